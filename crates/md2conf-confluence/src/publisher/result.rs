//! Publish result types.

/// Result of publishing a page.
#[derive(Debug, Clone)]
pub struct PublishResult {
    /// Page ID.
    pub page_id: String,
    /// Page title.
    pub title: String,
    /// Version after publishing.
    pub version: u32,
    /// Browser URL.
    pub url: String,
    /// Whether the page was newly created.
    pub created: bool,
    /// Number of attachments uploaded.
    pub attachments_uploaded: usize,
    /// Non-fatal conversion problems.
    pub warnings: Vec<String>,
}

/// Result of a simulated publish (no network calls made).
#[derive(Debug, Clone)]
pub struct DryRunResult {
    /// Page title.
    pub title: String,
    /// Storage-format markup that would be published.
    pub markup: String,
    /// Names of the attachments that would be uploaded.
    pub attachment_names: Vec<String>,
    /// Non-fatal conversion problems.
    pub warnings: Vec<String>,
}

/// Result of deleting a page.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// ID of the deleted page.
    pub page_id: String,
    /// Title of the deleted page.
    pub title: String,
}
