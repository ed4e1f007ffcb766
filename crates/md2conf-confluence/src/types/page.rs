//! Confluence page types.

use serde::{Deserialize, Serialize};

/// Confluence page (v2 API).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Owning space ID.
    #[serde(default)]
    pub space_id: Option<String>,
    /// Parent page ID.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Version information.
    pub version: Version,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

/// Page or property version.
#[derive(Debug, Clone, Deserialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
    /// Version message/comment.
    #[serde(default)]
    pub message: Option<String>,
}

/// Hypermedia links.
#[derive(Debug, Clone, Deserialize)]
pub struct Links {
    /// Web UI path, relative to the wiki root.
    #[serde(default)]
    pub webui: Option<String>,
}

/// Pages API response.
#[derive(Debug, Clone, Deserialize)]
pub struct PagesResponse {
    /// Matching pages.
    pub results: Vec<Page>,
}

/// Storage-format body for create and update requests.
#[derive(Debug, Serialize)]
pub(crate) struct BodyWrite<'a> {
    pub representation: &'static str,
    pub value: &'a str,
}

impl<'a> BodyWrite<'a> {
    pub(crate) fn storage(value: &'a str) -> Self {
        Self {
            representation: "storage",
            value,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct VersionWrite<'a> {
    pub number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePageRequest<'a> {
    pub space_id: &'a str,
    pub status: &'static str,
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<&'a str>,
    pub body: BodyWrite<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatePageRequest<'a> {
    pub id: &'a str,
    pub status: &'static str,
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<&'a str>,
    pub body: BodyWrite<'a>,
    pub version: VersionWrite<'a>,
}
