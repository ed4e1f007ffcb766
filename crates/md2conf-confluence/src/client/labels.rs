//! Label operations for Confluence API.

use serde::Serialize;
use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;

#[derive(Serialize)]
struct LabelRequest<'a> {
    prefix: &'static str,
    name: &'a str,
}

impl ConfluenceClient {
    /// Add global labels to a page. Labels already present are kept.
    pub fn add_labels(&self, page_id: &str, labels: &[String]) -> Result<(), ConfluenceError> {
        if labels.is_empty() {
            return Ok(());
        }
        let url = format!("{}/content/{}/label", self.rest_url(), page_id);

        info!("Adding labels to page {}: {}", page_id, labels.join(", "));

        let request: Vec<LabelRequest<'_>> = labels
            .iter()
            .map(|name| LabelRequest {
                prefix: "global",
                name,
            })
            .collect();

        let response = self
            .agent
            .post(&url)
            .header("Authorization", self.auth.header())
            .header("Accept", "application/json")
            .send_json(&request)?;

        Self::check(response, &format!("Page {page_id}"))?;
        Ok(())
    }
}
