//! Space operations for Confluence API.

use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{Space, SpacesResponse};

impl ConfluenceClient {
    /// Look up a space by key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::NotFound`] if no space has this key.
    pub fn find_space(&self, key: &str) -> Result<Space, ConfluenceError> {
        let url = format!("{}/spaces", self.api_v2_url());
        let resource = format!("Space {key}");

        info!("Retrieving space information: {}", key);

        let response = self
            .agent
            .get(&url)
            .query("keys", key)
            .header("Authorization", self.auth.header())
            .header("Accept", "application/json")
            .call()?;

        let spaces: SpacesResponse = Self::read_json(response, &resource)?;
        spaces
            .results
            .into_iter()
            .find(|s| s.key == key)
            .ok_or(ConfluenceError::NotFound(resource))
    }
}
