//! Content property operations for Confluence API.

use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{
    CreatePropertyRequest, PropertiesResponse, Property, UpdatePropertyRequest, VersionWrite,
};

impl ConfluenceClient {
    /// List content properties on a page.
    pub fn get_page_properties(&self, page_id: &str) -> Result<Vec<Property>, ConfluenceError> {
        let url = format!("{}/pages/{}/properties", self.api_v2_url(), page_id);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", self.auth.header())
            .header("Accept", "application/json")
            .call()?;

        let properties: PropertiesResponse =
            Self::read_json(response, &format!("Page {page_id}"))?;
        Ok(properties.results)
    }

    /// Add a content property to a page.
    pub fn create_page_property(
        &self,
        page_id: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<Property, ConfluenceError> {
        let url = format!("{}/pages/{}/properties", self.api_v2_url(), page_id);

        info!("Setting page property {} on page {}", key, page_id);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", self.auth.header())
            .header("Accept", "application/json")
            .send_json(&CreatePropertyRequest { key, value })?;

        Self::read_json(response, &format!("Page {page_id}"))
    }

    /// Replace the value of an existing content property.
    pub fn update_page_property(
        &self,
        page_id: &str,
        property: &Property,
        value: &serde_json::Value,
    ) -> Result<Property, ConfluenceError> {
        let url = format!(
            "{}/pages/{}/properties/{}",
            self.api_v2_url(),
            page_id,
            property.id
        );

        info!("Updating page property {} on page {}", property.key, page_id);

        let request = UpdatePropertyRequest {
            key: &property.key,
            value,
            version: VersionWrite {
                number: property.version.number + 1,
                message: None,
            },
        };

        let response = self
            .agent
            .put(&url)
            .header("Authorization", self.auth.header())
            .header("Accept", "application/json")
            .send_json(&request)?;

        Self::read_json(response, &format!("Property {}", property.key))
    }
}
