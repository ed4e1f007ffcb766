//! Confluence REST API client.
//!
//! Provides a sync HTTP client for Confluence Cloud. Pages, spaces,
//! attachment lookup and content properties use the v2 API; attachment
//! upload and labels use the v1 API. Authentication is HTTP basic auth with
//! an API token.

mod attachments;
mod labels;
mod pages;
mod properties;
mod spaces;

use std::time::Duration;

use serde::de::DeserializeOwned;
use ureq::Agent;
use ureq::http::Response;

use crate::auth::BasicAuth;
use crate::error::ConfluenceError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Confluence REST API client.
#[derive(Debug)]
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth: BasicAuth,
}

impl ConfluenceClient {
    /// Create a client for the wiki rooted at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Wiki root, e.g. `https://acme.atlassian.net/wiki`
    /// * `username` - Atlassian account email
    /// * `api_key` - API token
    #[must_use]
    pub fn new(base_url: &str, username: &str, api_key: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth: BasicAuth::new(username, api_key),
        }
    }

    /// Wiki root URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the v2 API base URL.
    fn api_v2_url(&self) -> String {
        format!("{}/api/v2", self.base_url)
    }

    /// Get the v1 API base URL.
    fn rest_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }

    /// Return the body of a successful response, or map the status to an error.
    ///
    /// `resource` names what was requested, for not-found messages.
    fn check(response: Response<ureq::Body>, resource: &str) -> Result<ureq::Body, ConfluenceError> {
        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::from_status(status, error_body, resource));
        }
        Ok(body)
    }

    /// Check the response and decode its JSON body.
    fn read_json<T: DeserializeOwned>(
        response: Response<ureq::Body>,
        resource: &str,
    ) -> Result<T, ConfluenceError> {
        Ok(Self::check(response, resource)?.read_json()?)
    }
}
