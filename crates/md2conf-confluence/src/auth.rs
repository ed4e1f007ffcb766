//! HTTP basic authentication for Confluence Cloud API tokens.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;

/// Basic auth credentials, pre-encoded as an `Authorization` header value.
#[derive(Clone)]
pub(crate) struct BasicAuth {
    header: String,
}

impl BasicAuth {
    pub(crate) fn new(username: &str, api_key: &str) -> Self {
        let token = BASE64_STANDARD.encode(format!("{username}:{api_key}"));
        Self {
            header: format!("Basic {token}"),
        }
    }

    /// Value for the `Authorization` header.
    pub(crate) fn header(&self) -> &str {
        &self.header
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BasicAuth(..)")
    }
}
