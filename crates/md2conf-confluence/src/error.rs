//! Error types for Confluence API operations.

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Resource does not exist (HTTP 404 or empty lookup).
    #[error("{0} not found")]
    NotFound(String),

    /// Version mismatch on update (HTTP 409).
    #[error("Version conflict: {0}")]
    Conflict(String),

    /// Credentials rejected (HTTP 401/403).
    #[error("Authentication failed ({status}): {body}")]
    Authentication {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfluenceError {
    /// Map an error status to the matching variant.
    pub(crate) fn from_status(status: u16, body: String, resource: &str) -> Self {
        match status {
            401 | 403 => Self::Authentication { status, body },
            404 => Self::NotFound(resource.to_owned()),
            409 => Self::Conflict(body),
            _ => Self::HttpResponse { status, body },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ConfluenceError::from_status(404, String::new(), "Page 1"),
            ConfluenceError::NotFound(ref what) if what == "Page 1"
        ));
        assert!(matches!(
            ConfluenceError::from_status(409, String::new(), "Page 1"),
            ConfluenceError::Conflict(_)
        ));
        assert!(matches!(
            ConfluenceError::from_status(401, String::new(), ""),
            ConfluenceError::Authentication { status: 401, .. }
        ));
        assert!(matches!(
            ConfluenceError::from_status(500, "boom".to_owned(), ""),
            ConfluenceError::HttpResponse { status: 500, .. }
        ));
    }

    #[test]
    fn test_not_found_message() {
        let err = ConfluenceError::NotFound("Space DOC".to_owned());
        assert_eq!(err.to_string(), "Space DOC not found");
    }
}
