//! Publish error types.

use crate::error::ConfluenceError;

/// Error during page publishing.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Confluence API error.
    #[error(transparent)]
    Confluence(#[from] ConfluenceError),

    /// Parent page given with `--ancestor` does not exist.
    #[error("Ancestor page '{title}' not found in space {space}")]
    AncestorNotFound {
        /// Ancestor title.
        title: String,
        /// Space key.
        space: String,
    },

    /// Page to delete does not exist.
    #[error("Page '{title}' not found in space {space}")]
    PageNotFound {
        /// Page title.
        title: String,
        /// Space key.
        space: String,
    },

    /// A step after page creation failed; the page was left in place.
    #[error("Page {page_id} was created but publishing did not complete: {source}")]
    Incomplete {
        /// ID of the page that now exists.
        page_id: String,
        /// The failing operation's error.
        #[source]
        source: ConfluenceError,
    },
}
