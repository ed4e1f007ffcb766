//! Page publisher for Confluence.
//!
//! This module provides the [`Publisher`] struct that encapsulates the
//! workflow for publishing a markdown document as a Confluence page:
//!
//! 1. Convert markdown to storage format and resolve images ([`PreparedPage`])
//! 2. Resolve the space and optional parent page
//! 3. Create the page if it does not exist yet
//! 4. Upload attachments
//! 5. Rewrite in-page links and update the page
//! 6. Sync content properties and labels
//!
//! Nothing is rolled back on failure: a page created before a failing step
//! stays in place, and the error names its id.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use md2conf_confluence::{ConfluenceClient, PreparedPage, PublishConfig, Publisher};
//! use md2conf_converter::{Document, MarkupConverter};
//!
//! let client = ConfluenceClient::new("https://acme.atlassian.net/wiki", "me@acme.com", "token");
//! let document = Document::read(Path::new("README.md"), None)?;
//! let page = PreparedPage::prepare(&document, &MarkupConverter::new(), &[]);
//!
//! let publisher = Publisher::new(&client, PublishConfig::new("DOC"));
//! let result = publisher.publish(&page)?;
//! println!("{}", result.url);
//! # Ok(())
//! # }
//! ```

mod error;
mod executor;
mod result;

pub use error::PublishError;
pub use executor::Publisher;
pub use result::{DeleteResult, DryRunResult, PublishResult};

use std::path::PathBuf;

use md2conf_converter::{
    Document, EditorVersion, LocalAttachment, MarkdownSource, MarkupConverter, resolve_images,
};

/// Configuration for publishing a page.
#[derive(Debug, Clone, Default)]
pub struct PublishConfig {
    /// Key of the target space.
    pub space_key: String,
    /// Title of the parent page, if any.
    pub ancestor: Option<String>,
    /// Editor generation (controls anchor links and the `editor` property).
    pub editor: EditorVersion,
    /// Markdown flavor for in-page anchor links.
    pub markdown_source: MarkdownSource,
    /// Extra content properties to set, as key/value pairs.
    pub properties: Vec<(String, String)>,
    /// Labels to add to the page.
    pub labels: Vec<String>,
}

impl PublishConfig {
    /// Config for publishing into `space_key` with default options.
    #[must_use]
    pub fn new(space_key: &str) -> Self {
        Self {
            space_key: space_key.to_owned(),
            ..Self::default()
        }
    }
}

/// A converted document ready to publish.
#[derive(Debug, Clone)]
pub struct PreparedPage {
    /// Page title.
    pub title: String,
    /// Storage-format markup.
    pub markup: String,
    /// Files to upload.
    pub attachments: Vec<LocalAttachment>,
    /// Non-fatal conversion problems.
    pub warnings: Vec<String>,
}

impl PreparedPage {
    /// Convert a document and resolve its images and extra attachments.
    ///
    /// Extra files are resolved relative to the document's directory.
    #[must_use]
    pub fn prepare(
        document: &Document,
        converter: &MarkupConverter,
        extra_files: &[PathBuf],
    ) -> Self {
        let markup = converter.convert(&document.body);
        let source_dir = document.source_dir();
        let mut resolved = resolve_images(&markup, &source_dir);
        resolved.add_files(extra_files, &source_dir);

        Self {
            title: document.title.clone(),
            markup: resolved.html,
            attachments: resolved.attachments,
            warnings: resolved.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_prepare() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.png"), b"png").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"txt").unwrap();
        let path = dir.path().join("page.md");
        std::fs::write(&path, "# Guide\n\n![Logo](logo.png)\n\n![Gone](gone.png)\n").unwrap();

        let document = Document::read(&path, None).unwrap();
        let page = PreparedPage::prepare(
            &document,
            &MarkupConverter::new(),
            &[PathBuf::from("notes.txt")],
        );

        assert_eq!(page.title, "Guide");
        assert!(page.markup.contains(r#"<ri:attachment ri:filename="logo.png" />"#));
        let names: Vec<_> = page.attachments.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, ["logo.png", "notes.txt"]);
        assert_eq!(page.warnings.len(), 1);
        assert!(page.warnings[0].contains("gone.png"));
    }
}
