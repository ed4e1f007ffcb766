//! Markdown to Confluence storage format conversion.
//!
//! The conversion pipeline has three stages, each usable on its own:
//!
//! - [`Document`] reads a markdown file and derives the page title
//! - [`MarkupConverter`] renders markdown and rewrites it into storage markup
//!   (panels, code macros, table of contents, placeholders)
//! - [`resolve_images`] turns `<img>` tags into attachment references and
//!   collects the files to upload
//!
//! [`rewrite_local_links`] runs after publishing, once the page id is known.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use md2conf_converter::{Document, MarkupConverter, resolve_images};
//!
//! let doc = Document::read(Path::new("README.md"), None)?;
//! let markup = MarkupConverter::new().convert(&doc.body);
//! let resolved = resolve_images(&markup, &doc.source_dir());
//! for warning in &resolved.warnings {
//!     eprintln!("{warning}");
//! }
//! ```

mod attachments;
mod document;
mod links;
mod macros;
mod markup;
mod util;

pub use attachments::{LocalAttachment, ResolvedImages, resolve_images};
pub use document::{Document, DocumentError};
pub use links::{EditorVersion, MarkdownSource, PageLink, rewrite_local_links};
pub use macros::PanelKind;
pub use markup::MarkupConverter;
pub use util::escape_html;
