//! Markdown source documents.

use std::path::{Path, PathBuf};

/// Error reading a markdown document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Source file does not exist.
    #[error("Markdown file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Source file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// No title override and the first line is empty.
    #[error("Cannot derive page title from first line of {}", .0.display())]
    MissingTitle(PathBuf),
}

/// A markdown document ready for conversion.
#[derive(Debug, Clone)]
pub struct Document {
    /// Page title.
    pub title: String,
    /// Markdown body (without the title line when the title was derived).
    pub body: String,
    /// Path of the source file.
    pub path: PathBuf,
}

impl Document {
    /// Read a markdown file from disk.
    ///
    /// Without `title_override`, the first line supplies the title (leading
    /// `#` characters stripped) and is removed from the body together with
    /// a setext `===` / `---` underline. With an override, the whole file is
    /// the body.
    pub fn read(path: &Path, title_override: Option<&str>) -> Result<Self, DocumentError> {
        if !path.exists() {
            return Err(DocumentError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_markdown(path, &text, title_override)
    }

    /// Build a document from markdown text already in memory.
    pub fn from_markdown(
        path: &Path,
        text: &str,
        title_override: Option<&str>,
    ) -> Result<Self, DocumentError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let (title, body) = if let Some(title) = title_override {
            (title.trim().to_owned(), text.to_owned())
        } else {
            let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
            (title_from_line(first), strip_setext_underline(first, rest).to_owned())
        };

        if title.is_empty() {
            return Err(DocumentError::MissingTitle(path.to_path_buf()));
        }

        Ok(Self {
            title,
            body,
            path: path.to_path_buf(),
        })
    }

    /// Directory containing the source file; relative references resolve here.
    #[must_use]
    pub fn source_dir(&self) -> PathBuf {
        let absolute = std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone());
        absolute
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }
}

/// Derive a title from a markdown line: `# Hello World` becomes `Hello World`.
fn title_from_line(line: &str) -> String {
    line.trim_start_matches('#').trim().to_owned()
}

/// Drop the `===` or `---` underline of a setext title from the body.
fn strip_setext_underline<'a>(first: &str, rest: &'a str) -> &'a str {
    if first.trim_start().starts_with('#') {
        return rest;
    }
    let (second, after) = rest.split_once('\n').unwrap_or((rest, ""));
    let underline = second.trim();
    let is_underline = !underline.is_empty()
        && (underline.chars().all(|c| c == '=') || underline.chars().all(|c| c == '-'));
    if is_underline { after } else { rest }
}
