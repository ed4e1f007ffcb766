//! Image reference resolution.
//!
//! Local `<img>` references are rewritten to attachment references and
//! collected for upload. Remote images become URL references and are left
//! on their origin server.

use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};

use crate::util::{escape_html, replace_outside_cdata, unescape_html};

static IMG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<img\b([^>]*?)\s*/?>").unwrap());

static ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([a-zA-Z][a-zA-Z0-9-]*)\s*=\s*"([^"]*)""#).unwrap());

/// A local file to upload as a page attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAttachment {
    /// Attachment name on the page (the file's base name).
    pub filename: String,
    /// Absolute path on disk.
    pub path: PathBuf,
    /// MIME type guessed from the extension.
    pub content_type: String,
}

impl LocalAttachment {
    fn new(filename: String, path: PathBuf) -> Self {
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_owned();
        Self {
            filename,
            path,
            content_type,
        }
    }
}

/// Markup with images rewritten, plus the files it references.
#[derive(Debug, Clone, Default)]
pub struct ResolvedImages {
    /// Rewritten markup.
    pub html: String,
    /// Files to upload, unique by filename, in first-seen order.
    pub attachments: Vec<LocalAttachment>,
    /// Non-fatal problems (missing files, name clashes).
    pub warnings: Vec<String>,
}

impl ResolvedImages {
    /// Add an attachment unless one with the same name is already present.
    fn push(&mut self, attachment: LocalAttachment) {
        let clash = match self
            .attachments
            .iter()
            .find(|a| a.filename == attachment.filename)
        {
            None => {
                self.attachments.push(attachment);
                return;
            }
            Some(existing) if existing.path == attachment.path => return,
            Some(existing) => format!(
                "Attachment name {} used by both {} and {}, keeping the first",
                attachment.filename,
                existing.path.display(),
                attachment.path.display()
            ),
        };
        self.warn(clash);
    }

    /// Record a problem for the caller to report.
    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Add extra files given on the command line.
    ///
    /// Relative paths resolve against `source_dir`. Missing files produce a
    /// warning and are skipped.
    pub fn add_files(&mut self, files: &[PathBuf], source_dir: &Path) {
        for file in files {
            let path = resolve_path(file, source_dir);
            let Some(filename) = file_name(&path) else {
                self.warn(format!("Not a file: {}", path.display()));
                continue;
            };
            if !path.is_file() {
                self.warn(format!("Attachment file not found: {}", path.display()));
                continue;
            }
            self.push(LocalAttachment::new(filename, path));
        }
    }
}

/// Rewrite `<img>` tags in converted markup.
///
/// Local images become `ri:attachment` references named by their base file
/// name; every existing file is returned for upload. Images whose file does
/// not exist are still rewritten, and reported in `warnings`. Code samples
/// (CDATA sections) are never touched.
#[must_use]
pub fn resolve_images(html: &str, source_dir: &Path) -> ResolvedImages {
    let mut resolved = ResolvedImages::default();
    let rewritten = replace_outside_cdata(&IMG_RE, html, |caps: &Captures<'_>| {
        rewrite_image(&caps[1], source_dir, &mut resolved).unwrap_or_else(|| caps[0].to_owned())
    });
    resolved.html = rewritten;
    resolved
}

fn rewrite_image(attrs: &str, source_dir: &Path, resolved: &mut ResolvedImages) -> Option<String> {
    let mut src = None;
    let mut alt = None;
    let mut title = None;
    for caps in ATTR_RE.captures_iter(attrs) {
        let value = unescape_html(&caps[2]);
        match caps[1].to_ascii_lowercase().as_str() {
            "src" => src = Some(value),
            "alt" => alt = Some(value),
            "title" => title = Some(value),
            _ => {}
        }
    }
    let src = src.filter(|s| !s.is_empty())?;

    let mut image_attrs = String::new();
    if let Some(alt) = alt.filter(|a| !a.is_empty()) {
        write!(image_attrs, r#" ac:alt="{}""#, escape_html(&alt)).unwrap();
    }
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        write!(image_attrs, r#" ac:title="{}""#, escape_html(&title)).unwrap();
    }

    if is_remote(&src) {
        return Some(format!(
            r#"<ac:image{image_attrs}><ri:url ri:value="{}" /></ac:image>"#,
            escape_html(&src)
        ));
    }

    let local = src.split(['?', '#']).next().unwrap_or(&src);
    let decoded = percent_decode_str(local).decode_utf8_lossy();
    let path = resolve_path(Path::new(decoded.as_ref()), source_dir);
    let filename = file_name(&path)?;

    if path.is_file() {
        resolved.push(LocalAttachment::new(filename.clone(), path));
    } else {
        resolved.warn(format!("Image file not found: {}", path.display()));
    }

    Some(format!(
        r#"<ac:image{image_attrs}><ri:attachment ri:filename="{}" /></ac:image>"#,
        escape_html(&filename)
    ))
}

fn is_remote(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    ["http://", "https://", "//", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

fn resolve_path(path: &Path, source_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        source_dir.join(path)
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, b"\x89PNG").unwrap();
        path
    }

    #[test]
    fn test_local_image_becomes_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch(dir.path(), "img/diagram.png");

        let resolved = resolve_images(
            r#"<p><img src="img/diagram.png" alt="Diagram" /></p>"#,
            dir.path(),
        );

        assert_eq!(
            resolved.html,
            r#"<p><ac:image ac:alt="Diagram"><ri:attachment ri:filename="diagram.png" /></ac:image></p>"#
        );
        assert_eq!(
            resolved.attachments,
            vec![LocalAttachment {
                filename: "diagram.png".to_owned(),
                path,
                content_type: "image/png".to_owned(),
            }]
        );
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_remote_image_becomes_url() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_images(
            r#"<img src="https://example.com/a.png?x=1&amp;y=2" alt="" />"#,
            dir.path(),
        );
        assert_eq!(
            resolved.html,
            r#"<ac:image><ri:url ri:value="https://example.com/a.png?x=1&amp;y=2" /></ac:image>"#
        );
        assert!(resolved.attachments.is_empty());
    }

    #[test]
    fn test_missing_image_warns() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_images(r#"<img src="missing.png" alt="x" />"#, dir.path());
        assert!(resolved.html.contains(r#"ri:filename="missing.png""#));
        assert!(resolved.attachments.is_empty());
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("missing.png"));
    }

    #[test]
    fn test_duplicate_references_upload_once() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.png");
        let html = r#"<img src="a.png" alt="" /><img src="./a.png" alt="" />"#;

        let resolved = resolve_images(html, dir.path());
        assert_eq!(resolved.attachments.len(), 1);
        assert_eq!(resolved.html.matches(r#"ri:filename="a.png""#).count(), 2);
    }

    #[test]
    fn test_name_clash_keeps_first() {
        let dir = tempfile::tempdir().unwrap();
        let first = touch(dir.path(), "one/logo.png");
        touch(dir.path(), "two/logo.png");
        let html = r#"<img src="one/logo.png" alt="" /><img src="two/logo.png" alt="" />"#;

        let resolved = resolve_images(html, dir.path());
        assert_eq!(resolved.attachments.len(), 1);
        assert_eq!(resolved.attachments[0].path, first);
        assert_eq!(resolved.warnings.len(), 1);
    }

    #[test]
    fn test_percent_encoded_src() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "my image.png");
        let resolved = resolve_images(r#"<img src="my%20image.png" alt="" />"#, dir.path());
        assert_eq!(resolved.attachments[0].filename, "my image.png");
    }

    #[test]
    fn test_images_in_code_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let html = r#"<![CDATA[<img src="a.png" />]]>"#;
        let resolved = resolve_images(html, dir.path());
        assert_eq!(resolved.html, html);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_add_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "report.pdf");
        let mut resolved = ResolvedImages::default();

        resolved.add_files(
            &[PathBuf::from("report.pdf"), PathBuf::from("absent.zip")],
            dir.path(),
        );

        assert_eq!(resolved.attachments.len(), 1);
        assert_eq!(resolved.attachments[0].content_type, "application/pdf");
        assert_eq!(resolved.warnings.len(), 1);
    }
}
