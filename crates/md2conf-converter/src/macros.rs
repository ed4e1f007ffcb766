//! Confluence storage-format macro generation.
//!
//! Every macro emitted by the converter goes through [`structured_macro`],
//! so the markup shape stays consistent across rules.

use std::fmt::Write;

use crate::util::escape_html;

/// Callout panel kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    /// Blue information panel (plain blockquote, `~?…?~`).
    Info,
    /// Yellow note panel (`Note:` blockquote, `~!…!~`).
    Note,
    /// Red warning panel (`Warning:` blockquote, `~%…%~`).
    Warning,
}

impl PanelKind {
    /// Confluence macro name.
    #[must_use]
    pub fn macro_name(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Note => "note",
            Self::Warning => "warning",
        }
    }
}

/// Body of a structured macro.
pub(crate) enum MacroBody<'a> {
    /// No body (self-closing).
    None,
    /// `<ac:rich-text-body>` containing storage markup.
    RichText(&'a str),
    /// `<ac:plain-text-body>` containing raw text wrapped in CDATA.
    PlainText(&'a str),
}

/// Build an `ac:structured-macro` element.
pub(crate) fn structured_macro(name: &str, params: &[(&str, &str)], body: MacroBody<'_>) -> String {
    let mut out = String::with_capacity(128);
    write!(out, r#"<ac:structured-macro ac:name="{name}">"#).unwrap();
    for (key, value) in params {
        write!(
            out,
            r#"<ac:parameter ac:name="{key}">{}</ac:parameter>"#,
            escape_html(value)
        )
        .unwrap();
    }
    match body {
        MacroBody::None => {}
        MacroBody::RichText(content) => {
            write!(out, "<ac:rich-text-body>{content}</ac:rich-text-body>").unwrap();
        }
        MacroBody::PlainText(content) => {
            write!(
                out,
                "<ac:plain-text-body>{}</ac:plain-text-body>",
                cdata(content)
            )
            .unwrap();
        }
    }
    out.push_str("</ac:structured-macro>");
    out
}

/// Wrap text in a CDATA section, splitting any literal `]]>`.
pub(crate) fn cdata(content: &str) -> String {
    format!("<![CDATA[{}]]>", content.replace("]]>", "]]]]><![CDATA[>"))
}

/// Info, note or warning panel around storage markup.
pub(crate) fn panel(kind: PanelKind, content: &str) -> String {
    structured_macro(kind.macro_name(), &[], MacroBody::RichText(content))
}

/// Code block with syntax highlighting.
pub(crate) fn code_block(language: Option<&str>, content: &str) -> String {
    structured_macro(
        "code",
        &[
            ("theme", "Midnight"),
            ("linenumbers", "true"),
            ("language", language.unwrap_or("none")),
        ],
        MacroBody::PlainText(content),
    )
}

/// Table of contents replacing a doctoc block.
pub(crate) fn doctoc_toc() -> String {
    let toc = structured_macro(
        "toc",
        &[
            ("printable", "true"),
            ("style", "disc"),
            ("maxLevel", "7"),
            ("minLevel", "1"),
            ("type", "list"),
            ("outline", "clear"),
            ("include", ".*"),
        ],
        MacroBody::None,
    );
    format!("<p>{toc}</p>")
}

/// Table of contents replacing a `[TOC]` marker.
pub(crate) fn marker_toc() -> String {
    format!("<p>{}</p>", structured_macro("toc", &[], MacroBody::None))
}

/// Contents list prepended with `--contents`.
pub(crate) fn contents() -> String {
    structured_macro(
        "toc",
        &[
            ("printable", "true"),
            ("style", "disc"),
            ("maxLevel", "5"),
            ("minLevel", "1"),
            ("class", "rm-contents"),
            ("exclude", ""),
            ("type", "list"),
            ("outline", "false"),
            ("include", ""),
        ],
        MacroBody::None,
    )
}

/// Raw HTML embed (used for iframes).
pub(crate) fn html_embed(content: &str) -> String {
    format!(
        "<p>{}</p>",
        structured_macro("html", &[], MacroBody::PlainText(content))
    )
}
