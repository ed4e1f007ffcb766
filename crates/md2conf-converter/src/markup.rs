//! Markdown to Confluence storage markup conversion.
//!
//! Markdown is rendered to HTML by `pulldown-cmark`, then a fixed sequence of
//! regex rewrites turns the Confluence-specific conventions into storage
//! format macros:
//!
//! 1. `[TOC]` marker
//! 2. `~?…?~`, `~!…!~`, `~%…%~` custom tags
//! 3. Blockquotes (`Note:` / `Warning:` prefixes select the panel)
//! 4. doctoc region
//! 5. HTML comments
//! 6. iframes
//! 7. Fenced code blocks
//! 8. Emoji removal (optional)
//!
//! Order matters: code blocks are converted last so that earlier rules never
//! see unescaped code, and comments are converted after the doctoc markers
//! they delimit.

use std::sync::LazyLock;

use pulldown_cmark::{Options, Parser, html};
use regex::{Captures, NoExpand, Regex};
use tracing::debug;

use crate::macros::{self, PanelKind};
use crate::util::{escape_html, unescape_html};

static TOC_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<p>\[TOC\]</p>").unwrap());

static INFO_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p>~\?.*?\?~</p>").unwrap());
static NOTE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p>~!.*?!~</p>").unwrap());
static WARNING_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<p>~%.*?%~</p>").unwrap());

/// `Note:` prefix at the start of a blockquote, with optional emphasis.
static NOTE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| prefix_regex("note"));
/// `Warning:` prefix at the start of a blockquote, with optional emphasis.
static WARNING_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| prefix_regex("warning"));

static DOCTOC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--\s*START doctoc.*?END doctoc.*?-->").unwrap());

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--(.*?)-->").unwrap());

static IFRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<iframe\b.*?</iframe>").unwrap());

static CODE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<pre><code(?: class="language-([^"]*)")?>(.*?)</code></pre>"#).unwrap()
});

static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}\x{1F1E0}-\x{1F1FF}]+")
        .unwrap()
});

const BLOCKQUOTE_OPEN: &str = "<blockquote>";
const BLOCKQUOTE_CLOSE: &str = "</blockquote>";

fn prefix_regex(word: &str) -> Regex {
    Regex::new(&format!(
        r"(?i)^<p>\s*(?:<(?:strong|em)>\s*)?{word}\s*(?:</(?:strong|em)>\s*)?:\s*(?:</(?:strong|em)>\s*)?"
    ))
    .unwrap()
}

/// Converts markdown to Confluence storage markup.
///
/// # Example
///
/// ```
/// use md2conf_converter::MarkupConverter;
///
/// let markup = MarkupConverter::new().convert("> Note: mind the gap");
/// assert!(markup.contains(r#"ac:name="note""#));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarkupConverter {
    remove_emojis: bool,
    prepend_contents: bool,
}

impl MarkupConverter {
    /// Create a converter with all optional rules disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip emoji characters from the output.
    #[must_use]
    pub fn remove_emojis(mut self, enabled: bool) -> Self {
        self.remove_emojis = enabled;
        self
    }

    /// Prepend a contents (toc) macro to the page.
    #[must_use]
    pub fn prepend_contents(mut self, enabled: bool) -> Self {
        self.prepend_contents = enabled;
        self
    }

    /// Render markdown to plain HTML without any Confluence rewriting.
    #[must_use]
    pub fn render_html(markdown: &str) -> String {
        let options = Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES;
        let parser = Parser::new_ext(markdown, options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }

    /// Convert markdown to Confluence storage markup.
    #[must_use]
    pub fn convert(&self, markdown: &str) -> String {
        let html = Self::render_html(markdown);

        let html = convert_toc_marker(&html);
        let html = convert_custom_tags(&html);
        let html = convert_blockquotes(html);
        let html = convert_doctoc(&html);
        let html = convert_comments(&html);
        let html = convert_iframes(&html);
        let mut html = convert_code_blocks(&html);

        if self.remove_emojis {
            html = remove_emojis(&html);
        }
        if self.prepend_contents {
            html = format!("{}\n{html}", macros::contents());
        }

        debug!("Converted markup: {} bytes", html.len());
        html
    }
}

/// Replace the first `[TOC]` paragraph with a toc macro.
fn convert_toc_marker(html: &str) -> String {
    TOC_MARKER_RE
        .replacen(html, 1, NoExpand(&macros::marker_toc()))
        .into_owned()
}

/// Convert `~?…?~`, `~!…!~` and `~%…%~` paragraphs to panels.
///
/// An opening tag without its closing counterpart never matches and stays
/// as literal text.
fn convert_custom_tags(html: &str) -> String {
    let mut html = html.to_owned();
    for (re, open, close, kind) in [
        (&*INFO_TAG_RE, "<p>~?", "?~</p>", PanelKind::Info),
        (&*NOTE_TAG_RE, "<p>~!", "!~</p>", PanelKind::Note),
        (&*WARNING_TAG_RE, "<p>~%", "%~</p>", PanelKind::Warning),
    ] {
        html = convert_custom_tag(&html, re, open, close, kind);
    }
    html
}

/// Wrap each `open … close` span in a panel.
///
/// A match is narrowed to the last opener before its closer, so an unclosed
/// opener earlier in the page stays literal.
fn convert_custom_tag(
    html: &str,
    re: &Regex,
    open: &str,
    close: &str,
    kind: PanelKind,
) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(m) = re.find_at(html, pos) {
        let body_end = m.end() - close.len();
        let start = m.start() + html[m.start()..body_end].rfind(open).unwrap_or(0);
        out.push_str(&html[pos..start]);
        let body = &html[start + open.len()..body_end];
        out.push_str(&macros::panel(kind, &format!("<p>{body}</p>")));
        pos = m.end();
    }
    out.push_str(&html[pos..]);
    out
}

/// Convert blockquotes to info, note or warning panels.
///
/// Innermost blockquotes are converted first so nesting stays balanced.
fn convert_blockquotes(mut html: String) -> String {
    while let Some(end) = html.find(BLOCKQUOTE_CLOSE) {
        let Some(start) = html[..end].rfind(BLOCKQUOTE_OPEN) else {
            break;
        };
        let inner = &html[start + BLOCKQUOTE_OPEN.len()..end];
        let replacement = blockquote_panel(inner.trim());
        html.replace_range(start..end + BLOCKQUOTE_CLOSE.len(), &replacement);
    }
    html
}

fn blockquote_panel(inner: &str) -> String {
    for (re, kind) in [
        (&*NOTE_PREFIX_RE, PanelKind::Note),
        (&*WARNING_PREFIX_RE, PanelKind::Warning),
    ] {
        if let Some(prefix) = re.find(inner) {
            let rest = capitalize_first(&inner[prefix.end()..]);
            return macros::panel(kind, &format!("<p>{rest}"));
        }
    }
    macros::panel(PanelKind::Info, inner)
}

/// Upper-case the first character unless the text starts with markup.
fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first != '<' => first.to_uppercase().chain(chars).collect(),
        _ => text.to_owned(),
    }
}

/// Replace a doctoc-generated region with a single toc macro.
fn convert_doctoc(html: &str) -> String {
    DOCTOC_RE
        .replace_all(html, NoExpand(&macros::doctoc_toc()))
        .into_owned()
}

/// Turn HTML comments into Confluence placeholders (hidden in view mode).
fn convert_comments(html: &str) -> String {
    COMMENT_RE
        .replace_all(html, |caps: &Captures<'_>| {
            format!(
                "<ac:placeholder>{}</ac:placeholder>",
                escape_html(caps[1].trim())
            )
        })
        .into_owned()
}

fn convert_iframes(html: &str) -> String {
    IFRAME_RE
        .replace_all(html, |caps: &Captures<'_>| macros::html_embed(&caps[0]))
        .into_owned()
}

/// Convert `<pre><code>` blocks to code macros.
fn convert_code_blocks(html: &str) -> String {
    CODE_BLOCK_RE
        .replace_all(html, |caps: &Captures<'_>| {
            let language = caps.get(1).map(|m| m.as_str()).filter(|l| !l.is_empty());
            macros::code_block(language, &unescape_html(&caps[2]))
        })
        .into_owned()
}

fn remove_emojis(html: &str) -> String {
    EMOJI_RE.replace_all(html, "").into_owned()
}
