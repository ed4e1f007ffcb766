//! Shared string helpers for markup rewriting.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// CDATA section (code block bodies).
static CDATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[.*?\]\]>").unwrap());

/// HTML tags, for slugs and plain-text link bodies.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Named HTML entities.
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&[a-z]+;").unwrap());

/// Escape text for use in XML content or attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Reverse the escaping applied by the markdown renderer.
///
/// `&amp;` is handled last so that `&amp;lt;` decodes to `&lt;`, not `<`.
#[must_use]
pub(crate) fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Strip all tags, leaving text content.
pub(crate) fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, "").into_owned()
}

/// Apply `re` to every part of `text` outside CDATA sections.
///
/// Code samples end up in CDATA after conversion; rules that run later must
/// not rewrite their contents.
pub(crate) fn replace_outside_cdata<F>(re: &Regex, text: &str, mut replace: F) -> String
where
    F: FnMut(&Captures<'_>) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for cdata in CDATA_RE.find_iter(text) {
        let segment = &text[last..cdata.start()];
        out.push_str(&re.replace_all(segment, |caps: &Captures<'_>| replace(caps)));
        out.push_str(cdata.as_str());
        last = cdata.end();
    }
    out.push_str(&re.replace_all(&text[last..], |caps: &Captures<'_>| replace(caps)));
    out
}

/// Heading anchor slug.
///
/// Tags and named entities are dropped, spaces become dashes and anything
/// outside `[a-zA-Z0-9-]` is removed.
pub(crate) fn slug(heading: &str, lowercase: bool) -> String {
    let text = if lowercase {
        heading.to_lowercase()
    } else {
        heading.to_owned()
    };
    let text = strip_tags(&text);
    let text = ENTITY_RE.replace_all(&text, "");
    text.chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if c.is_ascii_alphanumeric() || c == '-' => Some(c),
            _ => None,
        })
        .collect()
}
