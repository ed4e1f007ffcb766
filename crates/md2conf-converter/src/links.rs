//! In-page anchor link rewriting.
//!
//! Markdown renderers link headings with `#slug` fragments. Confluence
//! generates its own anchors, so once the page id is known each local link
//! that matches a heading is rewritten to a Confluence anchor.

use std::collections::HashMap;
use std::sync::LazyLock;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::macros::cdata;
use crate::util::{escape_html, replace_outside_cdata, slug, strip_tags};

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<h[1-6]>(.*?)</h[1-6]>").unwrap());

static LOCAL_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<a href="(#[^"]+)">(.+?)</a>"#).unwrap());

/// Tags and spaces, removed for editor v1 anchors.
static V1_ANCHOR_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(<.+?>|[ ])").unwrap());

/// Flavor of markdown the source was written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkdownSource {
    /// GitHub-style `#slug` anchors.
    #[default]
    Default,
    /// Bitbucket-style `#markdown-header-slug` anchors.
    Bitbucket,
}

impl MarkdownSource {
    fn anchor_prefix(self) -> &'static str {
        match self {
            Self::Default => "#",
            Self::Bitbucket => "#markdown-header-",
        }
    }
}

/// Confluence editor generation the page is stored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorVersion {
    /// Legacy editor: `ac:link` anchors.
    V1,
    /// New editor: plain anchors on the page URL.
    #[default]
    V2,
}

impl EditorVersion {
    /// Numeric version (stored in the `editor` content property as `v{n}`).
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }
}

impl TryFrom<u8> for EditorVersion {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(format!("unsupported editor version: {other}")),
        }
    }
}

/// The published page the links point into.
#[derive(Debug, Clone, Copy)]
pub struct PageLink<'a> {
    /// Wiki root URL.
    pub base_url: &'a str,
    /// Space key.
    pub space_key: &'a str,
    /// Page id.
    pub page_id: &'a str,
    /// Page title.
    pub title: &'a str,
}

impl PageLink<'_> {
    /// URL of the page in the new editor's address form.
    #[must_use]
    pub fn url(&self) -> String {
        let words: Vec<String> = self
            .title
            .split_whitespace()
            .map(|w| utf8_percent_encode(w, NON_ALPHANUMERIC).to_string())
            .collect();
        format!(
            "{}/spaces/{}/pages/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.space_key,
            self.page_id,
            words.join("+")
        )
    }
}

/// Rewrite `<a href="#…">` links that target a heading on the same page.
///
/// Links whose fragment matches no heading are left alone. Repeated
/// headings are addressed with `_1`, `_2`… suffixes on the markdown side.
#[must_use]
pub fn rewrite_local_links(
    html: &str,
    page: &PageLink<'_>,
    source: MarkdownSource,
    editor: EditorVersion,
) -> String {
    let anchors = heading_anchors(html, source, editor);
    if anchors.is_empty() {
        return html.to_owned();
    }
    info!("Converting local links");

    let page_url = page.url();
    replace_outside_cdata(&LOCAL_LINK_RE, html, |caps: &Captures<'_>| {
        let Some(anchor) = anchors.get(&caps[1]) else {
            return caps[0].to_owned();
        };
        debug!("Local link {} -> {anchor}", &caps[1]);
        let text = &caps[2];
        match editor {
            EditorVersion::V1 => format!(
                r#"<ac:link ac:anchor="{}"><ac:plain-text-link-body>{}</ac:plain-text-link-body></ac:link>"#,
                escape_html(anchor),
                cdata(strip_tags(text).trim())
            ),
            EditorVersion::V2 => format!(
                r#"<a href="{page_url}#{}" title="{}">{text}</a>"#,
                escape_html(anchor),
                escape_html(strip_tags(text).trim())
            ),
        }
    })
}

/// Map markdown fragments (`#slug`) to Confluence anchors for each heading.
fn heading_anchors(
    html: &str,
    source: MarkdownSource,
    editor: EditorVersion,
) -> HashMap<String, String> {
    let prefix = source.anchor_prefix();
    let mut anchors = HashMap::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for caps in HEADING_RE.captures_iter(html) {
        let heading = &caps[1];
        let key = format!("{prefix}{}", slug(heading, true));
        let value = match editor {
            EditorVersion::V1 => V1_ANCHOR_STRIP_RE.replace_all(heading, "").into_owned(),
            EditorVersion::V2 => slug(heading, false),
        };

        match counts.get_mut(&key) {
            Some(count) => {
                anchors.insert(format!("{key}_{count}"), format!("{value}.{count}"));
                *count += 1;
            }
            None => {
                anchors.insert(key.clone(), value);
                counts.insert(key, 1);
            }
        }
    }
    anchors
}
