//! Publish command: convert a markdown file and create, update or delete the
//! matching Confluence page.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use md2conf_config::{CliSettings, Config};
use md2conf_confluence::{
    ConfluenceClient, DryRunResult, PreparedPage, PublishConfig, PublishResult, Publisher,
};
use md2conf_converter::{Document, EditorVersion, MarkdownSource, MarkupConverter};
use tracing::debug;

use crate::error::CliError;
use crate::output::Output;

/// Markdown flavor used for in-page anchor links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum MarkdownSrc {
    /// GitHub-style `#slug` anchors.
    Default,
    /// Bitbucket-style `#markdown-header-slug` anchors.
    Bitbucket,
}

impl From<MarkdownSrc> for MarkdownSource {
    fn from(value: MarkdownSrc) -> Self {
        match value {
            MarkdownSrc::Default => Self::Default,
            MarkdownSrc::Bitbucket => Self::Bitbucket,
        }
    }
}

/// Arguments for publishing a markdown file.
#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct PublishArgs {
    /// Path to the markdown file.
    markdown_file: PathBuf,

    /// Key of the Confluence space to publish into.
    space_key: String,

    /// Confluence username.
    #[arg(short, long, env = "CONFLUENCE_USERNAME")]
    username: Option<String>,

    /// Confluence API key.
    #[arg(short = 'p', long = "apikey", env = "CONFLUENCE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Confluence organisation name (`acme` for acme.atlassian.net).
    #[arg(short, long, env = "CONFLUENCE_ORGNAME")]
    orgname: Option<String>,

    /// Full wiki URL, overrides the URL derived from the organisation name.
    #[arg(short = 'U', long = "wikiurl", env = "CONFLUENCE_URL")]
    wiki_url: Option<String>,

    /// Title of the parent page.
    #[arg(short, long)]
    ancestor: Option<String>,

    /// Delete the page instead of publishing it.
    #[arg(short, long)]
    delete: bool,

    /// Use http instead of https.
    #[arg(short, long)]
    nossl: bool,

    /// Log level: DEBUG, INFO, WARNING, ERROR, CRITICAL, or a tracing filter.
    #[arg(short, long, default_value = "INFO")]
    pub(crate) loglevel: String,

    /// Print the converted markup instead of publishing.
    #[arg(short, long)]
    simulate: bool,

    /// Page title (default: first line of the markdown file).
    #[arg(long)]
    title: Option<String>,

    /// Strip emoji characters from the page.
    #[arg(long = "remove-emojies")]
    remove_emojis: bool,

    /// Extra files to attach, relative to the markdown file.
    #[arg(short = 't', long = "attachment", num_args = 1..)]
    attachments: Vec<PathBuf>,

    /// Prepend a table of contents.
    #[arg(short, long)]
    contents: bool,

    /// Confluence editor version.
    #[arg(
        short = 'v',
        long = "version",
        default_value_t = 2,
        value_parser = clap::value_parser!(u8).range(1..=2)
    )]
    editor_version: u8,

    /// Markdown flavor for in-page anchor links.
    #[arg(short, long = "markdownsrc", value_enum, default_value_t = MarkdownSrc::Default)]
    markdown_src: MarkdownSrc,

    /// Label to add to the page (repeatable).
    #[arg(long = "label")]
    labels: Vec<String>,

    /// Content property to set, as key=value (repeatable).
    #[arg(long = "property", value_parser = parse_property)]
    properties: Vec<(String, String)>,

    /// Path to configuration file (default: auto-discover md2conf.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, conversion or any Confluence call fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            username: self.username.clone(),
            api_key: self.api_key.clone(),
            orgname: self.orgname.clone(),
            wiki_url: self.wiki_url.clone(),
            nossl: self.nossl.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let credentials = config.require_credentials()?;
        debug!("Confluence {} as {}", credentials.base_url, credentials.username);

        let document = Document::read(&self.markdown_file, self.title.as_deref())?;
        output.info(&format!("Converting {}...", self.markdown_file.display()));

        let converter = MarkupConverter::new()
            .remove_emojis(self.remove_emojis)
            .prepend_contents(self.contents);
        let page = PreparedPage::prepare(&document, &converter, &self.attachments);
        debug!(
            "Prepared \"{}\": {} attachments, {} warnings",
            page.title,
            page.attachments.len(),
            page.warnings.len()
        );
        for warning in &page.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        let client = ConfluenceClient::new(
            &credentials.base_url,
            &credentials.username,
            &credentials.api_key,
        );
        let publisher = Publisher::new(&client, self.publish_config()?);

        if self.simulate {
            print_dry_run_result(&output, &publisher.dry_run(&page));
        } else if self.delete {
            let result = publisher.delete(&page.title)?;
            output.success(&format!(
                "Deleted page \"{}\" (ID: {})",
                result.title, result.page_id
            ));
        } else {
            let result = publisher.publish(&page)?;
            print_publish_result(&output, &result);
        }

        Ok(())
    }

    fn publish_config(&self) -> Result<PublishConfig, CliError> {
        Ok(PublishConfig {
            space_key: self.space_key.clone(),
            ancestor: self.ancestor.clone(),
            editor: EditorVersion::try_from(self.editor_version).map_err(CliError::Validation)?,
            markdown_source: self.markdown_src.into(),
            properties: self.properties.clone(),
            labels: self.labels.clone(),
        })
    }
}

/// Parse a `key=value` content property.
fn parse_property(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected key=value, got '{value}'")),
    }
}

fn print_dry_run_result(output: &Output, result: &DryRunResult) {
    output.highlight("[SIMULATE] No changes made.");
    output.info(&format!("Title: {}", result.title));

    if !result.attachment_names.is_empty() {
        output.info(&format!("Attachments ({}):", result.attachment_names.len()));
        for name in &result.attachment_names {
            output.info(&format!("  -> {name}"));
        }
    }

    output.markup(&result.markup);
}

fn print_publish_result(output: &Output, result: &PublishResult) {
    if result.created {
        output.success("\nPage created successfully!");
    } else {
        output.success("\nPage updated successfully!");
    }
    output.info(&format!("ID: {}", result.page_id));
    output.info(&format!("Title: {}", result.title));
    output.info(&format!("Version: {}", result.version));
    output.info(&format!("URL: {}", result.url));

    if result.attachments_uploaded > 0 {
        output.info(&format!(
            "Attachments uploaded: {}",
            result.attachments_uploaded
        ));
    }
}
