//! Page publisher implementation.

use md2conf_converter::{PageLink, rewrite_local_links};
use tracing::info;

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{Page, Space};

use super::error::PublishError;
use super::result::{DeleteResult, DryRunResult, PublishResult};
use super::{PreparedPage, PublishConfig};

/// Content property recording the editor generation.
const EDITOR_PROPERTY: &str = "editor";

/// Publishes prepared pages to a Confluence space.
pub struct Publisher<'a> {
    client: &'a ConfluenceClient,
    config: PublishConfig,
}

impl<'a> Publisher<'a> {
    /// Create a new publisher.
    #[must_use]
    pub fn new(client: &'a ConfluenceClient, config: PublishConfig) -> Self {
        Self { client, config }
    }

    /// Describe what would be published without contacting Confluence.
    #[must_use]
    pub fn dry_run(&self, page: &PreparedPage) -> DryRunResult {
        info!(
            "Simulating publish of '{}' to space {}",
            page.title, self.config.space_key
        );
        DryRunResult {
            title: page.title.clone(),
            markup: page.markup.clone(),
            attachment_names: page
                .attachments
                .iter()
                .map(|a| a.filename.clone())
                .collect(),
            warnings: page.warnings.clone(),
        }
    }

    /// Create or update the page, then upload attachments and sync metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the space or the ancestor page does not exist
    /// - any Confluence API call fails (a page created before the failure
    ///   is reported through [`PublishError::Incomplete`])
    pub fn publish(&self, page: &PreparedPage) -> Result<PublishResult, PublishError> {
        let space = self.client.find_space(&self.config.space_key)?;
        let parent_id = self.resolve_ancestor(&space)?;

        let existing = self.client.find_page(&space, &page.title)?;
        let created = existing.is_none();
        let current = match existing {
            Some(current) => current,
            None => {
                self.client
                    .create_page(&space, &page.title, &page.markup, parent_id.as_deref())?
            }
        };

        let updated = match self.finish(&space, &current, page, parent_id.as_deref(), created) {
            Ok(updated) => updated,
            Err(source) if created => {
                return Err(PublishError::Incomplete {
                    page_id: current.id,
                    source,
                });
            }
            Err(err) => return Err(err.into()),
        };

        Ok(PublishResult {
            url: self.client.page_url(&updated),
            page_id: updated.id,
            title: updated.title,
            version: updated.version.number,
            created,
            attachments_uploaded: page.attachments.len(),
            warnings: page.warnings.clone(),
        })
    }

    /// Delete the page titled `title`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::PageNotFound`] if the space has no such page.
    pub fn delete(&self, title: &str) -> Result<DeleteResult, PublishError> {
        let space = self.client.find_space(&self.config.space_key)?;
        let page = self
            .client
            .find_page(&space, title)?
            .ok_or_else(|| PublishError::PageNotFound {
                title: title.to_owned(),
                space: space.key.clone(),
            })?;

        self.client.delete_page(&page.id)?;
        info!("Deleted page {} ({})", page.id, page.title);

        Ok(DeleteResult {
            page_id: page.id,
            title: page.title,
        })
    }

    fn resolve_ancestor(&self, space: &Space) -> Result<Option<String>, PublishError> {
        let Some(title) = &self.config.ancestor else {
            return Ok(None);
        };
        match self.client.find_ancestor(space, title) {
            Ok(ancestor) => {
                info!("Using ancestor page {} ({})", ancestor.id, title);
                Ok(Some(ancestor.id))
            }
            Err(ConfluenceError::NotFound(_)) => Err(PublishError::AncestorNotFound {
                title: title.clone(),
                space: space.key.clone(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Steps that run once the page exists: attachments, link rewriting,
    /// update, properties and labels.
    fn finish(
        &self,
        space: &Space,
        current: &Page,
        page: &PreparedPage,
        parent_id: Option<&str>,
        created: bool,
    ) -> Result<Page, ConfluenceError> {
        for attachment in &page.attachments {
            self.client.upload_attachment(&current.id, attachment)?;
        }

        let link = PageLink {
            base_url: self.client.base_url(),
            space_key: &space.key,
            page_id: &current.id,
            title: &page.title,
        };
        let body = rewrite_local_links(
            &page.markup,
            &link,
            self.config.markdown_source,
            self.config.editor,
        );

        let updated = if !created || body != page.markup {
            self.client.update_page(
                &current.id,
                &page.title,
                &body,
                current.version.number,
                parent_id,
            )?
        } else {
            current.clone()
        };

        self.sync_properties(&updated.id)?;
        self.client.add_labels(&updated.id, &self.config.labels)?;
        Ok(updated)
    }

    /// Set the `editor` property and any extra properties, skipping values
    /// that are already current.
    fn sync_properties(&self, page_id: &str) -> Result<(), ConfluenceError> {
        let mut wanted = vec![(
            EDITOR_PROPERTY.to_owned(),
            format!("v{}", self.config.editor.number()),
        )];
        wanted.extend(self.config.properties.iter().cloned());

        let existing = self.client.get_page_properties(page_id)?;
        for (key, value) in wanted {
            let value = serde_json::Value::String(value);
            match existing.iter().find(|p| p.key == key) {
                Some(property) if property.value == value => {}
                Some(property) => {
                    self.client.update_page_property(page_id, property, &value)?;
                }
                None => {
                    self.client.create_page_property(page_id, &key, &value)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::Method::{DELETE, GET, POST, PUT};
    use httpmock::{Mock, MockServer};
    use md2conf_converter::{EditorVersion, LocalAttachment};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn prepared(markup: &str) -> PreparedPage {
        PreparedPage {
            title: "Guide".to_owned(),
            markup: markup.to_owned(),
            attachments: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn page_json(id: &str, version: u32) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Guide",
            "version": {"number": version},
            "_links": {"webui": format!("/spaces/DOC/pages/{id}/Guide")}
        })
    }

    fn mock_space(server: &MockServer) -> Mock<'_> {
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/spaces")
                .query_param("keys", "DOC");
            then.status(200)
                .json_body_obj(&json!({"results": [{"id": "100", "key": "DOC"}]}));
        })
    }

    fn mock_find<'a>(server: &'a MockServer, title: &str, results: serde_json::Value) -> Mock<'a> {
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v2/spaces/100/pages")
                .query_param("title", title);
            then.status(200).json_body_obj(&json!({"results": results}));
        })
    }

    fn mock_properties(server: &MockServer) -> (Mock<'_>, Mock<'_>) {
        let list = server.mock(|when, then| {
            when.method(GET).path_contains("/properties");
            then.status(200).json_body_obj(&json!({"results": []}));
        });
        let create = server.mock(|when, then| {
            when.method(POST).path_contains("/properties");
            then.status(200).json_body_obj(
                &json!({"id": "p", "key": "editor", "value": "v2", "version": {"number": 1}}),
            );
        });
        (list, create)
    }

    #[test]
    fn test_dry_run_makes_no_requests() {
        let server = MockServer::start();
        let any = server.mock(|when, then| {
            when.path_contains("/");
            then.status(500);
        });

        let client = ConfluenceClient::new(&server.base_url(), "u", "k");
        let publisher = Publisher::new(&client, PublishConfig::new("DOC"));
        let mut page = prepared("<p>hello</p>");
        page.attachments.push(LocalAttachment {
            filename: "a.png".to_owned(),
            path: "a.png".into(),
            content_type: "image/png".to_owned(),
        });

        let result = publisher.dry_run(&page);

        assert_eq!(any.hits(), 0);
        assert_eq!(result.markup, "<p>hello</p>");
        assert_eq!(result.attachment_names, ["a.png"]);
    }

    #[test]
    fn test_publish_creates_missing_page() {
        let server = MockServer::start();
        mock_space(&server);
        mock_find(&server, "Guide", json!([]));
        let create = server.mock(|when, then| {
            when.method(POST).path("/api/v2/pages");
            then.status(200).json_body_obj(&page_json("8", 1));
        });
        let update = server.mock(|when, then| {
            when.method(PUT).path("/api/v2/pages/8");
            then.status(200).json_body_obj(&page_json("8", 2));
        });
        let (_, create_property) = mock_properties(&server);

        let client = ConfluenceClient::new(&server.base_url(), "u", "k");
        let publisher = Publisher::new(&client, PublishConfig::new("DOC"));
        let result = publisher.publish(&prepared("<p>hello</p>")).unwrap();

        create.assert();
        assert_eq!(update.hits(), 0);
        create_property.assert();
        assert!(result.created);
        assert_eq!(result.page_id, "8");
        assert_eq!(result.version, 1);
        assert_eq!(
            result.url,
            format!("{}/spaces/DOC/pages/8/Guide", server.base_url())
        );
    }

    #[test]
    fn test_publish_updates_existing_page() {
        let server = MockServer::start();
        mock_space(&server);
        mock_find(&server, "Guide", json!([page_json("8", 5)]));
        let create = server.mock(|when, then| {
            when.method(POST).path("/api/v2/pages");
            then.status(200).json_body_obj(&page_json("9", 1));
        });
        let update = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/v2/pages/8")
                .body_contains(r#""number":6"#);
            then.status(200).json_body_obj(&page_json("8", 6));
        });
        mock_properties(&server);

        let client = ConfluenceClient::new(&server.base_url(), "u", "k");
        let publisher = Publisher::new(&client, PublishConfig::new("DOC"));
        let result = publisher.publish(&prepared("<p>hello</p>")).unwrap();

        assert_eq!(create.hits(), 0);
        update.assert();
        assert!(!result.created);
        assert_eq!(result.version, 6);
    }

    #[test]
    fn test_new_page_with_local_links_is_updated() {
        let server = MockServer::start();
        mock_space(&server);
        mock_find(&server, "Guide", json!([]));
        server.mock(|when, then| {
            when.method(POST).path("/api/v2/pages");
            then.status(200).json_body_obj(&page_json("8", 1));
        });
        let update = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/v2/pages/8")
                .body_contains("/spaces/DOC/pages/8/Guide#Setup");
            then.status(200).json_body_obj(&page_json("8", 2));
        });
        mock_properties(&server);

        let client = ConfluenceClient::new(&server.base_url(), "u", "k");
        let mut config = PublishConfig::new("DOC");
        config.editor = EditorVersion::V2;
        let publisher = Publisher::new(&client, config);
        let markup = "<h2>Setup</h2>\n<p><a href=\"#setup\">go</a></p>";
        let result = publisher.publish(&prepared(markup)).unwrap();

        update.assert();
        assert_eq!(result.version, 2);
    }

    #[test]
    fn test_missing_ancestor_is_fatal() {
        let server = MockServer::start();
        mock_space(&server);
        mock_find(&server, "Parent", json!([]));
        let create = server.mock(|when, then| {
            when.method(POST).path("/api/v2/pages");
            then.status(200).json_body_obj(&page_json("8", 1));
        });

        let client = ConfluenceClient::new(&server.base_url(), "u", "k");
        let mut config = PublishConfig::new("DOC");
        config.ancestor = Some("Parent".to_owned());
        let publisher = Publisher::new(&client, config);
        let err = publisher.publish(&prepared("<p>x</p>")).unwrap_err();

        assert!(matches!(err, PublishError::AncestorNotFound { .. }));
        assert_eq!(create.hits(), 0);
    }

    #[test]
    fn test_stale_version_conflict() {
        let server = MockServer::start();
        mock_space(&server);
        mock_find(&server, "Guide", json!([page_json("8", 5)]));
        server.mock(|when, then| {
            when.method(PUT).path("/api/v2/pages/8");
            then.status(409).body("stale");
        });

        let client = ConfluenceClient::new(&server.base_url(), "u", "k");
        let publisher = Publisher::new(&client, PublishConfig::new("DOC"));
        let err = publisher.publish(&prepared("<p>x</p>")).unwrap_err();

        assert!(matches!(
            err,
            PublishError::Confluence(ConfluenceError::Conflict(_))
        ));
    }

    #[test]
    fn test_failure_after_create_names_page() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start();
        mock_space(&server);
        mock_find(&server, "Guide", json!([]));
        server.mock(|when, then| {
            when.method(POST).path("/api/v2/pages");
            then.status(200).json_body_obj(&page_json("8", 1));
        });

        let client = ConfluenceClient::new(&server.base_url(), "u", "k");
        let publisher = Publisher::new(&client, PublishConfig::new("DOC"));
        let mut page = prepared("<p>x</p>");
        page.attachments.push(LocalAttachment {
            filename: "gone.png".to_owned(),
            path: dir.path().join("gone.png"),
            content_type: "image/png".to_owned(),
        });
        let err = publisher.publish(&page).unwrap_err();

        assert!(matches!(err, PublishError::Incomplete { ref page_id, .. } if page_id == "8"));
    }

    #[test]
    fn test_delete_page() {
        let server = MockServer::start();
        mock_space(&server);
        mock_find(&server, "Guide", json!([page_json("8", 5)]));
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/api/v2/pages/8");
            then.status(204);
        });

        let client = ConfluenceClient::new(&server.base_url(), "u", "k");
        let publisher = Publisher::new(&client, PublishConfig::new("DOC"));
        let result = publisher.delete("Guide").unwrap();

        delete.assert();
        assert_eq!(result.page_id, "8");
    }

    #[test]
    fn test_delete_missing_page() {
        let server = MockServer::start();
        mock_space(&server);
        mock_find(&server, "Guide", json!([]));

        let client = ConfluenceClient::new(&server.base_url(), "u", "k");
        let publisher = Publisher::new(&client, PublishConfig::new("DOC"));
        let err = publisher.delete("Guide").unwrap_err();

        assert!(matches!(err, PublishError::PageNotFound { .. }));
    }

    #[test]
    fn test_properties_and_labels() {
        let server = MockServer::start();
        mock_space(&server);
        mock_find(&server, "Guide", json!([page_json("8", 1)]));
        server.mock(|when, then| {
            when.method(PUT).path("/api/v2/pages/8");
            then.status(200).json_body_obj(&page_json("8", 2));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/pages/8/properties");
            then.status(200).json_body_obj(&json!({"results": [
                {"id": "p1", "key": "editor", "value": "v2", "version": {"number": 1}},
                {"id": "p2", "key": "owner", "value": "ops", "version": {"number": 4}}
            ]}));
        });
        let update_owner = server.mock(|when, then| {
            when.method(PUT)
                .path("/api/v2/pages/8/properties/p2")
                .json_body_obj(&json!({"key": "owner", "value": "docs", "version": {"number": 5}}));
            then.status(200).json_body_obj(
                &json!({"id": "p2", "key": "owner", "value": "docs", "version": {"number": 5}}),
            );
        });
        let update_editor = server.mock(|when, then| {
            when.method(PUT).path("/api/v2/pages/8/properties/p1");
            then.status(200);
        });
        let labels = server.mock(|when, then| {
            when.method(POST).path("/rest/api/content/8/label");
            then.status(200).json_body_obj(&json!({"results": []}));
        });

        let client = ConfluenceClient::new(&server.base_url(), "u", "k");
        let mut config = PublishConfig::new("DOC");
        config.properties = vec![("owner".to_owned(), "docs".to_owned())];
        config.labels = vec!["howto".to_owned()];
        let publisher = Publisher::new(&client, config);
        publisher.publish(&prepared("<p>x</p>")).unwrap();

        update_owner.assert();
        assert_eq!(update_editor.hits(), 0);
        labels.assert();
    }
}
