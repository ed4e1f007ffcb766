//! Page operations for Confluence API.

use tracing::{debug, info};

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{
    BodyWrite, CreatePageRequest, Page, PagesResponse, Space, UpdatePageRequest, VersionWrite,
};

impl ConfluenceClient {
    /// Find a page in `space` by exact title.
    ///
    /// Returns `Ok(None)` if the space has no page with this title.
    pub fn find_page(&self, space: &Space, title: &str) -> Result<Option<Page>, ConfluenceError> {
        let url = format!("{}/spaces/{}/pages", self.api_v2_url(), space.id);

        info!("Retrieving page information: {}", title);

        let response = self
            .agent
            .get(&url)
            .query("title", title)
            .header("Authorization", self.auth.header())
            .header("Accept", "application/json")
            .call()?;

        let pages: PagesResponse = Self::read_json(response, &format!("Space {}", space.key))?;
        let page = pages.results.into_iter().find(|p| p.title == title);
        if let Some(page) = &page {
            debug!("Found page {} (version {})", page.id, page.version.number);
        }
        Ok(page)
    }

    /// Find the page to use as parent for a new page.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::NotFound`] if no page has this title.
    pub fn find_ancestor(&self, space: &Space, title: &str) -> Result<Page, ConfluenceError> {
        self.find_page(space, title)?
            .ok_or_else(|| ConfluenceError::NotFound(format!("Ancestor page '{title}'")))
    }

    /// Create a page with storage-format body.
    pub fn create_page(
        &self,
        space: &Space,
        title: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/pages", self.api_v2_url());

        info!("Creating page '{}' in space {}", title, space.key);

        let request = CreatePageRequest {
            space_id: &space.id,
            status: "current",
            title,
            parent_id,
            body: BodyWrite::storage(body),
        };

        let response = self
            .agent
            .post(&url)
            .header("Authorization", self.auth.header())
            .header("Accept", "application/json")
            .send_json(&request)?;

        let page: Page = Self::read_json(response, &format!("Space {}", space.key))?;
        info!("Created page {} (version {})", page.id, page.version.number);
        Ok(page)
    }

    /// Replace the title and body of a page.
    ///
    /// `version` is the page's current version; the update is sent as
    /// `version + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::Conflict`] if `version` is stale.
    pub fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        version: u32,
        parent_id: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/pages/{}", self.api_v2_url(), page_id);

        info!("Updating page {} to version {}", page_id, version + 1);

        let request = UpdatePageRequest {
            id: page_id,
            status: "current",
            title,
            parent_id,
            body: BodyWrite::storage(body),
            version: VersionWrite {
                number: version + 1,
                message: Some("Updated by md2conf"),
            },
        };

        let response = self
            .agent
            .put(&url)
            .header("Authorization", self.auth.header())
            .header("Accept", "application/json")
            .send_json(&request)?;

        Self::read_json(response, &format!("Page {page_id}"))
    }

    /// Delete a page.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::NotFound`] if the page does not exist.
    pub fn delete_page(&self, page_id: &str) -> Result<(), ConfluenceError> {
        let url = format!("{}/pages/{}", self.api_v2_url(), page_id);

        info!("Deleting page {}", page_id);

        let response = self
            .agent
            .delete(&url)
            .header("Authorization", self.auth.header())
            .call()?;

        Self::check(response, &format!("Page {page_id}"))?;
        Ok(())
    }

    /// Browser URL of a page.
    #[must_use]
    pub fn page_url(&self, page: &Page) -> String {
        match page.links.as_ref().and_then(|l| l.webui.as_deref()) {
            Some(webui) => format!("{}{webui}", self.base_url),
            None => format!(
                "{}/pages/viewpage.action?pageId={}",
                self.base_url, page.id
            ),
        }
    }
}
