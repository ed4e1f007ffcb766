//! Attachment operations for Confluence API.

use md2conf_converter::LocalAttachment;
use rand::RngExt;
use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentsResponse};

impl ConfluenceClient {
    /// Upload a file as a page attachment, replacing one with the same name.
    pub fn upload_attachment(
        &self,
        page_id: &str,
        file: &LocalAttachment,
    ) -> Result<Attachment, ConfluenceError> {
        let data = std::fs::read(&file.path)?;
        let existing = self.find_attachment(page_id, &file.filename)?;

        let url = if let Some(ref att) = existing {
            info!(
                "Updating existing attachment '{}' (id={})",
                file.filename, att.id
            );
            format!(
                "{}/content/{}/child/attachment/{}/data",
                self.rest_url(),
                page_id,
                att.id
            )
        } else {
            info!(
                "Uploading new attachment '{}' to page {}",
                file.filename, page_id
            );
            format!("{}/content/{}/child/attachment", self.rest_url(), page_id)
        };

        let boundary = format!("----Md2confBoundary{:016x}", rand::rng().random::<u64>());
        let body = multipart_body(&boundary, &file.filename, &file.content_type, &data);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", self.auth.header())
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "nocheck")
            .header("Accept", "application/json")
            .send(&body[..])?;

        let mut body_reader = Self::check(response, &format!("Page {page_id}"))?;

        // Response is a list for new uploads, single object for updates
        if existing.is_some() {
            Ok(body_reader.read_json()?)
        } else {
            let response: AttachmentsResponse = body_reader.read_json()?;
            response
                .results
                .into_iter()
                .next()
                .ok_or_else(|| ConfluenceError::HttpResponse {
                    status: 200,
                    body: "Empty attachment response".to_owned(),
                })
        }
    }

    /// Find an attachment on a page by filename.
    pub fn find_attachment(
        &self,
        page_id: &str,
        filename: &str,
    ) -> Result<Option<Attachment>, ConfluenceError> {
        let url = format!("{}/pages/{}/attachments", self.api_v2_url(), page_id);

        let response = self
            .agent
            .get(&url)
            .query("filename", filename)
            .header("Authorization", self.auth.header())
            .header("Accept", "application/json")
            .call()?;

        let attachments: AttachmentsResponse =
            Self::read_json(response, &format!("Page {page_id}"))?;
        Ok(attachments
            .results
            .into_iter()
            .find(|a| a.title == filename))
    }
}

/// Build a `multipart/form-data` body with a single `file` part.
fn multipart_body(boundary: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename.replace('"', "%22")
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(b"--");
    body.extend_from_slice(boundary.as_bytes());
    body.extend_from_slice(b"--\r\n");
    body
}
