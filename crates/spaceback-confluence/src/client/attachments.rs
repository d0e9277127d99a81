//! Attachment operations for Confluence API.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::RngExt;
use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{Attachment, ResultsPage};

/// Characters left unescaped in a URL path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a file name for use as a single URL path segment.
#[must_use]
pub fn encode_path_segment(name: &str) -> String {
    utf8_percent_encode(name, PATH_SEGMENT).to_string()
}

impl ConfluenceClient {
    /// List attachments on a content item, with their current versions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if any page of the listing fails.
    pub fn get_attachments(&self, content_id: &str) -> Result<Vec<Attachment>, ConfluenceError> {
        let url = format!(
            "{}/content/{}/child/attachment?expand=version",
            self.api_url(),
            content_id
        );
        info!("Getting attachments for content {}", content_id);
        self.collect_results(&url)
    }

    /// Download the current version of an attachment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the download fails.
    pub fn download_attachment(
        &self,
        content_id: &str,
        file_name: &str,
    ) -> Result<Vec<u8>, ConfluenceError> {
        let url = self.attachment_download_url(content_id, file_name);
        info!("Downloading '{}' for content {}", file_name, content_id);
        self.get_bytes(&url)
    }

    /// Upload or update attachment (upsert by file name).
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the lookup or upload fails.
    pub fn upload_attachment(
        &self,
        content_id: &str,
        file_name: &str,
        data: &[u8],
        content_type: &str,
        comment: Option<&str>,
    ) -> Result<Attachment, ConfluenceError> {
        let existing = self
            .get_attachments(content_id)?
            .into_iter()
            .find(|a| a.title == file_name);

        let url = if let Some(att) = &existing {
            info!(
                "Updating existing attachment '{}' (id={})",
                file_name, att.id
            );
            format!(
                "{}/content/{}/child/attachment/{}/data",
                self.api_url(),
                content_id,
                att.id
            )
        } else {
            info!(
                "Uploading new attachment '{}' to content {}",
                file_name, content_id
            );
            format!("{}/content/{}/child/attachment", self.api_url(), content_id)
        };

        let boundary = format!(
            "----SpacebackFormBoundary{:016x}",
            rand::rng().random::<u64>()
        );
        let body = multipart_body(&boundary, file_name, data, content_type, comment);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.authorization)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "nocheck")
            .header("Accept", "application/json")
            .send(&body[..])?;
        let mut body_reader = Self::check_status(response)?.into_body();

        // Updates answer with the attachment, new uploads with a listing
        if existing.is_some() {
            Ok(body_reader.read_json()?)
        } else {
            let created: ResultsPage<Attachment> = body_reader.read_json()?;
            created.results.into_iter().next().ok_or_else(|| {
                ConfluenceError::UnexpectedResponse("empty attachment listing".to_owned())
            })
        }
    }

    /// Download URL for the current version of an attachment.
    #[must_use]
    pub fn attachment_download_url(&self, content_id: &str, file_name: &str) -> String {
        format!(
            "{}/download/attachments/{}/{}",
            self.base_url,
            content_id,
            encode_path_segment(file_name)
        )
    }
}

/// Build a `multipart/form-data` body with a `file` part and an optional
/// `comment` part.
fn multipart_body(
    boundary: &str,
    file_name: &str,
    data: &[u8],
    content_type: &str,
    comment: Option<&str>,
) -> Vec<u8> {
    let quoted_name = file_name.replace('"', "%22");
    let mut body = Vec::with_capacity(data.len() + 512);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{quoted_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");

    if let Some(c) = comment {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"comment\"\r\n\r\n");
        body.extend_from_slice(c.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
