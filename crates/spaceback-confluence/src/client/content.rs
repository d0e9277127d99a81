//! Page and blog post operations for Confluence API.

use serde_json::{Value, json};
use tracing::info;

use super::{ConfluenceClient, with_expand};
use crate::error::ConfluenceError;
use crate::types::{Content, ContentKind};

/// A page or blog post to create.
#[derive(Debug, Clone)]
pub struct NewContent {
    /// Page or blog post.
    pub kind: ContentKind,
    /// Key of the target space.
    pub space_key: String,
    /// Title.
    pub title: String,
    /// Body in storage format.
    pub body: String,
    /// Parent page (pages only).
    pub parent_id: Option<String>,
}

impl NewContent {
    fn payload(&self) -> Value {
        let mut payload = json!({
            "type": self.kind.as_str(),
            "title": self.title,
            "space": {"key": self.space_key},
            "body": {
                "storage": {
                    "value": self.body,
                    "representation": "storage"
                }
            }
        });
        if self.kind == ContentKind::Page
            && let Some(parent) = &self.parent_id
        {
            payload["ancestors"] = json!([{"id": parent}]);
        }
        payload
    }
}

/// A new version of existing content.
#[derive(Debug, Clone)]
pub struct ContentUpdate<'a> {
    /// Content ID.
    pub id: &'a str,
    /// Page or blog post.
    pub kind: ContentKind,
    /// New title.
    pub title: &'a str,
    /// New body in storage format.
    pub body: &'a str,
    /// Version the update is based on; the new version is this plus one.
    pub current_version: u32,
    /// Version comment.
    pub message: Option<&'a str>,
}

impl ContentUpdate<'_> {
    fn payload(&self) -> Value {
        let mut payload = json!({
            "id": self.id,
            "type": self.kind.as_str(),
            "title": self.title,
            "body": {
                "storage": {
                    "value": self.body,
                    "representation": "storage"
                }
            },
            "version": {"number": self.current_version + 1}
        });
        if let Some(msg) = self.message {
            payload["version"]["message"] = json!(msg);
        }
        payload
    }
}

impl ConfluenceClient {
    /// Get content by ID with optional field expansion.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the request fails or the content does not exist.
    pub fn get_content(&self, content_id: &str, expand: &[&str]) -> Result<Content, ConfluenceError> {
        let url = with_expand(format!("{}/content/{}", self.api_url(), content_id), expand);
        info!("Getting content {}", content_id);
        self.get_json(&url)
    }

    /// List all current content of one kind in a space, in server order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if any page of the listing fails.
    pub fn list_content(
        &self,
        space_key: &str,
        kind: ContentKind,
        expand: &[&str],
    ) -> Result<Vec<Content>, ConfluenceError> {
        let url = with_expand(
            format!(
                "{}/content?spaceKey={}&type={}&status=current",
                self.api_url(),
                space_key,
                kind.as_str()
            ),
            expand,
        );
        info!("Listing {} content of space {}", kind.as_str(), space_key);
        let items: Vec<Content> = self.collect_results(&url)?;
        info!("Found {} {} items in space {}", items.len(), kind.as_str(), space_key);
        Ok(items)
    }

    /// Create a page or blog post.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the server rejects the content.
    pub fn create_content(&self, content: &NewContent) -> Result<Content, ConfluenceError> {
        let url = format!("{}/content", self.api_url());
        info!(
            "Creating {} '{}' in space {}",
            content.kind.as_str(),
            content.title,
            content.space_key
        );
        let created: Content = self.post_json(&url, &content.payload())?;
        info!("Created {} {}", content.kind.as_str(), created.id);
        Ok(created)
    }

    /// Replace the title and body of existing content.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the server rejects the update, e.g. on a
    /// version conflict.
    pub fn update_content(&self, update: &ContentUpdate<'_>) -> Result<Content, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), update.id);
        info!(
            "Updating {} {} from version {} to {}",
            update.kind.as_str(),
            update.id,
            update.current_version,
            update.current_version + 1
        );
        self.put_json(&url, &update.payload())
    }

    /// Absolute web URL of content.
    ///
    /// Uses the `webui` link when the content carries one, otherwise the
    /// `viewpage.action` form that works for any content ID.
    #[must_use]
    pub fn content_url(&self, content: &Content) -> String {
        if let Some(links) = &content.links
            && let Some(webui) = &links.webui
        {
            let base = links.base.as_deref().unwrap_or(&self.base_url);
            return format!("{base}{webui}");
        }
        format!(
            "{}/pages/viewpage.action?pageId={}",
            self.base_url, content.id
        )
    }
}
