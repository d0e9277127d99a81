//! Comment operations for Confluence API.

use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::Content;

impl ConfluenceClient {
    /// All comments on a content item, threaded replies included, with
    /// rendered bodies and creation history.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if any page of the listing fails.
    pub fn get_comments(&self, content_id: &str) -> Result<Vec<Content>, ConfluenceError> {
        let url = format!(
            "{}/content/{}/child/comment?expand=body.view,history&depth=all",
            self.api_url(),
            content_id
        );

        info!("Getting comments for content {}", content_id);
        let comments: Vec<Content> = self.collect_results(&url)?;
        info!("Found {} comments on content {}", comments.len(), content_id);
        Ok(comments)
    }
}
