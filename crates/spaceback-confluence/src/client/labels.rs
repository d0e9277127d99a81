//! Label operations for Confluence API.

use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::Label;

impl ConfluenceClient {
    /// Labels on a content item.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the request fails.
    pub fn get_labels(&self, content_id: &str) -> Result<Vec<Label>, ConfluenceError> {
        let url = format!("{}/content/{}/label", self.api_url(), content_id);
        self.collect_results(&url)
    }

    /// Add global labels to a content item. Existing labels are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the server rejects a label.
    pub fn add_labels(&self, content_id: &str, names: &[String]) -> Result<(), ConfluenceError> {
        if names.is_empty() {
            return Ok(());
        }
        let url = format!("{}/content/{}/label", self.api_url(), content_id);
        let labels: Vec<Label> = names.iter().map(|n| Label::global(n)).collect();
        info!("Adding {} labels to content {}", labels.len(), content_id);
        let _: serde_json::Value = self.post_json(&url, &labels)?;
        Ok(())
    }
}
