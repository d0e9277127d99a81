//! Space operations for Confluence API.

use serde_json::json;
use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::Space;

impl ConfluenceClient {
    /// Get a space with its plain description and homepage.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the request fails or the space does not exist.
    pub fn get_space(&self, space_key: &str) -> Result<Space, ConfluenceError> {
        let url = format!(
            "{}/space/{}?expand=description.plain,homepage",
            self.api_url(),
            space_key
        );
        info!("Getting space {}", space_key);
        self.get_json(&url)
    }

    /// Create a global space. The server creates a default homepage.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError`] if the key is taken or the caller may not
    /// create spaces.
    pub fn create_space(
        &self,
        key: &str,
        name: &str,
        description: &str,
    ) -> Result<Space, ConfluenceError> {
        let url = format!("{}/space", self.api_url());
        let payload = json!({
            "key": key,
            "name": name,
            "description": {
                "plain": {"value": description, "representation": "plain"}
            },
            "metadata": {}
        });
        info!("Creating space {} ({})", key, name);
        self.post_json(&url, &payload)
    }
}
