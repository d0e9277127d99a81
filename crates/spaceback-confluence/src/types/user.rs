//! Confluence user types.

use serde::Deserialize;

/// Confluence user as embedded in content history and versions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// "known" for real accounts, "anonymous" when not logged in.
    #[serde(rename = "type", default)]
    pub user_type: Option<String>,
    /// Login name.
    #[serde(default)]
    pub username: Option<String>,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl User {
    /// Whether the server treated the request as anonymous.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.user_type.as_deref() == Some("anonymous")
    }

    /// Best available human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("unknown")
    }
}
