//! Confluence space types.

use serde::Deserialize;

use super::{ContentRef, Representation};

/// Confluence space.
#[derive(Debug, Clone, Deserialize)]
pub struct Space {
    /// Space key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Description (`expand=description.plain`).
    #[serde(default)]
    pub description: Option<SpaceDescription>,
    /// Homepage (`expand=homepage`).
    #[serde(default)]
    pub homepage: Option<ContentRef>,
}

impl Space {
    /// Plain-text description, empty when the space has none.
    #[must_use]
    pub fn description_text(&self) -> &str {
        self.description
            .as_ref()
            .and_then(|d| d.plain.as_ref())
            .map_or("", |p| p.value.as_str())
    }

    /// Content ID of the homepage.
    #[must_use]
    pub fn homepage_id(&self) -> Option<&str> {
        self.homepage.as_ref().map(|h| h.id.as_str())
    }
}

/// Space description representations.
#[derive(Debug, Clone, Deserialize)]
pub struct SpaceDescription {
    /// Plain-text description.
    #[serde(default)]
    pub plain: Option<Representation>,
}
