//! Confluence label types.

use serde::{Deserialize, Serialize};

/// Content label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Label {
    /// Label namespace ("global", "my", "team").
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Label name.
    pub name: String,
}

impl Label {
    /// Global label with the given name.
    #[must_use]
    pub fn global(name: &str) -> Self {
        Self {
            prefix: default_prefix(),
            name: name.to_owned(),
        }
    }
}

fn default_prefix() -> String {
    "global".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_label_serializes_prefix() {
        let json = serde_json::to_string(&Label::global("howto")).unwrap();
        assert_eq!(json, r#"{"prefix":"global","name":"howto"}"#);
    }

    #[test]
    fn test_missing_prefix_defaults_to_global() {
        let label: Label = serde_json::from_str(r#"{"name": "ops"}"#).unwrap();
        assert_eq!(label, Label::global("ops"));
    }
}
