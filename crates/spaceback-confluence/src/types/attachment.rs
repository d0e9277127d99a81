//! Confluence attachment types.

use serde::Deserialize;

use super::{Links, Version};

/// Confluence attachment.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    /// Attachment ID.
    pub id: String,
    /// Attachment title, which is its file name.
    pub title: String,
    /// Version of the attachment (`expand=version`).
    #[serde(default)]
    pub version: Option<Version>,
    /// Media type and size.
    #[serde(default)]
    pub extensions: Option<AttachmentExtensions>,
    /// Hypermedia links (`download` is the relative download path).
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl Attachment {
    /// Timestamp of the attachment's current version.
    #[must_use]
    pub fn modified(&self) -> Option<&str> {
        self.version.as_ref().and_then(|v| v.when.as_deref())
    }
}

/// Attachment extension fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentExtensions {
    /// MIME type reported by the server.
    #[serde(default)]
    pub media_type: Option<String>,
    /// Size in bytes.
    #[serde(default)]
    pub file_size: Option<u64>,
}
