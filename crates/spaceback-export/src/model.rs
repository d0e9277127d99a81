//! Export data model.
//!
//! These types are independent of the wire format: [`ContentSource`]
//! implementations convert whatever the server returns into them.
//!
//! [`ContentSource`]: crate::ContentSource

use chrono::{DateTime, FixedOffset};

pub use spaceback_confluence::ContentKind;

/// Server timestamp, kept in the offset the server reported.
pub type Timestamp = DateTime<FixedOffset>;

/// Space being exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Space {
    /// Space key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Plain-text description.
    pub description: String,
    /// Content ID of the homepage.
    pub homepage_id: Option<String>,
}

/// Metadata of a page or blog post.
///
/// Bodies, comments and attachments are fetched separately, only for items
/// that are actually written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    /// Content ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// Page or blog post.
    pub kind: ContentKind,
    /// Direct parent page; always `None` for blog posts.
    pub parent_id: Option<String>,
    /// Creation (publish) time.
    pub created: Option<Timestamp>,
    /// Time of the current version.
    pub modified: Option<Timestamp>,
    /// Creator's display name.
    pub author: String,
    /// Web URL on the server.
    pub origin_url: String,
}

/// Comment on a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Author's display name.
    pub author: String,
    /// Creation time.
    pub created: Option<Timestamp>,
    /// Server-rendered HTML body.
    pub body: String,
}

/// Attachment on a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    /// File name as stored on the server.
    pub file_name: String,
    /// Time of the attachment's current version.
    pub modified: Option<Timestamp>,
}
