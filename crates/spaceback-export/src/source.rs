//! Content source boundary.
//!
//! [`ContentSource`] is everything the export engine needs from the server.
//! [`ConfluenceClient`] implements it over REST; tests use an in-memory
//! fixture.

use chrono::DateTime;
use spaceback_confluence::types::Content;
use spaceback_confluence::{ConfluenceClient, ConfluenceError};
use tracing::debug;

use crate::error::SourceError;
use crate::model::{AttachmentRef, Comment, ContentItem, ContentKind, Space, Timestamp};

/// Read access to one server.
///
/// Implementations must be `Sync`: with more than one worker thread, items
/// are exported in parallel against a shared source.
pub trait ContentSource: Sync {
    /// Server base URL including any context path, without trailing slash.
    fn base_url(&self) -> &str;

    /// Verify the credentials.
    fn login(&self) -> Result<(), SourceError>;

    /// Look up a space.
    fn space(&self, key: &str) -> Result<Space, SourceError>;

    /// IDs of all pages in a space, in server listing order.
    fn list_pages(&self, space_key: &str) -> Result<Vec<String>, SourceError>;

    /// IDs of all blog posts in a space, in server listing order.
    fn list_blog_posts(&self, space_key: &str) -> Result<Vec<String>, SourceError>;

    /// Metadata of a page or blog post.
    fn metadata(&self, id: &str) -> Result<ContentItem, SourceError>;

    /// Comments on an item, oldest first.
    fn comments(&self, id: &str) -> Result<Vec<Comment>, SourceError>;

    /// Attachments of an item.
    fn attachments(&self, id: &str) -> Result<Vec<AttachmentRef>, SourceError>;

    /// Raw bytes of an attachment.
    fn attachment_bytes(&self, id: &str, file_name: &str) -> Result<Vec<u8>, SourceError>;

    /// Server-rendered HTML body of an item.
    fn rendered_body(&self, id: &str) -> Result<String, SourceError>;
}

impl From<ConfluenceError> for SourceError {
    fn from(err: ConfluenceError) -> Self {
        if err.is_auth_failure() {
            Self::Auth(err.to_string())
        } else if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Parse a server timestamp; unparsable values count as absent.
pub(crate) fn parse_timestamp(value: Option<&str>) -> Option<Timestamp> {
    let value = value?;
    match DateTime::parse_from_rfc3339(value) {
        Ok(ts) => Some(ts),
        Err(e) => {
            debug!("Ignoring unparsable timestamp {:?}: {}", value, e);
            None
        }
    }
}

fn kind_of(content: &Content) -> Result<ContentKind, SourceError> {
    match content.content_type.as_str() {
        "page" => Ok(ContentKind::Page),
        "blogpost" => Ok(ContentKind::BlogPost),
        other => Err(SourceError::NotFound(format!(
            "content {} is a {other}, not a page or blog post",
            content.id
        ))),
    }
}

impl ContentSource for ConfluenceClient {
    fn base_url(&self) -> &str {
        ConfluenceClient::base_url(self)
    }

    fn login(&self) -> Result<(), SourceError> {
        self.current_user()?;
        Ok(())
    }

    fn space(&self, key: &str) -> Result<Space, SourceError> {
        let space = self.get_space(key)?;
        Ok(Space {
            description: space.description_text().to_owned(),
            homepage_id: space.homepage_id().map(ToOwned::to_owned),
            key: space.key,
            name: space.name,
        })
    }

    fn list_pages(&self, space_key: &str) -> Result<Vec<String>, SourceError> {
        let pages = self.list_content(space_key, ContentKind::Page, &[])?;
        Ok(pages.into_iter().map(|c| c.id).collect())
    }

    fn list_blog_posts(&self, space_key: &str) -> Result<Vec<String>, SourceError> {
        let posts = self.list_content(space_key, ContentKind::BlogPost, &[])?;
        Ok(posts.into_iter().map(|c| c.id).collect())
    }

    fn metadata(&self, id: &str) -> Result<ContentItem, SourceError> {
        let content = self.get_content(id, &["history", "version", "ancestors"])?;
        let kind = kind_of(&content)?;
        let history = content.history.as_ref();

        Ok(ContentItem {
            origin_url: self.content_url(&content),
            parent_id: match kind {
                ContentKind::Page => content.parent_id().map(ToOwned::to_owned),
                ContentKind::BlogPost => None,
            },
            created: parse_timestamp(history.and_then(|h| h.created_date.as_deref())),
            modified: parse_timestamp(content.version.as_ref().and_then(|v| v.when.as_deref())),
            author: history
                .and_then(|h| h.created_by.as_ref())
                .map_or("unknown", |u| u.name())
                .to_owned(),
            kind,
            id: content.id,
            title: content.title,
        })
    }

    fn comments(&self, id: &str) -> Result<Vec<Comment>, SourceError> {
        Ok(self
            .get_comments(id)?
            .into_iter()
            .map(|c| {
                let history = c.history.as_ref();
                Comment {
                    author: history
                        .and_then(|h| h.created_by.as_ref())
                        .map_or("unknown", |u| u.name())
                        .to_owned(),
                    created: parse_timestamp(history.and_then(|h| h.created_date.as_deref())),
                    body: c.view_body().unwrap_or_default().to_owned(),
                }
            })
            .collect())
    }

    fn attachments(&self, id: &str) -> Result<Vec<AttachmentRef>, SourceError> {
        Ok(self
            .get_attachments(id)?
            .into_iter()
            .map(|a| AttachmentRef {
                modified: parse_timestamp(a.modified()),
                file_name: a.title,
            })
            .collect())
    }

    fn attachment_bytes(&self, id: &str, file_name: &str) -> Result<Vec<u8>, SourceError> {
        Ok(self.download_attachment(id, file_name)?)
    }

    fn rendered_body(&self, id: &str) -> Result<String, SourceError> {
        let content = self.get_content(id, &["body.view"])?;
        Ok(content.view_body().unwrap_or_default().to_owned())
    }
}
