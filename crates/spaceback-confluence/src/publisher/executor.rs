//! Content publisher implementation.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::client::{ConfluenceClient, ContentUpdate, NewContent};
use crate::types::{Content, ContentKind};

use super::error::PublishError;
use super::result::{ContentSnapshot, PublishResult};
use super::{ContentChange, ContentDraft, ParentPage, content_type_for};

/// Creates, updates and reads pages and blog posts.
pub struct ContentPublisher<'a> {
    client: &'a ConfluenceClient,
}

impl<'a> ContentPublisher<'a> {
    /// Create a new publisher.
    #[must_use]
    pub fn new(client: &'a ConfluenceClient) -> Self {
        Self { client }
    }

    /// Create a page or blog post with its labels and attachments.
    ///
    /// All attachment files are read before anything is created, so a missing
    /// file leaves the space untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if an attachment cannot be read, the space has no
    /// homepage when publishing under it, or a Confluence call fails.
    pub fn publish(&self, draft: &ContentDraft) -> Result<PublishResult, PublishError> {
        let files = Self::read_attachments(&draft.attachments)?;
        let parent_id = match (&draft.kind, &draft.parent) {
            (ContentKind::BlogPost, _) | (_, ParentPage::None) => None,
            (_, ParentPage::Page(id)) => Some(id.clone()),
            (_, ParentPage::SpaceHome) => Some(self.homepage_id(&draft.space_key)?),
        };

        let created = self.client.create_content(&NewContent {
            kind: draft.kind,
            space_key: draft.space_key.clone(),
            title: draft.title.clone(),
            body: draft.body.clone(),
            parent_id,
        })?;

        self.client.add_labels(&created.id, &draft.labels)?;
        let uploaded = self.upload_all(&created.id, &files)?;

        let current = self.client.get_content(&created.id, &["version"])?;
        Ok(PublishResult {
            url: self.client.content_url(&current),
            version: current.version.as_ref().map_or(1, |v| v.number),
            id: created.id,
            title: created.title,
            kind: draft.kind,
            labels_added: draft.labels.len(),
            attachments_uploaded: uploaded,
        })
    }

    /// Publish a new version of existing content.
    ///
    /// The current title and body are kept where `change` leaves them unset.
    ///
    /// # Errors
    ///
    /// Returns an error if an attachment cannot be read, the content is not a
    /// page or blog post, or a Confluence call fails.
    pub fn update(
        &self,
        content_id: &str,
        change: &ContentChange,
    ) -> Result<PublishResult, PublishError> {
        let files = Self::read_attachments(&change.attachments)?;
        let current = self
            .client
            .get_content(content_id, &["body.storage", "version"])?;
        let kind = Self::kind_of(&current)?;
        let current_version = current.version.as_ref().map_or(0, |v| v.number);

        let title = change.title.as_deref().unwrap_or(&current.title);
        let body = change
            .body
            .as_deref()
            .or(current.storage_body())
            .unwrap_or_default();

        let updated = self.client.update_content(&ContentUpdate {
            id: content_id,
            kind,
            title,
            body,
            current_version,
            message: change.message.as_deref(),
        })?;
        info!(
            "Updated {} {} to version {}",
            kind.as_str(),
            content_id,
            current_version + 1
        );

        self.client.add_labels(content_id, &change.labels)?;
        let uploaded = self.upload_all(content_id, &files)?;

        Ok(PublishResult {
            url: self.client.content_url(&updated),
            version: updated
                .version
                .as_ref()
                .map_or(current_version + 1, |v| v.number),
            id: updated.id,
            title: updated.title,
            kind,
            labels_added: change.labels.len(),
            attachments_uploaded: uploaded,
        })
    }

    /// Read a page or blog post with its storage body and labels.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not a page or blog post, or a
    /// Confluence call fails.
    pub fn read(&self, content_id: &str) -> Result<ContentSnapshot, PublishError> {
        let content = self.client.get_content(
            content_id,
            &["body.storage", "version", "space", "metadata.labels"],
        )?;
        let kind = Self::kind_of(&content)?;

        Ok(ContentSnapshot {
            url: self.client.content_url(&content),
            kind,
            space_key: content.space.as_ref().map(|s| s.key.clone()),
            version: content.version.as_ref().map_or(0, |v| v.number),
            labels: content
                .label_names()
                .into_iter()
                .map(ToOwned::to_owned)
                .collect(),
            body: content.storage_body().unwrap_or_default().to_owned(),
            id: content.id,
            title: content.title,
        })
    }

    fn homepage_id(&self, space_key: &str) -> Result<String, PublishError> {
        self.client
            .get_space(space_key)?
            .homepage_id()
            .map(ToOwned::to_owned)
            .ok_or_else(|| PublishError::MissingHomepage(space_key.to_owned()))
    }

    fn kind_of(content: &Content) -> Result<ContentKind, PublishError> {
        match content.content_type.as_str() {
            "page" => Ok(ContentKind::Page),
            "blogpost" => Ok(ContentKind::BlogPost),
            other => Err(PublishError::UnsupportedContent {
                id: content.id.clone(),
                content_type: other.to_owned(),
            }),
        }
    }

    fn upload_all(
        &self,
        content_id: &str,
        files: &[AttachmentFile],
    ) -> Result<usize, PublishError> {
        for file in files {
            self.client.upload_attachment(
                content_id,
                &file.name,
                &file.data,
                &file.content_type,
                None,
            )?;
        }
        Ok(files.len())
    }

    fn read_attachments(paths: &[PathBuf]) -> Result<Vec<AttachmentFile>, PublishError> {
        paths.iter().map(|p| AttachmentFile::read(p)).collect()
    }
}

/// A local file loaded for upload.
struct AttachmentFile {
    name: String,
    data: Vec<u8>,
    content_type: String,
}

impl AttachmentFile {
    fn read(path: &Path) -> Result<Self, PublishError> {
        let data = std::fs::read(path).map_err(|source| PublishError::Attachment {
            path: path.to_owned(),
            source,
        })?;
        let name = path
            .file_name()
            .map_or_else(|| "attachment".to_owned(), |n| n.to_string_lossy().into_owned());
        Ok(Self {
            name,
            data,
            content_type: content_type_for(path),
        })
    }
}
