//! Space creation workflow.

use tracing::info;

use crate::client::{ConfluenceClient, ContentUpdate};
use crate::error::ConfluenceError;
use crate::types::ContentKind;

use super::{PermissionLevel, homepage_body};

/// Error while creating a space.
#[derive(Debug, thiserror::Error)]
pub enum SpaceError {
    /// Confluence API error.
    #[error("Confluence API error: {0}")]
    Confluence(#[from] ConfluenceError),

    /// Space keys are non-empty and ASCII alphanumeric.
    #[error("invalid space key {0:?}: use letters and digits only")]
    InvalidKey(String),

    /// The server created the space without a homepage.
    #[error("space {0} was created without a homepage")]
    MissingHomepage(String),
}

/// A space to create.
#[derive(Debug, Clone, Default)]
pub struct NewSpace {
    /// Space key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Plain-text description.
    pub description: String,
    /// Category labels, e.g. `team:docs`.
    pub categories: Vec<String>,
    /// Users and groups granted read access.
    pub readers: Vec<String>,
    /// Users and groups granted write access.
    pub writers: Vec<String>,
    /// Users and groups granted administration.
    pub admins: Vec<String>,
}

impl NewSpace {
    fn grants(&self) -> impl Iterator<Item = (&str, PermissionLevel)> {
        fn at(
            entities: &[String],
            level: PermissionLevel,
        ) -> impl Iterator<Item = (&str, PermissionLevel)> {
            entities.iter().map(move |e| (e.as_str(), level))
        }
        at(&self.readers, PermissionLevel::Read)
            .chain(at(&self.writers, PermissionLevel::Write))
            .chain(at(&self.admins, PermissionLevel::Admin))
    }
}

/// Outcome of creating a space.
#[derive(Debug, Clone)]
pub struct SpaceSummary {
    /// Space key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Content ID of the homepage.
    pub homepage_id: String,
    /// Web URL of the homepage.
    pub url: String,
    /// Number of category labels added.
    pub categories_added: usize,
    /// Number of individual permissions granted.
    pub permissions_granted: usize,
}

/// Creates spaces from the template.
pub struct SpaceCreator<'a> {
    client: &'a ConfluenceClient,
}

impl<'a> SpaceCreator<'a> {
    /// Create a new space creator.
    #[must_use]
    pub fn new(client: &'a ConfluenceClient) -> Self {
        Self { client }
    }

    /// Create the space, file it under its categories, replace the homepage
    /// with the template and grant permissions.
    ///
    /// Steps run in that order and stop at the first failure; the space is
    /// not rolled back.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or any Confluence call fails.
    pub fn create(&self, space: &NewSpace) -> Result<SpaceSummary, SpaceError> {
        validate_key(&space.key)?;

        self.client
            .create_space(&space.key, &space.name, &space.description)?;

        for category in &space.categories {
            self.client.add_space_label(category, &space.key)?;
        }

        let created = self.client.get_space(&space.key)?;
        let homepage_id = created
            .homepage_id()
            .ok_or_else(|| SpaceError::MissingHomepage(space.key.clone()))?
            .to_owned();
        let homepage = self.client.get_content(&homepage_id, &["version"])?;
        let title = format!("{} Home", space.name);
        let body = homepage_body(&space.key, &space.name);
        let updated = self.client.update_content(&ContentUpdate {
            id: &homepage_id,
            kind: ContentKind::Page,
            title: &title,
            body: &body,
            current_version: homepage.version.as_ref().map_or(1, |v| v.number),
            message: None,
        })?;
        info!("Homepage {} of space {} set from template", homepage_id, space.key);

        let mut granted = 0;
        for (entity, level) in space.grants() {
            for permission in level.permissions() {
                self.client
                    .add_space_permission(permission, entity, &space.key)?;
                granted += 1;
            }
        }

        Ok(SpaceSummary {
            key: space.key.clone(),
            name: space.name.clone(),
            url: self.client.content_url(&updated),
            homepage_id,
            categories_added: space.categories.len(),
            permissions_granted: granted,
        })
    }
}

fn validate_key(key: &str) -> Result<(), SpaceError> {
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(SpaceError::InvalidKey(key.to_owned()));
    }
    Ok(())
}
