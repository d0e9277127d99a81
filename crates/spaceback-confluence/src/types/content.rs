//! Confluence content types (pages, blog posts, comments).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Label, User};

/// Kind of content item this toolkit creates and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Page in the space's page tree.
    Page,
    /// Blog post.
    #[serde(rename = "blogpost")]
    BlogPost,
}

impl ContentKind {
    /// Name used by the REST API in `type` fields and query parameters.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::BlogPost => "blogpost",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Page => "page",
            Self::BlogPost => "blog post",
        })
    }
}

/// Confluence content entity.
#[derive(Debug, Clone, Deserialize)]
pub struct Content {
    /// Content ID.
    pub id: String,
    /// Content type ("page", "blogpost", "comment", ...).
    #[serde(rename = "type")]
    pub content_type: String,
    /// Title.
    pub title: String,
    /// Version information (`expand=version`).
    #[serde(default)]
    pub version: Option<Version>,
    /// Creation history (`expand=history`).
    #[serde(default)]
    pub history: Option<History>,
    /// Ancestors, root first (`expand=ancestors`).
    #[serde(default)]
    pub ancestors: Vec<ContentRef>,
    /// Body representations.
    #[serde(default)]
    pub body: Option<Body>,
    /// Owning space (`expand=space`).
    #[serde(default)]
    pub space: Option<super::Space>,
    /// Labels (`expand=metadata.labels`).
    #[serde(default)]
    pub metadata: Option<ContentMetadata>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl Content {
    /// Direct parent, which is the last ancestor.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.ancestors.last().map(|a| a.id.as_str())
    }

    /// Storage-format body, if expanded.
    #[must_use]
    pub fn storage_body(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map(|s| s.value.as_str())
    }

    /// Server-rendered HTML body, if expanded.
    #[must_use]
    pub fn view_body(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.view.as_ref())
            .map(|s| s.value.as_str())
    }

    /// Label names, if expanded.
    #[must_use]
    pub fn label_names(&self) -> Vec<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.labels.as_ref())
            .map(|labels| labels.results.iter().map(|l| l.name.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Reference to another content entity.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentRef {
    /// Content ID.
    pub id: String,
    /// Title, when the API includes it.
    #[serde(default)]
    pub title: Option<String>,
}

/// Content version.
#[derive(Debug, Clone, Deserialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
    /// Timestamp of this version (RFC 3339).
    #[serde(default)]
    pub when: Option<String>,
    /// Version message/comment.
    #[serde(default)]
    pub message: Option<String>,
    /// Author of this version.
    #[serde(default)]
    pub by: Option<User>,
}

/// Creation history.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    /// Creation (publish) timestamp (RFC 3339).
    #[serde(default)]
    pub created_date: Option<String>,
    /// Creator.
    #[serde(default)]
    pub created_by: Option<User>,
}

/// Content body representations.
#[derive(Debug, Clone, Deserialize)]
pub struct Body {
    /// Storage format (XHTML with macros).
    #[serde(default)]
    pub storage: Option<Representation>,
    /// Rendered HTML.
    #[serde(default)]
    pub view: Option<Representation>,
}

/// A single body representation.
#[derive(Debug, Clone, Deserialize)]
pub struct Representation {
    /// Body text.
    pub value: String,
    /// Representation name ("storage", "view", "plain").
    #[serde(default)]
    pub representation: Option<String>,
}

/// Content metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentMetadata {
    /// Labels attached to the content.
    #[serde(default)]
    pub labels: Option<ResultsPage<Label>>,
}

/// Hypermedia links.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    /// Web UI path, relative to `base`.
    #[serde(default)]
    pub webui: Option<String>,
    /// Short link.
    #[serde(default)]
    pub tinyui: Option<String>,
    /// Download path (attachments only).
    #[serde(default)]
    pub download: Option<String>,
    /// Absolute server base URL including context path.
    #[serde(default)]
    pub base: Option<String>,
    /// Next page of a paginated listing.
    #[serde(default)]
    pub next: Option<String>,
    /// API self link.
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsPage<T> {
    /// Entries on this page.
    pub results: Vec<T>,
    /// Number of entries on this page.
    #[serde(default)]
    pub size: usize,
    /// Pagination links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl<T> ResultsPage<T> {
    /// Whether the server advertises a further page.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.links.as_ref().is_some_and(|l| l.next.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_page_metadata() {
        let json = r#"{
            "id": "1234",
            "type": "page",
            "title": "Runbook",
            "status": "current",
            "version": {"number": 7, "when": "2021-05-02T09:15:00.000+02:00",
                        "by": {"type": "known", "username": "jdoe", "displayName": "Jane Doe"}},
            "history": {"createdDate": "2020-01-10T08:00:00.000+01:00",
                        "createdBy": {"type": "known", "username": "asmith", "displayName": "Al Smith"}},
            "ancestors": [{"id": "1", "title": "Home"}, {"id": "99", "title": "Ops"}],
            "_links": {"webui": "/display/OPS/Runbook", "base": "https://wiki.example.com"}
        }"#;

        let content: Content = serde_json::from_str(json).unwrap();

        assert_eq!(content.id, "1234");
        assert_eq!(content.content_type, "page");
        assert_eq!(content.parent_id(), Some("99"));
        let version = content.version.as_ref().unwrap();
        assert_eq!(version.number, 7);
        assert_eq!(version.when.as_deref(), Some("2021-05-02T09:15:00.000+02:00"));
        let history = content.history.as_ref().unwrap();
        assert_eq!(
            history.created_by.as_ref().unwrap().display_name.as_deref(),
            Some("Al Smith")
        );
        assert!(content.body.is_none());
    }

    #[test]
    fn test_top_level_page_has_no_parent() {
        let json = r#"{"id": "1", "type": "page", "title": "Home", "ancestors": []}"#;
        let content: Content = serde_json::from_str(json).unwrap();
        assert_eq!(content.parent_id(), None);
    }

    #[test]
    fn test_bodies_and_labels() {
        let json = r#"{
            "id": "5",
            "type": "blogpost",
            "title": "News",
            "body": {
                "storage": {"value": "<p>raw</p>", "representation": "storage"},
                "view": {"value": "<p>rendered</p>", "representation": "view"}
            },
            "metadata": {"labels": {"results": [
                {"prefix": "global", "name": "release"},
                {"prefix": "global", "name": "ops"}
            ], "size": 2}}
        }"#;

        let content: Content = serde_json::from_str(json).unwrap();

        assert_eq!(content.storage_body(), Some("<p>raw</p>"));
        assert_eq!(content.view_body(), Some("<p>rendered</p>"));
        assert_eq!(content.label_names(), vec!["release", "ops"]);
    }

    #[test]
    fn test_results_page_next_link() {
        let json = r#"{"results": [], "size": 0, "_links": {"next": "/rest/api/content?start=25"}}"#;
        let page: ResultsPage<Content> = serde_json::from_str(json).unwrap();
        assert!(page.has_next());

        let last: ResultsPage<Content> =
            serde_json::from_str(r#"{"results": [], "size": 0, "_links": {}}"#).unwrap();
        assert!(!last.has_next());
    }

    #[test]
    fn test_content_kind_api_names() {
        assert_eq!(ContentKind::Page.as_str(), "page");
        assert_eq!(ContentKind::BlogPost.as_str(), "blogpost");
        assert_eq!(ContentKind::BlogPost.to_string(), "blog post");
    }
}
