//! Page tree sidebar.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::html::escape_html;
use crate::model::ContentItem;

/// Parent to children index over all pages of a space.
///
/// Every page lands in exactly one bucket: under its parent when the parent
/// is one of the listed pages, otherwise among the roots. Children keep the
/// server listing order.
#[derive(Debug, Default)]
pub struct PageTree {
    roots: Vec<String>,
    children: HashMap<String, Vec<String>>,
    parents: HashMap<String, String>,
    titles: HashMap<String, String>,
}

impl PageTree {
    /// Build the index from page metadata in listing order.
    #[must_use]
    pub fn build(pages: &[ContentItem]) -> Self {
        let ids: HashSet<&str> = pages.iter().map(|p| p.id.as_str()).collect();
        let mut tree = Self::default();

        for page in pages {
            if tree.titles.contains_key(&page.id) {
                continue;
            }
            tree.titles.insert(page.id.clone(), page.title.clone());
            match page.parent_id.as_deref() {
                Some(parent) if parent != page.id && ids.contains(parent) => {
                    tree.parents.insert(page.id.clone(), parent.to_owned());
                    tree.children
                        .entry(parent.to_owned())
                        .or_default()
                        .push(page.id.clone());
                }
                _ => tree.roots.push(page.id.clone()),
            }
        }
        tree
    }

    /// Top-level pages.
    #[must_use]
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Direct children of a page.
    #[must_use]
    pub fn children(&self, id: &str) -> &[String] {
        self.children.get(id).map_or(&[], Vec::as_slice)
    }

    /// Ancestor IDs of a page, root first.
    ///
    /// The chain ends at a root, or where a parent cycle would repeat a page.
    #[must_use]
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut chain: Vec<String> = Vec::new();
        let mut current = self.parents.get(id);
        while let Some(parent) = current {
            if parent == id || chain.contains(parent) {
                break;
            }
            chain.push(parent.clone());
            current = self.parents.get(parent);
        }
        chain.reverse();
        chain
    }

    /// Number of indexed pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    /// Whether the space has no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Render the collapsible navigation fragment shared by all pages.
    ///
    /// Only the top level is initially visible. Pages on a parent cycle are
    /// not reachable from a root and are left out.
    #[must_use]
    pub fn render(&self) -> String {
        let mut html = String::with_capacity(self.titles.len() * 160);
        for id in &self.roots {
            self.render_node(&mut html, id, true);
        }
        html
    }

    fn render_node(&self, html: &mut String, id: &str, top_level: bool) {
        if top_level {
            let _ = write!(html, r#"<ul id="{id}"><li>"#);
        } else {
            let _ = write!(html, r#"<ul id="{id}" style="display:none"><li>"#);
        }

        let children = self.children(id);
        if children.is_empty() {
            html.push_str(r#"<a class="dot">&middot;</a>"#);
        } else {
            html.push_str(r##"<a class="arrow" onclick="showChildren(this)" href="#">&rarr;</a>"##);
        }
        let title = self.titles.get(id).map_or("", String::as_str);
        let _ = write!(
            html,
            r#"<a class="pagelink" href="{id}.html">{}</a>"#,
            escape_html(title)
        );
        for child in children {
            self.render_node(html, child, false);
        }

        html.push_str("</li></ul>");
    }
}
