//! Chronological blog index.

use std::fmt::Write;

use chrono::Datelike;

use crate::html::escape_html;
use crate::model::{ContentItem, Timestamp};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Blog posts grouped by publish month, newest first.
#[derive(Debug, Default)]
pub struct BlogIndex {
    groups: Vec<MonthGroup>,
    undated: Vec<BlogEntry>,
}

/// Posts published in one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGroup {
    /// Year.
    pub year: i32,
    /// Month, 1 to 12.
    pub month: u32,
    /// Posts, newest first.
    pub posts: Vec<BlogEntry>,
}

/// One post in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogEntry {
    /// Content ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// Publish time.
    pub published: Option<Timestamp>,
}

impl BlogIndex {
    /// Group and sort posts.
    ///
    /// The month is taken in the offset the server reported. Months sort
    /// newest first, and so do posts within a month; posts with the same
    /// publish time keep their listing order. Posts without a publish time
    /// are collected in a trailing group.
    #[must_use]
    pub fn build(posts: &[ContentItem]) -> Self {
        let mut dated: Vec<(Timestamp, BlogEntry)> = Vec::new();
        let mut undated = Vec::new();
        for post in posts {
            let entry = BlogEntry {
                id: post.id.clone(),
                title: post.title.clone(),
                published: post.created,
            };
            match post.created {
                Some(ts) => dated.push((ts, entry)),
                None => undated.push(entry),
            }
        }

        // Month key first, then full timestamp; both descending. Stable.
        dated.sort_by(|(a, _), (b, _)| {
            month_key(b)
                .cmp(&month_key(a))
                .then_with(|| b.cmp(a))
        });

        let mut groups: Vec<MonthGroup> = Vec::new();
        for (ts, entry) in dated {
            match groups.last_mut() {
                Some(group) if (group.year, group.month) == (ts.year(), ts.month()) => {
                    group.posts.push(entry);
                }
                _ => groups.push(MonthGroup {
                    year: ts.year(),
                    month: ts.month(),
                    posts: vec![entry],
                }),
            }
        }

        Self { groups, undated }
    }

    /// Month groups, newest first.
    #[must_use]
    pub fn groups(&self) -> &[MonthGroup] {
        &self.groups
    }

    /// Most recently published post.
    #[must_use]
    pub fn newest_post_id(&self) -> Option<&str> {
        self.groups
            .first()
            .and_then(|g| g.posts.first())
            .or_else(|| self.undated.first())
            .map(|e| e.id.as_str())
    }

    /// Whether the index holds no posts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.undated.is_empty()
    }

    /// Render the table rows of `assets/blogtree.html`.
    #[must_use]
    pub fn render_rows(&self) -> String {
        let mut html = String::new();
        for group in &self.groups {
            let month = MONTH_NAMES
                .get(group.month.saturating_sub(1) as usize)
                .copied()
                .unwrap_or("???");
            let _ = write!(
                html,
                r#"<tr><th colspan="2">{month} {:04}</th></tr>"#,
                group.year
            );
            for post in &group.posts {
                let day = post.published.map_or(0, |p| p.day());
                push_row(&mut html, &format!("{day:02}."), post);
            }
        }
        if !self.undated.is_empty() {
            html.push_str(r#"<tr><th colspan="2">Undated</th></tr>"#);
            for post in &self.undated {
                push_row(&mut html, "", post);
            }
        }
        html
    }
}

fn month_key(ts: &Timestamp) -> (i32, u32) {
    (ts.year(), ts.month())
}

fn push_row(html: &mut String, day: &str, post: &BlogEntry) {
    let _ = write!(
        html,
        r#"<tr><td>{day}</td><td><a href="../blogs/{}.html">{}</a></td></tr>"#,
        escape_html(&post.id),
        escape_html(&post.title)
    );
}
