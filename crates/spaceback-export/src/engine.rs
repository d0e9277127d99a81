//! Incremental export of one space.
//!
//! A run lists the space's content, decides per item whether its archive
//! document is stale, and rewrites only those. Navigation (page tree, blog
//! index) is always built from the full listing before any item is written.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::blog_index::BlogIndex;
use crate::error::ExportError;
use crate::finalize::{RunSummary, finalize};
use crate::html::{
    BlogPostDocument, MAIN_CSS, MAIN_JS, PageDocument, render_attachments, render_blog_post,
    render_blog_tree, render_comments, render_page,
};
use crate::links::LinkRewriter;
use crate::manifest::Manifest;
use crate::model::{ContentItem, ContentKind, Space};
use crate::page_tree::PageTree;
use crate::source::ContentSource;

/// What to export and where.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Space key.
    pub space_key: String,
    /// Archive root, usually `{backup_dir}/ConfluenceBackup_{key}`.
    pub output_root: PathBuf,
    /// Export pages.
    pub pages: bool,
    /// Export blog posts.
    pub blog: bool,
    /// Download attachments of written and skipped items.
    pub attachments: bool,
    /// Commit the archive after the run.
    pub history: bool,
    /// Apply the skip rule to blog posts instead of always rewriting them.
    pub incremental_blogs: bool,
    /// Worker threads; 1 exports sequentially.
    pub threads: usize,
}

impl ExportOptions {
    /// Everything enabled, one thread.
    #[must_use]
    pub fn new(space_key: impl Into<String>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            space_key: space_key.into(),
            output_root: output_root.into(),
            pages: true,
            blog: true,
            attachments: true,
            history: true,
            incremental_blogs: false,
            threads: 1,
        }
    }
}

/// What happened to one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Document rewritten.
    Written,
    /// Document up to date.
    Skipped,
    /// Export failed; see the report.
    Failed,
}

/// Observer for run progress.
///
/// Called from worker threads when `threads > 1`.
pub trait Progress: Sync {
    /// A phase started with `total` items.
    fn phase(&self, _name: &str, _total: usize) {}

    /// An item finished.
    fn item(&self, _kind: ContentKind, _id: &str, _outcome: ItemOutcome) {}
}

/// Progress observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}

/// An item that could not be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// Page or blog post.
    pub kind: ContentKind,
    /// Content ID.
    pub id: String,
    /// Error description.
    pub message: String,
}

/// Result of an export run.
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Exported space.
    pub space: Space,
    /// Archive root.
    pub output_root: PathBuf,
    /// Run start time.
    pub started_at: DateTime<Utc>,
    /// Pages rewritten.
    pub pages_written: usize,
    /// Pages left untouched.
    pub pages_skipped: usize,
    /// Blog posts rewritten.
    pub blogs_written: usize,
    /// Blog posts left untouched.
    pub blogs_skipped: usize,
    /// Attachment files downloaded.
    pub attachments_downloaded: usize,
    /// Attachment files left untouched.
    pub attachments_skipped: usize,
    /// Items that failed, in the order they were attempted.
    pub failures: Vec<ItemFailure>,
    /// History commit, if one was made.
    pub commit: Option<String>,
}

impl ExportReport {
    fn new(space: Space, output_root: PathBuf, started_at: DateTime<Utc>) -> Self {
        Self {
            space,
            output_root,
            started_at,
            pages_written: 0,
            pages_skipped: 0,
            blogs_written: 0,
            blogs_skipped: 0,
            attachments_downloaded: 0,
            attachments_skipped: 0,
            failures: Vec::new(),
            commit: None,
        }
    }

    /// Whether every item was exported.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Count one item. Attachments handled before a failure still count.
    fn record(&mut self, kind: ContentKind, stats: &ItemStats, result: Result<(), ItemFailure>) {
        self.attachments_downloaded += stats.attachments_downloaded;
        self.attachments_skipped += stats.attachments_skipped;
        if let Err(failure) = result {
            self.failures.push(failure);
            return;
        }
        let (written, skipped) = match kind {
            ContentKind::Page => (&mut self.pages_written, &mut self.pages_skipped),
            ContentKind::BlogPost => (&mut self.blogs_written, &mut self.blogs_skipped),
        };
        if stats.written {
            *written += 1;
        } else {
            *skipped += 1;
        }
    }
}

#[derive(Debug, Default)]
struct ItemStats {
    written: bool,
    attachments_downloaded: usize,
    attachments_skipped: usize,
}

/// Shared, read-only state of the item export phases.
struct RunContext<'a> {
    manifest: &'a Manifest,
    rewriter: &'a LinkRewriter,
    space_name: &'a str,
    saved_at: &'a str,
    newest_post_id: Option<&'a str>,
    pages: &'a PageTree,
    page_tree: &'a str,
}

/// Exports one space from a [`ContentSource`] into a directory.
pub struct ExportEngine<'a, S: ContentSource + ?Sized> {
    source: &'a S,
    options: ExportOptions,
}

impl<'a, S: ContentSource + ?Sized> ExportEngine<'a, S> {
    /// Create an engine.
    pub fn new(source: &'a S, options: ExportOptions) -> Self {
        Self { source, options }
    }

    /// Run the export.
    ///
    /// Authentication, space lookup, listings and the local layout are
    /// fatal. Anything failing for a single item is recorded in the report
    /// and the run continues.
    pub fn run(&self, progress: &dyn Progress) -> Result<ExportReport, ExportError> {
        let root = self.options.output_root.as_path();
        prepare_layout(root)?;
        let manifest = Manifest::load(root)?;
        match manifest.last_backup() {
            Some(last) => info!("Last backup at {}", last),
            None => info!("No previous backup, exporting everything"),
        }

        self.source.login()?;
        let started_at = Utc::now();
        let space = self.source.space(&self.options.space_key)?;
        info!("Exporting space {} ({}) to {}", space.key, space.name, root.display());

        let saved_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let rewriter = LinkRewriter::new(self.source.base_url())?;
        let pool = self.thread_pool()?;
        let mut report = ExportReport::new(space.clone(), root.to_path_buf(), started_at);

        let posts = if self.options.blog {
            let ids = self.source.list_blog_posts(&space.key)?;
            self.fetch_metadata(pool.as_ref(), ContentKind::BlogPost, &ids, &mut report, progress)
        } else {
            Vec::new()
        };
        let blog_index = BlogIndex::build(&posts);

        if self.options.pages {
            let ids = self.source.list_pages(&space.key)?;
            let pages =
                self.fetch_metadata(pool.as_ref(), ContentKind::Page, &ids, &mut report, progress);
            let tree = PageTree::build(&pages);
            let page_tree = tree.render();
            let ctx = RunContext {
                manifest: &manifest,
                rewriter: &rewriter,
                space_name: &space.name,
                saved_at: &saved_at,
                newest_post_id: blog_index.newest_post_id(),
                pages: &tree,
                page_tree: &page_tree,
            };
            self.export_items(pool.as_ref(), &ctx, &pages, &mut report, progress);
        }

        if self.options.blog {
            let homepage = space
                .homepage_id
                .as_deref()
                .filter(|_| self.options.pages);
            let blog_tree =
                render_blog_tree(&space.name, &saved_at, homepage, &blog_index.render_rows());
            write_file(&root.join("assets").join("blogtree.html"), &blog_tree)?;

            let no_pages = PageTree::default();
            let ctx = RunContext {
                manifest: &manifest,
                rewriter: &rewriter,
                space_name: &space.name,
                saved_at: &saved_at,
                newest_post_id: blog_index.newest_post_id(),
                pages: &no_pages,
                page_tree: "",
            };
            self.export_items(pool.as_ref(), &ctx, &posts, &mut report, progress);
        }

        let run = RunSummary {
            space: &space,
            started_at,
            history: self.options.history,
        };
        report.commit = finalize(root, &manifest, &run)?;

        info!(
            "Exported {}: {} pages written, {} skipped; {} blog posts written, {} skipped; {} failures",
            space.key,
            report.pages_written,
            report.pages_skipped,
            report.blogs_written,
            report.blogs_skipped,
            report.failures.len()
        );
        Ok(report)
    }

    fn thread_pool(&self) -> Result<Option<rayon::ThreadPool>, ExportError> {
        if self.options.threads <= 1 {
            return Ok(None);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.threads)
            .build()?;
        Ok(Some(pool))
    }

    /// Fetch metadata for every listed ID, keeping listing order.
    fn fetch_metadata(
        &self,
        pool: Option<&rayon::ThreadPool>,
        kind: ContentKind,
        ids: &[String],
        report: &mut ExportReport,
        progress: &dyn Progress,
    ) -> Vec<ContentItem> {
        info!("Found {} {}s", ids.len(), kind);
        progress.phase(&format!("Reading {kind}s"), ids.len());

        let results = map_items(pool, ids, |id| {
            self.source.metadata(id).map_err(|e| {
                warn!("Failed to read {} {}: {}", kind, id, e);
                self.discard_output(kind, id);
                progress.item(kind, id, ItemOutcome::Failed);
                ItemFailure {
                    kind,
                    id: id.clone(),
                    message: e.to_string(),
                }
            })
        });

        let mut items = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(item) => items.push(item),
                Err(failure) => report.failures.push(failure),
            }
        }
        items
    }

    fn export_items(
        &self,
        pool: Option<&rayon::ThreadPool>,
        ctx: &RunContext<'_>,
        items: &[ContentItem],
        report: &mut ExportReport,
        progress: &dyn Progress,
    ) {
        let Some(kind) = items.first().map(|i| i.kind) else {
            return;
        };
        progress.phase(&format!("Exporting {kind}s"), items.len());

        let results = map_items(pool, items, |item| {
            let mut stats = ItemStats::default();
            let result = self.export_item(ctx, item, &mut stats).map_err(|e| {
                warn!("Failed to export {} {} ({}): {}", item.kind, item.id, item.title, e);
                self.discard_output(item.kind, &item.id);
                ItemFailure {
                    kind: item.kind,
                    id: item.id.clone(),
                    message: e.to_string(),
                }
            });
            let outcome = match &result {
                Ok(()) if stats.written => ItemOutcome::Written,
                Ok(()) => ItemOutcome::Skipped,
                Err(_) => ItemOutcome::Failed,
            };
            progress.item(item.kind, &item.id, outcome);
            (stats, result)
        });

        for (stats, result) in results {
            report.record(kind, &stats, result);
        }
    }

    fn export_item(
        &self,
        ctx: &RunContext<'_>,
        item: &ContentItem,
        stats: &mut ItemStats,
    ) -> Result<(), ExportError> {
        let attachments = self.sync_attachments(ctx.manifest, item, stats)?;

        let output = self.output_path(item.kind, &item.id);
        let always_rewrite = item.kind == ContentKind::BlogPost && !self.options.incremental_blogs;
        if !always_rewrite && !ctx.manifest.needs_write(item.modified.as_ref(), &output) {
            info!("Skipping {} {} ({}), unchanged", item.kind, item.id, item.title);
            return Ok(());
        }

        info!("Writing {} {} ({})", item.kind, item.id, item.title);
        let comments = render_comments(&self.source.comments(&item.id)?);
        let body = ctx.rewriter.rewrite(&self.source.rendered_body(&item.id)?);

        let html = match item.kind {
            ContentKind::Page => {
                let ancestors = ctx.pages.ancestors(&item.id);
                render_page(&PageDocument {
                    item,
                    ancestors: &ancestors,
                    space_name: ctx.space_name,
                    saved_at: ctx.saved_at,
                    newest_post_id: ctx.newest_post_id,
                    page_tree: ctx.page_tree,
                    attachments: &attachments,
                    body: &body,
                    comments: &comments,
                })
            }
            ContentKind::BlogPost => render_blog_post(&BlogPostDocument {
                item,
                attachments: &attachments,
                body: &body,
                comments: &comments,
            }),
        };
        write_file(&output, &html)?;
        stats.written = true;
        Ok(())
    }

    fn output_path(&self, kind: ContentKind, id: &str) -> PathBuf {
        self.options
            .output_root
            .join(output_dir(kind))
            .join(format!("{id}.html"))
    }

    /// Remove the document of a failed item so that the next run retries it.
    fn discard_output(&self, kind: ContentKind, id: &str) {
        let path = self.output_path(kind, id);
        match std::fs::remove_file(&path) {
            Ok(()) => debug!("Removed stale {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove stale {}: {}", path.display(), e),
        }
    }

    /// Download new or changed attachments and render the attachments block.
    fn sync_attachments(
        &self,
        manifest: &Manifest,
        item: &ContentItem,
        stats: &mut ItemStats,
    ) -> Result<String, ExportError> {
        if !self.options.attachments {
            return Ok(String::new());
        }
        let attachments = self.source.attachments(&item.id)?;
        if attachments.is_empty() {
            return Ok(String::new());
        }

        let dir = self.options.output_root.join("attachments").join(&item.id);
        std::fs::create_dir_all(&dir).map_err(|e| ExportError::io(&dir, e))?;

        let mut names = Vec::with_capacity(attachments.len());
        for attachment in &attachments {
            let name = local_file_name(&attachment.file_name);
            let path = dir.join(&name);
            if manifest.needs_write(attachment.modified.as_ref(), &path) {
                debug!("Downloading attachment {} of {}", attachment.file_name, item.id);
                let bytes = self.source.attachment_bytes(&item.id, &attachment.file_name)?;
                std::fs::write(&path, bytes).map_err(|e| ExportError::io(&path, e))?;
                stats.attachments_downloaded += 1;
            } else {
                debug!("Attachment {} of {} unchanged", attachment.file_name, item.id);
                stats.attachments_skipped += 1;
            }
            names.push(name);
        }
        Ok(render_attachments(&item.id, &names))
    }
}

/// Archive directory holding documents of `kind`.
fn output_dir(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Page => "pages",
        ContentKind::BlogPost => "blogs",
    }
}

/// Map over items in order, on `pool` when given.
fn map_items<T, R, F>(pool: Option<&rayon::ThreadPool>, items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    match pool {
        Some(pool) => pool.install(|| items.par_iter().map(&f).collect()),
        None => items.iter().map(f).collect(),
    }
}

/// Create the archive directories and write the fixed assets.
fn prepare_layout(root: &Path) -> Result<(), ExportError> {
    for dir in ["assets", "pages", "blogs", "attachments"] {
        let path = root.join(dir);
        std::fs::create_dir_all(&path).map_err(|e| ExportError::io(&path, e))?;
    }
    let assets = root.join("assets");
    write_file(&assets.join("main.css"), MAIN_CSS)?;
    write_file(&assets.join("main.js"), MAIN_JS)?;
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<(), ExportError> {
    std::fs::write(path, content).map_err(|e| ExportError::io(path, e))
}

/// File name safe to place inside the item's attachment directory.
fn local_file_name(name: &str) -> String {
    let name = name.replace(['/', '\\'], "_");
    match name.as_str() {
        "" | "." | ".." => format!("_{name}"),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::error::SourceError;
    use crate::manifest::MANIFEST_FILE;
    use crate::model::{AttachmentRef, Comment, Timestamp};

    const BASE: &str = "https://wiki.example.com";

    fn ts(s: &str) -> Timestamp {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    /// In-memory space.
    #[derive(Default)]
    struct MockSource {
        space: Option<Space>,
        pages: Vec<String>,
        posts: Vec<String>,
        items: HashMap<String, ContentItem>,
        bodies: HashMap<String, String>,
        comments: HashMap<String, Vec<Comment>>,
        attachments: HashMap<String, Vec<AttachmentRef>>,
        broken: Vec<String>,
        reject_login: bool,
        downloads: Mutex<Vec<String>>,
    }

    impl MockSource {
        fn new() -> Self {
            Self {
                space: Some(Space {
                    key: "OPS".to_owned(),
                    name: "Ops \"Team\"".to_owned(),
                    description: String::new(),
                    homepage_id: Some("1".to_owned()),
                }),
                ..Self::default()
            }
        }

        fn add(&mut self, kind: ContentKind, id: &str, parent: Option<&str>, title: &str, at: &str) {
            let item = ContentItem {
                id: id.to_owned(),
                title: title.to_owned(),
                kind,
                parent_id: parent.map(ToOwned::to_owned),
                created: Some(ts(at)),
                modified: Some(ts(at)),
                author: "Ann".to_owned(),
                origin_url: format!("{BASE}/pages/viewpage.action?pageId={id}"),
            };
            match kind {
                ContentKind::Page => self.pages.push(id.to_owned()),
                ContentKind::BlogPost => self.posts.push(id.to_owned()),
            }
            self.bodies.insert(id.to_owned(), format!("<p>body of {id}</p>"));
            self.items.insert(id.to_owned(), item);
        }

        fn touch(&mut self, id: &str, at: &str) {
            if let Some(item) = self.items.get_mut(id) {
                item.modified = Some(ts(at));
            }
        }

        fn downloads(&self) -> Vec<String> {
            self.downloads.lock().unwrap().clone()
        }

        fn check(&self, id: &str) -> Result<(), SourceError> {
            if self.broken.iter().any(|b| b == id) {
                return Err(SourceError::Auth(format!("no access to {id}")));
            }
            Ok(())
        }
    }

    impl ContentSource for MockSource {
        fn base_url(&self) -> &str {
            BASE
        }

        fn login(&self) -> Result<(), SourceError> {
            if self.reject_login {
                return Err(SourceError::Auth("bad password".to_owned()));
            }
            Ok(())
        }

        fn space(&self, key: &str) -> Result<Space, SourceError> {
            self.space
                .clone()
                .filter(|s| s.key == key)
                .ok_or_else(|| SourceError::NotFound(key.to_owned()))
        }

        fn list_pages(&self, _space_key: &str) -> Result<Vec<String>, SourceError> {
            Ok(self.pages.clone())
        }

        fn list_blog_posts(&self, _space_key: &str) -> Result<Vec<String>, SourceError> {
            Ok(self.posts.clone())
        }

        fn metadata(&self, id: &str) -> Result<ContentItem, SourceError> {
            self.items
                .get(id)
                .cloned()
                .ok_or_else(|| SourceError::NotFound(id.to_owned()))
        }

        fn comments(&self, id: &str) -> Result<Vec<Comment>, SourceError> {
            Ok(self.comments.get(id).cloned().unwrap_or_default())
        }

        fn attachments(&self, id: &str) -> Result<Vec<AttachmentRef>, SourceError> {
            Ok(self.attachments.get(id).cloned().unwrap_or_default())
        }

        fn attachment_bytes(&self, id: &str, file_name: &str) -> Result<Vec<u8>, SourceError> {
            self.downloads.lock().unwrap().push(format!("{id}/{file_name}"));
            Ok(format!("bytes of {file_name}").into_bytes())
        }

        fn rendered_body(&self, id: &str) -> Result<String, SourceError> {
            self.check(id)?;
            self.bodies
                .get(id)
                .cloned()
                .ok_or_else(|| SourceError::NotFound(id.to_owned()))
        }
    }

    fn sample_space() -> MockSource {
        let mut source = MockSource::new();
        source.add(ContentKind::Page, "1", None, "Home", "2021-01-01T00:00:00Z");
        source.add(ContentKind::Page, "2", Some("1"), "Runbook", "2021-02-01T00:00:00Z");
        source.add(ContentKind::Page, "3", Some("2"), "On-call", "2021-03-01T00:00:00Z");
        source.add(ContentKind::BlogPost, "10", None, "Kickoff", "2021-04-02T09:00:00Z");
        source.add(ContentKind::BlogPost, "11", None, "Retro", "2021-05-20T09:00:00Z");
        source.attachments.insert(
            "2".to_owned(),
            vec![AttachmentRef {
                file_name: "diagram.png".to_owned(),
                modified: Some(ts("2021-02-01T00:00:00Z")),
            }],
        );
        source.comments.insert(
            "2".to_owned(),
            vec![Comment {
                author: "Bob".to_owned(),
                created: Some(ts("2021-02-02T10:00:00Z")),
                body: "<p>Looks good</p>".to_owned(),
            }],
        );
        source.bodies.insert(
            "3".to_owned(),
            format!(r#"<a href="{BASE}/pages/viewpage.action?pageId=2">up</a>"#),
        );
        source
    }

    fn options(dir: &Path) -> ExportOptions {
        let mut options = ExportOptions::new("OPS", dir);
        options.history = false;
        options
    }

    fn read(dir: &Path, rel: &str) -> String {
        std::fs::read_to_string(dir.join(rel)).unwrap()
    }

    fn write_manifest(dir: &Path, at: &str) {
        std::fs::write(dir.join(MANIFEST_FILE), format!("{}.000000", ts(at).timestamp())).unwrap();
    }

    #[test]
    fn test_first_run_writes_everything() {
        let dir = TempDir::new().unwrap();
        let source = sample_space();

        let report = ExportEngine::new(&source, options(dir.path()))
            .run(&NoProgress)
            .unwrap();

        assert!(report.is_complete());
        assert_eq!((report.pages_written, report.pages_skipped), (3, 0));
        assert_eq!((report.blogs_written, report.blogs_skipped), (2, 0));
        assert_eq!(report.attachments_downloaded, 1);
        for rel in [
            "assets/main.css",
            "assets/main.js",
            "assets/blogtree.html",
            "pages/1.html",
            "pages/2.html",
            "pages/3.html",
            "blogs/10.html",
            "blogs/11.html",
            "attachments/2/diagram.png",
            "start-here.html",
            MANIFEST_FILE,
        ] {
            assert!(dir.path().join(rel).is_file(), "{rel} missing");
        }
        assert_eq!(read(dir.path(), "attachments/2/diagram.png"), "bytes of diagram.png");
    }

    #[test]
    fn test_page_document_contents() {
        let dir = TempDir::new().unwrap();
        let source = sample_space();

        ExportEngine::new(&source, options(dir.path()))
            .run(&NoProgress)
            .unwrap();

        let runbook = read(dir.path(), "pages/2.html");
        assert!(runbook.contains(r#"pageid="2" ancestors="1""#));
        assert!(runbook.contains("<i>Ops &quot;Team&quot;</i>"));
        assert!(runbook.contains(r#"href="../attachments/2/diagram.png""#));
        assert!(runbook.contains("<p>Looks good</p>"));
        // Newest post is the blog link target
        assert!(runbook.contains(r#"href="../blogs/11.html""#));
        // Every page carries the whole tree
        assert!(runbook.contains(r#"<ul id="3" style="display:none">"#));

        let oncall = read(dir.path(), "pages/3.html");
        assert!(oncall.contains(r#"ancestors="1,2""#));
        assert!(oncall.contains(r#"<a href="../pages/2.html">up</a>"#));

        let blog_tree = read(dir.path(), "assets/blogtree.html");
        assert!(blog_tree.find("May 2021").unwrap() < blog_tree.find("Apr 2021").unwrap());
        assert!(blog_tree.contains(r#"href="../pages/1.html""#));
    }

    #[test]
    fn test_second_run_rewrites_nothing() {
        let dir = TempDir::new().unwrap();
        let source = sample_space();
        let mut opts = options(dir.path());
        opts.incremental_blogs = true;

        ExportEngine::new(&source, opts.clone()).run(&NoProgress).unwrap();
        let before = read(dir.path(), "pages/2.html");
        // Mark the file so a rewrite would be visible
        std::fs::write(dir.path().join("pages/2.html"), "kept").unwrap();

        let report = ExportEngine::new(&source, opts).run(&NoProgress).unwrap();

        assert_eq!((report.pages_written, report.pages_skipped), (0, 3));
        assert_eq!((report.blogs_written, report.blogs_skipped), (0, 2));
        assert_eq!((report.attachments_downloaded, report.attachments_skipped), (0, 1));
        assert_eq!(source.downloads(), vec!["2/diagram.png"]);
        assert_eq!(read(dir.path(), "pages/2.html"), "kept");
        assert!(before.contains("Runbook"));
    }

    #[test]
    fn test_blog_posts_rewritten_by_default() {
        let dir = TempDir::new().unwrap();
        let source = sample_space();

        ExportEngine::new(&source, options(dir.path())).run(&NoProgress).unwrap();
        let report = ExportEngine::new(&source, options(dir.path())).run(&NoProgress).unwrap();

        assert_eq!(report.pages_written, 0);
        assert_eq!(report.blogs_written, 2);
    }

    #[test]
    fn test_changed_page_rewritten() {
        let dir = TempDir::new().unwrap();
        let mut source = sample_space();
        write_manifest(dir.path(), "2021-06-01T00:00:00Z");
        for rel in ["pages/1.html", "pages/2.html", "pages/3.html"] {
            std::fs::create_dir_all(dir.path().join("pages")).unwrap();
            std::fs::write(dir.path().join(rel), "old").unwrap();
        }
        source.touch("3", "2021-06-02T00:00:00Z");

        let report = ExportEngine::new(&source, options(dir.path())).run(&NoProgress).unwrap();

        assert_eq!((report.pages_written, report.pages_skipped), (1, 2));
        assert_eq!(read(dir.path(), "pages/1.html"), "old");
        assert!(read(dir.path(), "pages/3.html").contains("On-call"));
    }

    #[test]
    fn test_deleted_output_rewritten() {
        let dir = TempDir::new().unwrap();
        let source = sample_space();

        ExportEngine::new(&source, options(dir.path())).run(&NoProgress).unwrap();
        std::fs::remove_file(dir.path().join("pages/1.html")).unwrap();
        std::fs::remove_file(dir.path().join("attachments/2/diagram.png")).unwrap();
        let report = ExportEngine::new(&source, options(dir.path())).run(&NoProgress).unwrap();

        assert_eq!(report.pages_written, 1);
        assert_eq!(report.attachments_downloaded, 1);
        assert!(dir.path().join("pages/1.html").is_file());
    }

    #[test]
    fn test_item_failure_recorded_and_manifest_advanced() {
        let dir = TempDir::new().unwrap();
        let mut source = sample_space();
        source.broken.push("2".to_owned());

        let report = ExportEngine::new(&source, options(dir.path())).run(&NoProgress).unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, "2");
        assert_eq!(report.failures[0].kind, ContentKind::Page);
        assert_eq!(report.pages_written, 2);
        // Attachments fetched before the failure are counted
        assert_eq!(report.attachments_downloaded, 1);
        assert!(!dir.path().join("pages/2.html").exists());
        assert!(dir.path().join(MANIFEST_FILE).is_file());
    }

    #[test]
    fn test_failed_item_retried_alone() {
        let dir = TempDir::new().unwrap();
        let mut source = sample_space();
        source.broken.push("2".to_owned());
        let mut opts = options(dir.path());
        opts.incremental_blogs = true;

        let report = ExportEngine::new(&source, opts.clone()).run(&NoProgress).unwrap();
        assert_eq!((report.pages_written, report.pages_skipped), (2, 0));

        // Still broken: the unchanged pages are not rewritten
        let report = ExportEngine::new(&source, opts.clone()).run(&NoProgress).unwrap();
        assert_eq!((report.pages_written, report.pages_skipped), (0, 2));
        assert_eq!((report.blogs_written, report.blogs_skipped), (0, 2));
        assert_eq!(report.failures.len(), 1);

        source.broken.clear();
        let report = ExportEngine::new(&source, opts.clone()).run(&NoProgress).unwrap();
        assert!(report.is_complete());
        assert_eq!((report.pages_written, report.pages_skipped), (1, 2));
        assert!(read(dir.path(), "pages/2.html").contains("Runbook"));

        // A later failure removes the outdated document
        source.broken.push("2".to_owned());
        source.touch("2", "2100-01-01T00:00:00Z");
        let report = ExportEngine::new(&source, opts).run(&NoProgress).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(!dir.path().join("pages/2.html").exists());
    }

    #[test]
    fn test_missing_metadata_recorded() {
        let dir = TempDir::new().unwrap();
        let mut source = sample_space();
        source.pages.push("404".to_owned());
        std::fs::create_dir_all(dir.path().join("pages")).unwrap();
        std::fs::write(dir.path().join("pages/404.html"), "stale").unwrap();

        let report = ExportEngine::new(&source, options(dir.path())).run(&NoProgress).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, "404");
        assert_eq!(report.pages_written, 3);
        assert!(!dir.path().join("pages/404.html").exists());
    }

    #[test]
    fn test_login_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut source = sample_space();
        source.reject_login = true;

        let err = ExportEngine::new(&source, options(dir.path()))
            .run(&NoProgress)
            .unwrap_err();

        assert!(matches!(err, ExportError::Source(SourceError::Auth(_))));
        assert!(!dir.path().join("pages/1.html").exists());
    }

    #[test]
    fn test_unknown_space_is_fatal() {
        let dir = TempDir::new().unwrap();
        let source = sample_space();

        let err = ExportEngine::new(&source, ExportOptions::new("NOPE", dir.path()))
            .run(&NoProgress)
            .unwrap_err();

        assert!(matches!(err, ExportError::Source(SourceError::NotFound(_))));
    }

    #[test]
    fn test_disabled_phases() {
        let dir = TempDir::new().unwrap();
        let source = sample_space();
        let mut opts = options(dir.path());
        opts.pages = false;
        opts.attachments = false;

        let report = ExportEngine::new(&source, opts).run(&NoProgress).unwrap();

        assert_eq!(report.pages_written, 0);
        assert_eq!(report.blogs_written, 2);
        assert!(source.downloads().is_empty());
        // No "go to pages" link without exported pages
        assert!(!read(dir.path(), "assets/blogtree.html").contains("../pages/"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = TempDir::new().unwrap();
        let parallel = TempDir::new().unwrap();
        let source = sample_space();
        let mut opts = options(parallel.path());
        opts.threads = 4;

        ExportEngine::new(&source, options(sequential.path())).run(&NoProgress).unwrap();
        let report = ExportEngine::new(&source, opts).run(&NoProgress).unwrap();

        assert_eq!(report.pages_written, 3);
        for rel in [
            "pages/1.html",
            "pages/2.html",
            "pages/3.html",
            "blogs/10.html",
            "blogs/11.html",
            "assets/blogtree.html",
        ] {
            let a = without_saved_time(&read(sequential.path(), rel));
            let b = without_saved_time(&read(parallel.path(), rel));
            assert_eq!(a, b, "{rel}");
        }
    }

    /// Blank out the "saved ..." stamp, the only run-dependent text.
    fn without_saved_time(html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut rest = html;
        while let Some(start) = rest.find("saved ") {
            let (head, tail) = rest.split_at(start + "saved ".len());
            out.push_str(head);
            rest = tail.find("</i>").map_or("", |end| &tail[end..]);
        }
        out.push_str(rest);
        out
    }

    #[test]
    fn test_progress_sees_every_item() {
        #[derive(Default)]
        struct Recorder(Mutex<Vec<(String, ItemOutcome)>>);

        impl Progress for Recorder {
            fn item(&self, _kind: ContentKind, id: &str, outcome: ItemOutcome) {
                self.0.lock().unwrap().push((id.to_owned(), outcome));
            }
        }

        let dir = TempDir::new().unwrap();
        let mut source = sample_space();
        source.broken.push("10".to_owned());
        let recorder = Recorder::default();

        ExportEngine::new(&source, options(dir.path())).run(&recorder).unwrap();

        let seen = recorder.0.into_inner().unwrap();
        assert_eq!(seen.len(), 5);
        assert!(seen.contains(&("10".to_owned(), ItemOutcome::Failed)));
        assert!(seen.contains(&("1".to_owned(), ItemOutcome::Written)));
    }

    #[test]
    fn test_local_file_name() {
        assert_eq!(local_file_name("report.pdf"), "report.pdf");
        assert_eq!(local_file_name("a/b\\c.txt"), "a_b_c.txt");
        assert_eq!(local_file_name(".."), "_..");
    }
}
