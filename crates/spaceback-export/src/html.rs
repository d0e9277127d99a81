//! HTML templates for the archive.
//!
//! Plain string assembly: every user-controlled value (titles, author and
//! space names, file names, URLs) goes through [`escape_html`]. Server-rendered
//! bodies and comment bodies are inserted verbatim.

use std::fmt::Write;

use spaceback_confluence::encode_path_segment;

use crate::model::{Comment, ContentItem, Timestamp};

/// Stylesheet shared by all archive documents.
pub const MAIN_CSS: &str = include_str!("assets/main.css");

/// Sidebar tree behavior (expand/collapse, open the current page's branch).
pub const MAIN_JS: &str = include_str!("assets/main.js");

/// Closes the content column opened by the page and blog post headers.
const DOCUMENT_FOOTER: &str = "</div></body></html>";

const CONTENT_COLUMN: &str =
    r#"<div style="float:left; padding: 0px 30px; height:100%; padding-left:22em;"> "#;

/// A page document.
pub struct PageDocument<'a> {
    /// The page.
    pub item: &'a ContentItem,
    /// Ancestor IDs, root first.
    pub ancestors: &'a [String],
    /// Display name of the space.
    pub space_name: &'a str,
    /// When the archive was written.
    pub saved_at: &'a str,
    /// Newest blog post, target of the "go to blog" link.
    pub newest_post_id: Option<&'a str>,
    /// Shared page tree fragment.
    pub page_tree: &'a str,
    /// Attachments block.
    pub attachments: &'a str,
    /// Rendered body, links already rewritten.
    pub body: &'a str,
    /// Comments block.
    pub comments: &'a str,
}

/// A blog post document.
pub struct BlogPostDocument<'a> {
    /// The blog post.
    pub item: &'a ContentItem,
    /// Attachments block.
    pub attachments: &'a str,
    /// Rendered body, links already rewritten.
    pub body: &'a str,
    /// Comments block.
    pub comments: &'a str,
}

/// Render `pages/{id}.html`.
pub fn render_page(doc: &PageDocument<'_>) -> String {
    let item = doc.item;
    let mut html = String::with_capacity(
        2048 + doc.page_tree.len() + doc.body.len() + doc.comments.len(),
    );

    html.push_str(r#"<!DOCTYPE html><html><head><meta charset="UTF-8">"#);
    let _ = write!(html, "<title>{}</title>", escape_html(&item.title));
    html.push_str(r#"<script language="javascript" type="text/javascript" src="../assets/main.js"></script>"#);
    html.push_str(r#"<link rel="stylesheet" href="../assets/main.css"></head>"#);
    let _ = write!(
        html,
        r#"<body onload="openTree()" pageid="{}" ancestors="{}">"#,
        escape_html(&item.id),
        escape_html(&doc.ancestors.join(","))
    );

    // Sidebar
    html.push_str(r#"<div id="sidebar">"#);
    push_sidebar_header(&mut html, doc.space_name, doc.saved_at);
    if let Some(post) = doc.newest_post_id {
        let _ = write!(
            html,
            r#"<div><a href="../blogs/{}.html"><span id="gotospan">go&nbsp;to&nbsp;blog</span></a></div>"#,
            escape_html(post)
        );
    }
    html.push_str("</div>");
    html.push_str(r#"<div id="pagetree" style="padding:0 10px;"><h3 style="color:Crimson">PAGES</h3>"#);
    html.push_str(doc.page_tree);
    html.push_str("</div></div>");

    push_heading(&mut html, item);
    html.push_str(doc.attachments);
    html.push_str(doc.body);
    html.push_str(doc.comments);
    html.push_str(DOCUMENT_FOOTER);
    html
}

/// Render `blogs/{id}.html`.
///
/// The sidebar embeds `assets/blogtree.html` instead of repeating the index.
pub fn render_blog_post(doc: &BlogPostDocument<'_>) -> String {
    let item = doc.item;
    let mut html = String::with_capacity(1024 + doc.body.len() + doc.comments.len());

    html.push_str(r#"<!DOCTYPE html><html><head><meta charset="UTF-8">"#);
    html.push_str(r#"<link rel="stylesheet" href="../assets/main.css">"#);
    html.push_str(r#"<script language="javascript" type="text/javascript" src="../assets/main.js"></script>"#);
    let _ = write!(html, "<title>{}</title></head><body>", escape_html(&item.title));
    html.push_str(r#"<div id="sidebar"><object type="text/html" data="../assets/blogtree.html"></object></div>"#);

    push_heading(&mut html, item);
    html.push_str(doc.attachments);
    html.push_str(doc.body);
    html.push_str(doc.comments);
    html.push_str(DOCUMENT_FOOTER);
    html
}

/// Render `assets/blogtree.html` around the blog index rows.
///
/// `homepage_id` is the target of the "go to pages" link, omitted when
/// there is no exported homepage.
pub fn render_blog_tree(
    space_name: &str,
    saved_at: &str,
    homepage_id: Option<&str>,
    rows: &str,
) -> String {
    let mut html = String::with_capacity(1024 + rows.len());

    html.push_str(r#"<!DOCTYPE html><html><head><meta charset="UTF-8"><base target="_parent" />"#);
    html.push_str(r#"<link rel="stylesheet" href="../assets/main.css">"#);
    html.push_str(r#"<script language="javascript" type="text/javascript" src="../assets/main.js"></script>"#);
    html.push_str("<title>blogtree</title></head><body>");
    html.push_str(r#"<div id="sidebar">"#);
    push_sidebar_header(&mut html, space_name, saved_at);
    if let Some(home) = homepage_id {
        let _ = write!(
            html,
            r#"<div><a target href="../pages/{}.html"><span id="gotospan">go&nbsp;to&nbsp;pages</span></a></div>"#,
            escape_html(home)
        );
    }
    html.push_str("</div>");
    html.push_str(r#"<div style="padding:0 10px;"><h3 style="color:Crimson">BLOG</h3><table class="blogtree" style="width:100%">"#);
    html.push_str(rows);
    html.push_str("</table></div></div></body></html>");
    html
}

/// Render the attachments block linking into `attachments/{content_id}/`.
///
/// Empty when there are no attachments.
pub fn render_attachments(content_id: &str, file_names: &[String]) -> String {
    if file_names.is_empty() {
        return String::new();
    }

    let mut html = String::with_capacity(128 + file_names.len() * 96);
    html.push_str(r#"<div style="background-color: #DDD; border: 1px silver ridge; padding: 5px;"><b>Attachments</b><ul>"#);
    for name in file_names {
        let href = format!(
            "../attachments/{}/{}",
            encode_path_segment(content_id),
            encode_path_segment(name)
        );
        let _ = write!(
            html,
            r#"<li><a href="{}">{}</a></li>"#,
            escape_html(&href),
            escape_html(name)
        );
    }
    html.push_str("</ul></div>");
    html
}

/// Render the comments block. Empty when there are no comments.
pub fn render_comments(comments: &[Comment]) -> String {
    let mut html = String::new();
    for comment in comments {
        let _ = write!(
            html,
            r#"<div class="confluence_comment"><hr><h4>{}</h4><p><i>{}</i></p><div>{}</div></div>"#,
            escape_html(&comment.author),
            escape_html(&format_timestamp(comment.created.as_ref())),
            comment.body
        );
    }
    html
}

/// Render `start-here.html`, redirecting to the homepage.
pub fn render_start_page(homepage_id: &str) -> String {
    let target = format!("pages/{}.html", escape_html(homepage_id));
    format!(
        r#"<!DOCTYPE html><html><head><meta http-equiv="refresh" content="0; url={target}"></head><body><p>Please visit <a href="{target}">this page</a></p></body></html>"#
    )
}

/// Escape text for HTML content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}

/// Format a timestamp as shown in archive documents (server-local time).
pub fn format_timestamp(ts: Option<&Timestamp>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn push_sidebar_header(html: &mut String, space_name: &str, saved_at: &str) {
    let _ = write!(
        html,
        r#"<div id="sidebarheader"><div><h3>Local copy of Confluence Space<br><i>{}</i></h3><p><i>saved {}</i></p></div>"#,
        escape_html(space_name),
        escape_html(saved_at)
    );
}

/// Opens the content column with title, origin link and byline.
fn push_heading(html: &mut String, item: &ContentItem) {
    html.push_str(CONTENT_COLUMN);
    let _ = write!(
        html,
        r#"<h1>{} (<a href="{}">Origin</a>)</h1>"#,
        escape_html(&item.title),
        escape_html(&item.origin_url)
    );
    let published = format_timestamp(item.created.as_ref());
    if published.is_empty() {
        let _ = write!(html, "<h5>Published by {}</h5>", escape_html(&item.author));
    } else {
        let _ = write!(
            html,
            "<h5>Published {} by {}</h5>",
            published,
            escape_html(&item.author)
        );
    }
}
