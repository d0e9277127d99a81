//! Rewriting server links in rendered bodies to archive-relative links.

use regex::Regex;

/// Rewrites attachment and page links for one server.
///
/// Both absolute links (`https://host/ctx/...`) and server-relative links
/// (`/ctx/...`) are recognised, but only at the start of a quoted attribute
/// value.
#[derive(Debug)]
pub struct LinkRewriter {
    attachment_prefixes: Vec<String>,
    page_link: Regex,
}

impl LinkRewriter {
    /// Create a rewriter for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if the page link pattern cannot be compiled.
    pub fn new(base_url: &str) -> Result<Self, regex::Error> {
        let base = base_url.trim_end_matches('/');
        let context = context_path(base);

        let attachment_prefixes = vec![
            format!("=\"{base}/download/attachments"),
            format!("=\"{context}/download/attachments"),
        ];
        let page_link = Regex::new(&format!(
            r#"(["'])(?:{})?{}/pages/viewpage\.action\?pageId=(\d+)(?:(?:&amp;|&)[^"'#]*)?"#,
            regex::escape(base),
            regex::escape(context)
        ))?;

        Ok(Self {
            attachment_prefixes,
            page_link,
        })
    }

    /// Point attachment links at `../attachments` and page links at
    /// `../pages/{id}.html`.
    ///
    /// Extra query parameters on page links are dropped; a `#fragment` is
    /// kept.
    #[must_use]
    pub fn rewrite(&self, html: &str) -> String {
        let mut out = html.to_owned();
        for prefix in &self.attachment_prefixes {
            if out.contains(prefix.as_str()) {
                out = out.replace(prefix.as_str(), "=\"../attachments");
            }
        }
        self.page_link
            .replace_all(&out, "${1}../pages/${2}.html")
            .into_owned()
    }
}

/// Path component of a base URL (`/confluence`), empty at the server root.
fn context_path(base: &str) -> &str {
    let after_scheme = base.find("://").map_or(base, |i| &base[i + 3..]);
    after_scheme
        .find('/')
        .map_or("", |i| after_scheme[i..].trim_end_matches('/'))
}
