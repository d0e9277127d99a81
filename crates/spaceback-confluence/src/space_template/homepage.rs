//! Homepage body for template spaces.

use std::fmt::Write;

/// Resource identifier the `livesearch`, `popular-labels` and `listlabels`
/// macros store for the current space.
const SPACE_IDENTIFIER: &str =
    "com.atlassian.confluence.content.render.xhtml.model.resource.identifiers.SpaceResourceIdentifier@35";

/// Storage-format body of a template space homepage.
///
/// Two-column layout: project overview and live search, member list, recent
/// activity next to contributors, label cloud and list, and incomplete tasks.
#[must_use]
pub fn homepage_body(space_key: &str, space_name: &str) -> String {
    let key = escape_xml(space_key);
    let name = escape_xml(space_name);
    let space_ref = format!(r#"<ri:space ri:space-key="{key}" />"#);
    let mut out = String::with_capacity(4096);

    out.push_str("<ac:layout>");

    // Overview and search
    out.push_str(r#"<ac:layout-section ac:type="two_equal"><ac:layout-cell>"#);
    out.push_str(r#"<ac:structured-macro ac:name="info"><ac:parameter ac:name="title">Overview</ac:parameter><ac:rich-text-body>"#);
    let _ = write!(
        out,
        "<p>This is the Confluence Space (Wiki, logbook, etc.) of the project {name}.</p>"
    );
    out.push_str("</ac:rich-text-body></ac:structured-macro></ac:layout-cell>");
    out.push_str(r#"<ac:layout-cell><p><br /><ac:structured-macro ac:name="livesearch">"#);
    out.push_str(r#"<ac:parameter ac:name="additional">page excerpt</ac:parameter>"#);
    out.push_str(r#"<ac:parameter ac:name="placeholder">Search space</ac:parameter>"#);
    push_space_params(&mut out, &key, &space_ref);
    out.push_str("</ac:structured-macro></p></ac:layout-cell></ac:layout-section>");

    // Members
    out.push_str(r#"<ac:layout-section ac:type="single"><ac:layout-cell>"#);
    out.push_str(r#"<ac:structured-macro ac:name="info"><ac:parameter ac:name="title">Members of the project (Confluence Space permissions)</ac:parameter>"#);
    out.push_str(r#"<ac:rich-text-body><ac:macro ac:name="spaceaccessusersminimal" /></ac:rich-text-body>"#);
    out.push_str("</ac:structured-macro></ac:layout-cell></ac:layout-section>");

    // Activity and labels | contributors
    out.push_str(r#"<ac:layout-section ac:type="two_equal"><ac:layout-cell>"#);
    out.push_str(r#"<h2>Recent space activity</h2><p><ac:structured-macro ac:name="recently-updated">"#);
    let _ = write!(
        out,
        r#"<ac:parameter ac:name="spaces">{space_ref}</ac:parameter>"#
    );
    out.push_str(r#"<ac:parameter ac:name="max">5</ac:parameter>"#);
    out.push_str(r#"<ac:parameter ac:name="hideHeading">true</ac:parameter>"#);
    out.push_str(r#"<ac:parameter ac:name="theme">social</ac:parameter>"#);
    out.push_str(r#"<ac:parameter ac:name="types">page, comment, blogpost</ac:parameter>"#);
    out.push_str("</ac:structured-macro></p>");
    out.push_str(r#"<hr /><h2>Hot topics</h2><p><ac:structured-macro ac:name="popular-labels">"#);
    out.push_str(r#"<ac:parameter ac:name="style">heatmap</ac:parameter>"#);
    out.push_str(r#"<ac:parameter ac:name="count">35</ac:parameter>"#);
    push_space_params(&mut out, &key, &space_ref);
    out.push_str("</ac:structured-macro></p>");
    out.push_str(r#"<h2>All labels in this space</h2><p><ac:structured-macro ac:name="listlabels">"#);
    push_space_params(&mut out, &key, &space_ref);
    out.push_str("</ac:structured-macro></p></ac:layout-cell>");
    out.push_str(r#"<ac:layout-cell><h2>Space contributors</h2><p><ac:structured-macro ac:name="contributors-summary">"#);
    let _ = write!(
        out,
        r#"<ac:parameter ac:name="spaces">{space_ref}</ac:parameter>"#
    );
    out.push_str("</ac:structured-macro></p></ac:layout-cell></ac:layout-section>");

    // Tasks
    out.push_str(r#"<ac:layout-section ac:type="single"><ac:layout-cell>"#);
    out.push_str(r#"<h2>Incomplete tasks</h2><p><ac:structured-macro ac:name="tasks-report-macro">"#);
    let _ = write!(
        out,
        r#"<ac:parameter ac:name="spaces">{key}</ac:parameter><ac:parameter ac:name="spaceAndPage">space:{key}</ac:parameter>"#
    );
    out.push_str(r#"<ac:parameter ac:name="pageSize">40</ac:parameter>"#);
    out.push_str("</ac:structured-macro></p></ac:layout-cell></ac:layout-section>");

    out.push_str("</ac:layout>");
    out
}

fn push_space_params(out: &mut String, key: &str, space_ref: &str) {
    let _ = write!(
        out,
        r#"<ac:parameter ac:name="{key}">{SPACE_IDENTIFIER}</ac:parameter><ac:parameter ac:name="spaceKey">{space_ref}</ac:parameter>"#
    );
}

/// Escape text for XHTML storage format.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
