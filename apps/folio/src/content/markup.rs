//! Small markup helpers shared by the projection table and the resume preview.

use std::sync::LazyLock;

use regex::Regex;

/// Route that renders the page with the resume preview open.
pub const PREVIEW_ROUTE: &str = "/resume";

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Escapes text for use in element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Removes every `<...>` tag, leaving the text between them.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

/// 1-based card index, zero-padded to two digits.
pub fn pad_index(zero_based: usize) -> String {
    format!("{:02}", zero_based + 1)
}

pub fn opens_new_context(href: &str) -> bool {
    href.starts_with("http")
}

pub fn is_resume_trigger(href: &str) -> bool {
    href.contains("resume")
}

/// Attribute string for an anchor pointing at `href`.
///
/// External (`http…`) targets open in a new browsing context. Targets that
/// mention `resume` are redirected to the preview route; the original target is
/// kept in `data-href`.
pub fn link_attrs(href: &str) -> String {
    let mut attrs = if is_resume_trigger(href) {
        format!(
            "href=\"{}\" data-href=\"{}\" data-resume-preview",
            PREVIEW_ROUTE,
            escape_html(href)
        )
    } else {
        format!("href=\"{}\"", escape_html(href))
    };
    if opens_new_context(href) {
        attrs.push_str(" target=\"_blank\" rel=\"noopener\"");
    }
    attrs
}
