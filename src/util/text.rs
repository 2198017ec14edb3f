// src/util/text.rs
use html_escape::decode_html_entities;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BLOCK_TAG_REGEX: Regex =
        Regex::new(r"</?(p|div|br|li|ul|ol|h[1-6]|pre|blockquote|details|summary|hr)[^>]*>")
            .expect("Failed to compile block tag regex");
    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]+>").expect("Failed to compile tag regex");
}

/// Reduce HTML to its text content, one line per block element.
///
/// # Examples
///
/// ```
/// use notiondeck::util::text::to_plain_text;
///
/// let html = "<p>This is the back</p><p>of the &amp; card</p>";
/// assert_eq!(to_plain_text(html), "This is the back\nof the & card");
/// ```
pub fn to_plain_text(html: &str) -> String {
    // Replace block-level tags with newlines to keep line structure
    let with_newlines = BLOCK_TAG_REGEX.replace_all(html, "\n");
    let no_tags = TAG_REGEX.replace_all(&with_newlines, "");
    let decoded = decode_html_entities(&no_tags);

    decoded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Anki tags cannot hold whitespace
pub fn normalize_tag(raw: &str) -> Option<String> {
    let tag = raw.split_whitespace().collect::<Vec<_>>().join("-");
    (!tag.is_empty()).then_some(tag)
}

/// Block id without dashes, as used in Notion URLs
pub fn compact_id(id: &str) -> String {
    id.replace('-', "")
}

/// URL slug of a page title: alphanumeric words joined by dashes
pub fn title_slug(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Last path segment of a URL without query or fragment
pub fn file_name_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(path)
}
