// src/infrastructure/block_hooks.rs
//
// One render function per block type. The walker passes in the already
// rendered inline content so tag extraction and run filtering stay in one place.
use crate::constants::NOTION_BASE_URL;
use crate::domain::{Block, BlockContent, BlockType};
use crate::util::text::{compact_id, file_name_from_url};
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::warn;

/// Render one block without its children.
///
/// `ordinal` is the 1-based position of a numbered list item among its
/// consecutive numbered siblings.
pub fn render_block(block: &Block, inline: &str, ordinal: usize) -> String {
    match (block.block_type, &block.content) {
        (_, BlockContent::Malformed { .. }) => unsupported(block),
        (BlockType::Paragraph, _) => format!("<p>{}</p>", inline),
        (BlockType::Heading1, _) => format!("<h1>{}</h1>", inline),
        (BlockType::Heading2, _) => format!("<h2>{}</h2>", inline),
        (BlockType::Heading3, _) => format!("<h3>{}</h3>", inline),
        (BlockType::Toggle, _) => toggle(inline, ""),
        (BlockType::BulletedListItem, _) => bulleted_item(inline, ""),
        (BlockType::NumberedListItem, _) => {
            format!(r#"<ol start="{}"><li>{}</li></ol>"#, ordinal.max(1), inline)
        }
        (BlockType::ToDo, BlockContent::ToDo { checked, .. }) => {
            let state = if *checked { "checked" } else { "unchecked" };
            format!(
                r#"<ul class="to-do-list"><li><div class="checkbox checkbox-{}"></div><span class="to-do-children-{}">{}</span></li></ul>"#,
                if *checked { "on" } else { "off" },
                state,
                inline
            )
        }
        (BlockType::Quote, _) => format!("<blockquote>{}</blockquote>", inline),
        (BlockType::Callout, BlockContent::Callout { icon, .. }) => {
            let icon = icon
                .as_deref()
                .map(|i| format!(r#"<span class="icon">{}</span>"#, i))
                .unwrap_or_default();
            format!(r#"<div class="callout">{}<div>{}</div></div>"#, icon, inline)
        }
        (BlockType::Code, BlockContent::Code { rich_text, language }) => {
            let code: String = rich_text.iter().map(|r| r.plain_text.as_str()).collect();
            format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                code_language(language),
                encode_text(&code)
            )
        }
        (BlockType::Divider, _) => divider(),
        (BlockType::Image, BlockContent::Media { url, caption }) => {
            let img = format!(r#"<img src="{}" />"#, encode_double_quoted_attribute(url));
            with_caption(img, &crate::domain::rich_text::plain_text(caption))
        }
        (BlockType::Audio, BlockContent::Media { url, .. }) => {
            let name = file_name_from_url(url);
            format!(
                r#"[sound:{}]<a href="{}">{}</a>"#,
                name,
                encode_double_quoted_attribute(url),
                encode_text(name)
            )
        }
        (BlockType::File, BlockContent::Media { url, .. }) => link(url, file_name_from_url(url)),
        (BlockType::Video, BlockContent::Media { url, .. })
        | (BlockType::Embed, BlockContent::Media { url, .. }) => format!(
            r#"<iframe src="{}" frameborder="0" allowfullscreen></iframe>"#,
            encode_double_quoted_attribute(url)
        ),
        (BlockType::Bookmark, BlockContent::Media { url, caption }) => {
            let label = crate::domain::rich_text::plain_text(caption);
            let label = if label.is_empty() { url.as_str() } else { label.as_str() };
            format!(
                r#"<a class="bookmark" href="{}">{}</a>"#,
                encode_double_quoted_attribute(url),
                encode_text(label)
            )
        }
        (BlockType::Column, _) | (BlockType::ColumnList, _) => String::new(),
        (BlockType::Equation, BlockContent::Equation { expression }) => {
            format!(r"\[{}\]", encode_text(expression))
        }
        (BlockType::ChildPage, BlockContent::ChildPage { title }) => {
            link(&page_url(&block.id), title)
        }
        (BlockType::LinkToPage, BlockContent::LinkToPage { page_id }) => {
            link(&page_url(page_id), page_id)
        }
        _ => unsupported(block),
    }
}

pub fn toggle(summary: &str, inner: &str) -> String {
    format!(
        r#"<details><summary>{}</summary>{}</details>"#,
        summary, inner
    )
}

pub fn bulleted_item(text: &str, inner: &str) -> String {
    format!("<ul><li>{}{}</li></ul>", text, inner)
}

pub fn divider() -> String {
    "<hr />".to_string()
}

/// Visible diagnostic for blocks that cannot be rendered
pub fn unsupported(block: &Block) -> String {
    warn!(block_id = %block.id, block_type = %block.type_name(), "Rendering unsupported block");
    let raw = serde_json::to_string_pretty(&block.raw).unwrap_or_default();
    format!(
        "unsupported: {}{}<pre>{}</pre>",
        encode_text(block.type_name()),
        divider(),
        encode_text(&raw)
    )
}

/// URL of a media block, for the card's media list
pub fn media_url(block: &Block) -> Option<&str> {
    match (block.block_type, &block.content) {
        (
            BlockType::Image | BlockType::Audio | BlockType::File | BlockType::Video,
            BlockContent::Media { url, .. },
        ) => Some(url.as_str()),
        _ => None,
    }
}

fn page_url(id: &str) -> String {
    format!("{}/{}", NOTION_BASE_URL, compact_id(id))
}

fn link(url: &str, label: &str) -> String {
    format!(
        r#"<a href="{}">{}</a>"#,
        encode_double_quoted_attribute(url),
        encode_text(label)
    )
}

fn with_caption(html: String, caption: &str) -> String {
    if caption.is_empty() {
        html
    } else {
        format!(
            "<figure>{}<figcaption>{}</figcaption></figure>",
            html,
            encode_text(caption)
        )
    }
}

fn code_language(language: &str) -> String {
    let lang = language.trim().to_lowercase().replace(' ', "-");
    if lang.is_empty() {
        "plain-text".to_string()
    } else {
        lang
    }
}
