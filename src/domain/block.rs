// src/domain/block.rs
use crate::domain::error::DomainError;
use crate::domain::rich_text::{self, RichText};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockType {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Toggle,
    BulletedListItem,
    NumberedListItem,
    ToDo,
    Quote,
    Callout,
    Code,
    Divider,
    Image,
    Audio,
    File,
    Video,
    Embed,
    Bookmark,
    Column,
    ColumnList,
    Equation,
    ChildPage,
    LinkToPage,
    Unsupported,
}

impl BlockType {
    pub const ALL: [BlockType; 24] = [
        BlockType::Paragraph,
        BlockType::Heading1,
        BlockType::Heading2,
        BlockType::Heading3,
        BlockType::Toggle,
        BlockType::BulletedListItem,
        BlockType::NumberedListItem,
        BlockType::ToDo,
        BlockType::Quote,
        BlockType::Callout,
        BlockType::Code,
        BlockType::Divider,
        BlockType::Image,
        BlockType::Audio,
        BlockType::File,
        BlockType::Video,
        BlockType::Embed,
        BlockType::Bookmark,
        BlockType::Column,
        BlockType::ColumnList,
        BlockType::Equation,
        BlockType::ChildPage,
        BlockType::LinkToPage,
        BlockType::Unsupported,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading1 => "heading_1",
            BlockType::Heading2 => "heading_2",
            BlockType::Heading3 => "heading_3",
            BlockType::Toggle => "toggle",
            BlockType::BulletedListItem => "bulleted_list_item",
            BlockType::NumberedListItem => "numbered_list_item",
            BlockType::ToDo => "to_do",
            BlockType::Quote => "quote",
            BlockType::Callout => "callout",
            BlockType::Code => "code",
            BlockType::Divider => "divider",
            BlockType::Image => "image",
            BlockType::Audio => "audio",
            BlockType::File => "file",
            BlockType::Video => "video",
            BlockType::Embed => "embed",
            BlockType::Bookmark => "bookmark",
            BlockType::Column => "column",
            BlockType::ColumnList => "column_list",
            BlockType::Equation => "equation",
            BlockType::ChildPage => "child_page",
            BlockType::LinkToPage => "link_to_page",
            BlockType::Unsupported => "unsupported",
        }
    }

    /// Map a source type tag, falling back to `Unsupported`
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or(BlockType::Unsupported)
    }

    pub fn is_heading(&self) -> bool {
        matches!(
            self,
            BlockType::Heading1 | BlockType::Heading2 | BlockType::Heading3
        )
    }

    /// Types that render their own children inside their fragment
    pub fn nests_children(&self) -> bool {
        matches!(self, BlockType::Toggle | BlockType::BulletedListItem)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| DomainError::UnknownBlockType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    /// paragraph, headings, toggle, list items, quote
    Text { rich_text: Vec<RichText> },
    ToDo { rich_text: Vec<RichText>, checked: bool },
    Callout { rich_text: Vec<RichText>, icon: Option<String> },
    Code { rich_text: Vec<RichText>, language: String },
    /// image, audio, file, video, embed, bookmark
    Media { url: String, caption: Vec<RichText> },
    Equation { expression: String },
    ChildPage { title: String },
    LinkToPage { page_id: String },
    /// divider, column, column_list
    Container,
    Malformed { reason: String },
    Unknown { type_name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: String,
    pub block_type: BlockType,
    pub has_children: bool,
    pub content: BlockContent,
    pub raw: Value,
}

#[derive(Deserialize)]
struct TextPayload {
    rich_text: Vec<RichText>,
}

#[derive(Deserialize)]
struct ToDoPayload {
    rich_text: Vec<RichText>,
    #[serde(default)]
    checked: bool,
}

#[derive(Deserialize)]
struct Icon {
    emoji: Option<String>,
}

#[derive(Deserialize)]
struct CalloutPayload {
    rich_text: Vec<RichText>,
    icon: Option<Icon>,
}

#[derive(Deserialize)]
struct CodePayload {
    rich_text: Vec<RichText>,
    #[serde(default)]
    language: String,
}

#[derive(Deserialize)]
struct UrlRef {
    url: String,
}

#[derive(Deserialize)]
struct MediaPayload {
    #[serde(default)]
    caption: Vec<RichText>,
    url: Option<String>,
    external: Option<UrlRef>,
    file: Option<UrlRef>,
}

#[derive(Deserialize)]
struct EquationPayload {
    expression: String,
}

#[derive(Deserialize)]
struct ChildPagePayload {
    title: String,
}

#[derive(Deserialize)]
struct LinkToPagePayload {
    page_id: Option<String>,
    database_id: Option<String>,
}

impl Block {
    pub fn new(id: impl Into<String>, block_type: BlockType, content: BlockContent) -> Self {
        Self {
            id: id.into(),
            block_type,
            has_children: false,
            content,
            raw: Value::Null,
        }
    }

    fn text(id: impl Into<String>, block_type: BlockType, runs: Vec<RichText>) -> Self {
        Self::new(id, block_type, BlockContent::Text { rich_text: runs })
    }

    pub fn paragraph(id: impl Into<String>, text: &str) -> Self {
        Self::text(id, BlockType::Paragraph, vec![RichText::plain(text)])
    }

    pub fn toggle(id: impl Into<String>, text: &str) -> Self {
        Self::text(id, BlockType::Toggle, vec![RichText::plain(text)])
    }

    pub fn with_runs(id: impl Into<String>, block_type: BlockType, runs: Vec<RichText>) -> Self {
        Self::text(id, block_type, runs)
    }

    pub fn code(id: impl Into<String>, language: &str, text: &str) -> Self {
        Self::new(
            id,
            BlockType::Code,
            BlockContent::Code {
                rich_text: vec![RichText::plain(text)],
                language: language.to_string(),
            },
        )
    }

    pub fn child_page(id: impl Into<String>, title: &str) -> Self {
        Self::new(
            id,
            BlockType::ChildPage,
            BlockContent::ChildPage {
                title: title.to_string(),
            },
        )
    }

    pub fn container(id: impl Into<String>, block_type: BlockType) -> Self {
        Self::new(id, block_type, BlockContent::Container)
    }

    pub fn media(id: impl Into<String>, block_type: BlockType, url: &str) -> Self {
        Self::new(
            id,
            block_type,
            BlockContent::Media {
                url: url.to_string(),
                caption: Vec::new(),
            },
        )
    }

    pub fn with_children(mut self, has_children: bool) -> Self {
        self.has_children = has_children;
        self
    }

    /// Parse a Notion-shaped block object.
    ///
    /// Never fails: a block without an id takes `fallback_id`, an unknown
    /// type tag becomes `Unsupported` and a payload missing required fields
    /// becomes `BlockContent::Malformed`.
    pub fn from_json(raw: Value, fallback_id: &str) -> Self {
        let id = raw.get("id").and_then(Value::as_str).map(str::to_string);
        let type_name = raw
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let has_children = raw
            .get("has_children")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let block_type = BlockType::from_tag(&type_name);

        let content = match &id {
            None => BlockContent::Malformed {
                reason: "missing id".to_string(),
            },
            Some(_) => {
                let payload = raw.get(&type_name).cloned().unwrap_or(Value::Null);
                parse_content(block_type, &type_name, payload).unwrap_or_else(|reason| {
                    BlockContent::Malformed { reason }
                })
            }
        };

        let id = id.unwrap_or_else(|| fallback_id.to_string());
        if let BlockContent::Malformed { reason } = &content {
            warn!(block_id = %id, block_type = %type_name, %reason, "Malformed block");
        }

        Self {
            id,
            block_type,
            has_children,
            content,
            raw,
        }
    }

    /// Inline content carried by text-like blocks
    pub fn rich_text(&self) -> Option<&[RichText]> {
        match &self.content {
            BlockContent::Text { rich_text }
            | BlockContent::ToDo { rich_text, .. }
            | BlockContent::Callout { rich_text, .. }
            | BlockContent::Code { rich_text, .. } => Some(rich_text),
            _ => None,
        }
    }

    pub fn plain_text(&self) -> String {
        match &self.content {
            BlockContent::Media { url, caption } => {
                let caption = rich_text::plain_text(caption);
                if caption.is_empty() {
                    url.clone()
                } else {
                    caption
                }
            }
            BlockContent::Equation { expression } => expression.clone(),
            BlockContent::ChildPage { title } => title.clone(),
            _ => self.rich_text().map(rich_text::plain_text).unwrap_or_default(),
        }
    }

    /// Diagnostic name: the source tag for unknown types
    pub fn type_name(&self) -> &str {
        match &self.content {
            BlockContent::Unknown { type_name } => type_name,
            _ => self.block_type.as_str(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.content, BlockContent::Malformed { .. })
    }
}

fn parse_content(
    block_type: BlockType,
    type_name: &str,
    payload: Value,
) -> Result<BlockContent, String> {
    fn decode<T: for<'de> Deserialize<'de>>(payload: Value) -> Result<T, String> {
        serde_json::from_value(payload).map_err(|e| e.to_string())
    }

    let content = match block_type {
        BlockType::Paragraph
        | BlockType::Heading1
        | BlockType::Heading2
        | BlockType::Heading3
        | BlockType::Toggle
        | BlockType::BulletedListItem
        | BlockType::NumberedListItem
        | BlockType::Quote => {
            let p: TextPayload = decode(payload)?;
            BlockContent::Text {
                rich_text: p.rich_text,
            }
        }
        BlockType::ToDo => {
            let p: ToDoPayload = decode(payload)?;
            BlockContent::ToDo {
                rich_text: p.rich_text,
                checked: p.checked,
            }
        }
        BlockType::Callout => {
            let p: CalloutPayload = decode(payload)?;
            BlockContent::Callout {
                rich_text: p.rich_text,
                icon: p.icon.and_then(|i| i.emoji),
            }
        }
        BlockType::Code => {
            let p: CodePayload = decode(payload)?;
            BlockContent::Code {
                rich_text: p.rich_text,
                language: p.language,
            }
        }
        BlockType::Image
        | BlockType::Audio
        | BlockType::File
        | BlockType::Video
        | BlockType::Embed
        | BlockType::Bookmark => {
            let p: MediaPayload = decode(payload)?;
            let url = p
                .url
                .or(p.external.map(|u| u.url))
                .or(p.file.map(|u| u.url))
                .ok_or_else(|| format!("{} block without url", type_name))?;
            BlockContent::Media {
                url,
                caption: p.caption,
            }
        }
        BlockType::Equation => {
            let p: EquationPayload = decode(payload)?;
            BlockContent::Equation {
                expression: p.expression,
            }
        }
        BlockType::ChildPage => {
            let p: ChildPagePayload = decode(payload)?;
            BlockContent::ChildPage { title: p.title }
        }
        BlockType::LinkToPage => {
            let p: LinkToPagePayload = decode(payload)?;
            let page_id = p
                .page_id
                .or(p.database_id)
                .ok_or_else(|| "link_to_page without target".to_string())?;
            BlockContent::LinkToPage { page_id }
        }
        BlockType::Divider | BlockType::Column | BlockType::ColumnList => BlockContent::Container,
        BlockType::Unsupported => BlockContent::Unknown {
            type_name: type_name.to_string(),
        },
    };
    Ok(content)
}
