// src/domain/note.rs
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub name: String,
    pub back: String,
    pub tags: BTreeSet<String>,
    pub number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notion_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notion_link: Option<String>,
    pub cloze: bool,
    pub reversed: bool,
    pub enable_input: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub answer: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<String>,
    pub guid: String,
}

impl Note {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            name: front.into(),
            back: back.into(),
            tags: BTreeSet::new(),
            number: 0,
            notion_id: None,
            notion_link: None,
            cloze: false,
            reversed: false,
            enable_input: false,
            answer: String::new(),
            media: Vec::new(),
            guid: String::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Copy with front and back swapped
    pub fn swapped(&self) -> Self {
        Self {
            name: self.back.clone(),
            back: self.name.clone(),
            reversed: !self.reversed,
            ..self.clone()
        }
    }
}
