// src/domain/deck.rs
use crate::constants::DECK_SEPARATOR;
use crate::domain::note::Note;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deck {
    pub name: String,
    pub cards: Vec<Note>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    pub block_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Deck {
    pub fn new(
        name: impl Into<String>,
        block_id: impl Into<String>,
        parent_name: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cards: Vec::new(),
            parent_name,
            block_id: block_id.into(),
            description: String::new(),
        }
    }

    /// Hierarchical name of a nested deck
    pub fn child_name(parent: &str, title: &str) -> String {
        if parent.is_empty() {
            title.to_string()
        } else {
            format!("{}{}{}", parent, DECK_SEPARATOR, title)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }
}
