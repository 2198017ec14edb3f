// src/application/deck_builder.rs
use crate::domain::{Deck, Note};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use tracing::debug;

/// Accumulates the cards of one deck during traversal
#[derive(Debug)]
pub struct DeckBuilder {
    deck: Deck,
    global_tags: BTreeSet<String>,
    next_number: u32,
}

impl DeckBuilder {
    pub fn new(name: impl Into<String>, block_id: impl Into<String>, parent_name: Option<String>) -> Self {
        Self {
            deck: Deck::new(name, block_id, parent_name),
            global_tags: BTreeSet::new(),
            next_number: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.deck.name
    }

    /// Append a card, assigning its number, prefix and guid
    pub fn push(&mut self, mut note: Note) {
        note.guid = card_guid(&self.deck.name, &note);
        note.number = self.next_number;
        note.name = format!("{} - {}", note.number, note.name);
        self.next_number += 1;
        debug!(deck = %self.deck.name, number = note.number, "Added card");
        self.deck.cards.push(note);
    }

    pub fn add_global_tags(&mut self, tags: BTreeSet<String>) {
        self.global_tags.extend(tags);
    }

    pub fn append_description(&mut self, html: &str) {
        self.deck.description.push_str(html);
    }

    /// Apply deck-wide tags and hand out the finished deck
    pub fn finish(mut self) -> Deck {
        if !self.global_tags.is_empty() {
            for card in &mut self.deck.cards {
                card.tags.extend(self.global_tags.iter().cloned());
            }
        }
        self.deck
    }
}

/// The notion id for forward cards when present, else a digest of the fields
fn card_guid(deck_name: &str, note: &Note) -> String {
    if let (Some(id), false) = (&note.notion_id, note.reversed) {
        return id.clone();
    }

    let mut hasher = Sha256::new();
    for field in [
        deck_name,
        note.notion_id.as_deref().unwrap_or(""),
        note.name.as_str(),
        note.back.as_str(),
        if note.reversed { "reversed" } else { "forward" },
    ] {
        hasher.update(field.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}
