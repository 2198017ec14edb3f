// src/ports/json.rs
use crate::domain::Deck;
use anyhow::{Context, Result};
use tracing::instrument;

/// Presents converted decks on the command line
#[derive(Debug, Default)]
pub struct DeckPresenter;

impl DeckPresenter {
    pub fn new() -> Self {
        Self
    }

    #[instrument(level = "debug", skip(self, decks))]
    pub fn render_json(&self, decks: &[Deck]) -> Result<String> {
        serde_json::to_string_pretty(decks).context("Failed to serialize decks to JSON")
    }

    /// One line per deck, then one indented line per card
    pub fn summary(&self, decks: &[Deck]) -> String {
        let mut out = String::new();
        for deck in decks {
            out.push_str(&format!("{} ({} cards)\n", deck.name, deck.len()));
            for card in &deck.cards {
                let kind = if card.cloze {
                    "cloze"
                } else if card.enable_input {
                    "input"
                } else if card.reversed {
                    "reversed"
                } else {
                    "basic"
                };
                let first_line = card.name.lines().next().unwrap_or("");
                out.push_str(&format!("  [{}] {}\n", kind, first_line));
            }
        }
        out
    }
}
