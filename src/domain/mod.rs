// src/domain/mod.rs
pub mod block;
pub mod deck;
pub mod error;
pub mod note;
pub mod rich_text;
pub mod rules;
pub mod settings;

pub use block::{Block, BlockContent, BlockType};
pub use deck::Deck;
pub use error::{DomainError, FetchFailure, SourceError, TraversalError};
pub use note::Note;
pub use rich_text::RichText;
pub use rules::{ParserRules, TagSource};
pub use settings::Settings;
