// src/application/mod.rs
pub mod block_source;
pub mod context;
pub mod deck_builder;
pub mod flashcard_finder;
pub mod inline;
pub mod transforms;

pub use block_source::{BlockSource, ChildrenPage};
pub use flashcard_finder::{FlashcardFinder, ParentKind};
pub use inline::InlineRenderer;
