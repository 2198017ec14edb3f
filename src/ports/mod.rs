// src/ports/mod.rs
pub mod json;

pub use json::DeckPresenter;
