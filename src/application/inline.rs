// src/application/inline.rs
use crate::domain::RichText;

/// Turns inline rich text into markup
pub trait InlineRenderer: Send + Sync {
    fn render(&self, runs: &[RichText]) -> String;
}
