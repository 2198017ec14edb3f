// src/infrastructure/mod.rs
pub mod block_hooks;
pub mod cloze_converter;
pub mod config;
pub mod fetcher;
pub mod inline_html;
pub mod json_source;

pub use config::Config;
pub use fetcher::{ChildFetcher, FetchPolicy};
pub use inline_html::HtmlInlineRenderer;
pub use json_source::JsonBlockSource;
