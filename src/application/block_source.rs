// src/application/block_source.rs
use crate::domain::{Block, SourceError};
use async_trait::async_trait;

/// One page of a block's children
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildrenPage {
    pub results: Vec<Block>,
    pub next_cursor: Option<String>,
}

/// Read access to a hosted block tree.
///
/// Children are paginated: callers keep passing `next_cursor` back until it
/// is `None`.
#[async_trait]
pub trait BlockSource: Send + Sync {
    async fn fetch_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChildrenPage, SourceError>;

    async fn fetch_page_title(&self, page_id: &str) -> Result<String, SourceError>;
}
