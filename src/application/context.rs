// src/application/context.rs
use crate::domain::Block;
use crate::util::text::normalize_tag;
use std::collections::{BTreeSet, HashSet};

/// State owned by one traversal and threaded through every recursive call.
///
/// Holds the Skip Set of consumed block ids, the tag and media buffers of the
/// card or deck preamble being rendered, and nested triggers deferred out of
/// an enclosing card.
#[derive(Debug, Default)]
pub struct TraversalContext {
    consumed: HashSet<String>,
    tags: BTreeSet<String>,
    media: Vec<String>,
    deferred: Vec<Block>,
}

impl TraversalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the id was already consumed
    pub fn consume(&mut self, block_id: &str) -> bool {
        self.consumed.insert(block_id.to_string())
    }

    pub fn is_consumed(&self, block_id: &str) -> bool {
        self.consumed.contains(block_id)
    }

    pub fn consumed_count(&self) -> usize {
        self.consumed.len()
    }

    /// Record tag text; comma separated values yield several tags
    pub fn add_tags(&mut self, text: &str) {
        self.tags
            .extend(text.split(',').filter_map(normalize_tag));
    }

    pub fn take_tags(&mut self) -> BTreeSet<String> {
        std::mem::take(&mut self.tags)
    }

    pub fn add_media(&mut self, url: &str) {
        self.media.push(url.to_string());
    }

    pub fn take_media(&mut self) -> Vec<String> {
        std::mem::take(&mut self.media)
    }

    pub fn defer(&mut self, block: Block) {
        self.deferred.push(block);
    }

    pub fn take_deferred(&mut self) -> Vec<Block> {
        std::mem::take(&mut self.deferred)
    }
}
