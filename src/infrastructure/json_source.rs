// src/infrastructure/json_source.rs
use crate::application::{BlockSource, ChildrenPage};
use crate::constants::DEFAULT_PAGE_SIZE;
use crate::domain::{Block, SourceError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct PageEntry {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct TreeFile {
    #[serde(default)]
    pages: HashMap<String, PageEntry>,
    #[serde(default)]
    children: HashMap<String, Vec<Value>>,
    page_size: Option<usize>,
}

/// Block source backed by a JSON dump of a block tree
#[derive(Debug, Clone)]
pub struct JsonBlockSource {
    titles: HashMap<String, String>,
    children: HashMap<String, Vec<Block>>,
    known: HashSet<String>,
    page_size: usize,
}

impl JsonBlockSource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read block tree file {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Failed to parse block tree file {}", path.display()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let file: TreeFile = serde_json::from_str(content).context("Invalid block tree JSON")?;

        let children: HashMap<String, Vec<Block>> = file
            .children
            .into_iter()
            .map(|(parent, raw_blocks)| {
                let blocks = raw_blocks
                    .into_iter()
                    .enumerate()
                    .map(|(i, raw)| Block::from_json(raw, &format!("{}-{}", parent, i)))
                    .collect();
                (parent, blocks)
            })
            .collect();

        let titles = file
            .pages
            .into_iter()
            .map(|(id, page)| (id, page.title))
            .collect();

        let source = Self::assemble(titles, children, file.page_size.unwrap_or(DEFAULT_PAGE_SIZE));
        debug!(
            parents = source.children.len(),
            blocks = source.known.len(),
            "Loaded block tree"
        );
        Ok(source)
    }

    /// Index a tree: a block has children when it claims so or has an entry
    pub(crate) fn assemble(
        titles: HashMap<String, String>,
        mut children: HashMap<String, Vec<Block>>,
        page_size: usize,
    ) -> Self {
        let parents: HashSet<String> = children.keys().cloned().collect();
        let mut known: HashSet<String> = titles.keys().cloned().collect();
        known.extend(parents.iter().cloned());

        for blocks in children.values_mut() {
            for block in blocks.iter_mut() {
                block.has_children |= parents.contains(&block.id);
                known.insert(block.id.clone());
            }
        }

        Self {
            titles,
            children,
            known,
            page_size: page_size.max(1),
        }
    }
}

/// Slice a child list into the page starting at `cursor`
pub(crate) fn paginate(
    blocks: &[Block],
    cursor: Option<&str>,
    page_size: usize,
) -> Result<ChildrenPage, SourceError> {
    let start = match cursor {
        None => 0,
        Some(c) => c
            .parse::<usize>()
            .map_err(|_| SourceError::Malformed(format!("invalid cursor {}", c)))?,
    };
    if start > blocks.len() {
        return Err(SourceError::Malformed(format!("cursor {} out of range", start)));
    }

    let end = (start + page_size).min(blocks.len());
    Ok(ChildrenPage {
        results: blocks[start..end].to_vec(),
        next_cursor: (end < blocks.len()).then(|| end.to_string()),
    })
}

#[async_trait]
impl BlockSource for JsonBlockSource {
    async fn fetch_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChildrenPage, SourceError> {
        match self.children.get(block_id) {
            Some(blocks) => paginate(blocks, cursor, self.page_size),
            None if self.known.contains(block_id) => Ok(ChildrenPage::default()),
            None => Err(SourceError::NotFound(block_id.to_string())),
        }
    }

    async fn fetch_page_title(&self, page_id: &str) -> Result<String, SourceError> {
        self.titles
            .get(page_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(page_id.to_string()))
    }
}
