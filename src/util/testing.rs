// src/util/testing.rs

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::env;
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{BlockSource, ChildrenPage};
use crate::constants::DEFAULT_PAGE_SIZE;
use crate::domain::{Block, SourceError};
use crate::infrastructure::json_source::JsonBlockSource;

/// Injected behaviour for children fetches of one block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The first n calls fail with a transport error
    Transient(u32),
    /// Every call fails with not found
    Permanent,
    /// Every call never completes
    Hang,
}

/// Shared mock block source for tests of the walker and the fetcher
///
/// Serves an in-memory tree through the file-backed source, counts children
/// fetches per block and can be told to fail.
///
/// # Examples
///
/// ```
/// use notiondeck::util::testing::{Failure, MockBlockSource};
/// use notiondeck::domain::Block;
///
/// let mock = MockBlockSource::builder()
///     .with_page("root", "Root")
///     .with_children("root", vec![Block::toggle("t1", "Q")])
///     .with_children("t1", vec![Block::paragraph("p1", "A")])
///     .with_failure("t1", Failure::Transient(1))
///     .build();
/// assert_eq!(mock.fetch_count("t1"), 0);
/// ```
pub struct MockBlockSource {
    tree: JsonBlockSource,
    failures: Mutex<HashMap<String, Failure>>,
    fetch_counts: Mutex<HashMap<String, usize>>,
}

impl MockBlockSource {
    pub fn builder() -> MockBlockSourceBuilder {
        MockBlockSourceBuilder::new()
    }

    /// Number of children fetch calls made for a block, retries included
    pub fn fetch_count(&self, block_id: &str) -> usize {
        self.fetch_counts
            .lock()
            .map(|counts| counts.get(block_id).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Total children fetch calls across all blocks
    pub fn total_fetches(&self) -> usize {
        self.fetch_counts
            .lock()
            .map(|counts| counts.values().sum())
            .unwrap_or(0)
    }

    fn record_fetch(&self, block_id: &str) {
        if let Ok(mut counts) = self.fetch_counts.lock() {
            *counts.entry(block_id.to_string()).or_default() += 1;
        }
    }

    /// Consume one injected failure for the block, if any is configured
    fn next_failure(&self, block_id: &str) -> Option<Failure> {
        let mut failures = self.failures.lock().ok()?;
        match failures.get_mut(block_id) {
            Some(Failure::Transient(0)) | None => None,
            Some(Failure::Transient(n)) => {
                *n -= 1;
                Some(Failure::Transient(*n))
            }
            Some(other) => Some(*other),
        }
    }
}

#[async_trait]
impl BlockSource for MockBlockSource {
    async fn fetch_children(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChildrenPage, SourceError> {
        self.record_fetch(block_id);
        match self.next_failure(block_id) {
            Some(Failure::Transient(_)) => {
                return Err(SourceError::Transport(format!(
                    "injected failure for {}",
                    block_id
                )))
            }
            Some(Failure::Permanent) => return Err(SourceError::NotFound(block_id.to_string())),
            Some(Failure::Hang) => std::future::pending::<()>().await,
            None => {}
        }

        self.tree.fetch_children(block_id, cursor).await
    }

    async fn fetch_page_title(&self, page_id: &str) -> Result<String, SourceError> {
        self.tree.fetch_page_title(page_id).await
    }
}

/// Builder for MockBlockSource
///
/// Provides a fluent interface for configuring the tree and its failures.
pub struct MockBlockSourceBuilder {
    titles: HashMap<String, String>,
    children: HashMap<String, Vec<Block>>,
    page_size: usize,
    failures: HashMap<String, Failure>,
}

impl MockBlockSourceBuilder {
    pub fn new() -> Self {
        Self {
            titles: HashMap::new(),
            children: HashMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
            failures: HashMap::new(),
        }
    }

    /// Add a page whose title can be fetched
    pub fn with_page(mut self, id: &str, title: &str) -> Self {
        self.titles.insert(id.to_string(), title.to_string());
        self
    }

    /// Set the children of a block; `has_children` is derived at build time
    pub fn with_children(mut self, parent_id: &str, blocks: Vec<Block>) -> Self {
        self.children.insert(parent_id.to_string(), blocks);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_failure(mut self, block_id: &str, failure: Failure) -> Self {
        self.failures.insert(block_id.to_string(), failure);
        self
    }

    pub fn build(self) -> MockBlockSource {
        MockBlockSource {
            tree: JsonBlockSource::assemble(self.titles, self.children, self.page_size),
            failures: Mutex::new(self.failures),
            fetch_counts: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MockBlockSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["tokio", "mio"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
