// src/constants.rs
//
// Application-wide constants shared by the walker, the transforms and the
// block sources.

/// Joins parent and child names of nested decks.
///
/// Used in: `domain/deck.rs`
pub const DECK_SEPARATOR: &str = "::";

/// Sentinel that opts a trigger in when cherry picking is enabled.
///
/// Used in: `application/transforms.rs`
pub const CHERRY_MARKER: &str = "🍒";

/// Sentinel that opts a trigger out when the avocado option is enabled.
///
/// Used in: `application/transforms.rs`
pub const AVOCADO_MARKER: &str = "🥑";

/// Base URL for links back to the source workspace.
///
/// Used in: `application/transforms.rs`, `infrastructure/block_hooks.rs`
pub const NOTION_BASE_URL: &str = "https://www.notion.so";

/// Maximum attempts for one children or title fetch: the first try plus one
/// retry after backoff.
///
/// Used in: `infrastructure/fetcher.rs`
pub const MAX_FETCH_ATTEMPTS: u32 = 2;

/// Default per-attempt fetch timeout in milliseconds.
///
/// Used in: `infrastructure/fetcher.rs`, `infrastructure/config.rs`
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Default pause before the single retry of a transient fetch failure.
///
/// Used in: `infrastructure/fetcher.rs`, `infrastructure/config.rs`
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;

/// Children per page served by the file-backed block source when the tree
/// file does not say otherwise. Mirrors the Notion API page size.
///
/// Used in: `infrastructure/json_source.rs`
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Title given to decks whose page has an empty title.
///
/// Used in: `application/flashcard_finder.rs`
pub const UNTITLED: &str = "Untitled";
