// src/infrastructure/fetcher.rs
use crate::application::BlockSource;
use crate::constants::{DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_RETRY_BACKOFF_MS, MAX_FETCH_ATTEMPTS};
use crate::domain::{Block, FetchFailure, SourceError, TraversalError};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Timeout and retry behaviour for one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub retry_backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            retry_backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

/// Wraps a block source with pagination, timeouts, one retry and cancellation
pub struct ChildFetcher<'a, S: BlockSource + ?Sized> {
    source: &'a S,
    policy: FetchPolicy,
    cancel: CancellationToken,
}

impl<'a, S: BlockSource + ?Sized> ChildFetcher<'a, S> {
    pub fn new(source: &'a S, policy: FetchPolicy, cancel: CancellationToken) -> Self {
        Self {
            source,
            policy,
            cancel,
        }
    }

    /// All children of a block in document order, across every page
    #[instrument(level = "debug", skip(self))]
    pub async fn all_children(&self, block_id: &str) -> Result<Vec<Block>, TraversalError> {
        let mut children = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .attempt(block_id, || {
                    self.source.fetch_children(block_id, cursor.as_deref())
                })
                .await?;
            children.extend(page.results);

            match page.next_cursor {
                Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                    return Err(TraversalError::FetchFailed {
                        block_id: block_id.to_string(),
                        attempts: 1,
                        cause: FetchFailure::Source(SourceError::Malformed(format!(
                            "cursor {} did not advance",
                            next
                        ))),
                    });
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(block_id, count = children.len(), "Fetched children");
        Ok(children)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn page_title(&self, page_id: &str) -> Result<String, TraversalError> {
        self.attempt(page_id, || self.source.fetch_page_title(page_id))
            .await
    }

    /// Run one source call under the policy: a retryable failure gets a
    /// second attempt after the backoff, anything else is final.
    async fn attempt<T, F, Fut>(&self, block_id: &str, call: F) -> Result<T, TraversalError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                result = tokio::time::timeout(self.policy.timeout, call()) => Some(result),
            };

            let failure = match outcome {
                None => {
                    return Err(TraversalError::Cancelled {
                        block_id: block_id.to_string(),
                    })
                }
                Some(Ok(Ok(value))) => return Ok(value),
                Some(Ok(Err(e))) => FetchFailure::Source(e),
                Some(Err(_elapsed)) => FetchFailure::Timeout(self.policy.timeout),
            };

            if !failure.is_retryable() || attempts >= MAX_FETCH_ATTEMPTS {
                return Err(TraversalError::FetchFailed {
                    block_id: block_id.to_string(),
                    attempts,
                    cause: failure,
                });
            }

            warn!(block_id, attempts, error = %failure, "Fetch failed, retrying");
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(TraversalError::Cancelled {
                        block_id: block_id.to_string(),
                    })
                }
                _ = tokio::time::sleep(self.policy.retry_backoff) => {}
            }
        }
    }
}
