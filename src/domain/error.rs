// src/domain/error.rs
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown card option: {0}")]
    UnknownOption(String),
    #[error("Invalid value '{value}' for card option '{key}'")]
    InvalidOptionValue { key: String, value: String },
    #[error("Card options '{0}' and '{1}' cannot be combined")]
    ConflictingOptions(&'static str, &'static str),
    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),
    #[error("Unknown tag source: {0}")]
    UnknownTagSource(String),
}

/// Failure reported by a block source collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Block not found: {0}")]
    NotFound(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl SourceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Transport(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchFailure {
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchFailure::Source(e) => e.is_retryable(),
            FetchFailure::Timeout(_) => true,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraversalError {
    #[error("Root block {block_id} could not be fetched: {cause}")]
    RootUnavailable {
        block_id: String,
        #[source]
        cause: FetchFailure,
    },
    #[error("Fetching block {block_id} failed after {attempts} attempt(s): {cause}")]
    FetchFailed {
        block_id: String,
        attempts: u32,
        #[source]
        cause: FetchFailure,
    },
    #[error("Traversal cancelled while fetching block {block_id}")]
    Cancelled { block_id: String },
}

impl TraversalError {
    /// The block whose fetch triggered this error
    pub fn block_id(&self) -> &str {
        match self {
            TraversalError::RootUnavailable { block_id, .. }
            | TraversalError::FetchFailed { block_id, .. }
            | TraversalError::Cancelled { block_id } => block_id,
        }
    }

    /// Re-label a fetch failure on the root block
    pub fn at_root(self) -> Self {
        match self {
            TraversalError::FetchFailed { block_id, cause, .. } => {
                TraversalError::RootUnavailable { block_id, cause }
            }
            other => other,
        }
    }
}
