//! Error kinds and handling policy.
//!
//! Callers need to match on error *kind*, not scrape a string, so this
//! crate uses a `thiserror` enum at its boundary rather than bare
//! `Result<T, String>`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    /// DataStore I/O failure. Policy: log, surface `smart-prompt:error`,
    /// abort this turn's apply, preserve prior state.
    #[error("data store I/O failure: {0}")]
    DataStoreIo(String),

    /// Strict format rejection. Policy: fail the entire reply's data
    /// application; leave panels untouched; emit error event; continue chat.
    #[error("response rejected as forbidden or unknown format: {0}")]
    FormatRejected(String),

    /// Invalid panel/field referenced by an operation command. Policy:
    /// throw with a message enumerating allowed panels/columns; stop
    /// applying remaining ops in that reply.
    #[error("invalid operation command: {0}")]
    InvalidOperation(String),

    /// Semantic cache embedding failure. Policy: skip cache for this turn,
    /// continue.
    #[error("semantic cache embedding failed: {0}")]
    CacheEmbeddingFailed(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
