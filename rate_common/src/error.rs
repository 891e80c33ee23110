//! Error types shared between the server and the poller.
//!
//! The `RateError` enum covers every failure of the fetch-then-persist pipeline:
//! talking to an HTTP peer, decoding its body, writing or reading the store, and
//! local I/O. Store failures are carried as text so this crate stays free of
//! database dependencies.
use std::io;

use thiserror::Error;

/// Unified error type shared by server and poller.
#[derive(Error, Debug)]
pub enum RateError {
    /// Transport failure, timeout or unexpected status from an HTTP peer.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The peer answered with a body that is not the expected JSON document.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Writing an observation failed or did not finish within its budget.
    #[error("persist error: {0}")]
    Persist(String),

    /// The store could not be opened or read.
    #[error("storage error: {0}")]
    Storage(String),

    /// The observation table could not be created.
    #[error("schema error: {0}")]
    Schema(String),

    /// A stored timestamp could not be converted to its display pattern.
    #[error("reformat error: {0}")]
    Reformat(String),

    /// I/O error originating from the standard library or sockets/files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A configuration value could not be used.
    #[error("config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for RateError {
    fn from(err: reqwest::Error) -> Self {
        RateError::Fetch(err.to_string())
    }
}
