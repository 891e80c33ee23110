//!
//! Common types and utilities shared by the rate server and the poller.
//!
//! This crate aggregates:
//! - `error` — unified error type `RateError` used across the workspace.
//! - `result` — handy `Result<T, RateError>` alias.
//! - `quote` — upstream quote payloads, stored rows and response bodies.
//! - `net` — networking defaults and the HTTP `Endpoint` paths.
#![warn(missing_docs)]
pub mod error;
pub mod result;
pub mod quote;
pub mod net;

pub use error::RateError;
pub use result::Result;
pub use quote::{BidSummary, ErrorBody, Quote, QuoteEnvelope, StoredQuote};
