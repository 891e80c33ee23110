//! Command-line arguments for the rate poller.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use rate_common::net::DEFAULT_SERVER_URL;
use rate_common::{RateError, Result};
use std::time::Duration;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Base URL of the rate server.
    #[clap(long, env = "SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    pub server_url: String,

    /// Budget for the whole call to the rate server, in milliseconds.
    #[clap(long, env = "POLLER_TIMEOUT_MS", default_value_t = 300)]
    pub timeout_ms: u64,

    /// File the bid is written to. Overwritten on every run.
    #[clap(long, env = "OUTPUT_PATH", default_value = "cotacao.txt")]
    pub output: String,

    /// Text written before the bid.
    #[clap(long, env = "BID_LABEL", default_value = "Dólar")]
    pub label: String,
}

impl Args {
    /// Reject a zero budget, which would fail every run.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(RateError::Config("--timeout-ms must be positive".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
