//! Command-line arguments for the rate server.
//!
//! Every flag can also be provided through the environment variable named next to it.
use clap::Parser;
use rate_common::net::{DEFAULT_BIND_ADDRESS, DEFAULT_UPSTREAM_URL};
use rate_common::{RateError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Parsed command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address the HTTP server listens on.
    #[clap(long, env = "BIND_ADDRESS", default_value = DEFAULT_BIND_ADDRESS)]
    pub bind: String,

    /// SQLite database file holding the observations.
    #[clap(long, env = "DB_PATH", default_value = "cotacao.db")]
    pub db_path: PathBuf,

    /// Upstream endpoint returning the USD/BRL quote.
    #[clap(long, env = "UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    /// Budget for the whole upstream call, in milliseconds.
    #[clap(long, env = "UPSTREAM_TIMEOUT_MS", default_value_t = 200)]
    pub upstream_timeout_ms: u64,

    /// Budget for a single insert, in milliseconds.
    #[clap(long, env = "INSERT_TIMEOUT_MS", default_value_t = 15)]
    pub insert_timeout_ms: u64,
}

impl Args {
    /// Reject budgets that would fail every request.
    pub fn validate(&self) -> Result<()> {
        if self.upstream_timeout_ms == 0 {
            return Err(RateError::Config("--upstream-timeout-ms must be positive".into()));
        }
        if self.insert_timeout_ms == 0 {
            return Err(RateError::Config("--insert-timeout-ms must be positive".into()));
        }
        Ok(())
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }

    pub fn insert_timeout(&self) -> Duration {
        Duration::from_millis(self.insert_timeout_ms)
    }
}
