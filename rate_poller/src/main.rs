//! Rate Poller — asks the rate server for a fresh USD/BRL quote and writes its bid to a
//! local text file as a single `"<label>: <bid>"` line.
//!
//! The call to the server runs under its own budget (`--timeout-ms`, 300ms by default),
//! looser than the server's internal upstream and insert budgets so that network and
//! server processing fit in it. Any failure ends the process with status 1; nothing is
//! retried.
//!
//! Usage example (CLI):
//! ```bash
//! rate_poller --server-url http://localhost:8080 --output ./cotacao.txt
//! ```
#![warn(missing_docs)]
mod args;
mod fetcher;
mod writer;

use crate::args::Args;
use crate::writer::{normalize_path, save_bid};
use clap::Parser;
use log::{error, info};
use rate_common::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logger();
    let args = Args::parse();

    if let Err(e) = run(&args).await {
        error!("Polling {} failed: {}", args.server_url, e);
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<()> {
    args.validate()?;
    let summary = fetcher::fetch_bid(&args.server_url, args.timeout()).await?;
    info!("Current bid fetched from server: {}", summary.bid);
    save_bid(&normalize_path(&args.output), &args.label, &summary.bid)
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
