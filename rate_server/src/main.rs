//! USD/BRL rate server.
//!
//! Serves two endpoints over HTTP:
//!
//! - `GET /cotacao` — fetches the current USD/BRL quote from the upstream provider
//!   (bounded by `--upstream-timeout-ms`), stores it in SQLite (bounded by
//!   `--insert-timeout-ms`) and answers `{"bid": "..."}`.
//! - `GET /list` — answers every stored observation, oldest first.
//!
//! Building blocks:
//! - `upstream::UpstreamClient` — single-attempt, timeout-bounded upstream call.
//! - `store::RateStore` — schema bootstrap, bounded inserts and listing over explicit
//!   per-operation sessions.
//! - `service` — axum routes wiring the two together.
//!
//! The observation table is created at startup; the server refuses to start when that
//! fails. Ctrl+C stops the listener after in-flight requests complete.
#![warn(missing_docs)]
mod args;
mod service;
mod store;
mod upstream;

use crate::args::Args;
use crate::service::AppState;
use crate::store::RateStore;
use crate::upstream::UpstreamClient;
use clap::Parser;
use log::{error, info};
use rate_common::{RateError, Result};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), RateError> {
    init_logger();
    let args = Args::parse();
    args.validate()?;

    let store = RateStore::new(&args.db_path, args.insert_timeout());
    bootstrap(&store).inspect_err(|e| error!("Cannot start without the rate table: {}", e))?;

    let state = AppState {
        upstream: UpstreamClient::new(&args.upstream_url, args.upstream_timeout()),
        store,
    };

    let listener = TcpListener::bind(&args.bind).await?;
    info!(
        "Rate server listening on {} (upstream budget {}ms, insert budget {}ms)",
        listener.local_addr()?,
        args.upstream_timeout_ms,
        args.insert_timeout_ms
    );

    axum::serve(listener, service::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Rate server stopped");
    Ok(())
}

/// Create the observation table and report how many rows it already holds.
fn bootstrap(store: &RateStore) -> Result<()> {
    let session = store.open_session()?;
    store.ensure_schema(&session)?;
    info!(
        "Database {} ready with {} stored quotes",
        store.path().display(),
        store.count(&session)?
    );
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C received. Shutting down server..."),
        Err(e) => {
            error!("Unable to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await
        }
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
