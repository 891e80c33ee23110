//! HTTP surface of the rate server.
//!
//! - `GET /cotacao` fetches a fresh quote upstream, stores it and answers with its bid.
//! - `GET /list` answers with every stored observation.
//!
//! Both routes accept any method and answer `405` to everything but `GET`. Failures
//! are logged and turned into a `500` with an `ErrorBody`; a failing request never
//! takes the server down.
use crate::store::RateStore;
use crate::upstream::UpstreamClient;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use log::{error, info, warn};
use rate_common::net::Endpoint;
use rate_common::{BidSummary, ErrorBody, RateError};
use std::sync::Arc;

/// Collaborators shared by every request.
pub struct AppState {
    pub upstream: UpstreamClient,
    pub store: RateStore,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(Endpoint::Quote.path(), any(fetch_and_store))
        .route(Endpoint::List.path(), any(list))
        .with_state(Arc::new(state))
}

async fn fetch_and_store(method: Method, State(state): State<Arc<AppState>>) -> Response {
    if method != Method::GET {
        return method_not_allowed(&method, Endpoint::Quote);
    }

    let quote = match state.upstream.fetch_quote().await {
        Ok(quote) => quote,
        Err(e) => return internal_error("Error when fetching API data", &e),
    };

    let stored = match state.store.open_session_detached().await {
        Ok(session) => state.store.insert(session, &quote).await,
        Err(e) => Err(e),
    };
    match stored {
        Ok(id) => {
            info!("Quote stored as row {} with bid {}", id, quote.bid);
            (StatusCode::OK, Json(BidSummary::from(&quote))).into_response()
        }
        Err(e) => internal_error("Error when persisting data", &e),
    }
}

async fn list(method: Method, State(state): State<Arc<AppState>>) -> Response {
    if method != Method::GET {
        return method_not_allowed(&method, Endpoint::List);
    }

    let listed = state
        .store
        .with_session(|store, session| store.list_all(session))
        .await;
    match listed {
        Ok(quotes) => {
            info!("Listing {} stored quotes", quotes.len());
            (StatusCode::OK, Json(quotes)).into_response()
        }
        Err(e) => internal_error("Error on fetching rates", &e),
    }
}

fn method_not_allowed(method: &Method, endpoint: Endpoint) -> Response {
    warn!("Rejected {} {}", method, endpoint);
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody::new("Method not allowed")),
    )
        .into_response()
}

fn internal_error(prefix: &str, err: &RateError) -> Response {
    let msg = format!("{} - {}", prefix, err);
    error!("{}", msg);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(format!("Internal server error: {}", msg))),
    )
        .into_response()
}
