//! Single-shot call to the rate server's quote endpoint.
use log::debug;
use rate_common::net::Endpoint;
use rate_common::{BidSummary, ErrorBody, RateError, Result};
use std::time::Duration;

/// Ask the server at `server_url` for a fresh quote and return its bid.
///
/// The call, body included, is abandoned once `timeout` elapses. A non-2xx answer is
/// a `RateError::Fetch` carrying the server's error message when it sent one.
pub async fn fetch_bid(server_url: &str, timeout: Duration) -> Result<BidSummary> {
    let url = Endpoint::Quote.url(server_url);
    tokio::time::timeout(timeout, request_bid(&url))
        .await
        .map_err(|_| {
            RateError::Fetch(format!(
                "timeout reached after {}ms calling {}",
                timeout.as_millis(),
                url
            ))
        })?
}

async fn request_bid(url: &str) -> Result<BidSummary> {
    debug!("GET {}", url);
    let response = reqwest::get(url).await?;
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let reason = serde_json::from_slice::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
        return Err(RateError::Fetch(format!("server answered {}: {}", status, reason)));
    }

    Ok(serde_json::from_slice(&body)?)
}
