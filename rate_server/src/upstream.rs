//! Client for the upstream USD/BRL quote provider.
//!
//! A single GET per call, no retries. The whole exchange, body included, is raced
//! against the configured budget and abandoned when the budget runs out.
use log::debug;
use rate_common::{Quote, QuoteEnvelope, RateError, Result};
use std::time::Duration;

/// Fetches quotes from a fixed upstream URL under a fixed budget.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }

    /// Fetch and decode one quote.
    ///
    /// Timeouts, transport failures and non-2xx statuses are `RateError::Fetch`;
    /// a body without the `USDBRL` envelope is `RateError::Decode`.
    pub async fn fetch_quote(&self) -> Result<Quote> {
        let body = tokio::time::timeout(self.timeout, self.fetch_body())
            .await
            .map_err(|_| {
                RateError::Fetch(format!(
                    "timeout reached after {}ms calling {}",
                    self.timeout.as_millis(),
                    self.url
                ))
            })??;

        debug!("Upstream answered {} bytes", body.len());
        QuoteEnvelope::from_slice(&body)
    }

    async fn fetch_body(&self) -> Result<Vec<u8>> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Fetch(format!(
                "upstream {} answered {}",
                self.url, status
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use std::time::Instant;
    use tokio::net::TcpListener;

    pub(crate) const UPSTREAM_BODY: &str = r#"{"USDBRL":{"code":"USD","codein":"BRL","name":"Dólar Americano/Real Brasileiro","high":"5.4512","low":"5.3998","varBid":"0.0123","pctChange":"0.23","bid":"5.43","ask":"5.4312","timestamp":"1718035198","create_date":"2024-06-10 12:59:58"}}"#;

    /// Serve `app` on an ephemeral local port and return its base URL.
    pub(crate) async fn spawn_upstream(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    pub(crate) fn upstream_with(body: &'static str) -> Router {
        Router::new().route("/json/last/USD-BRL", get(move || async move { body }))
    }

    #[tokio::test]
    async fn fetches_and_decodes_quote() {
        let base = spawn_upstream(upstream_with(UPSTREAM_BODY)).await;
        let client = UpstreamClient::new(
            format!("{}/json/last/USD-BRL", base),
            Duration::from_secs(2),
        );

        let quote = client.fetch_quote().await.unwrap();
        assert_eq!(quote.bid, "5.43");
        assert_eq!(quote.code, "USD");
    }

    #[tokio::test]
    async fn missing_envelope_is_a_decode_error() {
        let base = spawn_upstream(upstream_with(r#"{"bid":"5.43"}"#)).await;
        let client = UpstreamClient::new(
            format!("{}/json/last/USD-BRL", base),
            Duration::from_secs(2),
        );

        let err = client.fetch_quote().await.unwrap_err();
        assert!(matches!(err, RateError::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn error_status_is_a_fetch_error() {
        let app = Router::new().route(
            "/json/last/USD-BRL",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
        );
        let base = spawn_upstream(app).await;
        let client = UpstreamClient::new(
            format!("{}/json/last/USD-BRL", base),
            Duration::from_secs(2),
        );

        let err = client.fetch_quote().await.unwrap_err();
        assert!(matches!(err, RateError::Fetch(ref msg) if msg.contains("503")), "got {err:?}");
    }

    #[tokio::test]
    async fn slow_upstream_is_abandoned_at_the_budget() {
        let app = Router::new().route(
            "/json/last/USD-BRL",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                UPSTREAM_BODY
            }),
        );
        let base = spawn_upstream(app).await;
        let client = UpstreamClient::new(
            format!("{}/json/last/USD-BRL", base),
            Duration::from_millis(50),
        );

        let started = Instant::now();
        let err = client.fetch_quote().await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(matches!(err, RateError::Fetch(ref msg) if msg.contains("timeout reached")), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = UpstreamClient::new(format!("http://{}/", addr), Duration::from_secs(2));

        let err = client.fetch_quote().await.unwrap_err();
        assert!(matches!(err, RateError::Fetch(_)), "got {err:?}");
    }
}
