//! Shared networking constants and the HTTP endpoints exposed by the server.
use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};

/// Default address the rate server binds to.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
/// Default base URL the poller talks to.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
/// Upstream quote provider for the USD/BRL pair.
pub const DEFAULT_UPSTREAM_URL: &str = "https://economia.awesomeapi.com.br/json/last/USD-BRL";

/// Routes served by the rate server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString, IntoStaticStr)]
pub enum Endpoint {
    /// Fetch a fresh quote, store it and answer with its bid.
    #[strum(serialize = "/cotacao")]
    Quote,
    /// List every stored observation.
    #[strum(serialize = "/list")]
    List,
}

impl Endpoint {
    /// Path of the endpoint, e.g. `/cotacao`.
    pub fn path(self) -> &'static str {
        self.into()
    }

    /// Full URL of the endpoint under `base`; a trailing slash on `base` is ignored.
    pub fn url(self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self)
    }
}
