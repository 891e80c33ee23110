//! Quote payloads exchanged with the upstream provider, the store and HTTP callers.
//!
//! Every rate value is kept as the string the provider sent; nothing here parses
//! decimals, so no precision is lost between the provider, the database and callers.
use serde::{Deserialize, Serialize};

use crate::error::RateError;

/// One USD/BRL snapshot as reported by the upstream provider.
///
/// Missing fields decode as empty strings; only the envelope key is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Quote {
    /// Base currency code (e.g., `USD`).
    pub code: String,
    /// Quote currency code (e.g., `BRL`).
    pub codein: String,
    /// Human-readable pair name.
    pub name: String,
    /// Highest rate of the day.
    pub high: String,
    /// Lowest rate of the day.
    pub low: String,
    /// Absolute bid variation.
    pub var_bid: String,
    /// Percentual bid variation.
    pub pct_change: String,
    /// Buy-side rate.
    pub bid: String,
    /// Sell-side rate.
    pub ask: String,
    /// Provider timestamp, seconds since the UNIX epoch as text.
    pub timestamp: String,
    /// Provider creation date.
    #[serde(rename = "create_date")]
    pub create_date: String,
}

/// Upstream body: `{"USDBRL": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteEnvelope {
    /// The USD/BRL quote.
    #[serde(rename = "USDBRL")]
    pub usdbrl: Quote,
}

impl QuoteEnvelope {
    /// Decode an upstream body, failing with `RateError::Decode` when the
    /// `USDBRL` key is absent or the document is not JSON.
    pub fn from_slice(body: &[u8]) -> Result<Quote, RateError> {
        let envelope: QuoteEnvelope = serde_json::from_slice(body)?;
        Ok(envelope.usdbrl)
    }
}

/// A quote as persisted by the server, listed by `GET /list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredQuote {
    /// Store-assigned identifier.
    pub id: i64,
    /// Quote fields, flattened into the same JSON object.
    #[serde(flatten)]
    pub quote: Quote,
    /// Insertion time in the display pattern, or the raw stored value when it
    /// could not be reformatted.
    pub date_inserted_formatted: String,
}

/// Reduced projection returned to the caller of `GET /cotacao`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidSummary {
    /// Buy-side rate, as received from the provider.
    pub bid: String,
}

impl From<&Quote> for BidSummary {
    fn from(quote: &Quote) -> Self {
        BidSummary {
            bid: quote.bid.clone(),
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable description.
    pub error: String,
}

impl ErrorBody {
    /// Build an error body from any message.
    pub fn new(message: impl Into<String>) -> Self {
        ErrorBody {
            error: message.into(),
        }
    }
}
