use chrono::NaiveDateTime;
use log::warn;
use rate_common::{Quote, RateError, StoredQuote};
use rusqlite::Row;
use sea_query::{Iden, SimpleExpr};

/// Pattern SQLite writes `date_inserted` with.
pub const STORED_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
/// Pattern `date_inserted` is listed with.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Iden, Debug, Clone, Copy)]
pub enum RateIden {
    #[iden = "cotacao"]
    Table,
    Id,
    Code,
    Codein,
    Name,
    High,
    Low,
    VarBid,
    PctChange,
    Bid,
    Ask,
    TimestampApi,
    CreateDateApi,
    DateInserted,
}

impl RateIden {
    /// Columns filled from a `Quote`, in insert order.
    pub const QUOTE_COLUMNS: [RateIden; 11] = [
        RateIden::Code,
        RateIden::Codein,
        RateIden::Name,
        RateIden::High,
        RateIden::Low,
        RateIden::VarBid,
        RateIden::PctChange,
        RateIden::Bid,
        RateIden::Ask,
        RateIden::TimestampApi,
        RateIden::CreateDateApi,
    ];
}

/// One `cotacao` row before its timestamp is reformatted.
pub struct RateRow {
    pub id: i64,
    pub quote: Quote,
    pub date_inserted: String,
}

impl RateRow {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let text = |col: RateIden| -> rusqlite::Result<String> {
            row.get::<_, Option<String>>(col.to_string().as_str())
                .map(Option::unwrap_or_default)
        };

        Ok(Self {
            id: row.get(RateIden::Id.to_string().as_str())?,
            quote: Quote {
                code: text(RateIden::Code)?,
                codein: text(RateIden::Codein)?,
                name: text(RateIden::Name)?,
                high: text(RateIden::High)?,
                low: text(RateIden::Low)?,
                var_bid: text(RateIden::VarBid)?,
                pct_change: text(RateIden::PctChange)?,
                bid: text(RateIden::Bid)?,
                ask: text(RateIden::Ask)?,
                timestamp: text(RateIden::TimestampApi)?,
                create_date: text(RateIden::CreateDateApi)?,
            },
            date_inserted: text(RateIden::DateInserted)?,
        })
    }

    /// Convert to the listed form. A timestamp that does not match
    /// `STORED_DATE_FORMAT` is kept as stored.
    pub fn into_stored(self) -> StoredQuote {
        let date_inserted_formatted = match reformat_inserted_at(&self.date_inserted) {
            Ok(formatted) => formatted,
            Err(e) => {
                warn!("Row {} keeps its raw insertion date: {}", self.id, e);
                self.date_inserted
            }
        };

        StoredQuote {
            id: self.id,
            quote: self.quote,
            date_inserted_formatted,
        }
    }
}

/// Convert a stored insertion timestamp into the display pattern.
pub fn reformat_inserted_at(raw: &str) -> Result<String, RateError> {
    NaiveDateTime::parse_from_str(raw, STORED_DATE_FORMAT)
        .map(|at| at.format(DISPLAY_DATE_FORMAT).to_string())
        .map_err(|e| RateError::Reformat(format!("'{}': {}", raw, e)))
}

/// Values for `RateIden::QUOTE_COLUMNS`, in the same order.
pub fn quote_values(q: &Quote) -> [SimpleExpr; 11] {
    [
        q.code.as_str().into(),
        q.codein.as_str().into(),
        q.name.as_str().into(),
        q.high.as_str().into(),
        q.low.as_str().into(),
        q.var_bid.as_str().into(),
        q.pct_change.as_str().into(),
        q.bid.as_str().into(),
        q.ask.as_str().into(),
        q.timestamp.as_str().into(),
        q.create_date.as_str().into(),
    ]
}
