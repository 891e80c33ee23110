//! SQLite-backed store of USD/BRL observations.
//!
//! Every operation works on an explicit `Session`, a single connection that is
//! opened by `RateStore::open_session` and closed when the session is dropped.
//!
//! Inserts are bounded: the write runs on tokio's blocking pool and is raced against
//! the store's insert budget. When the budget wins, the caller gets
//! `RateError::Persist` right away while the write keeps running in the background;
//! nothing interrupts it, so the row may still land. Callers must treat a timed-out
//! insert as an indeterminate outcome.
pub mod schema;

use log::debug;
use rate_common::{Quote, RateError, Result, StoredQuote};
use rusqlite::Connection;
use sea_query::{ColumnDef, Expr, Func, Order, Query, SqliteQueryBuilder, Table};
use sea_query_rusqlite::RusqliteBinder;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schema::{RateIden, RateRow, quote_values};

/// Expression SQLite evaluates for `date_inserted` when a row is written.
const INSERTED_AT_DEFAULT: &str = "(strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))";

/// One open connection to the store.
pub struct Session {
    conn: Connection,
}

impl Session {
    fn insert_row(&self, quote: &Quote) -> Result<i64> {
        let (sql, values) = Query::insert()
            .into_table(RateIden::Table)
            .columns(RateIden::QUOTE_COLUMNS)
            .values(quote_values(quote))
            .map_err(|e| RateError::Persist(format!("unable to build insert: {}", e)))?
            .build_rusqlite(SqliteQueryBuilder);

        self.conn
            .execute(&sql, &*values.as_params())
            .map_err(|e| RateError::Persist(format!("unable to insert quote: {}", e)))?;

        Ok(self.conn.last_insert_rowid())
    }
}

/// Location of the database plus the budget applied to each insert.
#[derive(Debug, Clone)]
pub struct RateStore {
    path: PathBuf,
    insert_timeout: Duration,
}

impl RateStore {
    pub fn new(path: impl Into<PathBuf>, insert_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            insert_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection; it is closed when the returned session is dropped.
    pub fn open_session(&self) -> Result<Session> {
        let conn = Connection::open(&self.path).map_err(|e| {
            RateError::Storage(format!(
                "unable to open database {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Session { conn })
    }

    /// Run `op` against a freshly opened session on the blocking pool.
    ///
    /// SQLite waits on a locked database inside the calling thread, so request
    /// handlers go through here instead of opening sessions on a runtime worker.
    pub async fn with_session<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&RateStore, &Session) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || {
            let session = store.open_session()?;
            op(&store, &session)
        })
        .await
        .map_err(|e| RateError::Storage(format!("store task failed: {}", e)))?
    }

    /// Open a session on the blocking pool and hand it back to the caller.
    pub async fn open_session_detached(&self) -> Result<Session> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.open_session())
            .await
            .map_err(|e| RateError::Storage(format!("store task failed: {}", e)))?
    }

    /// Create the `cotacao` table unless it already exists.
    pub fn ensure_schema(&self, session: &Session) -> Result<()> {
        let sql = Table::create()
            .table(RateIden::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(RateIden::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(RateIden::Code).text())
            .col(ColumnDef::new(RateIden::Codein).text())
            .col(ColumnDef::new(RateIden::Name).text())
            .col(ColumnDef::new(RateIden::High).text())
            .col(ColumnDef::new(RateIden::Low).text())
            .col(ColumnDef::new(RateIden::VarBid).text())
            .col(ColumnDef::new(RateIden::PctChange).text())
            .col(ColumnDef::new(RateIden::Bid).text())
            .col(ColumnDef::new(RateIden::Ask).text())
            .col(ColumnDef::new(RateIden::TimestampApi).text())
            .col(ColumnDef::new(RateIden::CreateDateApi).text())
            .col(
                ColumnDef::new(RateIden::DateInserted)
                    .text()
                    .not_null()
                    .default(Expr::cust(INSERTED_AT_DEFAULT)),
            )
            .build(SqliteQueryBuilder);

        session
            .conn
            .execute(&sql, [])
            .map_err(|e| RateError::Schema(format!("unable to init schema: {}", e)))?;

        Ok(())
    }

    /// Persist `quote` within the insert budget and return the new row id.
    ///
    /// Only the write itself is timed; opening `session` is the caller's business.
    pub async fn insert(&self, session: Session, quote: &Quote) -> Result<i64> {
        let quote = quote.clone();
        let write = tokio::task::spawn_blocking(move || session.insert_row(&quote));

        match tokio::time::timeout(self.insert_timeout, write).await {
            Ok(Ok(result)) => {
                if let Ok(id) = &result {
                    debug!("Stored quote as row {}", id);
                }
                result
            }
            Ok(Err(e)) => Err(RateError::Persist(format!("insert task failed: {}", e))),
            Err(_) => Err(RateError::Persist(format!(
                "quote persistence cancelled, timeout reached after {}ms",
                self.insert_timeout.as_millis()
            ))),
        }
    }

    /// Every stored observation, oldest first, with display-formatted insertion dates.
    pub fn list_all(&self, session: &Session) -> Result<Vec<StoredQuote>> {
        let (sql, values) = Query::select()
            .column(RateIden::Id)
            .columns(RateIden::QUOTE_COLUMNS)
            .column(RateIden::DateInserted)
            .from(RateIden::Table)
            .order_by(RateIden::Id, Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = session
            .conn
            .prepare(&sql)
            .map_err(|e| RateError::Storage(format!("unable to prepare listing: {}", e)))?;
        let rows = stmt
            .query_map(&*values.as_params(), RateRow::from_row)
            .map_err(|e| RateError::Storage(format!("unable to list quotes: {}", e)))?;

        let mut quotes = Vec::new();
        for row in rows {
            let row = row.map_err(|e| RateError::Storage(format!("unable to read row: {}", e)))?;
            quotes.push(row.into_stored());
        }
        Ok(quotes)
    }

    /// Number of stored observations.
    pub fn count(&self, session: &Session) -> Result<i64> {
        let (sql, values) = Query::select()
            .expr(Func::count(Expr::col(RateIden::Id)))
            .from(RateIden::Table)
            .build_rusqlite(SqliteQueryBuilder);

        session
            .conn
            .query_row(&sql, &*values.as_params(), |row| row.get(0))
            .map_err(|e| RateError::Storage(format!("unable to count quotes: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::schema::DISPLAY_DATE_FORMAT;
    use chrono::NaiveDateTime;
    use std::time::Instant;
    use temp_dir::TempDir;

    fn quote(bid: &str) -> Quote {
        Quote {
            code: "USD".into(),
            codein: "BRL".into(),
            name: "Dólar Americano/Real Brasileiro".into(),
            high: "5.4512".into(),
            low: "5.3998".into(),
            var_bid: "0.0123".into(),
            pct_change: "0.23".into(),
            bid: bid.into(),
            ask: "5.4312".into(),
            timestamp: "1718035198".into(),
            create_date: "2024-06-10 12:59:58".into(),
        }
    }

    fn store_in(dir: &TempDir, insert_timeout: Duration) -> RateStore {
        let store = RateStore::new(dir.child("cotacao.db"), insert_timeout);
        let session = store.open_session().unwrap();
        store.ensure_schema(&session).unwrap();
        store
    }

    #[test]
    fn ensure_schema_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, Duration::from_secs(1));
        let session = store.open_session().unwrap();

        store.ensure_schema(&session).unwrap();
        store.ensure_schema(&session).unwrap();
        assert_eq!(store.count(&session).unwrap(), 0);
    }

    #[tokio::test]
    async fn insert_then_list_keeps_every_field() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, Duration::from_secs(1));

        let first = store.insert(store.open_session().unwrap(), &quote("5.43")).await.unwrap();
        let second = store.insert(store.open_session().unwrap(), &quote("5.44")).await.unwrap();
        assert!(second > first);

        let listed = store.list_all(&store.open_session().unwrap()).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first);
        assert_eq!(listed[0].quote, quote("5.43"));
        assert_eq!(listed[1].quote.bid, "5.44");
        NaiveDateTime::parse_from_str(&listed[0].date_inserted_formatted, DISPLAY_DATE_FORMAT)
            .unwrap();
    }

    #[tokio::test]
    async fn list_all_has_no_side_effects() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, Duration::from_secs(1));
        store.insert(store.open_session().unwrap(), &quote("5.43")).await.unwrap();

        let session = store.open_session().unwrap();
        let once = store.list_all(&session).unwrap();
        let twice = store.list_all(&session).unwrap();
        assert_eq!(once, twice);
        assert_eq!(store.count(&session).unwrap(), 1);
    }

    #[test]
    fn unparseable_insertion_date_falls_back_to_raw_value() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, Duration::from_secs(1));
        let session = store.open_session().unwrap();
        session
            .conn
            .execute_batch(
                "INSERT INTO cotacao (bid, date_inserted) VALUES ('5.10', 'yesterday');
                 INSERT INTO cotacao (bid, date_inserted) VALUES ('5.20', '2024-06-10T13:00:05Z');",
            )
            .unwrap();

        let listed = store.list_all(&session).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].date_inserted_formatted, "yesterday");
        assert_eq!(listed[1].date_inserted_formatted, "10/06/2024 13:00:05");
        assert!(listed[0].quote.ask.is_empty());
    }

    #[tokio::test]
    async fn insert_gives_up_at_its_budget_while_the_write_carries_on() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, Duration::from_millis(50));

        let blocker = Connection::open(store.path()).unwrap();
        blocker.execute_batch("BEGIN EXCLUSIVE;").unwrap();

        let started = Instant::now();
        let err = store
            .insert(store.open_session().unwrap(), &quote("5.43"))
            .await
            .unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(matches!(err, RateError::Persist(ref msg) if msg.contains("timeout reached")));

        blocker.execute_batch("COMMIT;").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let session = store.open_session().unwrap();
        while store.count(&session).unwrap() == 0 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(store.count(&session).unwrap(), 1);
    }

    #[tokio::test]
    async fn with_session_reads_on_the_blocking_pool() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir, Duration::from_secs(1));
        store.insert(store.open_session_detached().await.unwrap(), &quote("5.43")).await.unwrap();

        let listed = store
            .with_session(|store, session| store.list_all(session))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].quote.bid, "5.43");
    }

    #[tokio::test]
    async fn with_session_reports_open_failures_as_storage_errors() {
        let dir = TempDir::new().unwrap();
        let store = RateStore::new(dir.child("missing").join("cotacao.db"), Duration::from_secs(1));

        let err = store
            .with_session(|store, session| store.count(session))
            .await
            .unwrap_err();
        assert!(matches!(err, RateError::Storage(_)));
    }

    #[test]
    fn schema_failure_is_reported_as_schema_error() {
        let dir = TempDir::new().unwrap();
        let store = RateStore::new(dir.child("cotacao.db"), Duration::from_secs(1));
        let session = store.open_session().unwrap();
        session.conn.execute_batch("PRAGMA query_only = ON;").unwrap();

        let err = store.ensure_schema(&session).unwrap_err();
        assert!(matches!(err, RateError::Schema(_)));
    }
}
