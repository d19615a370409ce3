//! [`SqliteStore`], the SQLite implementation of [`IngestStore`].

use std::path::Path;

use chessdb_core::{
  row::Row,
  store::{IngestStore, TableNames},
};
use rusqlite::types::Value as SqlValue;

use crate::{
  Result,
  encode::{column_list, decode_row, encode_value, quote_ident},
  schema,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A chess game store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every
/// write call runs in its own transaction, so concurrent batches from the
/// bulk loader commit or roll back independently.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, tables: &TableNames) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema(tables).await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory(tables: &TableNames) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema(tables).await?;
    Ok(store)
  }

  async fn init_schema(&self, tables: &TableNames) -> Result<()> {
    let ddl = schema::render(tables)?;
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&ddl)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of rows in `table`.
  pub async fn count(&self, table: &str) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table)?);
    let n: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |r| r.get(0))?))
      .await?;
    Ok(n as u64)
  }
}

// ─── IngestStore impl ────────────────────────────────────────────────────────

impl IngestStore for SqliteStore {
  type Error = crate::Error;

  async fn fetch<'a>(&'a self, table: &'a str, columns: &'a [&'a str]) -> Result<Vec<Row>> {
    let sql = format!(
      "SELECT {} FROM {}",
      column_list(columns)?,
      quote_ident(table)?
    );
    let width = columns.len();

    let raws: Vec<Vec<SqlValue>> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| {
            (0..width)
              .map(|i| row.get::<_, SqlValue>(i))
              .collect::<rusqlite::Result<Vec<_>>>()
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(decode_row).collect()
  }

  async fn insert_ignore_duplicates<'a>(
    &'a self,
    table:   &'a str,
    columns: &'a [&'a str],
    rows:    Vec<Row>,
  ) -> Result<u64> {
    if rows.is_empty() {
      return Ok(0);
    }

    let placeholders = (1..=columns.len())
      .map(|i| format!("?{i}"))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "INSERT OR IGNORE INTO {} ({}) VALUES ({placeholders})",
      quote_ident(table)?,
      column_list(columns)?,
    );
    let encoded: Vec<Vec<SqlValue>> = rows
      .into_iter()
      .map(|row| row.into_iter().map(encode_value).collect())
      .collect();

    let inserted = self
      .conn
      .call(move |conn| {
        // Dropping `tx` without commit rolls the whole batch back.
        let tx = conn.transaction()?;
        let mut inserted = 0u64;
        {
          let mut stmt = tx.prepare(&sql)?;
          for row in &encoded {
            inserted += stmt.execute(rusqlite::params_from_iter(row.iter()))? as u64;
          }
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    tracing::debug!(table, inserted, "batch committed");
    Ok(inserted)
  }

  async fn refresh_max_elo<'a>(&'a self, players: &'a str, games: &'a str) -> Result<()> {
    let sql = schema::refresh_max_elo(players, games)?;
    let updated = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, [])?))
      .await?;
    tracing::debug!(updated, "max_elo refreshed");
    Ok(())
  }
}
