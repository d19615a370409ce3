//! The `IngestStore` trait, the only way the pipeline touches persistence.
//!
//! The trait is implemented by storage backends (e.g. `chessdb-store-sqlite`).
//! The ingestion pipeline depends on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use serde::Deserialize;

use crate::row::Row;

// ─── Table names ─────────────────────────────────────────────────────────────

/// Names of the three tables the pipeline writes; overridable per deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TableNames {
  pub players:  String,
  pub openings: String,
  pub games:    String,
}

impl Default for TableNames {
  fn default() -> Self {
    Self {
      players:  "players".to_owned(),
      openings: "openings".to_owned(),
      games:    "games".to_owned(),
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a relational store holding players, openings and games.
///
/// Writes are insert-if-absent: a row that would violate a uniqueness
/// constraint is silently discarded, never raised and never overwritten.
/// Names therefore never merge or change once written.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait IngestStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read `columns` from every row of `table`, in column order.
  fn fetch<'a>(
    &'a self,
    table: &'a str,
    columns: &'a [&'a str],
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + 'a;

  /// Append `rows` to `table` as one unit of work, skipping any row that
  /// violates a uniqueness constraint. Returns the number of rows actually
  /// written.
  ///
  /// On error nothing from this call is persisted.
  fn insert_ignore_duplicates<'a>(
    &'a self,
    table: &'a str,
    columns: &'a [&'a str],
    rows: Vec<Row>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Recompute every player's `max_elo` from the games that reference it.
  /// The value never decreases.
  fn refresh_max_elo<'a>(
    &'a self,
    players: &'a str,
    games: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
