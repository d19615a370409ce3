//! Error type for `chessdb-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// Table and column names are interpolated into SQL, so only plain
  /// identifiers are accepted.
  #[error("invalid identifier: {0:?}")]
  InvalidIdentifier(String),

  #[error("column {index} holds an unsupported {kind} value")]
  UnsupportedColumnType { index: usize, kind: &'static str },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
