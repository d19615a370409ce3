//! Error types for `chessdb-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("column {column} has unexpected value {found}")]
  UnexpectedValue { column: &'static str, found: String },

  #[error("row has {found} columns, expected {expected}")]
  RowWidth { expected: usize, found: usize },

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
