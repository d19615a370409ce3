//! Error types for the chessdb-pgn parser.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot open archive {path:?}: {source}")]
  Open {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("read error: {0}")]
  Io(#[from] std::io::Error),

  #[error("malformed tag line {line}: {content}")]
  MalformedTag { line: usize, content: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
