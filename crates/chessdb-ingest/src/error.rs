//! Error type for the ingestion pipeline.
//!
//! Only conditions that make a whole run meaningless end up here. Bad values
//! inside a record degrade a field, and failed store batches are counted in
//! a [`LoadReport`](crate::loader::LoadReport).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot open opening table {path:?}: {source}")]
  OpeningFile {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("opening table error: {0}")]
  Csv(#[from] csv::Error),

  #[error("row decode error: {0}")]
  Decode(#[from] chessdb_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("failed to build worker pool: {0}")]
  Pool(#[from] rayon::ThreadPoolBuildError),

  #[error("worker task failed: {0}")]
  Join(#[from] tokio::task::JoinError),

  #[error("ingestion cancelled")]
  Cancelled,

  #[error("ingestion deadline exceeded")]
  DeadlineExceeded,
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
