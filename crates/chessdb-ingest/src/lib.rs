//! Ingestion pipeline for chess game archives.
//!
//! Archives are parsed into flat tag records, new players are extracted and
//! written, identifier maps are refreshed, and game rows are built and
//! written, all against any [`IngestStore`](chessdb_core::store::IngestStore).
//! CPU-bound stages run on a [`TransformPool`](pool::TransformPool); writes go
//! through the [`BulkLoader`](loader::BulkLoader).

pub mod cancel;
pub mod config;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod loader;
pub mod openings;
pub mod pool;
pub mod resolve;
pub mod transform;

pub use cancel::CancelToken;
pub use config::IngestConfig;
pub use error::{Error, Result};
pub use ingest::{IngestReport, Ingestor, RunReport};
pub use loader::LoadReport;
