//! Core types and trait definitions for the chess game store.
//!
//! This crate is deliberately free of file and database dependencies.
//! The parser, the store backends and the ingestion pipeline all depend on
//! it; it depends on nothing of theirs.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod entity;
pub mod error;
pub mod record;
pub mod row;
pub mod store;

pub use error::{Error, Result};
