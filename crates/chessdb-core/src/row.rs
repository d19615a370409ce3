//! Untyped rows exchanged with a store.
//!
//! The bulk loader has no table-specific knowledge: every entity flattens
//! itself into a [`Row`] whose order matches its [`ToRow::COLUMNS`]. Reads
//! come back in the same shape and are decoded by the caller.

use uuid::Uuid;

use crate::{
  Error, Result,
  entity::{DATE_TIME_FORMAT, Game, Opening, Player},
};

// ─── Values ──────────────────────────────────────────────────────────────────

/// A single column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
  Null,
  Integer(i64),
  Text(String),
}

pub type Row = Vec<Value>;

impl Value {
  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_integer(&self) -> Option<i64> {
    match self {
      Self::Integer(i) => Some(*i),
      _ => None,
    }
  }

  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  /// Decode a non-null text column.
  pub fn expect_text(&self, column: &'static str) -> Result<&str> {
    self.as_text().ok_or_else(|| Error::UnexpectedValue {
      column,
      found: format!("{self:?}"),
    })
  }

  /// Decode a non-null UUID column stored as hyphenated text.
  pub fn expect_uuid(&self, column: &'static str) -> Result<Uuid> {
    Ok(Uuid::parse_str(self.expect_text(column)?)?)
  }
}

impl From<Uuid> for Value {
  fn from(id: Uuid) -> Self { Self::Text(id.hyphenated().to_string()) }
}

impl From<String> for Value {
  fn from(s: String) -> Self { Self::Text(s) }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<i32> for Value {
  fn from(i: i32) -> Self { Self::Integer(i64::from(i)) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

/// Check that a fetched row carries exactly `expected` columns.
pub fn check_width(row: &Row, expected: usize) -> Result<()> {
  if row.len() == expected {
    Ok(())
  } else {
    Err(Error::RowWidth { expected, found: row.len() })
  }
}

// ─── Entity → row ────────────────────────────────────────────────────────────

/// An entity that can be written by the bulk loader.
pub trait ToRow {
  /// Column names in the order produced by [`to_row`](Self::to_row).
  const COLUMNS: &'static [&'static str];

  fn to_row(&self) -> Row;
}

impl ToRow for Player {
  const COLUMNS: &'static [&'static str] = &["id", "name", "title", "max_elo"];

  fn to_row(&self) -> Row {
    vec![
      self.id.into(),
      self.name.as_str().into(),
      self.title.clone().into(),
      self.max_elo.into(),
    ]
  }
}

impl ToRow for Opening {
  const COLUMNS: &'static [&'static str] = &["id", "eco", "name", "pgn"];

  fn to_row(&self) -> Row {
    vec![
      self.id.into(),
      self.eco.as_str().into(),
      self.name.as_str().into(),
      self.pgn.as_str().into(),
    ]
  }
}

impl ToRow for Game {
  const COLUMNS: &'static [&'static str] = &[
    "id",
    "white",
    "black",
    "result",
    "white_elo",
    "black_elo",
    "date_time",
    "time_control",
    "opening",
  ];

  fn to_row(&self) -> Row {
    vec![
      self.id.into(),
      self.white.into(),
      self.black.into(),
      self.result.map(|r| r.code()).into(),
      self.white_elo.into(),
      self.black_elo.into(),
      self
        .date_time
        .map(|dt| dt.format(DATE_TIME_FORMAT).to_string())
        .into(),
      self.time_control.as_ref().map(|tc| tc.as_str()).into(),
      self.opening.into(),
    ]
  }
}
