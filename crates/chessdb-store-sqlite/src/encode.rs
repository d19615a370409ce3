//! Conversions between [`chessdb_core::row::Value`] and the SQLite value
//! model, plus identifier quoting for dynamically named tables.

use chessdb_core::row::Value;
use rusqlite::types::Value as SqlValue;

use crate::{Error, Result};

// ─── Values ──────────────────────────────────────────────────────────────────

pub fn encode_value(v: Value) -> SqlValue {
  match v {
    Value::Null => SqlValue::Null,
    Value::Integer(i) => SqlValue::Integer(i),
    Value::Text(s) => SqlValue::Text(s),
  }
}

pub fn decode_value(index: usize, v: SqlValue) -> Result<Value> {
  match v {
    SqlValue::Null => Ok(Value::Null),
    SqlValue::Integer(i) => Ok(Value::Integer(i)),
    SqlValue::Text(s) => Ok(Value::Text(s)),
    SqlValue::Real(_) => Err(Error::UnsupportedColumnType { index, kind: "real" }),
    SqlValue::Blob(_) => Err(Error::UnsupportedColumnType { index, kind: "blob" }),
  }
}

pub fn decode_row(raw: Vec<SqlValue>) -> Result<Vec<Value>> {
  raw
    .into_iter()
    .enumerate()
    .map(|(i, v)| decode_value(i, v))
    .collect()
}

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Double-quote `name` for use as a table or column identifier.
///
/// Only `[A-Za-z_][A-Za-z0-9_]*` is accepted.
pub fn quote_ident(name: &str) -> Result<String> {
  let mut chars = name.chars();
  let valid = chars
    .next()
    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

  if valid {
    Ok(format!("\"{name}\""))
  } else {
    Err(Error::InvalidIdentifier(name.to_owned()))
  }
}

/// Quote and comma-join a column list.
pub fn column_list(columns: &[&str]) -> Result<String> {
  Ok(
    columns
      .iter()
      .map(|c| quote_ident(c))
      .collect::<Result<Vec<_>>>()?
      .join(", "),
  )
}
