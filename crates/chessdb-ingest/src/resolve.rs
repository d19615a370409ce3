//! Identifier resolution: name → id maps read back from the store.
//!
//! A map is a snapshot. It goes stale the moment rows are inserted, which is
//! why the orchestrator reads players twice per batch: once to know which
//! names are new, and again after inserting them so that games built from
//! the map see the ids just written.

use std::collections::HashMap;

use chessdb_core::{
  row::{Row, check_width},
  store::{IngestStore, TableNames},
};
use uuid::Uuid;

use crate::{Error, Result};

const PLAYER_COLUMNS: &[&str] = &["id", "name"];
const OPENING_COLUMNS: &[&str] = &["id", "name", "pgn"];

// ─── Maps ─────────────────────────────────────────────────────────────────────

pub type NameMap = HashMap<String, Uuid>;

/// Read-only lookup tables handed to the game transform.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMaps {
  pub players:  NameMap,
  pub openings: NameMap,
}

impl IdentifierMaps {
  pub fn player(&self, name: &str) -> Option<Uuid> { self.players.get(name).copied() }

  /// Resolve an `Opening` tag: exact name first, then the part before the
  /// first `:` so that a variation falls back to its parent opening.
  pub fn opening(&self, tag: &str) -> Option<Uuid> {
    if let Some(id) = self.openings.get(tag) {
      return Some(*id);
    }
    let (family, _) = tag.split_once(':')?;
    self.openings.get(family.trim_end()).copied()
  }
}

// ─── Resolver ─────────────────────────────────────────────────────────────────

/// Pure read step; it never inserts anything.
pub struct Resolver<'a, S> {
  store:  &'a S,
  tables: &'a TableNames,
}

impl<'a, S: IngestStore> Resolver<'a, S> {
  pub fn new(store: &'a S, tables: &'a TableNames) -> Self { Self { store, tables } }

  pub async fn players(&self) -> Result<NameMap> {
    let rows = self
      .store
      .fetch(&self.tables.players, PLAYER_COLUMNS)
      .await
      .map_err(Error::store)?;
    decode_name_map(rows, PLAYER_COLUMNS.len())
  }

  pub async fn openings(&self) -> Result<NameMap> {
    let rows = self
      .store
      .fetch(&self.tables.openings, OPENING_COLUMNS)
      .await
      .map_err(Error::store)?;
    decode_name_map(rows, OPENING_COLUMNS.len())
  }

  /// Fresh player and opening maps reflecting everything committed so far.
  pub async fn refresh(&self) -> Result<IdentifierMaps> {
    let players = self.players().await?;
    let openings = self.openings().await?;
    tracing::debug!(
      players = players.len(),
      openings = openings.len(),
      "identifier maps refreshed"
    );
    Ok(IdentifierMaps { players, openings })
  }
}

/// Decode `(id, name, ..)` rows into a name → id map.
fn decode_name_map(rows: Vec<Row>, width: usize) -> Result<NameMap> {
  rows
    .iter()
    .map(|row| -> Result<(String, Uuid)> {
      check_width(row, width)?;
      let id = row[0].expect_uuid("id")?;
      let name = row[1].expect_text("name")?.to_owned();
      Ok((name, id))
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chessdb_core::row::Value;

  use super::*;

  fn maps(openings: &[&str]) -> (IdentifierMaps, Vec<Uuid>) {
    let ids: Vec<Uuid> = openings.iter().map(|_| Uuid::new_v4()).collect();
    let openings = openings
      .iter()
      .zip(&ids)
      .map(|(name, id)| (name.to_string(), *id))
      .collect();
    (IdentifierMaps { players: NameMap::new(), openings }, ids)
  }

  #[test]
  fn variation_falls_back_to_parent_opening() {
    let (m, ids) = maps(&["Sicilian Defense"]);
    assert_eq!(m.opening("Sicilian Defense: Najdorf Variation"), Some(ids[0]));
  }

  #[test]
  fn exact_variation_wins_over_parent() {
    let (m, ids) = maps(&["Sicilian Defense", "Sicilian Defense: Najdorf Variation"]);
    assert_eq!(m.opening("Sicilian Defense: Najdorf Variation"), Some(ids[1]));
    assert_eq!(m.opening("Sicilian Defense"), Some(ids[0]));
  }

  #[test]
  fn unknown_opening_is_none() {
    let (m, _) = maps(&["Sicilian Defense"]);
    assert_eq!(m.opening("French Defense: Winawer"), None);
    assert_eq!(m.opening("?"), None);
  }

  #[test]
  fn decode_rejects_bad_rows() {
    let id = Uuid::new_v4();
    let good = vec![Value::from(id), Value::from("Alice")];
    let map = decode_name_map(vec![good], 2).unwrap();
    assert_eq!(map.get("Alice"), Some(&id));

    let null_name = vec![Value::from(id), Value::Null];
    assert!(decode_name_map(vec![null_name], 2).is_err());

    let short = vec![Value::from(id)];
    assert!(decode_name_map(vec![short], 2).is_err());
  }
}
