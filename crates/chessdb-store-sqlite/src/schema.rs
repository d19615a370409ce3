//! SQL schema for the chess SQLite store.
//!
//! Table names are configurable, so the DDL is rendered per store rather than
//! held in a constant. Idempotent thanks to `CREATE TABLE IF NOT EXISTS`.

use chessdb_core::store::TableNames;

use crate::{Result, encode::quote_ident};

/// Render the full schema DDL for `tables`.
///
/// The `UNIQUE` constraints are what make batch inserts idempotent: a
/// repeated player or opening name, or a repeated game id, is skipped by
/// `INSERT OR IGNORE`.
pub fn render(tables: &TableNames) -> Result<String> {
  let players  = quote_ident(&tables.players)?;
  let openings = quote_ident(&tables.openings)?;
  let games    = quote_ident(&tables.games)?;
  let white_idx = quote_ident(&format!("{}_white_idx", tables.games))?;
  let black_idx = quote_ident(&format!("{}_black_idx", tables.games))?;

  Ok(format!(
    "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS {players} (
    id       TEXT PRIMARY KEY,
    name     TEXT NOT NULL UNIQUE,
    title    TEXT,
    max_elo  INTEGER     -- raised only by the max-elo refresh
);

-- Static reference data; loaded once from the opening TSV files.
CREATE TABLE IF NOT EXISTS {openings} (
    id    TEXT PRIMARY KEY,
    eco   TEXT NOT NULL,
    name  TEXT NOT NULL UNIQUE,
    pgn   TEXT NOT NULL
);

-- Ids are derived from the source tags, so a re-ingested game collides
-- on the primary key.
CREATE TABLE IF NOT EXISTS {games} (
    id            TEXT PRIMARY KEY,
    white         TEXT REFERENCES {players}(id),
    black         TEXT REFERENCES {players}(id),
    result        TEXT CHECK (result IN ('W', 'B', 'D')),
    white_elo     INTEGER,
    black_elo     INTEGER,
    date_time     TEXT,   -- YYYY-MM-DD HH:MM:SS, UTC
    time_control  TEXT,
    opening       TEXT REFERENCES {openings}(id)
);

CREATE INDEX IF NOT EXISTS {white_idx} ON {games}(white);
CREATE INDEX IF NOT EXISTS {black_idx} ON {games}(black);

PRAGMA user_version = 1;
"
  ))
}

/// Raise each player's `max_elo` to the highest Elo recorded in any game
/// they played. `-1` stands in for "no value" inside the scalar `MAX`.
pub fn refresh_max_elo(players: &str, games: &str) -> Result<String> {
  let p = quote_ident(players)?;
  let g = quote_ident(games)?;

  Ok(format!(
    "UPDATE {p} SET max_elo = NULLIF(MAX(
       COALESCE(max_elo, -1),
       COALESCE((SELECT MAX(white_elo) FROM {g} WHERE {g}.white = {p}.id), -1),
       COALESCE((SELECT MAX(black_elo) FROM {g} WHERE {g}.black = {p}.id), -1)
     ), -1)"
  ))
}
