//! Persistent entities: players, openings and games.
//!
//! Players and openings are keyed by `name` in the store; two records with
//! the same name are the same entity. A name is never rewritten once a row
//! exists, and only the store-side aggregate refresh touches `max_elo`.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text format for [`Game::date_time`] when it is written to the store.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── Player ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
  /// Generated client-side when the name is first seen.
  pub id:      Uuid,
  pub name:    String,
  /// Best-known title, e.g. `GM`.
  pub title:   Option<String>,
  /// Highest Elo observed in the batch that created the player; later
  /// raised by the store's aggregate refresh.
  pub max_elo: Option<i32>,
}

// ─── Opening ─────────────────────────────────────────────────────────────────

/// A row of the static opening reference tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
  pub id:   Uuid,
  /// ECO classification code, e.g. `B90`.
  pub eco:  String,
  pub name: String,
  /// Reference move sequence; informational only.
  pub pgn:  String,
}

// ─── Game ────────────────────────────────────────────────────────────────────

/// Outcome of a game, stored as a single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
  WhiteWins,
  BlackWins,
  Draw,
}

impl GameResult {
  /// Map a `Result` tag value. Anything other than the three exact decisive
  /// or drawn forms (including `*` and padded variants) is unknown.
  pub fn from_tag(value: &str) -> Option<Self> {
    match value {
      "1-0" => Some(Self::WhiteWins),
      "0-1" => Some(Self::BlackWins),
      "1/2-1/2" => Some(Self::Draw),
      _ => None,
    }
  }

  pub fn code(self) -> &'static str {
    match self {
      Self::WhiteWins => "W",
      Self::BlackWins => "B",
      Self::Draw => "D",
    }
  }
}

/// A validated time-control string of the form `<base>[+<increment>]`,
/// both parts in whole seconds.
///
/// The original text is kept verbatim; parsing only decides whether the
/// value is usable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeControl(String);

impl TimeControl {
  pub fn parse(value: &str) -> Option<Self> {
    let raw = value.trim();
    let valid = match raw.split_once('+') {
      Some((base, inc)) => is_seconds(base) && is_seconds(inc),
      None => is_seconds(raw),
    };
    valid.then(|| Self(raw.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

fn is_seconds(s: &str) -> bool {
  !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && s.parse::<u32>().is_ok()
}

impl fmt::Display for TimeControl {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A game row ready for loading. Foreign keys are `None` when the name could
/// not be resolved against the identifier maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
  pub id:           Uuid,
  pub white:        Option<Uuid>,
  pub black:        Option<Uuid>,
  pub result:       Option<GameResult>,
  pub white_elo:    Option<i32>,
  pub black_elo:    Option<i32>,
  pub date_time:    Option<NaiveDateTime>,
  pub time_control: Option<TimeControl>,
  pub opening:      Option<Uuid>,
}
