//! Record → game row transform.
//!
//! Pure and per-record: a missing or unparseable tag only nulls the field
//! that depends on it. The opening lookup and the result mapping are the
//! only conditional steps; everything else is copied from the tags.

use chessdb_core::{
  entity::{Game, GameResult, TimeControl},
  record::{Color, RawGameRecord, tags},
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::{config::UnresolvedPlayerPolicy, resolve::IdentifierMaps};

/// Namespace for game ids derived from their tag sets.
const GAME_NAMESPACE: Uuid = Uuid::from_u128(0x6a1c_58e2_3f4d_4b8a_9e0f_1c2d_7b3a_5e41);

// ─── Field parsers ───────────────────────────────────────────────────────────

/// Parse an Elo tag. `?`, `-`, negatives and other garbage yield `None`.
pub fn parse_elo(value: &str) -> Option<i32> {
  value.trim().parse::<u16>().ok().map(i32::from)
}

/// Combine a `YYYY.MM.DD` date tag and a `HH:MM:SS` time tag, preferring the
/// UTC variants.
pub fn parse_date_time(record: &RawGameRecord) -> Option<NaiveDateTime> {
  let date = record
    .get_nonempty(tags::UTC_DATE)
    .or_else(|| record.get_nonempty(tags::DATE))?;
  let time = record
    .get_nonempty(tags::UTC_TIME)
    .or_else(|| record.get_nonempty(tags::TIME))?;

  let date = NaiveDate::parse_from_str(date, "%Y.%m.%d").ok()?;
  let time = NaiveTime::parse_from_str(time, "%H:%M:%S").ok()?;
  Some(date.and_time(time))
}

/// Deterministic id: the same tag set always maps to the same game, so a
/// re-ingested archive collides on the primary key instead of duplicating.
pub fn game_id(record: &RawGameRecord) -> Uuid {
  let mut key = Vec::with_capacity(256);
  for (name, value) in record.sorted() {
    key.extend_from_slice(name.as_bytes());
    key.push(0x1f);
    key.extend_from_slice(value.as_bytes());
    key.push(0x1e);
  }
  Uuid::new_v5(&GAME_NAMESPACE, &key)
}

// ─── Transform ───────────────────────────────────────────────────────────────

/// Build the game row for `record`, or `None` if the policy drops it.
pub fn build_game(
  record: &RawGameRecord,
  maps:   &IdentifierMaps,
  policy: UnresolvedPlayerPolicy,
) -> Option<Game> {
  let white = record.player(Color::White).and_then(|n| maps.player(n));
  let black = record.player(Color::Black).and_then(|n| maps.player(n));

  if policy == UnresolvedPlayerPolicy::Drop && (white.is_none() || black.is_none()) {
    return None;
  }

  Some(Game {
    id: game_id(record),
    white,
    black,
    result: record.get(tags::RESULT).and_then(GameResult::from_tag),
    white_elo: record.get(tags::WHITE_ELO).and_then(parse_elo),
    black_elo: record.get(tags::BLACK_ELO).and_then(parse_elo),
    date_time: parse_date_time(record),
    time_control: record.get(tags::TIME_CONTROL).and_then(TimeControl::parse),
    opening: record.get_nonempty(tags::OPENING).and_then(|o| maps.opening(o)),
  })
}

/// Games built from one chunk, plus how many records the policy dropped.
#[derive(Debug, Default)]
pub struct ChunkGames {
  pub games:   Vec<Game>,
  pub dropped: usize,
}

pub fn build_chunk(
  records: &[RawGameRecord],
  maps:    &IdentifierMaps,
  policy:  UnresolvedPlayerPolicy,
) -> ChunkGames {
  let mut out = ChunkGames {
    games:   Vec::with_capacity(records.len()),
    dropped: 0,
  };
  for record in records {
    match build_game(record, maps, policy) {
      Some(game) => out.games.push(game),
      None => out.dropped += 1,
    }
  }
  out
}
