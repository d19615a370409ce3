//! Player extraction: names in the batch that the store does not know yet.
//!
//! Matching is exact and case-sensitive. `Magnus` and `magnus` are two
//! players.

use std::{cmp::Ordering, collections::HashMap};

use chessdb_core::{
  entity::Player,
  record::{Color, RawGameRecord},
};
use uuid::Uuid;

use crate::{resolve::NameMap, transform::parse_elo};

/// Titles from strongest to weakest. Anything else ranks below these.
const TITLE_RANK: &[&str] = &[
  "GM", "IM", "WGM", "FM", "WIM", "CM", "WFM", "WCM", "NM", "LM", "BOT",
];

// ─── Candidates ───────────────────────────────────────────────────────────────

/// What one batch tells us about a not-yet-stored player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
  pub title:   Option<String>,
  pub max_elo: Option<i32>,
}

impl Candidate {
  fn observe(&mut self, title: Option<&str>, elo: Option<i32>) {
    if let Some(t) = title
      && self.title.as_deref().is_none_or(|cur| title_cmp(t, cur).is_lt())
    {
      self.title = Some(t.to_owned());
    }
    self.max_elo = self.max_elo.max(elo);
  }

  fn merge(&mut self, other: Candidate) { self.observe(other.title.as_deref(), other.max_elo); }
}

pub type Candidates = HashMap<String, Candidate>;

/// Order titles best-first: ranked titles by rank, then unknown ones
/// alphabetically.
fn title_cmp(a: &str, b: &str) -> Ordering {
  let rank = |t: &str| TITLE_RANK.iter().position(|r| *r == t).unwrap_or(TITLE_RANK.len());
  rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
}

fn normalize_title(raw: &str) -> Option<&str> {
  let t = raw.trim();
  (!t.is_empty() && t != "-" && t != "?").then_some(t)
}

/// Collect candidates from one chunk of records, skipping names in `known`.
pub fn candidates_in(records: &[RawGameRecord], known: &NameMap) -> Candidates {
  let mut out = Candidates::new();
  for record in records {
    for color in Color::BOTH {
      let Some(name) = record.player(color) else { continue };
      if known.contains_key(name) {
        continue;
      }
      let title = record.get(color.title_tag()).and_then(normalize_title);
      let elo = record.get(color.elo_tag()).and_then(parse_elo);
      out.entry(name.to_owned()).or_default().observe(title, elo);
    }
  }
  out
}

/// Fold per-chunk candidates into one map; order of chunks does not matter.
pub fn merge_candidates(chunks: impl IntoIterator<Item = Candidates>) -> Candidates {
  let mut merged = Candidates::new();
  for chunk in chunks {
    for (name, candidate) in chunk {
      match merged.get_mut(&name) {
        Some(existing) => existing.merge(candidate),
        None => {
          merged.insert(name, candidate);
        }
      }
    }
  }
  merged
}

/// Turn candidates into new player rows with fresh ids.
pub fn into_players(candidates: Candidates) -> Vec<Player> {
  candidates
    .into_iter()
    .map(|(name, c)| Player {
      id: Uuid::new_v4(),
      name,
      title: c.title,
      max_elo: c.max_elo,
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn game(white: &str, w_elo: &str, black: &str, b_elo: &str) -> RawGameRecord {
    [
      ("White", white),
      ("WhiteElo", w_elo),
      ("Black", black),
      ("BlackElo", b_elo),
    ]
    .into_iter()
    .collect()
  }

  #[test]
  fn keeps_batch_maximum_elo() {
    let records = [
      game("Alice", "2400", "Bob", "2350"),
      game("Bob", "2380", "Alice", "2390"),
      game("Alice", "?", "Bob", "2300"),
    ];
    let c = candidates_in(&records, &NameMap::new());
    assert_eq!(c.len(), 2);
    assert_eq!(c["Alice"].max_elo, Some(2400));
    assert_eq!(c["Bob"].max_elo, Some(2380));
  }

  #[test]
  fn skips_known_names() {
    let mut known = NameMap::new();
    known.insert("Alice".into(), Uuid::new_v4());
    let c = candidates_in(&[game("Alice", "2400", "Bob", "2350")], &known);
    assert_eq!(c.keys().collect::<Vec<_>>(), vec!["Bob"]);
  }

  #[test]
  fn names_are_case_sensitive() {
    let c = candidates_in(&[game("magnus", "2800", "Magnus", "2850")], &NameMap::new());
    assert_eq!(c.len(), 2);
  }

  #[test]
  fn padded_names_are_distinct_players() {
    let mut known = NameMap::new();
    known.insert("Bob".into(), Uuid::new_v4());
    let c = candidates_in(&[game(" Bob ", "2360", "Bob", "2300")], &known);
    assert_eq!(c.keys().collect::<Vec<_>>(), vec![" Bob "]);
    assert_eq!(c[" Bob "].max_elo, Some(2360));
  }

  #[test]
  fn best_title_wins_regardless_of_order() {
    let mut a = Candidate::default();
    a.observe(Some("FM"), None);
    a.observe(Some("GM"), None);
    a.observe(None, None);
    a.observe(Some("BOT"), None);
    assert_eq!(a.title.as_deref(), Some("GM"));

    let mut b = Candidate::default();
    b.observe(Some("XX"), None);
    b.observe(Some("LM"), None);
    assert_eq!(b.title.as_deref(), Some("LM"));
  }

  #[test]
  fn placeholder_titles_are_absent() {
    let mut r = game("Alice", "2400", "Bob", "2350");
    r.insert("WhiteTitle", "-");
    r.insert("BlackTitle", "IM");
    let c = candidates_in(&[r], &NameMap::new());
    assert_eq!(c["Alice"].title, None);
    assert_eq!(c["Bob"].title.as_deref(), Some("IM"));
  }

  #[test]
  fn merge_is_order_independent() {
    let first = candidates_in(&[game("Alice", "2400", "Bob", "2100")], &NameMap::new());
    let second = candidates_in(&[game("Alice", "2450", "Carol", "2000")], &NameMap::new());

    let ab = merge_candidates([first.clone(), second.clone()]);
    let ba = merge_candidates([second, first]);
    assert_eq!(ab, ba);
    assert_eq!(ab["Alice"].max_elo, Some(2450));
    assert_eq!(ab.len(), 3);
  }

  #[test]
  fn missing_player_tag_is_skipped() {
    let r: RawGameRecord = [("White", "Alice")].into_iter().collect();
    let players = into_players(candidates_in(&[r], &NameMap::new()));
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].name, "Alice");
    assert_eq!(players[0].max_elo, None);
  }
}
