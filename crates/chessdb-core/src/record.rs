//! Raw game records: the flat tag maps produced by the archive parser.
//!
//! A record is ephemeral: it lives for one ingestion run and is never
//! persisted as-is. No tag is required at parse time; downstream stages look
//! up the tags they need and degrade gracefully when one is absent.

use std::collections::{BTreeMap, HashMap};

/// Tag names consumed by the ingestion pipeline.
pub mod tags {
  pub const WHITE: &str = "White";
  pub const BLACK: &str = "Black";
  pub const WHITE_TITLE: &str = "WhiteTitle";
  pub const BLACK_TITLE: &str = "BlackTitle";
  pub const WHITE_ELO: &str = "WhiteElo";
  pub const BLACK_ELO: &str = "BlackElo";
  pub const RESULT: &str = "Result";
  pub const UTC_DATE: &str = "UTCDate";
  pub const UTC_TIME: &str = "UTCTime";
  pub const DATE: &str = "Date";
  pub const TIME: &str = "Time";
  pub const TIME_CONTROL: &str = "TimeControl";
  pub const OPENING: &str = "Opening";
}

/// Which side of the board a player sat on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
  White,
  Black,
}

impl Color {
  pub const BOTH: [Color; 2] = [Color::White, Color::Black];

  pub fn name_tag(self) -> &'static str {
    match self {
      Self::White => tags::WHITE,
      Self::Black => tags::BLACK,
    }
  }

  pub fn title_tag(self) -> &'static str {
    match self {
      Self::White => tags::WHITE_TITLE,
      Self::Black => tags::BLACK_TITLE,
    }
  }

  pub fn elo_tag(self) -> &'static str {
    match self {
      Self::White => tags::WHITE_ELO,
      Self::Black => tags::BLACK_ELO,
    }
  }
}

/// One game's header tags, keyed case-sensitively by tag name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGameRecord {
  tags: HashMap<String, String>,
}

impl RawGameRecord {
  pub fn new() -> Self { Self::default() }

  /// Insert a tag, replacing any earlier value for the same name.
  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
    self.tags.insert(name.into(), value.into());
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.tags.get(name).map(String::as_str)
  }

  /// Like [`get`](Self::get), but treats blank values as absent.
  pub fn get_nonempty(&self, name: &str) -> Option<&str> {
    self.get(name).map(str::trim).filter(|v| !v.is_empty())
  }

  /// The player name for `color`, exactly as tagged. Names are identity
  /// keys, so no normalisation is applied; only an empty value is absent.
  pub fn player(&self, color: Color) -> Option<&str> {
    self.get(color.name_tag()).filter(|name| !name.is_empty())
  }

  pub fn len(&self) -> usize { self.tags.len() }

  pub fn is_empty(&self) -> bool { self.tags.is_empty() }

  pub fn clear(&mut self) { self.tags.clear(); }

  /// Tags in name order; stable across runs, unlike `HashMap` iteration.
  pub fn sorted(&self) -> BTreeMap<&str, &str> {
    self
      .tags
      .iter()
      .map(|(k, v)| (k.as_str(), v.as_str()))
      .collect()
  }
}

impl<K, V> FromIterator<(K, V)> for RawGameRecord
where
  K: Into<String>,
  V: Into<String>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut record = Self::new();
    for (k, v) in iter {
      record.insert(k, v);
    }
    record
  }
}
