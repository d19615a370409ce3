//! Archive reader for tag/movetext (PGN) game collections.
//!
//! Splits an archive into [`RawGameRecord`]s. Only header tags are kept;
//! movetext is a record-boundary signal and is never parsed. Pure
//! synchronous; no database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! let records = chessdb_pgn::open("lichess_elite_2020-06.pgn").unwrap();
//! for record in records {
//!   let record = record.unwrap();
//!   println!("{:?} vs {:?}", record.get("White"), record.get("Black"));
//! }
//! ```

pub mod error;
mod parse;

use std::{
  fs::File,
  io::{BufRead, BufReader},
  mem,
  path::Path,
};

use chessdb_core::record::RawGameRecord;

pub use error::{Error, Result};
use parse::{Line, classify, parse_tag};

// ─── Public API ──────────────────────────────────────────────────────────────

/// Open the archive at `path` and return a lazy iterator over its records.
///
/// Each call re-reads the file from the start.
pub fn open(path: impl AsRef<Path>) -> Result<Records<BufReader<File>>> {
  let path = path.as_ref();
  let file = File::open(path).map_err(|source| Error::Open {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(Records::new(BufReader::with_capacity(1 << 20, file)))
}

/// Parse an in-memory archive, keeping every completed record.
pub fn parse_str(input: &str) -> Vec<RawGameRecord> {
  Records::new(input.as_bytes())
    .filter_map(std::result::Result::ok)
    .collect()
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Iterator over the completed records of one archive.
///
/// A record is complete once a movetext line follows its tags. Tags pending
/// at end of input never reached movetext and are dropped. Malformed tag
/// lines are logged and skipped without resetting the pending record.
#[derive(Debug)]
pub struct Records<R> {
  reader:  R,
  buf:     Vec<u8>,
  pending: RawGameRecord,
  line_no: usize,
  skipped: usize,
  done:    bool,
}

impl<R: BufRead> Records<R> {
  pub fn new(reader: R) -> Self {
    Self {
      reader,
      buf: Vec::with_capacity(256),
      pending: RawGameRecord::new(),
      line_no: 0,
      skipped: 0,
      done: false,
    }
  }

  /// Number of malformed tag lines skipped so far.
  pub fn skipped_tags(&self) -> usize { self.skipped }

  fn handle_line(&mut self, line: &str) -> Option<RawGameRecord> {
    match classify(line) {
      Line::Tag(tag) => {
        match parse_tag(tag, self.line_no) {
          Ok((name, value)) => self.pending.insert(name, value),
          Err(e) => {
            self.skipped += 1;
            tracing::warn!("skipping tag line: {e}");
          }
        }
        None
      }
      Line::Movetext if !self.pending.is_empty() => {
        Some(mem::take(&mut self.pending))
      }
      Line::Movetext | Line::Other => None,
    }
  }
}

impl<R: BufRead> Iterator for Records<R> {
  type Item = Result<RawGameRecord>;

  fn next(&mut self) -> Option<Self::Item> {
    while !self.done {
      self.buf.clear();
      match self.reader.read_until(b'\n', &mut self.buf) {
        Ok(0) => {
          self.done = true;
          if !self.pending.is_empty() {
            tracing::debug!(
              tags = self.pending.len(),
              "dropping record without movetext at end of archive"
            );
            self.pending.clear();
          }
        }
        Ok(_) => {
          self.line_no += 1;
          let buf = mem::take(&mut self.buf);
          let emitted = {
            let text = String::from_utf8_lossy(&buf);
            let line: &str = if self.line_no == 1 {
              text.trim_start_matches('\u{feff}')
            } else {
              &text
            };
            self.handle_line(line)
          };
          self.buf = buf;
          if let Some(record) = emitted {
            return Some(Ok(record));
          }
        }
        Err(e) => {
          self.done = true;
          return Some(Err(e.into()));
        }
      }
    }
    None
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  const TWO_GAMES: &str = "\
[Event \"Rated Blitz game\"]
[White \"Alice\"]
[Black \"Bob\"]
[Result \"1-0\"]

1. e4 e5 2. Nf3 Nc6 1-0

[Event \"Rated Blitz game\"]
[White \"Bob\"]
[Black \"Carol\"]
[Result \"1/2-1/2\"]

1. d4 d5 1/2-1/2
";

  #[test]
  fn splits_records_on_movetext() {
    let records = parse_str(TWO_GAMES);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("White"), Some("Alice"));
    assert_eq!(records[1].get("Black"), Some("Carol"));
    assert_eq!(records[1].get("Result"), Some("1/2-1/2"));
  }

  #[test]
  fn trailing_record_without_movetext_is_dropped() {
    let truncated = format!("{TWO_GAMES}\n[White \"Dave\"]\n[Black \"Eve\"]\n");
    let complete = format!("{truncated}\n1. c4 *\n");

    assert_eq!(parse_str(&truncated).len(), 2);
    assert_eq!(parse_str(&complete).len(), 3);
  }

  #[test]
  fn malformed_tag_is_skipped_without_resetting_record() {
    let input = "[White \"Alice\"]\n[Broken]\n[Black \"Bob\"]\n1. e4 *\n";
    let mut records = Records::new(input.as_bytes());

    let record = records.next().unwrap().unwrap();
    assert_eq!(record.get("White"), Some("Alice"));
    assert_eq!(record.get("Black"), Some("Bob"));
    assert_eq!(record.len(), 2);
    assert!(records.next().is_none());
    assert_eq!(records.skipped_tags(), 1);
  }

  #[test]
  fn movetext_without_tags_emits_nothing() {
    assert!(parse_str("1. e4 e5 *\n2. Nf3 *\n").is_empty());
  }

  #[test]
  fn multiline_movetext_emits_once() {
    let input = "[White \"A\"]\n1. e4 e5\n2. Nf3 Nc6\n3. Bb5 1-0\n";
    assert_eq!(parse_str(input).len(), 1);
  }

  #[test]
  fn crlf_and_bom_are_tolerated() {
    let input = "\u{feff}[White \"Alice\"]\r\n[Black \"Bob\"]\r\n\r\n1. e4 1-0\r\n";
    let records = parse_str(input);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("White"), Some("Alice"));
  }

  #[test]
  fn open_reads_file_and_is_restartable() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(TWO_GAMES.as_bytes()).unwrap();

    let first: Vec<_> = open(file.path()).unwrap().collect();
    let second: Vec<_> = open(file.path()).unwrap().collect();
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
  }

  #[test]
  fn open_missing_file_fails() {
    let err = open("/definitely/not/here.pgn").unwrap_err();
    assert!(matches!(err, Error::Open { .. }));
    assert!(err.to_string().contains("here.pgn"));
  }
}
