//! Opening reference loader for tab-separated `eco\tname\tpgn` tables.

use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use chessdb_core::entity::Opening;
use uuid::Uuid;

use crate::{Error, Result};

/// Read one reference table. The first line is a header and is skipped
/// whatever it says; columns are taken by position.
pub fn read_opening_file(path: &Path) -> Result<Vec<Opening>> {
  let file = File::open(path).map_err(|source| Error::OpeningFile {
    path: path.to_path_buf(),
    source,
  })?;
  let mut rdr = csv::ReaderBuilder::new()
    .delimiter(b'\t')
    .has_headers(true)
    .quoting(false)
    .flexible(true)
    .from_reader(BufReader::new(file));

  let mut openings = Vec::new();
  for (i, record) in rdr.records().enumerate() {
    let record = record?;
    match (record.get(0), record.get(1), record.get(2)) {
      (Some(eco), Some(name), Some(pgn)) if !name.trim().is_empty() => {
        openings.push(Opening {
          id:   Uuid::new_v4(),
          eco:  eco.trim().to_owned(),
          name: name.trim().to_owned(),
          pgn:  pgn.trim().to_owned(),
        });
      }
      _ => tracing::warn!(file = ?path, row = i + 2, "skipping malformed opening row"),
    }
  }
  Ok(openings)
}

/// Concatenate every readable table into one list, first occurrence of each
/// name winning. A file that cannot be read is logged and skipped.
pub fn read_openings<P: AsRef<Path>>(files: &[P]) -> Vec<Opening> {
  let mut seen = HashSet::new();
  let mut openings = Vec::new();

  for path in files {
    let path = path.as_ref();
    tracing::info!(file = ?path, "reading opening table");
    match read_opening_file(path) {
      Ok(rows) => openings.extend(rows.into_iter().filter(|o| seen.insert(o.name.clone()))),
      Err(e) => tracing::error!("{e}"),
    }
  }

  tracing::info!(openings = openings.len(), "opening tables loaded");
  openings
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use tempfile::NamedTempFile;

  use super::*;

  fn tsv(content: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f
  }

  #[test]
  fn reads_rows_and_assigns_ids() {
    let f = tsv(
      "eco\tname\tpgn\n\
       B20\tSicilian Defense\t1. e4 c5\n\
       B90\tSicilian Defense: Najdorf Variation\t1. e4 c5 2. Nf3 d6 3. d4 cxd4 4. Nxd4 Nf6 5. Nc3 a6\n",
    );
    let rows = read_opening_file(f.path()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].eco, "B20");
    assert_eq!(rows[1].name, "Sicilian Defense: Najdorf Variation");
    assert_ne!(rows[0].id, rows[1].id);
  }

  #[test]
  fn apostrophes_and_quotes_survive() {
    let f = tsv("eco\tname\tpgn\nC20\tKing's Pawn Game: \"Wayward\" Queen\t1. e4 e5 2. Qh5\n");
    let rows = read_opening_file(f.path()).unwrap();
    assert_eq!(rows[0].name, "King's Pawn Game: \"Wayward\" Queen");
  }

  #[test]
  fn short_rows_are_skipped() {
    let f = tsv("eco\tname\tpgn\nA00\tonly two\nA01\tNimzo-Larsen Attack\t1. b3\n");
    let rows = read_opening_file(f.path()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Nimzo-Larsen Attack");
  }

  #[test]
  fn missing_file_does_not_stop_the_others() {
    let a = tsv("eco\tname\tpgn\nA00\tPolish Opening\t1. b4\n");
    let c = tsv("eco\tname\tpgn\nC00\tFrench Defense\t1. e4 e6\nA00\tPolish Opening\t1. b4\n");
    let files = [
      a.path().to_path_buf(),
      "/no/such/b.tsv".into(),
      c.path().to_path_buf(),
    ];

    let rows = read_openings(&files);
    let names: Vec<_> = rows.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Polish Opening", "French Defense"]);
  }

  #[test]
  fn all_missing_yields_empty() {
    assert!(read_openings(&["/no/such/a.tsv"]).is_empty());
  }
}
