//! Line classifier and tag-line parser.
//!
//! Pipeline:
//!   raw line
//!     └─ classify()          → Line
//!          └─ parse_tag()    → (name, unquoted value)
//!               └─ Records   → accumulate until movetext, then emit

use crate::error::{Error, Result};

// ─── Line classes ────────────────────────────────────────────────────────────

pub(crate) enum Line<'a> {
  /// `[Name "Value"]`, not yet validated.
  Tag(&'a str),
  /// Starts with a move number; closes the pending record.
  Movetext,
  /// Blank lines, comments, continuation of movetext.
  Other,
}

pub(crate) fn classify(line: &str) -> Line<'_> {
  match line.as_bytes().first() {
    Some(b'[') => Line::Tag(line),
    Some(b) if b.is_ascii_digit() => Line::Movetext,
    _ => Line::Other,
  }
}

// ─── Tag lines ───────────────────────────────────────────────────────────────

/// Split `[Name "Value"]` on the first space and unquote the value.
///
/// `line_no` is only used for error reporting.
pub(crate) fn parse_tag(line: &str, line_no: usize) -> Result<(&str, String)> {
  let malformed = || Error::MalformedTag {
    line:    line_no,
    content: line.trim_end().to_string(),
  };

  let inner = line
    .trim_end()
    .strip_prefix('[')
    .and_then(|s| s.strip_suffix(']'))
    .ok_or_else(malformed)?;

  let (name, quoted) = inner.split_once(' ').ok_or_else(malformed)?;
  if name.is_empty() {
    return Err(malformed());
  }

  let value = quoted
    .trim()
    .strip_prefix('"')
    .and_then(|s| s.strip_suffix('"'))
    .ok_or_else(malformed)?;

  Ok((name, unescape_value(value)))
}

/// Undo PGN string escapes (`\"` and `\\`). Other backslashes are literal.
fn unescape_value(s: &str) -> String {
  let mut result = String::with_capacity(s.len());
  let mut chars = s.chars().peekable();
  while let Some(c) = chars.next() {
    if c == '\\' && matches!(chars.peek(), Some('"') | Some('\\')) {
      if let Some(escaped) = chars.next() {
        result.push(escaped);
      }
    } else {
      result.push(c);
    }
  }
  result
}
