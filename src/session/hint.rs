//! Iteration hints embedded in document text.
//!
//! A document can pin the iteration it is about by carrying a line near
//! the top such as:
//!
//! ```text
//! Iteration: a589a806-bf11-4d4f-a031-c19813331553 (Fabrikam\Sprint 2)
//! ```
//!
//! The display path in parentheses is optional and purely informational;
//! matching against the team's iterations is by identifier.

/// An iteration reference read out of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationHint {
  pub id: String,
  pub path: Option<String>,
}

/// How many lines from the anchor are scanned for a hint.
const SCAN_LINES: usize = 5;

const MARKER: &str = "iteration:";

/// Extract an iteration reference from `lines`, scanning a few lines from
/// `start`. Leading comment punctuation (`#`, `//`, `<!--`) is ignored so
/// the hint works in markdown, code and HTML-style documents alike.
pub fn extract_iteration_hint(lines: &[&str], start: usize) -> Option<IterationHint> {
  lines
    .iter()
    .skip(start)
    .take(SCAN_LINES)
    .find_map(|line| parse_hint_line(line))
}

fn parse_hint_line(line: &str) -> Option<IterationHint> {
  let trimmed = line
    .trim_start()
    .trim_start_matches(['#', '/', '*'])
    .trim_start_matches("<!--")
    .trim_start();

  let head = trimmed.get(..MARKER.len())?;
  if !head.eq_ignore_ascii_case(MARKER) {
    return None;
  }

  let value = trimmed[MARKER.len()..]
    .trim_end_matches("-->")
    .trim();
  if value.is_empty() {
    return None;
  }

  // "<id>" or "<id> (<display path>)"
  let (id, rest) = match value.split_once(char::is_whitespace) {
    Some((id, rest)) => (id, rest.trim()),
    None => (value, ""),
  };

  let path = rest
    .strip_prefix('(')
    .and_then(|r| r.strip_suffix(')'))
    .map(|p| p.trim().to_string())
    .filter(|p| !p.is_empty());

  Some(IterationHint {
    id: id.to_string(),
    path,
  })
}
