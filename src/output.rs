//! Decoding and HTML rendering of factorization program transcripts.
//!
//! A transcript is an optional verbose trace, a `Factorization:` line, one
//! factor per line and a closing `Time: <elapsed>` line.

use crate::utils::escape_html;

/// Line that introduces the factor list in a transcript.
pub const FACTORIZATION_MARKER: &str = "Factorization:";

const FONT_FAMILY: &str = "Courier New";
const FONT_SIZE: u32 = 12;
const FAILURE_BANNER: &str = "<h2> Factorization failed: </h2>";
/// Shortest run of `=` rendered as a section divider.
const DIVIDER_MIN_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorizationResult {
  /// Factor expressions in the order the program printed them.
  pub factors: Vec<String>,
  pub elapsed: String,
  pub raw_text: String,
}

impl FactorizationResult {
  /// Whether the transcript contained a factor section at all. A missing
  /// marker means `factors` and `elapsed` carry no information.
  pub fn found_marker(&self) -> bool {
    self.raw_text.contains(FACTORIZATION_MARKER)
  }
}

/// Extract the factor list and elapsed time from a transcript.
///
/// Only the text after the last marker is considered. Never fails: without
/// a marker `factors` is empty and `elapsed` is a best-effort read of the
/// last line.
pub fn decode(raw_text: &str) -> FactorizationResult {
  let (section, found) = match raw_text.rfind(FACTORIZATION_MARKER) {
    Some(i) => (&raw_text[i + FACTORIZATION_MARKER.len()..], true),
    None => (raw_text, false),
  };

  let mut lines: Vec<&str> =
    section.lines().filter(|line| !line.trim().is_empty()).collect();

  let elapsed = lines
    .pop()
    .and_then(|line| line.rsplit(':').next())
    .map(|value| value.trim().to_string())
    .unwrap_or_default();

  let factors = if found {
    lines.into_iter().map(str::to_string).collect()
  } else {
    Vec::new()
  };

  FactorizationResult {
    factors,
    elapsed,
    raw_text: raw_text.to_string(),
  }
}

/// Render a transcript (or, with `failed`, a diagnostic message) as a
/// small HTML document.
///
/// With `verbose` the whole trace is shown with dividers and markers
/// highlighted, otherwise only the concatenated factors.
pub fn render_html(raw_text: &str, verbose: bool, failed: bool) -> String {
  let body = if verbose {
    render_transcript(raw_text)
  } else {
    escape_html(&decode(raw_text).factors.concat())
  };

  let mut html = format!(
    "<html style=\"font-family: {FONT_FAMILY}; font-size:{FONT_SIZE}\">"
  );
  if failed {
    html.push_str(FAILURE_BANNER);
  }
  html.push_str(&body);
  html.push_str("</html>");
  html
}

fn render_transcript(raw_text: &str) -> String {
  match raw_text.rfind(FACTORIZATION_MARKER) {
    Some(i) => {
      let (trace, factors) = raw_text.split_at(i);
      format!("{}<b>{}</b>", render_lines(trace), render_lines(factors))
    }
    None => render_lines(raw_text),
  }
}

fn render_lines(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for segment in text.split_inclusive('\n') {
    let (content, newline) = match segment.strip_suffix('\n') {
      Some(line) => (line.strip_suffix('\r').unwrap_or(line), true),
      None => (segment, false),
    };

    if is_divider(content) {
      out.push_str("<hr>");
      continue;
    }
    render_line(content, &mut out);
    if newline {
      out.push_str("<br>");
    }
  }
  out
}

fn is_divider(line: &str) -> bool {
  line.len() >= DIVIDER_MIN_LEN && line.chars().all(|ch| ch == '=')
}

/// `--> message <--` marks a step in the trace; the message is shown in
/// bold between double arrows.
fn render_line(line: &str, out: &mut String) {
  let mut rest = line;
  while let Some(ch) = rest.chars().next() {
    if let Some(after) = rest.strip_prefix("-->") {
      out.push_str("<b>&gt;&gt;&nbsp;");
      rest = after;
    } else if let Some(after) = rest.strip_prefix("<--") {
      out.push_str("&nbsp; &lt;&lt;</b>");
      rest = after;
    } else {
      out.push_str(&escape_html(&rest[..ch.len_utf8()]));
      rest = &rest[ch.len_utf8()..];
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn divider_needs_ten_equals_signs() {
    assert!(is_divider("=========="));
    assert!(!is_divider("========="));
    assert!(!is_divider("==========x"));
  }

  #[test]
  fn arrows_wrap_trace_steps() {
    let mut out = String::new();
    render_line("--> Hensel lift <--", &mut out);
    assert_eq!(out, "<b>&gt;&gt;&nbsp; Hensel lift &nbsp; &lt;&lt;</b>");
  }

  #[test]
  fn crlf_line_endings() {
    assert_eq!(render_lines("a\r\n==========\r\nb"), "a<br><hr>b");
  }

  #[test]
  fn decode_without_time_line() {
    let result = decode("Factorization:\n");
    assert!(result.factors.is_empty());
    assert_eq!(result.elapsed, "");
    assert!(result.found_marker());
  }
}
