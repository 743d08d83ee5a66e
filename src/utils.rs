/// Escape text for inclusion in an HTML body.
pub fn escape_html(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      _ => escaped.push(ch),
    }
  }
  escaped
}

/// Short random id used to correlate the log lines of one invocation.
pub fn request_id() -> String {
  let mut id = uuid::Uuid::new_v4().simple().to_string();
  id.truncate(8);
  id
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escapes_markup() {
    assert_eq!(escape_html("a<b & c>\"d\""), "a&lt;b &amp; c&gt;&quot;d&quot;");
    assert_eq!(escape_html("(x^2+1)"), "(x^2+1)");
  }

  #[test]
  fn request_ids_are_short_and_distinct() {
    let a = request_id();
    let b = request_id();
    assert_eq!(a.len(), 8);
    assert_ne!(a, b);
  }
}
