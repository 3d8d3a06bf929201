//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let mut end = max;
    while !s.is_char_boundary(end) {
      end -= 1;
    }
    format!("{}… ({} bytes total)", &s[..end], s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn short_strings_pass_through() {
    assert_eq!(trunc_for_log("abc", 10), "abc");
  }

  #[test]
  fn long_strings_are_truncated_on_char_boundaries() {
    let s = "∫∫∫∫"; // 3 bytes each
    let out = trunc_for_log(s, 4);
    assert!(out.starts_with('∫'));
    assert!(out.contains("12 bytes total"));
  }
}
