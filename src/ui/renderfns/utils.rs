use ratatui::prelude::Color;

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Display color for an account status
pub fn account_color(is_active: bool) -> Color {
  if is_active {
    Color::Green
  } else {
    Color::Red
  }
}

/// Display color for a leave approval label
pub fn leave_status_color(status: &str) -> Color {
  match status {
    "Approved" => Color::Green,
    "Pending" => Color::Yellow,
    _ => Color::White,
  }
}

/// First ten characters of a timestamp, i.e. its date part
pub fn short_date(timestamp: &str) -> &str {
  timestamp.get(..10).unwrap_or(timestamp)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("Zoë Zoë Zoë", 6), "Zoë...");
  }

  #[test]
  fn test_leave_status_color() {
    assert_eq!(leave_status_color("Approved"), Color::Green);
    assert_eq!(leave_status_color("Pending"), Color::Yellow);
    assert_eq!(leave_status_color("Other"), Color::White);
  }

  #[test]
  fn test_short_date() {
    assert_eq!(short_date("2024-03-01T09:30:00Z"), "2024-03-01");
    assert_eq!(short_date("soon"), "soon");
  }
}
