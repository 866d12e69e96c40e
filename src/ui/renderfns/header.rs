use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::session::Session;
use crate::ui::view::ShortcutInfo;

/// Draw the header bar with title, backend host, user, and shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  api_url: &str,
  session: &Session,
  shortcuts: &[ShortcutInfo],
) {
  let mut spans = vec![
    Span::styled(format!(" {} ", title), Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", extract_host(api_url)),
      Style::default().fg(Color::White),
    ),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    user_span(session),
    Span::raw("  "),
  ];

  let mut shortcuts = shortcuts.to_vec();
  shortcuts.sort_by_key(|s| s.priority);
  for (i, shortcut) in shortcuts.iter().enumerate() {
    if i > 0 {
      spans.push(Span::raw("   "));
    }
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

fn user_span(session: &Session) -> Span<'static> {
  if !session.is_logged_in() {
    return Span::styled(" signed out ", Style::default().fg(Color::DarkGray));
  }

  let who = session.name().or(session.email()).unwrap_or("unknown");
  let label = if session.is_super_user() {
    format!(" {} (admin) ", who)
  } else {
    format!(" {} ", who)
  };
  Span::styled(label, Style::default().fg(Color::Yellow).bold())
}

/// Host (and port) of a base URL
fn extract_host(url: &str) -> &str {
  let rest = url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url);
  rest.split('/').next().unwrap_or(rest)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_host() {
    assert_eq!(extract_host("https://hr.example.com"), "hr.example.com");
    assert_eq!(extract_host("https://hr.example.com/api/v1"), "hr.example.com");
    assert_eq!(extract_host("http://localhost:8000/api"), "localhost:8000");
  }

  #[test]
  fn test_user_span_marks_admins() {
    use crate::testutil::signed_in_user;

    let admin = Session::signed_in("t", &signed_in_user("1", true));
    assert_eq!(user_span(&admin).content, " User 1 (admin) ");
    assert_eq!(user_span(&Session::default()).content, " signed out ");
  }
}
