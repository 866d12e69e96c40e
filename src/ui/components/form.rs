use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Events a form hands back to its view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
  /// Enter on the last field
  Submit,
  Cancel,
}

#[derive(Debug, Clone)]
struct Field {
  label: &'static str,
  input: TextInput,
  masked: bool,
}

/// A vertical stack of labelled single-line inputs, one of them focused.
#[derive(Debug, Clone, Default)]
pub struct Form {
  fields: Vec<Field>,
  focused: usize,
}

impl Form {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a plain text field
  pub fn field(mut self, label: &'static str) -> Self {
    self.push(label, false);
    self
  }

  /// Add a field whose value is drawn as bullets
  pub fn secret(mut self, label: &'static str) -> Self {
    self.push(label, true);
    self
  }

  fn push(&mut self, label: &'static str, masked: bool) {
    self.fields.push(Field {
      label,
      input: TextInput::new(),
      masked,
    });
  }

  /// Value of the field labelled `label`, or "" if there is none
  pub fn value(&self, label: &str) -> &str {
    self
      .fields
      .iter()
      .find(|f| f.label == label)
      .map(|f| f.input.value())
      .unwrap_or("")
  }

  pub fn focus_first(&mut self) {
    self.focused = 0;
  }

  fn focus_next(&mut self) {
    if !self.fields.is_empty() {
      self.focused = (self.focused + 1) % self.fields.len();
    }
  }

  fn focus_prev(&mut self) {
    if !self.fields.is_empty() {
      self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
    }
  }

  fn on_last_field(&self) -> bool {
    self.focused + 1 >= self.fields.len()
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.focus_next();
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus_prev();
        return KeyResult::Handled;
      }
      _ => {}
    }

    let Some(field) = self.fields.get_mut(self.focused) else {
      return KeyResult::NotHandled;
    };

    match field.input.handle_key(key) {
      InputResult::Consumed => KeyResult::Handled,
      InputResult::Cancelled => KeyResult::Event(FormEvent::Cancel),
      InputResult::Submitted(_) if self.on_last_field() => KeyResult::Event(FormEvent::Submit),
      InputResult::Submitted(_) => {
        self.focus_next();
        KeyResult::Handled
      }
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  /// Height needed to draw every field
  pub fn height(&self) -> u16 {
    self.fields.len() as u16 * 3
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let constraints = vec![Constraint::Length(3); self.fields.len()];
    let rows = Layout::vertical(constraints).split(area);

    for (i, (field, row)) in self.fields.iter().zip(rows.iter()).enumerate() {
      let focused = i == self.focused;
      let border = if focused {
        Style::default().fg(Color::Yellow)
      } else {
        Style::default().fg(Color::DarkGray)
      };

      let shown = if field.masked {
        "•".repeat(field.input.value().chars().count())
      } else {
        field.input.value().to_string()
      };

      let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {} ", field.label));
      let inner = block.inner(*row);
      frame.render_widget(Paragraph::new(shown).block(block), *row);

      if focused {
        let x = inner.x + field.input.cursor_position() as u16;
        frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y));
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(form: &mut Form, s: &str) {
    for c in s.chars() {
      form.handle_key(key(KeyCode::Char(c)));
    }
  }

  fn login_form() -> Form {
    Form::new().field("Email").secret("Password")
  }

  #[test]
  fn test_typing_goes_to_focused_field() {
    let mut form = login_form();
    type_str(&mut form, "a@x.com");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "secret");

    assert_eq!(form.value("Email"), "a@x.com");
    assert_eq!(form.value("Password"), "secret");
  }

  #[test]
  fn test_enter_advances_then_submits() {
    let mut form = login_form();
    assert_eq!(form.handle_key(key(KeyCode::Enter)), KeyResult::Handled);
    assert_eq!(form.focused, 1);
    assert_eq!(
      form.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(FormEvent::Submit)
    );
  }

  #[test]
  fn test_focus_wraps() {
    let mut form = login_form();
    form.handle_key(key(KeyCode::BackTab));
    assert_eq!(form.focused, 1);
    form.handle_key(key(KeyCode::Down));
    assert_eq!(form.focused, 0);
  }

  #[test]
  fn test_escape_cancels() {
    let mut form = login_form();
    assert_eq!(
      form.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(FormEvent::Cancel)
    );
  }

  #[test]
  fn test_unknown_label_is_empty() {
    let mut form = login_form();
    type_str(&mut form, "x");
    assert_eq!(form.value("Nope"), "");
  }
}
