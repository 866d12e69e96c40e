use crate::api::types::RegisterRequest;
use crate::guards::Route;
use crate::query::Mutation;
use crate::ui::components::{Form, FormEvent, KeyResult};
use crate::ui::context::AppContext;
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use serde_json::Value;
use tracing::info;

const EMAIL: &str = "Email";
const OTP: &str = "One-time code";
const NAME: &str = "Name";
const DEPARTMENT: &str = "Department";
const BIRTH_DATE: &str = "Date of birth (YYYY-MM-DD)";
const PASSWORD: &str = "Password";
const CONFIRM: &str = "Confirm password";

pub const OTP_LENGTH: usize = 6;

/// Only the length is checked; the server verifies the code itself.
pub fn validate_otp(code: &str) -> Result<(), &'static str> {
  if code.chars().count() == OTP_LENGTH {
    Ok(())
  } else {
    Err("Please enter a valid 6-digit OTP.")
  }
}

pub fn validate_passwords(password: &str, confirm: &str) -> Result<(), &'static str> {
  if password == confirm {
    Ok(())
  } else {
    Err("Passwords do not match")
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
  Verify,
  Details,
}

/// Two-step registration: email and one-time code, then account details.
pub struct RegisterView {
  ctx: AppContext,
  step: Step,
  verify: Form,
  details: Form,
  request: Mutation<Value>,
}

impl RegisterView {
  pub fn new(ctx: AppContext) -> Self {
    Self {
      ctx,
      step: Step::Verify,
      verify: Form::new().field(EMAIL).field(OTP),
      details: Form::new()
        .field(NAME)
        .field(DEPARTMENT)
        .field(BIRTH_DATE)
        .secret(PASSWORD)
        .secret(CONFIRM),
      request: Mutation::new(),
    }
  }

  fn submit_verify(&mut self) {
    match validate_otp(self.verify.value(OTP)) {
      Ok(()) => {
        self.step = Step::Details;
        self.details.focus_first();
      }
      Err(message) => self.ctx.toasts.error(message),
    }
  }

  fn submit_details(&mut self) {
    let password = self.details.value(PASSWORD);
    if let Err(message) = validate_passwords(password, self.details.value(CONFIRM)) {
      self.ctx.toasts.error(message);
      return;
    }

    let request = RegisterRequest {
      email: self.verify.value(EMAIL).trim().to_string(),
      password: password.to_string(),
      name: self.details.value(NAME).trim().to_string(),
      department: self.details.value(DEPARTMENT).trim().to_string(),
      date_of_birth: self.details.value(BIRTH_DATE).trim().to_string(),
      temporary_token: self.verify.value(OTP).to_string(),
    };
    let api = self.ctx.api.clone();
    self.request.start(async move { api.register(&request).await });
  }

  fn form(&self) -> &Form {
    match self.step {
      Step::Verify => &self.verify,
      Step::Details => &self.details,
    }
  }
}

impl View for RegisterView {
  fn route(&self) -> Route {
    Route::Register
  }

  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    let result = match self.step {
      Step::Verify => self.verify.handle_key(key),
      Step::Details => self.details.handle_key(key),
    };

    match (self.step, result) {
      (Step::Verify, KeyResult::Event(FormEvent::Submit)) => self.submit_verify(),
      (Step::Details, KeyResult::Event(FormEvent::Submit)) => self.submit_details(),
      (Step::Verify, KeyResult::Event(FormEvent::Cancel)) => {
        return ViewAction::Navigate(Route::Login);
      }
      (Step::Details, KeyResult::Event(FormEvent::Cancel)) => self.step = Step::Verify,
      (_, KeyResult::Handled | KeyResult::NotHandled) => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let (title, hint) = match self.step {
      Step::Verify => (" Register (1/2) ", "Enter the email and the 6-character code you received"),
      Step::Details => (" Register (2/2) ", "Esc: back to the code"),
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
      Constraint::Length(self.form().height()),
      Constraint::Length(1),
      Constraint::Min(0),
    ])
    .split(inner);

    self.form().render(frame, chunks[0]);

    let hint = if self.request.is_pending() {
      "Registering..."
    } else {
      hint
    };
    frame.render_widget(
      Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
      chunks[1],
    );
  }

  fn breadcrumb_label(&self) -> String {
    "Register".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    match self.request.poll() {
      Some(Ok(_)) => {
        info!(email = %self.verify.value(EMAIL), "registered");
        self.ctx.toasts.info("Registered successfully! Please login.");
        ViewAction::Navigate(Route::Login)
      }
      Some(Err(e)) => {
        self
          .ctx
          .toasts
          .error(format!("Registration failed: {}", e.user_message()));
        ViewAction::None
      }
      None => ViewAction::None,
    }
  }

  fn is_editing(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![Shortcut::new("enter", "next"), Shortcut::new("esc", "back")]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::{press, settle, type_text, TestContext};
  use crossterm::event::KeyCode;
  use reqwest::Method;
  use serde_json::json;

  #[test]
  fn test_otp_length_only() {
    assert!(validate_otp("123456").is_ok());
    assert!(validate_otp("abcdef").is_ok());
    assert!(validate_otp("12345").is_err());
    assert!(validate_otp("1234567").is_err());
    assert!(validate_otp("").is_err());
  }

  #[test]
  fn test_password_confirmation() {
    assert!(validate_passwords("pw", "pw").is_ok());
    assert_eq!(validate_passwords("pw", "Pw"), Err("Passwords do not match"));
  }

  fn verify(view: &mut RegisterView, code: &str) {
    type_text(view, "new@x.com");
    press(view, KeyCode::Tab);
    type_text(view, code);
    press(view, KeyCode::Enter);
  }

  fn fill_details(view: &mut RegisterView, password: &str, confirm: &str) {
    for value in ["Ada", "Engineering", "1990-12-10", password] {
      type_text(view, value);
      press(view, KeyCode::Tab);
    }
    type_text(view, confirm);
    press(view, KeyCode::Enter);
  }

  #[tokio::test]
  async fn test_short_code_stays_on_first_step() {
    let mut test = TestContext::new();
    let mut view = RegisterView::new(test.ctx.clone());

    verify(&mut view, "123");

    assert_eq!(view.step, Step::Verify);
    assert_eq!(
      test.toast_messages(),
      vec!["Please enter a valid 6-digit OTP.".to_string()]
    );
  }

  #[tokio::test]
  async fn test_mismatched_passwords_send_nothing() {
    let mut test = TestContext::new();
    let mut view = RegisterView::new(test.ctx.clone());

    verify(&mut view, "123456");
    assert_eq!(view.step, Step::Details);
    fill_details(&mut view, "secret", "secreT");
    settle().await;

    assert!(test.transport.requests().is_empty());
    assert_eq!(test.toast_messages(), vec!["Passwords do not match".to_string()]);
  }

  #[tokio::test]
  async fn test_successful_registration_returns_to_login() {
    let mut test = TestContext::new();
    test
      .transport
      .respond(Method::POST, "/auth/register", 201, json!({"ok": true}));
    let mut view = RegisterView::new(test.ctx.clone());

    verify(&mut view, "654321");
    fill_details(&mut view, "secret", "secret");
    settle().await;

    assert_eq!(view.tick(), ViewAction::Navigate(Route::Login));
    assert_eq!(
      test.toast_messages(),
      vec!["Registered successfully! Please login.".to_string()]
    );
    assert_eq!(
      test.transport.requests()[0].body,
      Some(json!({
        "email": "new@x.com",
        "password": "secret",
        "name": "Ada",
        "department": "Engineering",
        "date_of_birth": "1990-12-10",
        "temporary_token": "654321",
      }))
    );
  }

  #[tokio::test]
  async fn test_failed_registration_toasts_server_message() {
    let mut test = TestContext::new();
    test.transport.respond(
      Method::POST,
      "/auth/register",
      400,
      json!({"message": "Invalid or expired code"}),
    );
    let mut view = RegisterView::new(test.ctx.clone());

    verify(&mut view, "000000");
    fill_details(&mut view, "secret", "secret");
    settle().await;

    assert_eq!(view.tick(), ViewAction::None);
    assert_eq!(
      test.toast_messages(),
      vec!["Registration failed: Invalid or expired code".to_string()]
    );
  }

  #[tokio::test]
  async fn test_escape_steps_back_then_leaves() {
    let test = TestContext::new();
    let mut view = RegisterView::new(test.ctx.clone());

    verify(&mut view, "123456");
    assert_eq!(press(&mut view, KeyCode::Esc), ViewAction::None);
    assert_eq!(view.step, Step::Verify);
    assert_eq!(
      press(&mut view, KeyCode::Esc),
      ViewAction::Navigate(Route::Login)
    );
  }
}
