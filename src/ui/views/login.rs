use crate::api::types::{LoginRequest, LoginResponse};
use crate::api::ApiError;
use crate::guards::Route;
use crate::query::Mutation;
use crate::ui::components::{Form, FormEvent, KeyResult};
use crate::ui::context::AppContext;
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tracing::{info, warn};

const EMAIL: &str = "Email";
const PASSWORD: &str = "Password";

/// Sign-in form
pub struct LoginView {
  ctx: AppContext,
  form: Form,
  request: Mutation<LoginResponse>,
}

impl LoginView {
  /// Mounting the login view signs out whoever was signed in.
  pub fn new(ctx: AppContext) -> Self {
    if let Err(e) = ctx.session.logout() {
      warn!(error = %e, "failed to clear session on login mount");
    }

    Self {
      ctx,
      form: Form::new().field(EMAIL).secret(PASSWORD),
      request: Mutation::new(),
    }
  }

  fn submit(&mut self) {
    let request = LoginRequest {
      email: self.form.value(EMAIL).trim().to_string(),
      password: self.form.value(PASSWORD).to_string(),
    };
    let api = self.ctx.api.clone();
    self.request.start(async move { api.login(&request).await });
  }

  fn on_result(&mut self, result: Result<LoginResponse, ApiError>) -> ViewAction {
    let response = match result {
      Ok(response) => response,
      Err(e) => {
        self.ctx.toasts.error(format!("Login failed: {}", failure_message(&e)));
        return ViewAction::None;
      }
    };

    if let Err(e) = self.ctx.session.login(&response.token, &response.user) {
      warn!(error = %e, "failed to persist session");
      self.ctx.toasts.error(format!("Login failed: {}", e));
      return ViewAction::None;
    }

    info!(user = %response.user.email, "signed in");
    ViewAction::Navigate(Route::LANDING)
  }
}

/// A 401 from the login endpoint means rejected credentials.
fn failure_message(error: &ApiError) -> String {
  match error {
    ApiError::Auth { .. } => "Invalid email or password".to_string(),
    other => other.user_message(),
  }
}

impl View for LoginView {
  fn route(&self) -> Route {
    Route::Login
  }

  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
      return ViewAction::Navigate(Route::Register);
    }

    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submit) => {
        self.submit();
        ViewAction::None
      }
      KeyResult::Event(FormEvent::Cancel) | KeyResult::Handled | KeyResult::NotHandled => {
        ViewAction::None
      }
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = if self.request.is_pending() {
      " Sign in (signing in...) "
    } else {
      " Sign in "
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
      Constraint::Length(self.form.height()),
      Constraint::Length(1),
      Constraint::Min(0),
    ])
    .split(inner);

    self.form.render(frame, chunks[0]);

    let hint = Paragraph::new("Enter: sign in   Tab: next field   Ctrl-R: create an account")
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hint, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    "Login".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    match self.request.poll() {
      Some(result) => self.on_result(result),
      None => ViewAction::None,
    }
  }

  fn is_editing(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("enter", "sign in"),
      Shortcut::new("ctrl-r", "register"),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::{press, settle, type_text, TestContext};
  use reqwest::Method;
  use serde_json::json;

  fn fill(view: &mut LoginView, email: &str, password: &str) {
    type_text(view, email);
    press(view, KeyCode::Tab);
    type_text(view, password);
  }

  #[tokio::test]
  async fn test_mount_clears_existing_session() {
    let test = TestContext::signed_in(true);
    let _view = LoginView::new(test.ctx.clone());
    assert!(!test.ctx.session.is_logged_in());
  }

  #[tokio::test]
  async fn test_successful_login_signs_in_and_lands() {
    let test = TestContext::new();
    test.transport.respond(
      Method::POST,
      "/auth/login",
      200,
      json!({"token": "t1", "user": {"id": "1", "email": "a@x.com", "name": "A", "isSuperUser": false}}),
    );
    let mut view = LoginView::new(test.ctx.clone());

    fill(&mut view, "a@x.com", "secret");
    press(&mut view, KeyCode::Enter);
    settle().await;

    assert_eq!(view.tick(), ViewAction::Navigate(Route::Dashboard));
    let session = test.ctx.session.snapshot();
    assert_eq!(session.token(), Some("t1"));
    assert_eq!(session.user_id(), Some("1"));
    assert!(!session.is_super_user());
    assert!(session.is_logged_in());
    assert_eq!(
      test.transport.requests()[0].body,
      Some(json!({"email": "a@x.com", "password": "secret"}))
    );
  }

  #[tokio::test]
  async fn test_failed_login_toasts_and_stays_signed_out() {
    let mut test = TestContext::new();
    test.transport.respond(
      Method::POST,
      "/auth/login",
      400,
      json!({"message": "Account is suspended"}),
    );
    let mut view = LoginView::new(test.ctx.clone());

    fill(&mut view, "a@x.com", "secret");
    press(&mut view, KeyCode::Enter);
    settle().await;

    assert_eq!(view.tick(), ViewAction::None);
    assert!(!test.ctx.session.is_logged_in());
    assert_eq!(
      test.toast_messages(),
      vec!["Login failed: Account is suspended".to_string()]
    );
  }

  #[tokio::test]
  async fn test_rejected_credentials_message() {
    let mut test = TestContext::new();
    test
      .transport
      .respond(Method::POST, "/auth/login", 401, json!({}));
    let mut view = LoginView::new(test.ctx.clone());

    fill(&mut view, "a@x.com", "wrong");
    press(&mut view, KeyCode::Enter);
    settle().await;
    view.tick();

    assert_eq!(
      test.toast_messages(),
      vec!["Login failed: Invalid email or password".to_string()]
    );
  }

  #[tokio::test]
  async fn test_ctrl_r_opens_registration() {
    let test = TestContext::new();
    let mut view = LoginView::new(test.ctx.clone());
    let action = view.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
    assert_eq!(action, ViewAction::Navigate(Route::Register));
  }
}
