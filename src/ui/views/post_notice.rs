use crate::api::types::NoticeRequest;
use crate::guards::Route;
use crate::query::Mutation;
use crate::ui::components::{Form, FormEvent, KeyResult};
use crate::ui::context::AppContext;
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use serde_json::Value;
use tracing::{info, warn};

const TITLE: &str = "Title";
const DESCRIPTION: &str = "Description";

/// Trim both parts; both must be non-empty.
pub fn validate_notice(title: &str, text: &str) -> Result<NoticeRequest, &'static str> {
  let (title, text) = (title.trim(), text.trim());
  if title.is_empty() || text.is_empty() {
    return Err("Both Title and Description are required");
  }
  Ok(NoticeRequest {
    notice_title: title.to_string(),
    notice_text: text.to_string(),
  })
}

/// Form for posting a notice to everyone
pub struct PostNoticeView {
  ctx: AppContext,
  form: Form,
  request: Mutation<Value>,
}

impl PostNoticeView {
  pub fn new(ctx: AppContext) -> Self {
    Self {
      ctx,
      form: Form::new().field(TITLE).field(DESCRIPTION),
      request: Mutation::new(),
    }
  }

  fn submit(&mut self) {
    if self.request.is_pending() {
      return;
    }
    let notice = match validate_notice(self.form.value(TITLE), self.form.value(DESCRIPTION)) {
      Ok(notice) => notice,
      Err(message) => {
        self.ctx.toasts.error(message);
        return;
      }
    };

    let api = self.ctx.api.clone();
    self.request.start(async move { api.post_notice(&notice).await });
  }
}

impl View for PostNoticeView {
  fn route(&self) -> Route {
    Route::PostNotice
  }

  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.form.handle_key(key) {
      KeyResult::Event(FormEvent::Submit) => {
        self.submit();
        ViewAction::None
      }
      KeyResult::Event(FormEvent::Cancel) => ViewAction::Pop,
      KeyResult::Handled | KeyResult::NotHandled => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = if self.request.is_pending() {
      " Post notice (posting...) "
    } else {
      " Post notice "
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
    frame.render_widget(
      Paragraph::new("Enter on Description: post   Esc: close")
        .style(Style::default().fg(Color::DarkGray)),
      chunks[1],
    );
  }

  fn breadcrumb_label(&self) -> String {
    "Post notice".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    match self.request.poll() {
      Some(Ok(_)) => {
        info!("notice posted");
        self.ctx.toasts.info("Notice was posted successfully");
        ViewAction::Pop
      }
      Some(Err(e)) => {
        warn!(error = %e, "posting notice failed");
        self.ctx.toasts.error("Failed to post Notice.");
        ViewAction::None
      }
      None => ViewAction::None,
    }
  }

  fn is_editing(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![Shortcut::new("enter", "post"), Shortcut::new("esc", "close")]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::QueryKey;
  use crate::testutil::{press, settle, type_text, TestContext};
  use crossterm::event::KeyCode;
  use reqwest::Method;
  use serde_json::json;

  fn fill(view: &mut PostNoticeView, title: &str, text: &str) {
    type_text(view, title);
    press(view, KeyCode::Tab);
    type_text(view, text);
    press(view, KeyCode::Enter);
  }

  #[test]
  fn test_validate_notice_trims() {
    let notice = validate_notice("  Hi ", " there ").unwrap();
    assert_eq!(notice.notice_title, "Hi");
    assert_eq!(notice.notice_text, "there");
    assert!(validate_notice("   ", "body").is_err());
    assert!(validate_notice("title", "").is_err());
  }

  #[tokio::test]
  async fn test_empty_title_sends_nothing() {
    let mut test = TestContext::signed_in(true);
    let mut view = PostNoticeView::new(test.ctx.clone());

    fill(&mut view, "", "body");
    settle().await;

    assert!(test.transport.requests().is_empty());
    assert_eq!(
      test.toast_messages(),
      vec!["Both Title and Description are required".to_string()]
    );
  }

  #[tokio::test]
  async fn test_posting_invalidates_notices_and_closes() {
    let mut test = TestContext::signed_in(true);
    test.transport.respond(Method::GET, "/notices", 200, json!([]));
    test.ctx.api.notices().await.unwrap();
    test.transport.respond(Method::POST, "/notices", 201, json!({"id": 4}));
    let mut view = PostNoticeView::new(test.ctx.clone());

    fill(&mut view, " Holiday ", "Office closed Monday");
    settle().await;

    assert_eq!(view.tick(), ViewAction::Pop);
    assert!(test.ctx.api.cache().is_stale(&QueryKey::Notices));
    assert_eq!(
      test.toast_messages(),
      vec!["Notice was posted successfully".to_string()]
    );
    let post = test
      .transport
      .requests()
      .into_iter()
      .find(|r| r.method == Method::POST)
      .unwrap();
    assert_eq!(
      post.body,
      Some(json!({"notice_title": "Holiday", "notice_text": "Office closed Monday"}))
    );
  }

  #[tokio::test]
  async fn test_failure_keeps_form_open_with_input() {
    let mut test = TestContext::signed_in(true);
    test
      .transport
      .fail(Method::POST, "/notices", "connection reset");
    let mut view = PostNoticeView::new(test.ctx.clone());

    fill(&mut view, "Holiday", "Office closed Monday");
    settle().await;

    assert_eq!(view.tick(), ViewAction::None);
    assert_eq!(view.form.value(TITLE), "Holiday");
    assert_eq!(view.form.value(DESCRIPTION), "Office closed Monday");
    assert_eq!(test.toast_messages(), vec!["Failed to post Notice.".to_string()]);
  }
}
