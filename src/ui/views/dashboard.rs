use crate::api::types::{Employee, Notice};
use crate::api::ApiError;
use crate::guards::Route;
use crate::query::{Query, QueryState};
use crate::session::{SessionHandle, DISPLAY_NAME_KEY};
use crate::ui::context::AppContext;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{account_color, short_date, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use std::sync::Arc;
use tracing::warn;

/// Landing view: the signed-in user's profile and the notice board
pub struct DashboardView {
  session: SessionHandle,
  is_admin: bool,
  /// Name remembered from an earlier visit, shown while the profile loads
  known_name: Option<String>,
  profile: Query<Arc<Employee>>,
  notices: Query<Arc<Vec<Notice>>>,
  list_state: ListState,
}

impl DashboardView {
  pub fn new(ctx: AppContext) -> Self {
    let session = ctx.session.snapshot();
    let user_id = session.user_id().map(str::to_string);

    let api = ctx.api.clone();
    let mut profile = Query::new(move || {
      let api = api.clone();
      let user_id = user_id.clone();
      async move {
        let id = user_id.ok_or_else(|| ApiError::Unknown("no signed-in user".to_string()))?;
        api.employee(&id).await
      }
    });

    let api = ctx.api.clone();
    let mut notices = Query::new(move || {
      let api = api.clone();
      async move { api.notices().await }
    });

    profile.fetch();
    notices.fetch();

    let known_name = ctx
      .session
      .get_local_item(DISPLAY_NAME_KEY)
      .unwrap_or_else(|e| {
        warn!(error = %e, "failed to read display name");
        None
      });

    Self {
      session: ctx.session.clone(),
      is_admin: session.is_super_user(),
      known_name,
      profile,
      notices,
      list_state: ListState::default(),
    }
  }

  fn remember_name(&mut self) {
    let Some(name) = self.profile.data().map(|me| me.name.clone()) else {
      return;
    };
    if name.is_empty() || self.known_name.as_deref() == Some(name.as_str()) {
      return;
    }
    match self.session.set_local_item(DISPLAY_NAME_KEY, &name) {
      Ok(()) => self.known_name = Some(name),
      Err(e) => warn!(error = %e, "failed to store display name"),
    }
  }

  fn notice_list(&self) -> &[Notice] {
    self.notices.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn render_profile(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Profile ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let lines = match self.profile.state() {
      QueryState::Idle | QueryState::Loading => {
        let text = match &self.known_name {
          Some(name) => format!("Welcome back, {}. Loading profile...", name),
          None => "Loading profile...".to_string(),
        };
        vec![Line::styled(text, Style::default().fg(Color::DarkGray))]
      }
      QueryState::Error(e) => vec![Line::styled(
        format!("Error: {}", e.user_message()),
        Style::default().fg(Color::Red),
      )],
      QueryState::Success(me) => profile_lines(me),
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
  }

  fn render_notices(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.notice_list().len();
    ensure_valid_selection(&mut self.list_state, len);

    let title = match self.notices.state() {
      QueryState::Loading => " Notices (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Notices (error: {}) ", e.user_message()),
      _ => format!(" Notices ({}) ", len),
    };
    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 {
      let content = if self.notices.is_error() {
        "Failed to load notices. Press 'r' to retry."
      } else if self.notices.is_loading() {
        ""
      } else {
        "No notices."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let chunks = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
      .split(block.inner(area));
    frame.render_widget(block, area);

    let items: Vec<ListItem> = self
      .notice_list()
      .iter()
      .map(|notice| {
        let date = notice.created_at.as_deref().map(short_date).unwrap_or("");
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<11}", date), Style::default().fg(Color::DarkGray)),
          Span::raw(truncate(&notice.notice_title, 60)),
        ]))
      })
      .collect();

    let list = List::new(items)
      .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[0], &mut self.list_state);

    let selected = self
      .list_state
      .selected()
      .and_then(|idx| self.notice_list().get(idx));
    if let Some(notice) = selected {
      let body = Paragraph::new(notice.notice_text.as_str())
        .block(Block::default().borders(Borders::TOP).title(" Notice "))
        .wrap(Wrap { trim: true });
      frame.render_widget(body, chunks[1]);
    }
  }
}

fn profile_lines(me: &Employee) -> Vec<Line<'static>> {
  let field = |label: &str, value: String| {
    Line::from(vec![
      Span::styled(format!("{:<12}", label), Style::default().fg(Color::DarkGray)),
      Span::raw(value),
    ])
  };

  vec![
    Line::styled(me.name.clone(), Style::default().fg(Color::Cyan).bold()),
    field("Email", me.email.clone()),
    field("Department", me.department.clone()),
    field("Designation", me.designation.clone()),
    field("Joined", short_date(&me.joined_date).to_string()),
    Line::from(vec![
      Span::styled(format!("{:<12}", "Account"), Style::default().fg(Color::DarkGray)),
      Span::styled(
        if me.is_active { "Active" } else { "Suspended" },
        Style::default().fg(account_color(me.is_active)),
      ),
    ]),
    field(
      "Leaves",
      format!(
        "{} remaining of {} ({} used)",
        me.leaves.remaining, me.leaves.total, me.leaves.used
      ),
    ),
  ]
}

impl View for DashboardView {
  fn route(&self) -> Route {
    Route::Dashboard
  }

  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.profile.refetch();
        self.notices.refetch();
        ViewAction::None
      }
      KeyCode::Char('e') if self.is_admin => ViewAction::Push(Route::Employees),
      KeyCode::Char('n') if self.is_admin => ViewAction::Push(Route::PostNotice),
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Length(48), Constraint::Min(20)]).split(area);
    self.render_profile(frame, chunks[0]);
    self.render_notices(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    "Dashboard".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    if self.profile.poll() {
      self.remember_name();
    }
    self.notices.poll();
    ViewAction::None
  }

  /// Returning from a pushed view picks up anything it invalidated.
  fn resume(&mut self) {
    self.profile.refetch();
    self.notices.refetch();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    let mut shortcuts = vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("r", "refresh").with_priority(20),
    ];
    if self.is_admin {
      shortcuts.push(Shortcut::new("e", "employees").with_priority(30));
      shortcuts.push(Shortcut::new("n", "post notice").with_priority(40));
    }
    shortcuts
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::{press, settle, TestContext};
  use reqwest::Method;
  use serde_json::json;

  fn script(test: &TestContext) {
    test.transport.respond(
      Method::GET,
      "/users/users/1/",
      200,
      json!({"id": 1, "name": "User 1", "email": "user1@x.com", "isactive": true}),
    );
    test.transport.respond(
      Method::GET,
      "/notices",
      200,
      json!([{"id": 3, "notice_title": "Office closed", "notice_text": "Friday"}]),
    );
  }

  #[tokio::test]
  async fn test_loads_profile_and_notices() {
    let test = TestContext::signed_in(false);
    script(&test);

    let mut view = DashboardView::new(test.ctx.clone());
    settle().await;
    view.tick();

    assert_eq!(view.profile.data().map(|me| me.name.as_str()), Some("User 1"));
    assert_eq!(view.notice_list().len(), 1);
    assert_eq!(
      test.ctx.session.get_local_item(DISPLAY_NAME_KEY).unwrap().as_deref(),
      Some("User 1")
    );
  }

  #[tokio::test]
  async fn test_remembered_name_is_read_on_mount() {
    let test = TestContext::signed_in(false);
    test.ctx.session.set_local_item(DISPLAY_NAME_KEY, "Ada").unwrap();

    let view = DashboardView::new(test.ctx.clone());
    assert_eq!(view.known_name.as_deref(), Some("Ada"));
  }

  #[tokio::test]
  async fn test_resume_only_refetches_invalidated_keys() {
    let test = TestContext::signed_in(true);
    script(&test);

    let mut view = DashboardView::new(test.ctx.clone());
    settle().await;
    view.tick();

    test.ctx.api.cache().invalidate(&crate::cache::QueryKey::Notices);
    view.resume();
    settle().await;
    view.tick();

    assert_eq!(test.transport.count(Method::GET, "/notices"), 2);
    assert_eq!(test.transport.count(Method::GET, "/users/users/1/"), 1);
  }

  #[tokio::test]
  async fn test_admin_shortcuts() {
    let test = TestContext::signed_in(true);
    let mut view = DashboardView::new(test.ctx.clone());
    assert_eq!(press(&mut view, KeyCode::Char('e')), ViewAction::Push(Route::Employees));
    assert_eq!(press(&mut view, KeyCode::Char('n')), ViewAction::Push(Route::PostNotice));

    let test = TestContext::signed_in(false);
    let mut view = DashboardView::new(test.ctx.clone());
    assert_eq!(press(&mut view, KeyCode::Char('e')), ViewAction::None);
  }
}
