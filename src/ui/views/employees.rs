use crate::api::types::Employee;
use crate::guards::Route;
use crate::query::{Query, QueryState};
use crate::ui::context::AppContext;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{account_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::sync::Arc;

/// Employee directory
pub struct EmployeesView {
  query: Query<Arc<Vec<Employee>>>,
  list_state: ListState,
}

impl EmployeesView {
  pub fn new(ctx: AppContext) -> Self {
    let api = ctx.api.clone();
    let mut query = Query::new(move || {
      let api = api.clone();
      async move { api.employees().await }
    });
    query.fetch();

    Self {
      query,
      list_state: ListState::default(),
    }
  }

  fn employees(&self) -> &[Employee] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.employees().len();
    ensure_valid_selection(&mut self.list_state, len);

    let title = match self.query.state() {
      QueryState::Loading => " Employees (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Employees (error: {}) ", e.user_message()),
      _ => format!(" Employees ({}) ", len),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 && !self.query.is_loading() {
      let content = if self.query.is_error() {
        "Failed to load employees. Press 'r' to retry."
      } else {
        "No employees found."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .employees()
      .iter()
      .map(|employee| {
        let status = if employee.is_active { "active" } else { "suspended" };
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<6}", employee.id), Style::default().fg(Color::Cyan)),
          Span::raw(format!("{:<24}", truncate(&employee.name, 22))),
          Span::styled(
            format!("{:<20}", truncate(&employee.department, 18)),
            Style::default().fg(Color::Yellow),
          ),
          Span::styled(
            format!("{:<10}", status),
            Style::default().fg(account_color(employee.is_active)),
          ),
          Span::styled(employee.email.clone(), Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn selected_route(&self) -> Option<Route> {
    let idx = self.list_state.selected()?;
    let employee = self.employees().get(idx)?;
    Some(Route::EmployeeDetails {
      id: employee.id.clone(),
    })
  }
}

impl View for EmployeesView {
  fn route(&self) -> Route {
    Route::Employees
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
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Enter => self
        .selected_route()
        .map(ViewAction::Push)
        .unwrap_or(ViewAction::None),
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Employees".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    self.query.poll();
    ViewAction::None
  }

  fn resume(&mut self) {
    self.query.refetch();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("enter", "details").with_priority(20),
      Shortcut::new("r", "refresh").with_priority(30),
      Shortcut::new("q", "back").with_priority(40),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::{press, settle, TestContext};
  use reqwest::Method;
  use serde_json::json;

  #[tokio::test]
  async fn test_enter_opens_selected_employee() {
    let test = TestContext::signed_in(true);
    test.transport.respond(
      Method::GET,
      "/users/users/",
      200,
      json!([
        {"id": 7, "name": "Grace", "email": "grace@x.com", "isactive": true},
        {"id": 8, "name": "Alan", "email": "alan@x.com", "isactive": false},
      ]),
    );

    let mut view = EmployeesView::new(test.ctx.clone());
    settle().await;
    view.tick();
    let len = view.employees().len();
    ensure_valid_selection(&mut view.list_state, len);

    press(&mut view, KeyCode::Down);
    assert_eq!(
      press(&mut view, KeyCode::Enter),
      ViewAction::Push(Route::EmployeeDetails { id: "8".to_string() })
    );
  }

  #[tokio::test]
  async fn test_enter_without_data_does_nothing() {
    let test = TestContext::signed_in(true);
    let mut view = EmployeesView::new(test.ctx.clone());
    assert_eq!(press(&mut view, KeyCode::Enter), ViewAction::None);
  }
}
