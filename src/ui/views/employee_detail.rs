use crate::api::types::{Employee, LeaveDetail};
use crate::guards::Route;
use crate::query::{Mutation, Query, QueryState};
use crate::ui::context::AppContext;
use crate::ui::renderfns::{account_color, leave_status_color, short_date, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// One employee's record, leave history, and account suspension toggle
pub struct EmployeeDetailView {
  ctx: AppContext,
  id: String,
  employee: Query<Arc<Employee>>,
  leaves: Query<Arc<Vec<LeaveDetail>>>,
  toggle: Mutation<Value>,
  /// Direction of the toggle in flight; true means suspending
  suspending: bool,
}

impl EmployeeDetailView {
  pub fn new(id: String, ctx: AppContext) -> Self {
    let api = ctx.api.clone();
    let employee_id = id.clone();
    let mut employee = Query::new(move || {
      let api = api.clone();
      let id = employee_id.clone();
      async move { api.employee(&id).await }
    });

    let api = ctx.api.clone();
    let employee_id = id.clone();
    let mut leaves = Query::new(move || {
      let api = api.clone();
      let id = employee_id.clone();
      async move { api.leaves(&id).await }
    });

    employee.fetch();
    leaves.fetch();

    Self {
      ctx,
      id,
      employee,
      leaves,
      toggle: Mutation::new(),
      suspending: false,
    }
  }

  /// Suspend an active account or reactivate a suspended one.
  fn toggle_suspension(&mut self) {
    if self.toggle.is_pending() {
      return;
    }
    let Some(employee) = self.employee.data() else {
      return;
    };

    let suspend = employee.is_active;
    let email = employee.email.clone();
    let id = self.id.clone();
    let api = self.ctx.api.clone();
    if self
      .toggle
      .start(async move { api.set_account_suspended(&id, &email, suspend).await })
    {
      self.suspending = suspend;
    }
  }

  fn on_toggled(&mut self, result: Result<Value, crate::api::ApiError>) {
    match result {
      Ok(_) => {
        info!(employee = %self.id, suspended = self.suspending, "account status changed");
        let message = if self.suspending {
          "Employee disabled successfully."
        } else {
          "Employee re-activated successfully."
        };
        self.ctx.toasts.info(message);
        self.employee.refetch();
      }
      Err(e) => {
        warn!(employee = %self.id, error = %e, "account status change failed");
        self.ctx.toasts.error("Failed to disable employee.");
      }
    }
  }

  fn render_record(&self, frame: &mut Frame, area: Rect, employee: &Employee) {
    let label = |text: &'static str| Span::styled(format!("{:<13}", text), Style::default().fg(Color::DarkGray));

    let mut lines = Vec::new();
    if !employee.is_active {
      lines.push(Line::styled(
        " This account is suspended ",
        Style::default().fg(Color::White).bg(Color::Red).bold(),
      ));
    }
    lines.extend([
      Line::styled(employee.name.clone(), Style::default().fg(Color::Cyan).bold()),
      Line::from(vec![label("Email"), Span::raw(employee.email.clone())]),
      Line::from(vec![label("Department"), Span::raw(employee.department.clone())]),
      Line::from(vec![label("Designation"), Span::raw(employee.designation.clone())]),
      Line::from(vec![
        label("Joined"),
        Span::raw(short_date(&employee.joined_date).to_string()),
      ]),
      Line::from(vec![
        label("Account"),
        Span::styled(
          if employee.is_active { "Active" } else { "Suspended" },
          Style::default().fg(account_color(employee.is_active)),
        ),
      ]),
      Line::from(vec![
        label("Leave days"),
        Span::raw(format!(
          "{} total, {} used, {} remaining",
          employee.leaves.total, employee.leaves.used, employee.leaves.remaining
        )),
      ]),
    ]);

    frame.render_widget(Paragraph::new(lines), area);
  }

  fn render_leaves(&self, frame: &mut Frame, area: Rect) {
    let title = match self.leaves.state() {
      QueryState::Loading => " Leaves (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Leaves (error: {}) ", e.user_message()),
      _ => " Leaves ".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::TOP);

    let leaves = self.leaves.data().map(|v| v.as_slice()).unwrap_or(&[]);
    if leaves.is_empty() {
      let content = if self.leaves.is_success() {
        "No leave records."
      } else {
        ""
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let header = Row::new(["Applied", "From", "To", "Days", "Status", "Reason"])
      .style(Style::default().fg(Color::DarkGray));
    let rows = leaves.iter().map(|leave| {
      let days = leave
        .total_days()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "?".to_string());
      let status = leave.status_label();
      Row::new(vec![
        Cell::from(short_date(&leave.leave_apply_date).to_string()),
        Cell::from(short_date(&leave.start_date).to_string()),
        Cell::from(short_date(&leave.end_date).to_string()),
        Cell::from(days),
        Cell::from(status).style(Style::default().fg(leave_status_color(status))),
        Cell::from(truncate(&leave.reason, 40)),
      ])
    });

    let table = Table::new(
      rows,
      [
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(5),
        Constraint::Length(9),
        Constraint::Min(10),
      ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
  }
}

impl View for EmployeeDetailView {
  fn route(&self) -> Route {
    Route::EmployeeDetails { id: self.id.clone() }
  }

  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('s') => {
        self.toggle_suspension();
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.employee.refetch();
        self.leaves.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let title = match self.employee.state() {
      QueryState::Loading => format!(" Employee {} (loading...) ", self.id),
      QueryState::Error(e) => format!(" Employee {} (error: {}) ", self.id, e.user_message()),
      _ if self.toggle.is_pending() => format!(" Employee {} (updating...) ", self.id),
      _ => format!(" Employee {} ", self.id),
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(employee) = self.employee.data().cloned() else {
      if let Some(error) = self.employee.error() {
        let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", error.user_message()))
          .style(Style::default().fg(Color::Red));
        frame.render_widget(paragraph, inner);
      }
      return;
    };

    let chunks = Layout::vertical([Constraint::Length(9), Constraint::Min(3)]).split(inner);
    self.render_record(frame, chunks[0], &employee);
    self.render_leaves(frame, chunks[1]);
  }

  fn breadcrumb_label(&self) -> String {
    self
      .employee
      .data()
      .map(|e| e.name.clone())
      .filter(|name| !name.is_empty())
      .unwrap_or_else(|| self.id.clone())
  }

  fn tick(&mut self) -> ViewAction {
    self.employee.poll();
    self.leaves.poll();
    if let Some(result) = self.toggle.poll() {
      self.on_toggled(result);
    }
    ViewAction::None
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    let toggle = match self.employee.data() {
      Some(e) if !e.is_active => "reactivate",
      _ => "suspend",
    };
    vec![
      Shortcut::new(":", "command").with_priority(10),
      Shortcut::new("s", toggle).with_priority(20),
      Shortcut::new("r", "refresh").with_priority(30),
      Shortcut::new("q", "back").with_priority(40),
    ]
  }
}
