use crate::commands::CommandAction;
use crate::event::{Event, EventHandler};
use crate::guards::{self, Route};
use crate::session::Session;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::context::{AppContext, Toast, ToastLevel};
use crate::ui::view::{View, ViewAction};
use crate::ui::views;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

const TICK_RATE: Duration = Duration::from_millis(100);
const TOAST_TTL: Duration = Duration::from_secs(5);

/// Main application state
pub struct App {
  ctx: AppContext,
  title: String,
  api_url: String,

  /// Navigation stack, current view last
  view_stack: Vec<Box<dyn View>>,

  palette: CommandInput,

  toasts: mpsc::UnboundedReceiver<Toast>,
  /// Latest toast and when it arrived
  toast: Option<(Toast, Instant)>,

  session_rx: watch::Receiver<Session>,

  should_quit: bool,
}

impl App {
  /// Build the app and mount whatever the landing route resolves to.
  pub fn new(
    ctx: AppContext,
    toasts: mpsc::UnboundedReceiver<Toast>,
    title: impl Into<String>,
    api_url: impl Into<String>,
  ) -> Self {
    let session_rx = ctx.session.subscribe();
    let mut app = Self {
      ctx,
      title: title.into(),
      api_url: api_url.into(),
      view_stack: Vec::new(),
      palette: CommandInput::new(),
      toasts,
      toast: None,
      session_rx,
      should_quit: false,
    };
    app.navigate(Route::LANDING);
    app
  }

  pub async fn run(&mut self) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = self.event_loop(&mut terminal).await;
    ratatui::restore();
    result
  }

  async fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Resize | Event::Tick => {}
    }
    self.tick();
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    match self.palette.handle_key(key) {
      KeyResult::NotHandled => {}
      KeyResult::Handled | KeyResult::Event(CommandEvent::Cancelled) => return,
      KeyResult::Event(CommandEvent::Run(action)) => {
        self.run_command(action);
        return;
      }
      KeyResult::Event(CommandEvent::Unknown(input)) => {
        self.show_toast(Toast {
          level: ToastLevel::Error,
          message: format!("Unknown command: {}", input),
        });
        return;
      }
    }

    let editing = self.current_view().is_some_and(|v| v.is_editing());
    if key.code == KeyCode::Char(':') && !editing && self.ctx.session.is_logged_in() {
      self.palette.activate(self.ctx.session.snapshot().is_super_user());
      return;
    }

    if let Some(view) = self.view_stack.last_mut() {
      let action = view.handle_key(key);
      self.apply(action);
    }
  }

  /// Poll async work: view queries, toasts, and session changes.
  fn tick(&mut self) {
    if let Some(view) = self.view_stack.last_mut() {
      let action = view.tick();
      self.apply(action);
    }

    while let Ok(toast) = self.toasts.try_recv() {
      self.show_toast(toast);
    }
    if self
      .toast
      .as_ref()
      .is_some_and(|(_, at)| at.elapsed() >= TOAST_TTL)
    {
      self.toast = None;
    }

    if self.session_rx.has_changed().unwrap_or(false) {
      let session = self.session_rx.borrow_and_update().clone();
      self.on_session_changed(&session);
    }
  }

  /// Sign-out (explicit or forced by a 401) drops cached data and
  /// re-runs the guard of the current view.
  fn on_session_changed(&mut self, session: &Session) {
    if !session.is_logged_in() {
      self.ctx.api.cache().clear();
    }

    let Some(route) = self.current_route() else {
      return;
    };
    let allowed = guards::resolve(route.clone(), session);
    if allowed != route {
      info!(from = ?route, to = ?allowed, "session changed, leaving view");
      self.navigate(allowed);
    }
  }

  fn show_toast(&mut self, toast: Toast) {
    self.toast = Some((toast, Instant::now()));
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Navigate(route) => self.navigate(route),
      ViewAction::Push(route) => self.push(route),
      ViewAction::Pop => self.pop(),
    }
  }

  /// Replace the whole stack with `route`, or wherever its guard sends us.
  fn navigate(&mut self, route: Route) {
    let target = guards::resolve(route.clone(), &self.ctx.session.snapshot());
    if target != route {
      info!(requested = ?route, redirected = ?target, "navigation redirected");
    }

    self.view_stack.clear();
    let view = views::build(&target, &self.ctx);
    self.view_stack.push(view);
  }

  /// Open `route` on top of the current view. A redirect replaces the stack.
  fn push(&mut self, route: Route) {
    let target = guards::resolve(route.clone(), &self.ctx.session.snapshot());
    if target != route {
      self.navigate(route);
      return;
    }
    let view = views::build(&target, &self.ctx);
    self.view_stack.push(view);
  }

  fn pop(&mut self) {
    if self.view_stack.len() > 1 {
      self.view_stack.pop();
      if let Some(view) = self.view_stack.last_mut() {
        view.resume();
      }
    } else if self.current_route() != Some(Route::LANDING)
      && self.ctx.session.is_logged_in()
    {
      self.navigate(Route::LANDING);
    }
  }

  fn run_command(&mut self, action: CommandAction) {
    match action {
      CommandAction::OpenDashboard => self.navigate(Route::Dashboard),
      CommandAction::OpenEmployees => self.open_over_dashboard(Route::Employees),
      CommandAction::OpenPostNotice => self.open_over_dashboard(Route::PostNotice),
      CommandAction::Logout => {
        if let Err(e) = self.ctx.session.logout() {
          warn!(error = %e, "logout failed");
          self.ctx.toasts.error(format!("Logout failed: {}", e));
          return;
        }
        self.navigate(Route::Login);
      }
      CommandAction::Quit => self.should_quit = true,
    }
  }

  /// Commands open admin views with the dashboard underneath, so `q`
  /// always leads back to it.
  fn open_over_dashboard(&mut self, route: Route) {
    self.navigate(Route::Dashboard);
    self.push(route);
  }

  pub fn current_route(&self) -> Option<Route> {
    self.current_view().map(|v| v.route())
  }

  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self.view_stack.iter().map(|v| v.breadcrumb_label()).collect()
  }

  pub fn toast(&self) -> Option<&Toast> {
    self.toast.as_ref().map(|(toast, _)| toast)
  }

  pub fn palette(&self) -> &CommandInput {
    &self.palette
  }

  pub fn session(&self) -> Session {
    self.ctx.session.snapshot()
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn api_url(&self) -> &str {
    &self.api_url
  }
}
