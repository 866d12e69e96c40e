//! Shared fixtures for unit tests.

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use reqwest::Method;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

use crate::api::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use crate::api::types::AuthUser;
use crate::api::{CachedHrApi, HrApi, HttpClient};
use crate::cache::QueryCache;
use crate::session::{SessionHandle, SessionStore};
use crate::storage::MemoryStorage;
use crate::ui::context::{AppContext, Toast};
use crate::ui::view::{View, ViewAction};

pub const BASE_URL: &str = "http://hr.test/api";

struct Route {
  method: Method,
  path: String,
  reply: Result<HttpResponse, TransportError>,
  delay: Duration,
}

/// Transport that answers from a script and records every request.
///
/// Routes are matched by method and by the URL ending in the route's path;
/// the longest matching path wins. Unmatched requests get a 404.
#[derive(Default)]
pub struct FakeTransport {
  routes: Mutex<Vec<Route>>,
  requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
  pub fn new() -> Self {
    Self::default()
  }

  /// Answer `method path` with `status` and a JSON body. Replaces any
  /// earlier script for the same route.
  pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
    self.respond_raw(method, path, status, &body.to_string());
  }

  pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: &str) {
    self.script(
      method,
      path,
      Ok(HttpResponse {
        status,
        body: body.to_string(),
      }),
      Duration::ZERO,
    );
  }

  /// Like [`respond`](Self::respond), but the reply arrives after `delay`.
  /// The reply is chosen when the request is sent, so rescripting the route
  /// later only affects later requests.
  pub fn respond_after(&self, method: Method, path: &str, status: u16, body: Value, delay: Duration) {
    self.script(
      method,
      path,
      Ok(HttpResponse {
        status,
        body: body.to_string(),
      }),
      delay,
    );
  }

  /// Fail `method path` without a response.
  pub fn fail(&self, method: Method, path: &str, message: &str) {
    self.script(
      method,
      path,
      Err(TransportError::NoResponse(message.to_string())),
      Duration::ZERO,
    );
  }

  /// Answer `method path` with a status line whose body cannot be read.
  pub fn fail_body(&self, method: Method, path: &str, status: u16, message: &str) {
    self.script(
      method,
      path,
      Err(TransportError::Body {
        status,
        message: message.to_string(),
      }),
      Duration::ZERO,
    );
  }

  fn script(
    &self,
    method: Method,
    path: &str,
    reply: Result<HttpResponse, TransportError>,
    delay: Duration,
  ) {
    let mut routes = self.routes.lock().unwrap();
    routes.retain(|r| !(r.method == method && r.path == path));
    routes.push(Route {
      method,
      path: path.to_string(),
      reply,
      delay,
    });
  }

  pub fn requests(&self) -> Vec<HttpRequest> {
    self.requests.lock().unwrap().clone()
  }

  /// Number of requests sent to `method path` (exact path match).
  pub fn count(&self, method: Method, path: &str) -> usize {
    let url = format!("{}{}", BASE_URL, path);
    self
      .requests()
      .iter()
      .filter(|r| r.method == method && r.url == url)
      .count()
  }
}

#[async_trait]
impl Transport for FakeTransport {
  async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
    self.requests.lock().unwrap().push(request.clone());

    let matched = {
      let routes = self.routes.lock().unwrap();
      routes
        .iter()
        .filter(|r| r.method == request.method && request.url.ends_with(&r.path))
        .max_by_key(|r| r.path.len())
        .map(|r| (r.reply.clone(), r.delay))
    };

    let Some((reply, delay)) = matched else {
      return Ok(HttpResponse {
        status: 404,
        body: String::new(),
      });
    };
    if !delay.is_zero() {
      tokio::time::sleep(delay).await;
    }
    reply
  }
}

pub fn signed_in_user(id: &str, super_user: bool) -> AuthUser {
  AuthUser {
    id: id.to_string(),
    email: format!("user{}@x.com", id),
    name: format!("User {}", id),
    is_super_user: super_user,
  }
}

/// A signed-out session backed by memory.
pub fn session() -> SessionHandle {
  Arc::new(SessionStore::restore(Arc::new(MemoryStorage::new())).unwrap())
}

fn http(transport: Arc<FakeTransport>, session: SessionHandle) -> HttpClient {
  HttpClient::new(Url::parse(BASE_URL).unwrap(), transport, session)
}

pub fn api(transport: Arc<FakeTransport>) -> HrApi {
  HrApi::new(http(transport, session()))
}

pub fn cached_api(transport: Arc<FakeTransport>) -> CachedHrApi {
  CachedHrApi::new(api(transport), QueryCache::new())
}

/// Everything a view needs, wired to `transport`.
pub struct TestContext {
  pub ctx: AppContext,
  pub transport: Arc<FakeTransport>,
  pub toasts: mpsc::UnboundedReceiver<Toast>,
}

impl TestContext {
  pub fn new() -> Self {
    let transport = Arc::new(FakeTransport::new());
    let session = session();
    let api = CachedHrApi::new(
      HrApi::new(http(transport.clone(), session.clone())),
      QueryCache::new(),
    );
    let (ctx, toasts) = AppContext::new(api, session);
    Self {
      ctx,
      transport,
      toasts,
    }
  }

  /// A context whose session is already signed in.
  pub fn signed_in(super_user: bool) -> Self {
    let test = Self::new();
    test
      .ctx
      .session
      .login("t1", &signed_in_user("1", super_user))
      .unwrap();
    test
  }

  /// Drain queued toast messages.
  pub fn toast_messages(&mut self) -> Vec<String> {
    let mut messages = Vec::new();
    while let Ok(toast) = self.toasts.try_recv() {
      messages.push(toast.message);
    }
    messages
  }
}

/// Let spawned requests finish.
pub async fn settle() {
  tokio::time::sleep(std::time::Duration::from_millis(20)).await;
}

/// Send a single key to `view`.
pub fn press(view: &mut dyn View, code: KeyCode) -> ViewAction {
  view.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
}

/// Type `text` into `view` one character at a time.
pub fn type_text(view: &mut dyn View, text: &str) {
  for c in text.chars() {
    press(view, KeyCode::Char(c));
  }
}
