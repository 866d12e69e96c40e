//! Dependencies handed to every view.

use tokio::sync::mpsc;

use crate::api::CachedHrApi;
use crate::session::SessionHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
  Info,
  Error,
}

/// A short message shown in the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
  pub level: ToastLevel,
  pub message: String,
}

/// Sender half of the toast queue.
#[derive(Clone)]
pub struct Toasts {
  tx: mpsc::UnboundedSender<Toast>,
}

impl Toasts {
  pub fn info(&self, message: impl Into<String>) {
    self.push(ToastLevel::Info, message.into());
  }

  pub fn error(&self, message: impl Into<String>) {
    self.push(ToastLevel::Error, message.into());
  }

  fn push(&self, level: ToastLevel, message: String) {
    // The receiver only goes away when the app is shutting down
    let _ = self.tx.send(Toast { level, message });
  }
}

/// Session, API and toast queue, threaded explicitly into each view.
#[derive(Clone)]
pub struct AppContext {
  pub api: CachedHrApi,
  pub session: SessionHandle,
  pub toasts: Toasts,
}

impl AppContext {
  /// Build a context and the receiving end of its toast queue.
  pub fn new(api: CachedHrApi, session: SessionHandle) -> (Self, mpsc::UnboundedReceiver<Toast>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let ctx = Self {
      api,
      session,
      toasts: Toasts { tx },
    };
    (ctx, rx)
  }
}
