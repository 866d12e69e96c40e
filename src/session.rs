//! Authentication state for the running client.
//!
//! The session is owned by a single [`SessionStore`] that is passed around
//! explicitly (as a [`SessionHandle`]) rather than living in a global. Every
//! change is written to durable storage first and only then applied in
//! memory, so the persisted copy always mirrors what guards see.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::types::AuthUser;
use crate::storage::{LocalStorage, StorageError};

pub const TOKEN_KEY: &str = "token";
pub const USER_ID_KEY: &str = "userId";
pub const EMAIL_KEY: &str = "email";
pub const NAME_KEY: &str = "name";
pub const SUPER_USER_KEY: &str = "isSuperUser";
/// Full name from the employee record, kept for the next start-up
pub const DISPLAY_NAME_KEY: &str = "displayName";

/// Snapshot of the authentication state.
///
/// `is_logged_in` is derived from the token, so it cannot disagree with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
  token: Option<String>,
  user_id: Option<String>,
  email: Option<String>,
  name: Option<String>,
  is_super_user: bool,
}

impl Session {
  /// A signed-in session for `user`.
  pub fn signed_in(token: impl Into<String>, user: &AuthUser) -> Self {
    Self {
      token: Some(token.into()),
      user_id: Some(user.id.clone()),
      email: Some(user.email.clone()),
      name: Some(user.name.clone()),
      is_super_user: user.is_super_user,
    }
  }

  pub fn is_logged_in(&self) -> bool {
    self.token.is_some()
  }

  pub fn token(&self) -> Option<&str> {
    self.token.as_deref()
  }

  pub fn user_id(&self) -> Option<&str> {
    self.user_id.as_deref()
  }

  pub fn email(&self) -> Option<&str> {
    self.email.as_deref()
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  pub fn is_super_user(&self) -> bool {
    self.is_super_user
  }

  /// Rebuild a session from persisted items. Anything without a token is
  /// treated as signed out.
  fn load(storage: &dyn LocalStorage) -> Result<Self, StorageError> {
    let Some(token) = storage.get_item(TOKEN_KEY)? else {
      return Ok(Self::default());
    };

    Ok(Self {
      token: Some(token),
      user_id: storage.get_item(USER_ID_KEY)?,
      email: storage.get_item(EMAIL_KEY)?,
      name: storage.get_item(NAME_KEY)?,
      is_super_user: storage.get_item(SUPER_USER_KEY)?.as_deref() == Some("true"),
    })
  }
}

/// Shared handle to the session store.
pub type SessionHandle = Arc<SessionStore>;

/// Owner of the session state and its persisted copy.
pub struct SessionStore {
  storage: Arc<dyn LocalStorage>,
  state: watch::Sender<Session>,
}

impl SessionStore {
  /// Create a store, restoring any session persisted in `storage`.
  pub fn restore(storage: Arc<dyn LocalStorage>) -> Result<Self, StorageError> {
    let session = Session::load(storage.as_ref())?;
    if session.is_logged_in() {
      info!(user_id = ?session.user_id(), "restored persisted session");
    }
    let (state, _) = watch::channel(session);
    Ok(Self { storage, state })
  }

  /// Sign in. Overwrites any existing session.
  pub fn login(&self, token: &str, user: &AuthUser) -> Result<(), StorageError> {
    let super_user = if user.is_super_user { "true" } else { "false" };
    self.storage.set_items(&[
      (TOKEN_KEY, token),
      (USER_ID_KEY, user.id.as_str()),
      (EMAIL_KEY, user.email.as_str()),
      (NAME_KEY, user.name.as_str()),
      (SUPER_USER_KEY, super_user),
    ])?;

    self.state.send_replace(Session::signed_in(token, user));
    info!(user_id = %user.id, super_user = user.is_super_user, "logged in");
    Ok(())
  }

  /// Sign out and wipe durable storage. Safe to call when already signed out.
  pub fn logout(&self) -> Result<(), StorageError> {
    self.storage.clear()?;

    let changed = self.state.send_if_modified(|session| {
      if session.is_logged_in() {
        *session = Session::default();
        true
      } else {
        false
      }
    });
    if changed {
      info!("logged out");
    }
    Ok(())
  }

  /// Sign out after the server rejected our credentials.
  pub fn expire(&self) {
    if let Err(e) = self.logout() {
      warn!(error = %e, "failed to clear persisted session");
    }
  }

  /// Read a value stored next to the session. Cleared on logout like the rest.
  pub fn get_local_item(&self, key: &str) -> Result<Option<String>, StorageError> {
    self.storage.get_item(key)
  }

  pub fn set_local_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
    self.storage.set_item(key, value)
  }

  pub fn snapshot(&self) -> Session {
    self.state.borrow().clone()
  }

  pub fn token(&self) -> Option<String> {
    self.state.borrow().token.clone()
  }

  pub fn is_logged_in(&self) -> bool {
    self.state.borrow().is_logged_in()
  }

  /// Receive every session change.
  pub fn subscribe(&self) -> watch::Receiver<Session> {
    self.state.subscribe()
  }
}
