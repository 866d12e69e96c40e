//! Failure taxonomy for backend calls.

use serde::Deserialize;

/// A failed backend call, classified by how the UI should react.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
  /// No response was received.
  #[error("network error: {0}")]
  Network(String),
  /// The server rejected our credentials (401/403).
  #[error("not authorized (HTTP {status})")]
  Auth { status: u16 },
  /// A 4xx with a message the server meant for the user.
  #[error("{message}")]
  Validation { status: u16, message: String },
  /// Anything else.
  #[error("unexpected error: {0}")]
  Unknown(String),
}

#[derive(Deserialize)]
struct ErrorBody {
  message: String,
}

impl ApiError {
  /// Classify a non-success response.
  pub fn from_response(status: u16, body: &str) -> Self {
    match status {
      401 | 403 => Self::Auth { status },
      400..=499 => match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { message }) => Self::Validation { status, message },
        Err(_) => Self::Unknown(format!("HTTP {}", status)),
      },
      _ => Self::Unknown(format!("HTTP {}", status)),
    }
  }

  pub fn is_auth(&self) -> bool {
    matches!(self, Self::Auth { .. })
  }

  /// Text to show the user in a toast or inline message.
  pub fn user_message(&self) -> String {
    match self {
      Self::Network(_) => "Could not reach the server. Please try again.".to_string(),
      Self::Auth { .. } => "Your session has expired. Please log in again.".to_string(),
      Self::Validation { message, .. } => message.clone(),
      Self::Unknown(_) => "Unknown error".to_string(),
    }
  }
}
