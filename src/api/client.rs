//! HTTP client adapter: base URL, bearer token and failure classification.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::error::ApiError;
use super::transport::{HttpRequest, Transport, TransportError};
use crate::session::SessionHandle;

/// Adapter every backend call goes through.
#[derive(Clone)]
pub struct HttpClient {
  base_url: Url,
  transport: Arc<dyn Transport>,
  session: SessionHandle,
}

impl HttpClient {
  pub fn new(base_url: Url, transport: Arc<dyn Transport>, session: SessionHandle) -> Self {
    Self {
      base_url,
      transport,
      session,
    }
  }

  /// Resolve `path` (which starts with `/`) against the base URL, keeping
  /// any path prefix the base URL carries.
  fn url_for(&self, path: &str) -> String {
    format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
  }

  /// Send a request and decode the JSON response body.
  ///
  /// A 401/403 signs the session out before the error is returned, so the
  /// guards send the user back to the login view.
  pub async fn request<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    body: Option<Value>,
  ) -> Result<T, ApiError> {
    let request = HttpRequest {
      method,
      url: self.url_for(path),
      bearer: self.session.token(),
      body,
    };
    debug!(method = %request.method, url = %request.url, "sending request");

    let method = request.method.clone();
    let response = self.transport.send(request).await.map_err(|e| match e {
      TransportError::NoResponse(message) => {
        warn!(%method, path, error = %message, "request failed without a response");
        ApiError::Network(message)
      }
      TransportError::Body { status, .. } => {
        warn!(%method, path, status, error = %e, "response body unreadable");
        ApiError::Unknown(e.to_string())
      }
    })?;

    if !(200..300).contains(&response.status) {
      let err = ApiError::from_response(response.status, &response.body);
      warn!(%method, path, status = response.status, error = %err, "request rejected");
      if err.is_auth() {
        self.session.expire();
      }
      return Err(err);
    }

    let value = if response.body.trim().is_empty() {
      Value::Null
    } else {
      serde_json::from_str(&response.body)
        .map_err(|e| ApiError::Unknown(format!("invalid JSON from {}: {}", path, e)))?
    };
    serde_json::from_value(value)
      .map_err(|e| ApiError::Unknown(format!("unexpected response from {}: {}", path, e)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::{signed_in_user, FakeTransport};
  use serde_json::json;

  fn client(transport: Arc<FakeTransport>) -> HttpClient {
    let session = crate::testutil::session();
    HttpClient::new(
      Url::parse("http://hr.test/api/").unwrap(),
      transport,
      session,
    )
  }

  #[tokio::test]
  async fn test_success_decodes_json() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::GET, "/notices", 200, json!([{"id": 1, "notice_title": "Hi"}]));

    let value: Value = client(transport.clone())
      .request(Method::GET, "/notices", None)
      .await
      .unwrap();
    assert_eq!(value[0]["notice_title"], "Hi");
    assert_eq!(transport.requests()[0].url, "http://hr.test/api/notices");
  }

  #[tokio::test]
  async fn test_empty_body_is_null() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond_raw(Method::DELETE, "/action/suspend-activate/a@x.com", 204, "");

    let value: Value = client(transport)
      .request(Method::DELETE, "/action/suspend-activate/a@x.com", None)
      .await
      .unwrap();
    assert_eq!(value, Value::Null);
  }

  #[tokio::test]
  async fn test_bearer_only_when_logged_in() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::GET, "/notices", 200, json!([]));
    let client = client(transport.clone());

    let _: Value = client.request(Method::GET, "/notices", None).await.unwrap();
    client
      .session
      .login("t1", &signed_in_user("1", false))
      .unwrap();
    let _: Value = client.request(Method::GET, "/notices", None).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].bearer, None);
    assert_eq!(requests[1].bearer.as_deref(), Some("t1"));
  }

  #[tokio::test]
  async fn test_unauthorized_forces_logout() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::GET, "/users/users/", 401, json!({"message": "expired"}));
    let client = client(transport);
    client
      .session
      .login("t1", &signed_in_user("1", true))
      .unwrap();

    let err = client
      .request::<Value>(Method::GET, "/users/users/", None)
      .await
      .unwrap_err();
    assert_eq!(err, ApiError::Auth { status: 401 });
    assert!(!client.session.is_logged_in());
  }

  #[tokio::test]
  async fn test_validation_error_keeps_session() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::POST, "/notices", 400, json!({"message": "title too long"}));
    let client = client(transport);
    client
      .session
      .login("t1", &signed_in_user("1", true))
      .unwrap();

    let err = client
      .request::<Value>(Method::POST, "/notices", Some(json!({})))
      .await
      .unwrap_err();
    assert_eq!(err.user_message(), "title too long");
    assert!(client.session.is_logged_in());
  }

  #[tokio::test]
  async fn test_transport_failure_is_network_error() {
    let transport = Arc::new(FakeTransport::new());
    transport.fail(Method::GET, "/notices", "connection refused");

    let err = client(transport)
      .request::<Value>(Method::GET, "/notices", None)
      .await
      .unwrap_err();
    assert_eq!(err, ApiError::Network("connection refused".to_string()));
  }

  #[tokio::test]
  async fn test_unreadable_body_is_unknown_error() {
    let transport = Arc::new(FakeTransport::new());
    transport.fail_body(Method::GET, "/notices", 200, "connection reset");

    let err = client(transport)
      .request::<Value>(Method::GET, "/notices", None)
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::Unknown(_)), "got {:?}", err);
  }

  #[tokio::test]
  async fn test_server_error_is_unknown() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::GET, "/notices", 503, json!({"message": "down"}));

    let err = client(transport)
      .request::<Value>(Method::GET, "/notices", None)
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::Unknown(_)));
  }
}
