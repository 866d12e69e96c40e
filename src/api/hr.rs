use reqwest::Method;
use serde_json::Value;
use url::{form_urlencoded, Url};

use super::client::HttpClient;
use super::error::ApiError;
use super::types::{
  Employee, LeaveDetail, LoginRequest, LoginResponse, Notice, NoticeRequest, RegisterRequest,
};

/// HR backend API client
#[derive(Clone)]
pub struct HrApi {
  http: HttpClient,
}

impl HrApi {
  pub fn new(http: HttpClient) -> Self {
    Self { http }
  }

  /// Exchange credentials for a token
  pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
    self
      .http
      .request(Method::POST, "/auth/login", Some(to_body(request)?))
      .await
  }

  /// Create an account using a one-time code
  pub async fn register(&self, request: &RegisterRequest) -> Result<Value, ApiError> {
    self
      .http
      .request(Method::POST, "/auth/register", Some(to_body(request)?))
      .await
  }

  /// List all employees
  pub async fn list_employees(&self) -> Result<Vec<Employee>, ApiError> {
    self.http.request(Method::GET, "/users/users/", None).await
  }

  /// Get a single employee by id
  pub async fn get_employee(&self, id: &str) -> Result<Employee, ApiError> {
    let path = format!("/users/users/{}/", path_segment(id)?);
    self.http.request(Method::GET, &path, None).await
  }

  /// Get the leave records of an employee
  pub async fn get_employee_leaves(&self, employee_id: &str) -> Result<Vec<LeaveDetail>, ApiError> {
    let id: String = form_urlencoded::byte_serialize(employee_id.as_bytes()).collect();
    let path = format!("/leaves/?id={}", id);
    self.http.request(Method::GET, &path, None).await
  }

  /// List notices
  pub async fn list_notices(&self) -> Result<Vec<Notice>, ApiError> {
    self.http.request(Method::GET, "/notices", None).await
  }

  /// Post a new notice
  pub async fn post_notice(&self, notice: &NoticeRequest) -> Result<Value, ApiError> {
    self
      .http
      .request(Method::POST, "/notices", Some(to_body(notice)?))
      .await
  }

  /// Suspend an active account (`DELETE`) or reactivate a suspended one (`PATCH`)
  pub async fn set_account_suspended(&self, email: &str, suspend: bool) -> Result<Value, ApiError> {
    let path = format!("/action/suspend-activate/{}", path_segment(email)?);
    let method = if suspend { Method::DELETE } else { Method::PATCH };
    self.http.request(method, &path, None).await
  }
}

/// Percent-encode `value` so it stays a single path segment.
fn path_segment(value: &str) -> Result<String, ApiError> {
  let mut url = Url::parse("http://segment.invalid/")
    .map_err(|e| ApiError::Unknown(format!("failed to encode path: {}", e)))?;
  url
    .path_segments_mut()
    .map_err(|()| ApiError::Unknown("failed to encode path".to_string()))?
    .clear()
    .push(value);
  Ok(url.path().trim_start_matches('/').to_string())
}

fn to_body(value: &impl serde::Serialize) -> Result<Value, ApiError> {
  serde_json::to_value(value).map_err(|e| ApiError::Unknown(format!("failed to encode request: {}", e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::{api, FakeTransport};
  use serde_json::json;
  use std::sync::Arc;

  #[tokio::test]
  async fn test_login_posts_credentials() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(
      Method::POST,
      "/auth/login",
      200,
      json!({"token": "t1", "user": {"id": "1", "email": "a@x.com", "name": "A", "isSuperUser": false}}),
    );

    let response = api(transport.clone())
      .login(&LoginRequest {
        email: "a@x.com".to_string(),
        password: "secret".to_string(),
      })
      .await
      .unwrap();

    assert_eq!(response.token, "t1");
    let sent = &transport.requests()[0];
    assert_eq!(sent.body, Some(json!({"email": "a@x.com", "password": "secret"})));
  }

  #[tokio::test]
  async fn test_employee_leaves_query_string() {
    let transport = Arc::new(FakeTransport::new());
    transport.respond(Method::GET, "/leaves/?id=42", 200, json!([]));

    let leaves = api(transport.clone()).get_employee_leaves("42").await.unwrap();
    assert!(leaves.is_empty());
    assert_eq!(transport.count(Method::GET, "/leaves/?id=42"), 1);
  }

  #[tokio::test]
  async fn test_suspend_and_reactivate_methods() {
    let transport = Arc::new(FakeTransport::new());
    let path = "/action/suspend-activate/a@x.com";
    transport.respond(Method::DELETE, path, 200, json!({}));
    transport.respond(Method::PATCH, path, 200, json!({}));
    let api = api(transport.clone());

    api.set_account_suspended("a@x.com", true).await.unwrap();
    api.set_account_suspended("a@x.com", false).await.unwrap();

    assert_eq!(transport.count(Method::DELETE, path), 1);
    assert_eq!(transport.count(Method::PATCH, path), 1);
  }

  #[tokio::test]
  async fn test_email_with_reserved_characters_stays_one_segment() {
    let transport = Arc::new(FakeTransport::new());
    let path = "/action/suspend-activate/a%2Fb%23c%3F@x.com";
    transport.respond(Method::DELETE, path, 200, json!({}));

    api(transport.clone())
      .set_account_suspended("a/b#c?@x.com", true)
      .await
      .unwrap();

    assert_eq!(transport.count(Method::DELETE, path), 1);
  }

  #[test]
  fn test_path_segment_keeps_plain_values() {
    assert_eq!(path_segment("grace@x.com").unwrap(), "grace@x.com");
    assert_eq!(path_segment("7").unwrap(), "7");
    assert_eq!(path_segment("a b%").unwrap(), "a%20b%25");
  }
}
