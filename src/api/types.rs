//! Serde types for the HR backend's request and response bodies.
//!
//! Field names follow the backend's JSON exactly; mixed camelCase and
//! snake_case is what the server sends.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Authentication
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
  pub email: String,
  pub password: String,
}

/// The user block returned alongside a login token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
  #[serde(deserialize_with = "string_or_number")]
  pub id: String,
  pub email: String,
  pub name: String,
  #[serde(rename = "isSuperUser", default)]
  pub is_super_user: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
  pub token: String,
  pub user: AuthUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
  pub email: String,
  pub password: String,
  pub name: String,
  pub department: String,
  pub date_of_birth: String,
  pub temporary_token: String,
}

// ============================================================================
// Employees and leaves
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LeaveSummary {
  #[serde(default)]
  pub total: i64,
  #[serde(default)]
  pub used: i64,
  #[serde(default)]
  pub remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaveDetail {
  #[serde(deserialize_with = "string_or_number")]
  pub id: String,
  #[serde(default)]
  pub user_email: String,
  pub start_date: String,
  pub end_date: String,
  #[serde(default)]
  pub leave_apply_date: String,
  #[serde(default)]
  pub is_approved: bool,
  #[serde(default)]
  pub reason: String,
  #[serde(rename = "approverId", default)]
  pub approver_id: Option<String>,
}

impl LeaveDetail {
  /// Inclusive number of calendar days covered, if both dates parse.
  pub fn total_days(&self) -> Option<i64> {
    let start = parse_date(&self.start_date)?;
    let end = parse_date(&self.end_date)?;
    Some((end - start).num_days() + 1)
  }

  pub fn status_label(&self) -> &'static str {
    if self.is_approved {
      "Approved"
    } else {
      "Pending"
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Employee {
  #[serde(deserialize_with = "string_or_number")]
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(rename = "roleHierarchy", default)]
  pub role_hierarchy: i64,
  #[serde(default)]
  pub department: String,
  #[serde(default)]
  pub designation: String,
  pub email: String,
  #[serde(default)]
  pub status: String,
  #[serde(rename = "joinedDate", default)]
  pub joined_date: String,
  #[serde(rename = "isactive", default)]
  pub is_active: bool,
  #[serde(default)]
  pub leaves: LeaveSummary,
  #[serde(rename = "leaveDetails", default)]
  pub leave_details: Vec<LeaveDetail>,
}

// ============================================================================
// Notices
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Notice {
  #[serde(deserialize_with = "string_or_number")]
  pub id: String,
  pub notice_title: String,
  #[serde(default)]
  pub notice_text: String,
  #[serde(default)]
  pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeRequest {
  pub notice_title: String,
  pub notice_text: String,
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse the date part of an ISO 8601 date or datetime.
fn parse_date(s: &str) -> Option<NaiveDate> {
  let date = s.get(..10).unwrap_or(s);
  NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Ids arrive as strings from some endpoints and as numbers from others.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: serde::Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Id {
    Str(String),
    Num(i64),
  }

  Ok(match Id::deserialize(deserializer)? {
    Id::Str(s) => s,
    Id::Num(n) => n.to_string(),
  })
}
