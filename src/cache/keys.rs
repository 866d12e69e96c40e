//! Cache keys and the mutation invalidation graph.

use std::fmt;

/// Typed key for a cached server resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
  /// The employee directory
  Users,
  /// A single employee by id
  User(String),
  /// Leave records for an employee id
  LeaveDetails(String),
  /// The notices list
  Notices,
}

impl fmt::Display for QueryKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Users => write!(f, "[\"users\"]"),
      Self::User(id) => write!(f, "[\"user\", {:?}]", id),
      Self::LeaveDetails(id) => write!(f, "[\"leaveDetails\", {:?}]", id),
      Self::Notices => write!(f, "[\"notices\"]"),
    }
  }
}

/// Every write the client performs, with the keys it makes stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
  Login,
  Register,
  PostNotice,
  /// Suspend or reactivate the employee with this id
  ToggleSuspension { employee_id: String },
}

impl MutationKind {
  pub fn affected_keys(&self) -> Vec<QueryKey> {
    match self {
      Self::Login | Self::Register => Vec::new(),
      Self::PostNotice => vec![QueryKey::Notices],
      Self::ToggleSuspension { employee_id } => {
        vec![QueryKey::Users, QueryKey::User(employee_id.clone())]
      }
    }
  }
}
