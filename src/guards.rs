//! Routes and the navigation guards that gate them.
//!
//! Guards are pure functions of a session snapshot. They never navigate
//! themselves; the app applies the returned redirect.

use crate::session::Session;

/// A navigable view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
  Login,
  Register,
  /// Landing view for every signed-in user
  Dashboard,
  Employees,
  EmployeeDetails { id: String },
  PostNotice,
}

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
  Public,
  Authenticated,
  Admin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
  Allow,
  Redirect(Route),
}

impl Route {
  /// Where a successful login lands.
  pub const LANDING: Route = Route::Dashboard;

  pub fn policy(&self) -> Policy {
    match self {
      Route::Login | Route::Register => Policy::Public,
      Route::Dashboard => Policy::Authenticated,
      Route::Employees | Route::EmployeeDetails { .. } | Route::PostNotice => Policy::Admin,
    }
  }
}

/// Passes iff the user is signed in.
pub fn require_authenticated(session: &Session) -> GuardDecision {
  if session.is_logged_in() {
    GuardDecision::Allow
  } else {
    GuardDecision::Redirect(Route::Login)
  }
}

/// Passes iff the user is signed in as a super user.
pub fn require_admin(session: &Session) -> GuardDecision {
  if session.is_logged_in() && session.is_super_user() {
    GuardDecision::Allow
  } else {
    GuardDecision::Redirect(Route::LANDING)
  }
}

/// Evaluate the guard for `route`.
pub fn check(route: &Route, session: &Session) -> GuardDecision {
  match route.policy() {
    Policy::Public => GuardDecision::Allow,
    Policy::Authenticated => require_authenticated(session),
    Policy::Admin => require_admin(session),
  }
}

/// Follow redirects from `route` until a guard allows one.
///
/// Chains are at most admin → landing → login, and `Login` is public.
pub fn resolve(route: Route, session: &Session) -> Route {
  const MAX_HOPS: usize = 4;

  let mut current = route;
  for _ in 0..MAX_HOPS {
    match check(&current, session) {
      GuardDecision::Allow => return current,
      GuardDecision::Redirect(target) => current = target,
    }
  }
  Route::Login
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testutil::signed_in_user;

  fn anonymous() -> Session {
    Session::default()
  }

  fn employee() -> Session {
    Session::signed_in("t1", &signed_in_user("1", false))
  }

  fn admin() -> Session {
    Session::signed_in("t1", &signed_in_user("1", true))
  }

  #[test]
  fn test_authenticated_guard() {
    assert_eq!(
      require_authenticated(&anonymous()),
      GuardDecision::Redirect(Route::Login)
    );
    assert_eq!(require_authenticated(&employee()), GuardDecision::Allow);
    assert_eq!(require_authenticated(&admin()), GuardDecision::Allow);
  }

  #[test]
  fn test_admin_guard() {
    assert_eq!(
      require_admin(&anonymous()),
      GuardDecision::Redirect(Route::Dashboard)
    );
    assert_eq!(
      require_admin(&employee()),
      GuardDecision::Redirect(Route::Dashboard)
    );
    assert_eq!(require_admin(&admin()), GuardDecision::Allow);
  }

  #[test]
  fn test_public_routes_always_allowed() {
    assert_eq!(check(&Route::Login, &anonymous()), GuardDecision::Allow);
    assert_eq!(check(&Route::Register, &admin()), GuardDecision::Allow);
  }

  #[test]
  fn test_resolve_follows_redirect_chain() {
    let details = Route::EmployeeDetails { id: "7".into() };
    assert_eq!(resolve(details.clone(), &anonymous()), Route::Login);
    assert_eq!(resolve(details.clone(), &employee()), Route::Dashboard);
    assert_eq!(resolve(details.clone(), &admin()), details);
  }
}
