//! HR API routed through the query cache.

use serde_json::Value;
use std::sync::Arc;
use tracing::trace;

use crate::cache::{CacheResult, MutationKind, QueryCache, QueryKey};

use super::error::ApiError;
use super::hr::HrApi;
use super::types::{
  Employee, LeaveDetail, LoginRequest, LoginResponse, Notice, NoticeRequest, RegisterRequest,
};

/// HR API with transparent caching.
///
/// Reads go through the [`QueryCache`]; writes go through
/// [`QueryCache::mutate`] with the keys their [`MutationKind`] declares.
#[derive(Clone)]
pub struct CachedHrApi {
  inner: HrApi,
  cache: QueryCache,
}

impl CachedHrApi {
  pub fn new(inner: HrApi, cache: QueryCache) -> Self {
    Self { inner, cache }
  }

  pub fn cache(&self) -> &QueryCache {
    &self.cache
  }

  /// Employee directory.
  pub async fn employees(&self) -> Result<Arc<Vec<Employee>>, ApiError> {
    let inner = self.inner.clone();
    let result = self
      .cache
      .fetch(QueryKey::Users, || async move { inner.list_employees().await })
      .await?;
    Ok(served(result))
  }

  /// A single employee.
  pub async fn employee(&self, id: &str) -> Result<Arc<Employee>, ApiError> {
    let inner = self.inner.clone();
    let id = id.to_string();
    let result = self
      .cache
      .fetch(QueryKey::User(id.clone()), || async move {
        inner.get_employee(&id).await
      })
      .await?;
    Ok(served(result))
  }

  /// Leave records of an employee.
  pub async fn leaves(&self, employee_id: &str) -> Result<Arc<Vec<LeaveDetail>>, ApiError> {
    let inner = self.inner.clone();
    let id = employee_id.to_string();
    let result = self
      .cache
      .fetch(QueryKey::LeaveDetails(id.clone()), || async move {
        inner.get_employee_leaves(&id).await
      })
      .await?;
    Ok(served(result))
  }

  /// Notices list.
  pub async fn notices(&self) -> Result<Arc<Vec<Notice>>, ApiError> {
    let inner = self.inner.clone();
    let result = self
      .cache
      .fetch(QueryKey::Notices, || async move { inner.list_notices().await })
      .await?;
    Ok(served(result))
  }

  pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
    self.run(MutationKind::Login, self.inner.login(request)).await
  }

  pub async fn register(&self, request: &RegisterRequest) -> Result<Value, ApiError> {
    self.run(MutationKind::Register, self.inner.register(request)).await
  }

  pub async fn post_notice(&self, notice: &NoticeRequest) -> Result<Value, ApiError> {
    self
      .run(MutationKind::PostNotice, self.inner.post_notice(notice))
      .await
  }

  /// Suspend (`suspend = true`) or reactivate the employee `employee_id`
  /// whose account is `email`.
  pub async fn set_account_suspended(
    &self,
    employee_id: &str,
    email: &str,
    suspend: bool,
  ) -> Result<Value, ApiError> {
    let kind = MutationKind::ToggleSuspension {
      employee_id: employee_id.to_string(),
    };
    self
      .run(kind, self.inner.set_account_suspended(email, suspend))
      .await
  }

  async fn run<T>(
    &self,
    kind: MutationKind,
    mutation: impl std::future::Future<Output = Result<T, ApiError>>,
  ) -> Result<T, ApiError> {
    self.cache.mutate(&kind.affected_keys(), mutation).await
  }
}

fn served<T>(result: CacheResult<Arc<T>>) -> Arc<T> {
  trace!(source = ?result.source, "read served");
  result.data
}
