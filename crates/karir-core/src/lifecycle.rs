//! The employment record lifecycle.
//!
//! ```text
//!            soft_delete                 hard_delete
//!   Active ──────────────▶ Trashed ──────────────────▶ (removed)
//!     ▲                       │
//!     └────── restore ────────┘
//! ```
//!
//! Every operation resolves the caller's [`AccessFilter`] once, then issues a
//! single conditional store call keyed by a [`RecordSelector`]. Missing
//! records, records in the wrong state and records owned by someone else all
//! surface as [`Error::NotFoundOrForbidden`].

use std::{future::Future, sync::Arc, time::Duration};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  access::{AccessFilter, resolve_access_filter},
  employment::{EmploymentDetails, EmploymentRecord, NewEmployment},
  identity::Identity,
  query::{ListRequest, ListView, Listing, RecordPage, RecordQuery, RecordSelector},
  store::CareerStore,
};

// ─── States and transitions ──────────────────────────────────────────────────

/// Derived from the `deleted_at` marker; never stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
  Active,
  Trashed,
}

/// A state-changing write other than permanent deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  /// Set `deleted_at` if unset. Already-trashed records match but keep their
  /// original markers.
  Trash,
  /// Clear `deleted_at`.
  Restore,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Orchestrates ownership resolution and conditional store writes for
/// employment records.
///
/// Cloning is cheap; the store handle is shared.
pub struct LifecycleEngine<S> {
  store:   Arc<S>,
  timeout: Duration,
}

impl<S> Clone for LifecycleEngine<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), timeout: self.timeout }
  }
}

impl<S> LifecycleEngine<S> {
  /// Ceiling applied to each operation unless overridden.
  pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

  pub fn new(store: Arc<S>) -> Self {
    Self { store, timeout: Self::DEFAULT_TIMEOUT }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn timeout(&self) -> Duration { self.timeout }

  /// Run `op` under the configured ceiling. On expiry the caller gets
  /// [`Error::Timeout`] and stops waiting, but a statement already handed to
  /// the backend is not cancelled. A write that times out may still commit.
  ///
  /// Store calls made outside the engine (login, profile reads) go through
  /// here too.
  pub async fn bounded<T>(&self, op: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(self.timeout, op).await {
      Ok(result) => result,
      Err(_) => {
        tracing::warn!(timeout = ?self.timeout, "store operation timed out; caller no longer waiting");
        Err(Error::Timeout(self.timeout))
      }
    }
  }
}

impl<S> LifecycleEngine<S>
where
  S: CareerStore,
  Error: From<S::Error>,
{
  async fn access_for(&self, identity: &Identity) -> Result<AccessFilter> {
    Ok(resolve_access_filter(self.store.as_ref(), identity).await?)
  }

  // ── Lifecycle transitions ─────────────────────────────────────────────

  /// Move a record into the trash.
  ///
  /// Soft-deleting a record that is already trashed succeeds without
  /// touching it, so its original `deleted_at` survives.
  pub async fn soft_delete(&self, employment_id: Uuid, identity: &Identity) -> Result<()> {
    self
      .bounded(async {
        let access = self.access_for(identity).await?;
        let selector = RecordSelector { employment_id, access, state: None };
        let matched = self
          .store
          .transition_employment(selector, Transition::Trash, Utc::now())
          .await?;
        if matched == 0 {
          return Err(Error::NotFoundOrForbidden);
        }
        tracing::info!(
          %employment_id,
          subject_id = %identity.subject_id,
          "employment record moved to trash"
        );
        Ok(())
      })
      .await
  }

  /// Trashed records visible to `identity`.
  pub async fn list_trash(
    &self,
    identity: &Identity,
    request: &ListRequest,
  ) -> Result<Listing<EmploymentRecord>> {
    self.list(identity, ListView::Trash, request).await
  }

  /// Bring a trashed record back to the active set.
  pub async fn restore(&self, employment_id: Uuid, identity: &Identity) -> Result<()> {
    self
      .bounded(async {
        let access = self.access_for(identity).await?;
        let selector = RecordSelector {
          employment_id,
          access,
          state: Some(LifecycleState::Trashed),
        };
        let matched = self
          .store
          .transition_employment(selector, Transition::Restore, Utc::now())
          .await?;
        if matched == 0 {
          return Err(Error::NotFoundOrForbidden);
        }
        tracing::info!(
          %employment_id,
          subject_id = %identity.subject_id,
          "employment record restored from trash"
        );
        Ok(())
      })
      .await
  }

  /// Permanently remove a trashed record. Active records cannot be hard
  /// deleted directly.
  pub async fn hard_delete(&self, employment_id: Uuid, identity: &Identity) -> Result<()> {
    self
      .bounded(async {
        let access = self.access_for(identity).await?;
        let selector = RecordSelector {
          employment_id,
          access,
          state: Some(LifecycleState::Trashed),
        };
        let deleted = self.store.delete_employment(selector).await?;
        if deleted == 0 {
          return Err(Error::NotFoundOrForbidden);
        }
        tracing::info!(
          %employment_id,
          subject_id = %identity.subject_id,
          "employment record permanently deleted"
        );
        Ok(())
      })
      .await
  }

  // ── Active records ────────────────────────────────────────────────────

  pub async fn create(&self, input: NewEmployment) -> Result<EmploymentRecord> {
    input.details.validate()?;
    self
      .bounded(async {
        if self.store.get_alumni(input.alumni_id).await?.is_none() {
          return Err(Error::InvalidInput(format!(
            "alumni profile {} does not exist",
            input.alumni_id
          )));
        }
        let record = self.store.insert_employment(input).await?;
        tracing::info!(
          employment_id = %record.employment_id,
          alumni_id = %record.alumni_id,
          "employment record created"
        );
        Ok(record)
      })
      .await
  }

  /// An active record visible to `identity`.
  pub async fn get(&self, employment_id: Uuid, identity: &Identity) -> Result<EmploymentRecord> {
    self
      .bounded(async {
        let access = self.access_for(identity).await?;
        self
          .store
          .get_employment(employment_id)
          .await?
          .filter(|r| r.state() == LifecycleState::Active && access.permits(r))
          .ok_or(Error::NotFoundOrForbidden)
      })
      .await
  }

  /// Replace the descriptive fields of an active record. The owning
  /// `alumni_id` is not part of [`EmploymentDetails`] and cannot change.
  pub async fn update(
    &self,
    employment_id: Uuid,
    identity: &Identity,
    details: EmploymentDetails,
  ) -> Result<EmploymentRecord> {
    details.validate()?;
    self
      .bounded(async {
        let access = self.access_for(identity).await?;
        let selector = RecordSelector {
          employment_id,
          access,
          state: Some(LifecycleState::Active),
        };
        let record = self
          .store
          .update_employment(selector, details, Utc::now())
          .await?
          .ok_or(Error::NotFoundOrForbidden)?;
        tracing::info!(%employment_id, "employment record updated");
        Ok::<_, Error>(record)
      })
      .await
  }

  /// Active records visible to `identity`.
  pub async fn list_active(
    &self,
    identity: &Identity,
    request: &ListRequest,
  ) -> Result<Listing<EmploymentRecord>> {
    self.list(identity, ListView::Active, request).await
  }

  /// Active records of a single profile.
  pub async fn list_for_alumni(&self, alumni_id: Uuid) -> Result<Vec<EmploymentRecord>> {
    self
      .bounded(async {
        if self.store.get_alumni(alumni_id).await?.is_none() {
          return Err(Error::NotFoundOrForbidden);
        }
        Ok(self.store.list_employment_for_alumni(alumni_id).await?)
      })
      .await
  }

  async fn list(
    &self,
    identity: &Identity,
    view: ListView,
    request: &ListRequest,
  ) -> Result<Listing<EmploymentRecord>> {
    self
      .bounded(async {
        let access = self.access_for(identity).await?;
        let (sort, order) =
          view.resolve_sort(request.sort_by.as_deref(), request.order.as_deref());
        let query = RecordQuery {
          access,
          view,
          search: request.search_text(),
          sort,
          order,
          limit: request.page.limit,
          offset: request.page.offset(),
        };
        tracing::debug!(
          ?view,
          ?access,
          sort = sort.as_str(),
          order = order.as_str(),
          "listing employment records"
        );

        let RecordPage { total, items } = self.store.list_employment(&query).await?;
        Ok::<_, Error>(Listing {
          items,
          total,
          page: request.page,
          sort,
          order,
          search: query.search,
        })
      })
      .await
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicBool, Ordering};

  use chrono::DateTime;

  use super::*;
  use crate::{
    account::{NewUser, Session, User, UserCredentials},
    alumni::{AlumniDetails, AlumniProfile, NewAlumni},
    identity::Role,
  };

  /// A store whose reads hang forever. Transitions are handed to a
  /// background task, like a connection thread, and commit after 50ms.
  #[derive(Default)]
  struct StalledStore {
    committed: Arc<AtomicBool>,
  }

  impl CareerStore for StalledStore {
    type Error = Error;
    async fn add_user(&self, _: NewUser) -> Result<User> { std::future::pending().await }
    async fn get_user(&self, _: Uuid) -> Result<Option<User>> { std::future::pending().await }
    async fn find_user_by_login(&self, _: String) -> Result<Option<UserCredentials>> { std::future::pending().await }
    async fn create_session(&self, _: Session) -> Result<()> { std::future::pending().await }
    async fn resolve_session(&self, _: String, _: DateTime<Utc>) -> Result<Option<Identity>> { std::future::pending().await }
    async fn delete_expired_sessions(&self, _: DateTime<Utc>) -> Result<u64> { std::future::pending().await }
    async fn add_alumni(&self, _: NewAlumni) -> Result<AlumniProfile> { std::future::pending().await }
    async fn get_alumni(&self, _: Uuid) -> Result<Option<AlumniProfile>> { std::future::pending().await }
    async fn find_alumni_by_user(&self, _: Uuid) -> Result<Option<AlumniProfile>> { std::future::pending().await }
    async fn update_alumni(&self, _: Uuid, _: AlumniDetails, _: DateTime<Utc>) -> Result<Option<AlumniProfile>> { std::future::pending().await }
    async fn delete_alumni(&self, _: Uuid) -> Result<u64> { std::future::pending().await }
    async fn insert_employment(&self, _: NewEmployment) -> Result<EmploymentRecord> { std::future::pending().await }
    async fn get_employment(&self, _: Uuid) -> Result<Option<EmploymentRecord>> { std::future::pending().await }
    async fn list_employment_for_alumni(&self, _: Uuid) -> Result<Vec<EmploymentRecord>> { std::future::pending().await }
    async fn list_employment<'a>(&'a self, _: &'a RecordQuery) -> Result<RecordPage> { std::future::pending().await }
    async fn update_employment(&self, _: RecordSelector, _: EmploymentDetails, _: DateTime<Utc>) -> Result<Option<EmploymentRecord>> { std::future::pending().await }
    async fn transition_employment(&self, _: RecordSelector, _: Transition, _: DateTime<Utc>) -> Result<u64> {
      let committed = Arc::clone(&self.committed);
      let worker = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        committed.store(true, Ordering::SeqCst);
        1
      });
      Ok(worker.await.unwrap_or(0))
    }
    async fn delete_employment(&self, _: RecordSelector) -> Result<u64> { std::future::pending().await }
  }

  fn stalled_engine() -> LifecycleEngine<StalledStore> {
    LifecycleEngine::new(Arc::new(StalledStore::default()))
      .with_timeout(Duration::from_millis(20))
  }

  #[tokio::test]
  async fn stalled_store_times_out_for_admin() {
    let admin = Identity { subject_id: Uuid::new_v4(), role: Role::Admin };
    let err = stalled_engine().restore(Uuid::new_v4(), &admin).await.unwrap_err();
    assert!(matches!(err, Error::Timeout(d) if d == Duration::from_millis(20)));
  }

  #[tokio::test]
  async fn timed_out_write_can_still_commit() {
    let engine = stalled_engine();
    let admin = Identity { subject_id: Uuid::new_v4(), role: Role::Admin };
    let err = engine.soft_delete(Uuid::new_v4(), &admin).await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
    assert!(!engine.store().committed.load(Ordering::SeqCst));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(engine.store().committed.load(Ordering::SeqCst));
  }

  #[tokio::test]
  async fn stalled_ownership_lookup_times_out() {
    let user = Identity { subject_id: Uuid::new_v4(), role: Role::User };
    let err = stalled_engine()
      .list_trash(&user, &ListRequest::default())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
  }

  #[test]
  fn default_timeout_is_ten_seconds() {
    let engine = LifecycleEngine::new(Arc::new(StalledStore::default()));
    assert_eq!(engine.timeout(), Duration::from_secs(10));
  }
}
