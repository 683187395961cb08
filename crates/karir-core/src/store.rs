//! The `CareerStore` trait.
//!
//! Implemented by storage backends (e.g. `karir-store-sqlite`). The lifecycle
//! engine and the HTTP layer depend on this abstraction, not on a concrete
//! backend.
//!
//! Every employment write is keyed by a [`RecordSelector`] and must be applied
//! as a single conditional operation: match the selector and mutate in one
//! indivisible step, then report how many rows matched. The lifecycle engine
//! relies on that count to decide success.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  account::{NewUser, Session, User, UserCredentials},
  alumni::{AlumniDetails, AlumniProfile, NewAlumni},
  employment::{EmploymentDetails, EmploymentRecord, NewEmployment},
  identity::Identity,
  lifecycle::Transition,
  query::{RecordPage, RecordQuery, RecordSelector},
};

/// Abstraction over a Karir storage backend.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait CareerStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Persist a new user. Duplicate usernames or emails are rejected.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look a user up by username or email, returning the stored hash.
  fn find_user_by_login(
    &self,
    login: String,
  ) -> impl Future<Output = Result<Option<UserCredentials>, Self::Error>> + Send + '_;

  fn create_session(
    &self,
    session: Session,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Resolve a token digest to the identity it was issued for. Sessions whose
  /// `expires_at` is not after `now` resolve to `None`.
  fn resolve_session(
    &self,
    token_hash: String,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + '_;

  /// Drop every session that expired at or before `now`.
  fn delete_expired_sessions(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Alumni profiles ───────────────────────────────────────────────────

  /// Persist a new profile. A second profile for the same `user_id` is
  /// rejected.
  fn add_alumni(
    &self,
    input: NewAlumni,
  ) -> impl Future<Output = Result<AlumniProfile, Self::Error>> + Send + '_;

  fn get_alumni(
    &self,
    alumni_id: Uuid,
  ) -> impl Future<Output = Result<Option<AlumniProfile>, Self::Error>> + Send + '_;

  /// The profile owned by `user_id`, if any.
  fn find_alumni_by_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<AlumniProfile>, Self::Error>> + Send + '_;

  /// Replace the editable fields of a profile and refresh `updated_at`. The
  /// owning `user_id` is kept. Returns `None` if no such profile exists.
  fn update_alumni(
    &self,
    alumni_id: Uuid,
    details: AlumniDetails,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<AlumniProfile>, Self::Error>> + Send + '_;

  /// Remove a profile and return the deleted-row count. A profile still
  /// referenced by employment records, in either lifecycle state, is refused.
  fn delete_alumni(
    &self,
    alumni_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Employment records ────────────────────────────────────────────────

  /// Insert a new active record. `employment_id`, `created_at` and
  /// `updated_at` are assigned by the store.
  fn insert_employment(
    &self,
    input: NewEmployment,
  ) -> impl Future<Output = Result<EmploymentRecord, Self::Error>> + Send + '_;

  /// Unfiltered lookup by id, in any lifecycle state.
  fn get_employment(
    &self,
    employment_id: Uuid,
  ) -> impl Future<Output = Result<Option<EmploymentRecord>, Self::Error>> + Send + '_;

  /// Active records of one alumni profile, oldest first.
  fn list_employment_for_alumni(
    &self,
    alumni_id: Uuid,
  ) -> impl Future<Output = Result<Vec<EmploymentRecord>, Self::Error>> + Send + '_;

  /// The total matching `query` and its ordered window, read together so
  /// the two always agree.
  fn list_employment<'a>(
    &'a self,
    query: &'a RecordQuery,
  ) -> impl Future<Output = Result<RecordPage, Self::Error>> + Send + 'a;

  /// Replace the descriptive fields of the selected record and refresh
  /// `updated_at`. Returns the updated record, or `None` if nothing matched.
  fn update_employment(
    &self,
    selector: RecordSelector,
    details: EmploymentDetails,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<EmploymentRecord>, Self::Error>> + Send + '_;

  /// Apply a lifecycle transition to the selected record and return the
  /// matched-row count (0 or 1).
  fn transition_employment(
    &self,
    selector: RecordSelector,
    transition: Transition,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Permanently remove the selected record and return the deleted-row count.
  fn delete_employment(
    &self,
    selector: RecordSelector,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
