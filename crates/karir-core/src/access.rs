//! Ownership resolution.
//!
//! Turns an [`Identity`] into the [`AccessFilter`] every employment query and
//! mutation for that request must satisfy. Admins bypass ownership entirely;
//! regular users may only touch records of the alumni profile they own.

use uuid::Uuid;

use crate::{employment::EmploymentRecord, identity::Identity, store::CareerStore};

/// The ownership predicate for one request, built once and applied to every
/// store call that request makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessFilter {
  /// Matches by record id alone.
  Unrestricted,
  /// Additionally requires `alumni_id` to equal the given profile.
  Alumni(Uuid),
  /// Matches nothing. Used for callers without a profile so that "no
  /// profile" and "not your record" look identical from outside.
  Nothing,
}

impl AccessFilter {
  pub fn permits_alumni(&self, alumni_id: Uuid) -> bool {
    match self {
      Self::Unrestricted => true,
      Self::Alumni(owned) => *owned == alumni_id,
      Self::Nothing => false,
    }
  }

  pub fn permits(&self, record: &EmploymentRecord) -> bool {
    self.permits_alumni(record.alumni_id)
  }
}

/// Build the access filter for `identity` from current store state.
pub async fn resolve_access_filter<S>(
  store: &S,
  identity: &Identity,
) -> Result<AccessFilter, S::Error>
where
  S: CareerStore,
{
  if identity.is_admin() {
    return Ok(AccessFilter::Unrestricted);
  }

  let filter = match store.find_alumni_by_user(identity.subject_id).await? {
    Some(profile) => AccessFilter::Alumni(profile.alumni_id),
    None => {
      tracing::debug!(
        subject_id = %identity.subject_id,
        "no alumni profile owned by subject; access filter matches nothing"
      );
      AccessFilter::Nothing
    }
  };
  Ok(filter)
}
