//! Employment records, the unit the trash/restore lifecycle operates on.
//!
//! A record's lifecycle is carried by a single marker, `deleted_at`: absent
//! means active, a timestamp means the record sits in the trash. There is no
//! separate boolean.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, lifecycle::LifecycleState};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Whether the alumnus still holds the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
  Active,
  Resigned,
  ContractEnded,
}

// ─── Details ─────────────────────────────────────────────────────────────────

/// The descriptive, caller-editable part of an employment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentDetails {
  pub company:      String,
  pub position:     String,
  pub industry:     String,
  pub location:     String,
  #[serde(default)]
  pub salary_range: Option<String>,
  pub start_date:   NaiveDate,
  /// `None` means the position is ongoing.
  #[serde(default)]
  pub end_date:     Option<NaiveDate>,
  pub status:       EmploymentStatus,
  #[serde(default)]
  pub description:  Option<String>,
}

impl EmploymentDetails {
  pub fn validate(&self) -> Result<()> {
    for (field, value) in [
      ("company", &self.company),
      ("position", &self.position),
      ("industry", &self.industry),
      ("location", &self.location),
    ] {
      if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{field} is required")));
      }
    }
    if let Some(end) = self.end_date
      && end < self.start_date
    {
      return Err(Error::InvalidInput("end_date precedes start_date".into()));
    }
    Ok(())
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentRecord {
  pub employment_id: Uuid,
  /// Owning alumni profile. Fixed at creation.
  pub alumni_id:     Uuid,
  #[serde(flatten)]
  pub details:       EmploymentDetails,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
  /// Lifecycle marker; `Some` while the record is in the trash.
  pub deleted_at:    Option<DateTime<Utc>>,
}

impl EmploymentRecord {
  pub fn state(&self) -> LifecycleState {
    if self.deleted_at.is_some() {
      LifecycleState::Trashed
    } else {
      LifecycleState::Active
    }
  }
}

/// Input to [`crate::store::CareerStore::insert_employment`].
/// Timestamps and the record id are always assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmployment {
  pub alumni_id: Uuid,
  #[serde(flatten)]
  pub details:   EmploymentDetails,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn details() -> EmploymentDetails {
    EmploymentDetails {
      company:      "PT Nusantara Data".into(),
      position:     "Backend Engineer".into(),
      industry:     "Technology".into(),
      location:     "Jakarta".into(),
      salary_range: Some("10-15jt".into()),
      start_date:   NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
      end_date:     None,
      status:       EmploymentStatus::Active,
      description:  None,
    }
  }

  #[test]
  fn validate_accepts_ongoing_position() {
    assert!(details().validate().is_ok());
  }

  #[test]
  fn validate_rejects_blank_company() {
    let mut d = details();
    d.company = "   ".into();
    assert!(matches!(d.validate(), Err(Error::InvalidInput(m)) if m.contains("company")));
  }

  #[test]
  fn validate_rejects_end_before_start() {
    let mut d = details();
    d.end_date = NaiveDate::from_ymd_opt(2021, 1, 1);
    assert!(matches!(d.validate(), Err(Error::InvalidInput(_))));
  }

  #[test]
  fn state_follows_deleted_at() {
    let now = Utc::now();
    let mut record = EmploymentRecord {
      employment_id: Uuid::new_v4(),
      alumni_id:     Uuid::new_v4(),
      details:       details(),
      created_at:    now,
      updated_at:    now,
      deleted_at:    None,
    };
    assert_eq!(record.state(), LifecycleState::Active);
    record.deleted_at = Some(now);
    assert_eq!(record.state(), LifecycleState::Trashed);
  }

  #[test]
  fn details_are_flattened_on_the_wire() {
    let json = serde_json::to_value(NewEmployment {
      alumni_id: Uuid::nil(),
      details:   details(),
    })
    .unwrap();
    assert_eq!(json["company"], "PT Nusantara Data");
    assert_eq!(json["status"], "active");
    assert_eq!(json["start_date"], "2022-03-01");
    assert!(json.get("details").is_none());
  }
}
