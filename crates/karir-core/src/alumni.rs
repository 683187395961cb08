//! Alumni profiles, the anchor of the ownership chain.
//!
//! An employment record never stores its owner. Ownership is derived at
//! request time: identity → profile whose `user_id` matches → records whose
//! `alumni_id` matches that profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlumniProfile {
  pub alumni_id:       Uuid,
  /// University student number (NIM); unique.
  pub student_number:  String,
  pub name:            String,
  pub major:           String,
  pub entry_year:      i32,
  pub graduation_year: i32,
  pub email:           String,
  pub phone:           String,
  pub address:         Option<String>,
  /// The owning login, if any. At most one profile per user.
  pub user_id:         Option<Uuid>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

/// The editable part of a profile. Everything except the owning login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlumniDetails {
  pub student_number:  String,
  pub name:            String,
  pub major:           String,
  pub entry_year:      i32,
  pub graduation_year: i32,
  pub email:           String,
  pub phone:           String,
  #[serde(default)]
  pub address:         Option<String>,
}

impl AlumniDetails {
  pub fn validate(&self) -> Result<()> {
    for (field, value) in [
      ("student_number", &self.student_number),
      ("name", &self.name),
      ("major", &self.major),
      ("email", &self.email),
      ("phone", &self.phone),
    ] {
      if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{field} is required")));
      }
    }
    if !self.email.contains('@') {
      return Err(Error::InvalidInput("email is not a valid address".into()));
    }
    if self.graduation_year < self.entry_year {
      return Err(Error::InvalidInput(
        "graduation_year precedes entry_year".into(),
      ));
    }
    Ok(())
  }
}

/// Input to [`crate::store::CareerStore::add_alumni`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAlumni {
  #[serde(flatten)]
  pub details: AlumniDetails,
  #[serde(default)]
  pub user_id: Option<Uuid>,
}

impl NewAlumni {
  pub fn validate(&self) -> Result<()> { self.details.validate() }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn details() -> AlumniDetails {
    AlumniDetails {
      student_number:  "2016001".into(),
      name:            "Putri".into(),
      major:           "Teknik Informatika".into(),
      entry_year:      2016,
      graduation_year: 2020,
      email:           "putri@example.ac.id".into(),
      phone:           "0812".into(),
      address:         None,
    }
  }

  #[test]
  fn graduation_before_entry_is_rejected() {
    let mut d = details();
    d.graduation_year = 2015;
    assert!(matches!(d.validate(), Err(Error::InvalidInput(_))));
  }

  #[test]
  fn new_alumni_reads_flat_json() {
    let input: NewAlumni = serde_json::from_value(serde_json::json!({
      "student_number": "2016001",
      "name": "Putri",
      "major": "Teknik Informatika",
      "entry_year": 2016,
      "graduation_year": 2020,
      "email": "putri@example.ac.id",
      "phone": "0812",
    }))
    .unwrap();
    assert_eq!(input.details, details());
    assert_eq!(input.user_id, None);
  }
}
