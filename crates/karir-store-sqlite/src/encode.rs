//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings with microsecond
//! precision and a `Z` suffix, so lexical order equals chronological order
//! and `ORDER BY deleted_at` needs no parsing. Calendar dates use
//! `YYYY-MM-DD`. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use karir_core::{
  account::User,
  alumni::AlumniProfile,
  employment::{EmploymentDetails, EmploymentRecord, EmploymentStatus},
  identity::Role,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at the precision the store persists.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ─────────────────────────────────────────────────────────────────────

pub fn decode_role(s: &str) -> Result<Role> {
  Role::parse(s).ok_or_else(|| Error::UnknownValue {
    column: "role",
    value:  s.to_owned(),
  })
}

// ─── EmploymentStatus ─────────────────────────────────────────────────────────

pub fn encode_status(s: EmploymentStatus) -> &'static str {
  match s {
    EmploymentStatus::Active => "active",
    EmploymentStatus::Resigned => "resigned",
    EmploymentStatus::ContractEnded => "contract_ended",
  }
}

pub fn decode_status(s: &str) -> Result<EmploymentStatus> {
  match s {
    "active" => Ok(EmploymentStatus::Active),
    "resigned" => Ok(EmploymentStatus::Resigned),
    "contract_ended" => Ok(EmploymentStatus::ContractEnded),
    other => Err(Error::UnknownValue {
      column: "status",
      value:  other.to_owned(),
    }),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawEmployment::from_row`].
pub const EMPLOYMENT_COLUMNS: &str = "employment_id, alumni_id, company, \
  position, industry, location, salary_range, start_date, end_date, status, \
  description, created_at, updated_at, deleted_at";

/// Raw strings read directly from an `employment` row.
pub struct RawEmployment {
  pub employment_id: String,
  pub alumni_id:     String,
  pub company:       String,
  pub position:      String,
  pub industry:      String,
  pub location:      String,
  pub salary_range:  Option<String>,
  pub start_date:    String,
  pub end_date:      Option<String>,
  pub status:        String,
  pub description:   Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
  pub deleted_at:    Option<String>,
}

impl RawEmployment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      employment_id: row.get(0)?,
      alumni_id:     row.get(1)?,
      company:       row.get(2)?,
      position:      row.get(3)?,
      industry:      row.get(4)?,
      location:      row.get(5)?,
      salary_range:  row.get(6)?,
      start_date:    row.get(7)?,
      end_date:      row.get(8)?,
      status:        row.get(9)?,
      description:   row.get(10)?,
      created_at:    row.get(11)?,
      updated_at:    row.get(12)?,
      deleted_at:    row.get(13)?,
    })
  }

  pub fn into_record(self) -> Result<EmploymentRecord> {
    Ok(EmploymentRecord {
      employment_id: decode_uuid(&self.employment_id)?,
      alumni_id:     decode_uuid(&self.alumni_id)?,
      details:       EmploymentDetails {
        company:      self.company,
        position:     self.position,
        industry:     self.industry,
        location:     self.location,
        salary_range: self.salary_range,
        start_date:   decode_date(&self.start_date)?,
        end_date:     self.end_date.as_deref().map(decode_date).transpose()?,
        status:       decode_status(&self.status)?,
        description:  self.description,
      },
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
      deleted_at:    self.deleted_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Column list matching [`RawAlumni::from_row`].
pub const ALUMNI_COLUMNS: &str = "alumni_id, student_number, name, major, \
  entry_year, graduation_year, email, phone, address, user_id, created_at, \
  updated_at";

/// Raw values read directly from an `alumni` row.
pub struct RawAlumni {
  pub alumni_id:       String,
  pub student_number:  String,
  pub name:            String,
  pub major:           String,
  pub entry_year:      i32,
  pub graduation_year: i32,
  pub email:           String,
  pub phone:           String,
  pub address:         Option<String>,
  pub user_id:         Option<String>,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawAlumni {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      alumni_id:       row.get(0)?,
      student_number:  row.get(1)?,
      name:            row.get(2)?,
      major:           row.get(3)?,
      entry_year:      row.get(4)?,
      graduation_year: row.get(5)?,
      email:           row.get(6)?,
      phone:           row.get(7)?,
      address:         row.get(8)?,
      user_id:         row.get(9)?,
      created_at:      row.get(10)?,
      updated_at:      row.get(11)?,
    })
  }

  pub fn into_profile(self) -> Result<AlumniProfile> {
    Ok(AlumniProfile {
      alumni_id:       decode_uuid(&self.alumni_id)?,
      student_number:  self.student_number,
      name:            self.name,
      major:           self.major,
      entry_year:      self.entry_year,
      graduation_year: self.graduation_year,
      email:           self.email,
      phone:           self.phone,
      address:         self.address,
      user_id:         self.user_id.as_deref().map(decode_uuid).transpose()?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `users` row (without the password hash).
pub struct RawUser {
  pub user_id:    String,
  pub username:   String,
  pub email:      String,
  pub role:       String,
  pub created_at: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(0)?,
      username:   row.get(1)?,
      email:      row.get(2)?,
      role:       row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      username:   self.username,
      email:      self.email,
      role:       decode_role(&self.role)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let early = decode_dt("2024-01-01T00:00:00.5Z").unwrap();
    let late = decode_dt("2024-01-01T00:00:00.123456789Z").unwrap();
    // Variable-width fractions would compare the wrong way round as text.
    assert!(early > late);
    assert!(encode_dt(early) > encode_dt(late));
  }

  #[test]
  fn now_roundtrips_exactly() {
    let t = now();
    assert_eq!(decode_dt(&encode_dt(t)).unwrap(), t);
  }

  #[test]
  fn unknown_status_is_rejected() {
    assert!(matches!(
      decode_status("fired"),
      Err(Error::UnknownValue { column: "status", .. })
    ));
  }
}
