//! Error type for `karir-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum column held a value this build does not recognise.
  #[error("unknown {column} value: {value:?}")]
  UnknownValue { column: &'static str, value: String },

  #[error("alumni profile {alumni_id} still has {records} employment record(s)")]
  ProfileInUse { alumni_id: uuid::Uuid, records: u64 },
}

impl Error {
  /// `true` if SQLite rejected the write on a UNIQUE, FOREIGN KEY or CHECK
  /// constraint.
  pub fn is_constraint_violation(&self) -> bool {
    matches!(
      self,
      Self::Database(tokio_rusqlite::Error::Rusqlite(
        rusqlite::Error::SqliteFailure(e, _)
      )) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
  }
}

impl From<Error> for karir_core::Error {
  fn from(err: Error) -> Self {
    if let Error::ProfileInUse { .. } = err {
      return karir_core::Error::Conflict(err.to_string());
    }
    if err.is_constraint_violation() {
      let detail = match &err {
        Error::Database(tokio_rusqlite::Error::Rusqlite(
          rusqlite::Error::SqliteFailure(_, Some(msg)),
        )) => msg.clone(),
        _ => "constraint violation".to_owned(),
      };
      karir_core::Error::Conflict(detail)
    } else {
      karir_core::Error::store(err)
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
