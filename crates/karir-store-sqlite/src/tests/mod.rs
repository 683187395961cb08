//! Integration tests for `SqliteStore` and the lifecycle engine running on
//! top of it, against an in-memory database.

mod store;

use std::sync::Arc;

use chrono::NaiveDate;
use karir_core::{
  account::NewUser,
  alumni::{AlumniDetails, AlumniProfile, NewAlumni},
  employment::{EmploymentDetails, EmploymentRecord, EmploymentStatus, NewEmployment},
  identity::{Identity, Role},
  lifecycle::LifecycleEngine,
  store::CareerStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn engine() -> LifecycleEngine<SqliteStore> {
  LifecycleEngine::new(Arc::new(store().await))
}

fn admin() -> Identity {
  Identity { subject_id: Uuid::new_v4(), role: Role::Admin }
}

async fn add_user(s: &SqliteStore, username: &str, role: Role) -> Identity {
  s.add_user(NewUser {
    username:      username.to_owned(),
    email:         format!("{username}@example.ac.id"),
    password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_owned(),
    role,
  })
  .await
  .unwrap()
  .identity()
}

fn alumni_details(student_number: &str) -> AlumniDetails {
  AlumniDetails {
    student_number:  student_number.to_owned(),
    name:            format!("Alumnus {student_number}"),
    major:           "Teknik Informatika".to_owned(),
    entry_year:      2016,
    graduation_year: 2020,
    email:           format!("{student_number}@alumni.example.ac.id"),
    phone:           "081234567890".to_owned(),
    address:         None,
  }
}

fn new_alumni(student_number: &str, user_id: Option<Uuid>) -> NewAlumni {
  NewAlumni { details: alumni_details(student_number), user_id }
}

/// A user who owns one alumni profile.
async fn alumnus(s: &SqliteStore, username: &str) -> (Identity, AlumniProfile) {
  let identity = add_user(s, username, Role::User).await;
  let profile = s
    .add_alumni(new_alumni(username, Some(identity.subject_id)))
    .await
    .unwrap();
  (identity, profile)
}

fn details(company: &str) -> EmploymentDetails {
  EmploymentDetails {
    company:      company.to_owned(),
    position:     "Backend Engineer".to_owned(),
    industry:     "Technology".to_owned(),
    location:     "Jakarta".to_owned(),
    salary_range: Some("10-15 juta".to_owned()),
    start_date:   NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
    end_date:     None,
    status:       EmploymentStatus::Active,
    description:  None,
  }
}

async fn add_record(s: &SqliteStore, alumni_id: Uuid, company: &str) -> EmploymentRecord {
  s.insert_employment(NewEmployment { alumni_id, details: details(company) })
    .await
    .unwrap()
}
