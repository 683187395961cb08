use chrono::{Duration, Utc};
use karir_core::{
  access::AccessFilter,
  account::Session,
  identity::Role,
  lifecycle::{LifecycleState, Transition},
  query::{ListView, RecordQuery, RecordSelector, SortKey, SortOrder},
  store::CareerStore,
};
use uuid::Uuid;

use super::*;

fn query(view: ListView, access: AccessFilter) -> RecordQuery {
  let (sort, order) = view.default_sort();
  RecordQuery { access, view, search: None, sort, order, limit: 10, offset: 0 }
}

fn select(employment_id: Uuid, state: Option<LifecycleState>) -> RecordSelector {
  RecordSelector { employment_id, access: AccessFilter::Unrestricted, state }
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_find_user_by_username_or_email() {
  let s = store().await;
  let id = add_user(&s, "budi", Role::User).await;

  let by_name = s.find_user_by_login("budi".into()).await.unwrap().unwrap();
  assert_eq!(by_name.user.user_id, id.subject_id);
  assert!(by_name.password_hash.starts_with("$argon2id$"));

  let by_email = s
    .find_user_by_login("budi@example.ac.id".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(by_email.user.user_id, id.subject_id);

  let fetched = s.get_user(id.subject_id).await.unwrap().unwrap();
  assert_eq!(fetched.role, Role::User);
  assert!(s.find_user_by_login("nobody".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
  let s = store().await;
  add_user(&s, "siti", Role::User).await;
  let err = s
    .add_user(karir_core::account::NewUser {
      username:      "siti".into(),
      email:         "other@example.ac.id".into(),
      password_hash: "x".into(),
      role:          Role::User,
    })
    .await
    .unwrap_err();
  assert!(err.is_constraint_violation());
  assert!(matches!(karir_core::Error::from(err), karir_core::Error::Conflict(_)));
}

#[tokio::test]
async fn session_resolves_until_expiry() {
  let s = store().await;
  let id = add_user(&s, "andi", Role::Admin).await;
  let now = Utc::now();
  s.create_session(Session {
    token_hash: "abc".into(),
    user_id:    id.subject_id,
    issued_at:  now,
    expires_at: now + Duration::hours(1),
  })
  .await
  .unwrap();

  assert_eq!(s.resolve_session("abc".into(), now).await.unwrap(), Some(id));
  assert_eq!(
    s.resolve_session("abc".into(), now + Duration::hours(2)).await.unwrap(),
    None
  );
  assert_eq!(s.resolve_session("zzz".into(), now).await.unwrap(), None);

  let removed = s.delete_expired_sessions(now + Duration::hours(2)).await.unwrap();
  assert_eq!(removed, 1);
  assert_eq!(s.resolve_session("abc".into(), now).await.unwrap(), None);
}

// ─── Alumni ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn alumni_profile_found_by_owner() {
  let s = store().await;
  let (user, profile) = alumnus(&s, "rina").await;

  let by_user = s.find_alumni_by_user(user.subject_id).await.unwrap().unwrap();
  assert_eq!(by_user, profile);
  assert_eq!(s.get_alumni(profile.alumni_id).await.unwrap(), Some(profile));
  assert!(s.find_alumni_by_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn second_profile_for_same_user_is_rejected() {
  let s = store().await;
  let (user, _) = alumnus(&s, "dewi").await;
  let err = s
    .add_alumni(new_alumni("dewi-2", Some(user.subject_id)))
    .await
    .unwrap_err();
  assert!(err.is_constraint_violation());
}

#[tokio::test]
async fn update_alumni_keeps_owner() {
  let s = store().await;
  let (user, profile) = alumnus(&s, "yuni").await;

  let mut changed = alumni_details("yuni");
  changed.name = "Yuni Lestari".into();
  changed.address = Some("Bandung".into());
  let later = profile.updated_at + Duration::seconds(5);

  let updated = s
    .update_alumni(profile.alumni_id, changed, later)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.name, "Yuni Lestari");
  assert_eq!(updated.address.as_deref(), Some("Bandung"));
  assert_eq!(updated.user_id, Some(user.subject_id));
  assert_eq!(updated.created_at, profile.created_at);
  assert_eq!(updated.updated_at, later);

  let missing = s
    .update_alumni(Uuid::new_v4(), alumni_details("ghost"), later)
    .await
    .unwrap();
  assert!(missing.is_none());
}

#[tokio::test]
async fn update_alumni_to_taken_student_number_conflicts() {
  let s = store().await;
  alumnus(&s, "taken").await;
  let (_, profile) = alumnus(&s, "mover").await;
  let err = s
    .update_alumni(profile.alumni_id, alumni_details("taken"), Utc::now())
    .await
    .unwrap_err();
  assert!(matches!(karir_core::Error::from(err), karir_core::Error::Conflict(_)));
}

#[tokio::test]
async fn delete_alumni_refuses_referenced_profile() {
  let s = store().await;
  let (_, profile) = alumnus(&s, "bayu").await;
  let record = add_record(&s, profile.alumni_id, "Pertamina").await;
  s.transition_employment(select(record.employment_id, None), Transition::Trash, Utc::now())
    .await
    .unwrap();

  // Trashed records still hold the profile.
  let err = s.delete_alumni(profile.alumni_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::ProfileInUse { records: 1, .. }));
  assert!(matches!(karir_core::Error::from(err), karir_core::Error::Conflict(_)));
  assert!(s.get_alumni(profile.alumni_id).await.unwrap().is_some());

  s.delete_employment(select(record.employment_id, Some(LifecycleState::Trashed)))
    .await
    .unwrap();
  assert_eq!(s.delete_alumni(profile.alumni_id).await.unwrap(), 1);
  assert!(s.get_alumni(profile.alumni_id).await.unwrap().is_none());
  assert_eq!(s.delete_alumni(profile.alumni_id).await.unwrap(), 0);
}

// ─── Employment ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_employment() {
  let s = store().await;
  let (_, profile) = alumnus(&s, "agus").await;
  let record = add_record(&s, profile.alumni_id, "Tokopedia").await;

  let fetched = s.get_employment(record.employment_id).await.unwrap().unwrap();
  assert_eq!(fetched, record);
  assert_eq!(fetched.state(), LifecycleState::Active);
}

#[tokio::test]
async fn insert_for_unknown_alumni_violates_foreign_key() {
  let s = store().await;
  let err = s
    .insert_employment(karir_core::employment::NewEmployment {
      alumni_id: Uuid::new_v4(),
      details:   details("Gojek"),
    })
    .await
    .unwrap_err();
  assert!(err.is_constraint_violation());
}

#[tokio::test]
async fn trash_keeps_first_marker() {
  let s = store().await;
  let (_, profile) = alumnus(&s, "wati").await;
  let record = add_record(&s, profile.alumni_id, "Bukalapak").await;
  let first = Utc::now();

  let matched = s
    .transition_employment(select(record.employment_id, None), Transition::Trash, first)
    .await
    .unwrap();
  assert_eq!(matched, 1);
  let trashed = s.get_employment(record.employment_id).await.unwrap().unwrap();

  let matched = s
    .transition_employment(
      select(record.employment_id, None),
      Transition::Trash,
      first + Duration::minutes(5),
    )
    .await
    .unwrap();
  assert_eq!(matched, 1);
  let again = s.get_employment(record.employment_id).await.unwrap().unwrap();
  assert_eq!(again.deleted_at, trashed.deleted_at);
  assert_eq!(again.updated_at, trashed.updated_at);
}

#[tokio::test]
async fn state_guard_blocks_wrong_state() {
  let s = store().await;
  let (_, profile) = alumnus(&s, "joko").await;
  let record = add_record(&s, profile.alumni_id, "Traveloka").await;
  let trashed = Some(LifecycleState::Trashed);

  let restored = s
    .transition_employment(select(record.employment_id, trashed), Transition::Restore, Utc::now())
    .await
    .unwrap();
  assert_eq!(restored, 0);
  let deleted = s.delete_employment(select(record.employment_id, trashed)).await.unwrap();
  assert_eq!(deleted, 0);
  assert!(s.get_employment(record.employment_id).await.unwrap().is_some());
}

#[tokio::test]
async fn access_filter_limits_writes() {
  let s = store().await;
  let (_, mine) = alumnus(&s, "eko").await;
  let (_, theirs) = alumnus(&s, "fajar").await;
  let record = add_record(&s, theirs.alumni_id, "Shopee").await;

  for access in [AccessFilter::Alumni(mine.alumni_id), AccessFilter::Nothing] {
    let selector = RecordSelector {
      employment_id: record.employment_id,
      access,
      state: None,
    };
    let matched = s
      .transition_employment(selector, Transition::Trash, Utc::now())
      .await
      .unwrap();
    assert_eq!(matched, 0);
  }
  let untouched = s.get_employment(record.employment_id).await.unwrap().unwrap();
  assert_eq!(untouched.deleted_at, None);
}

#[tokio::test]
async fn update_rewrites_details_only_when_selected() {
  let s = store().await;
  let (_, profile) = alumnus(&s, "hadi").await;
  let record = add_record(&s, profile.alumni_id, "Grab").await;

  let mut changed = details("Grab Indonesia");
  changed.status = EmploymentStatus::Resigned;
  changed.end_date = NaiveDate::from_ymd_opt(2023, 6, 30);

  let updated = s
    .update_employment(
      select(record.employment_id, Some(LifecycleState::Active)),
      changed.clone(),
      Utc::now(),
    )
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.details, changed);
  assert_eq!(updated.alumni_id, record.alumni_id);
  assert_eq!(updated.created_at, record.created_at);

  let missing = s
    .update_employment(
      select(Uuid::new_v4(), Some(LifecycleState::Active)),
      changed,
      Utc::now(),
    )
    .await
    .unwrap();
  assert!(missing.is_none());
}

#[tokio::test]
async fn listing_splits_active_and_trash() {
  let s = store().await;
  let (_, profile) = alumnus(&s, "indah").await;
  let kept = add_record(&s, profile.alumni_id, "Telkom").await;
  let binned = add_record(&s, profile.alumni_id, "Indosat").await;
  s.transition_employment(select(binned.employment_id, None), Transition::Trash, Utc::now())
    .await
    .unwrap();

  let active = query(ListView::Active, AccessFilter::Unrestricted);
  let trash = query(ListView::Trash, AccessFilter::Unrestricted);
  let page = s.list_employment(&active).await.unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.items[0].employment_id, kept.employment_id);
  let page = s.list_employment(&trash).await.unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.items[0].employment_id, binned.employment_id);

  let for_alumni = s.list_employment_for_alumni(profile.alumni_id).await.unwrap();
  assert_eq!(for_alumni.len(), 1);
  assert_eq!(for_alumni[0].employment_id, kept.employment_id);
}

#[tokio::test]
async fn search_is_case_insensitive_and_literal() {
  let s = store().await;
  let (_, profile) = alumnus(&s, "joni").await;
  add_record(&s, profile.alumni_id, "PT Maju_Jaya").await;
  add_record(&s, profile.alumni_id, "PT MajuXJaya").await;
  add_record(&s, profile.alumni_id, "Astra").await;

  let mut q = query(ListView::Active, AccessFilter::Unrestricted);
  q.search = Some("maju".into());
  assert_eq!(s.list_employment(&q).await.unwrap().total, 2);

  // `_` must not act as a single-character wildcard.
  q.search = Some("maju_".into());
  let hits = s.list_employment(&q).await.unwrap();
  assert_eq!(hits.total, 1);
  assert_eq!(hits.items[0].details.company, "PT Maju_Jaya");

  // Active listings also match on location.
  q.search = Some("jakarta".into());
  assert_eq!(s.list_employment(&q).await.unwrap().total, 3);
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
  let s = store().await;
  let (_, profile) = alumnus(&s, "ozturk").await;
  let record = add_record(&s, profile.alumni_id, "ÉCOLE Öztürk").await;
  add_record(&s, profile.alumni_id, "Astra").await;
  s.transition_employment(select(record.employment_id, None), Transition::Trash, Utc::now())
    .await
    .unwrap();

  let mut q = query(ListView::Trash, AccessFilter::Unrestricted);
  for term in ["ÉCOLE", "école", "öztürk", "ÖZTÜRK", "Ecole Ö"] {
    q.search = Some(term.into());
    let expected = u64::from(term != "Ecole Ö");
    assert_eq!(s.list_employment(&q).await.unwrap().total, expected, "search {term:?}");
  }
}

#[tokio::test]
async fn trash_search_covers_company_and_position_only() {
  let s = store().await;
  let (_, profile) = alumnus(&s, "tono").await;
  let binned = add_record(&s, profile.alumni_id, "Kalbe Farma").await;
  add_record(&s, profile.alumni_id, "Unilever").await;
  s.transition_employment(select(binned.employment_id, None), Transition::Trash, Utc::now())
    .await
    .unwrap();

  let mut q = query(ListView::Trash, AccessFilter::Unrestricted);
  // Location and industry are not searched in the trash.
  q.search = Some("jakarta".into());
  assert_eq!(s.list_employment(&q).await.unwrap().total, 0);
  q.search = Some("technology".into());
  assert_eq!(s.list_employment(&q).await.unwrap().total, 0);

  q.search = Some("backend".into());
  let hits = s.list_employment(&q).await.unwrap();
  assert_eq!(hits.total, 1);
  assert_eq!(hits.items[0].employment_id, binned.employment_id);

  q.search = Some("KALBE".into());
  assert_eq!(s.list_employment(&q).await.unwrap().total, 1);

  // The active view does search location.
  let mut active = query(ListView::Active, AccessFilter::Unrestricted);
  active.search = Some("jakarta".into());
  assert_eq!(s.list_employment(&active).await.unwrap().total, 1);
}

#[tokio::test]
async fn listing_orders_and_windows() {
  let s = store().await;
  let (_, profile) = alumnus(&s, "lina").await;
  for company in ["Bravo", "Alpha", "Delta", "Charlie"] {
    add_record(&s, profile.alumni_id, company).await;
  }

  let mut q = query(ListView::Active, AccessFilter::Alumni(profile.alumni_id));
  q.sort = SortKey::Company;
  q.order = SortOrder::Desc;
  q.limit = 2;
  q.offset = 1;

  let page = s.list_employment(&q).await.unwrap();
  let names: Vec<_> = page.items.into_iter().map(|r| r.details.company).collect();
  assert_eq!(names, ["Charlie", "Bravo"]);
  assert_eq!(page.total, 4);

  q.access = AccessFilter::Nothing;
  let page = s.list_employment(&q).await.unwrap();
  assert_eq!(page.total, 0);
  assert!(page.items.is_empty());
}
