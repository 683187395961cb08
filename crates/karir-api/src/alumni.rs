//! Handlers for `/alumni` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST`   | `/alumni` | Admin only; 409 on duplicate NIM or owner |
//! | `GET`    | `/alumni/{id}` | Admin, or the user owning the profile |
//! | `PUT`    | `/alumni/{id}` | Admin only; the owning user is never changed |
//! | `DELETE` | `/alumni/{id}` | Admin only; 409 while employment records remain |

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
  http::StatusCode,
};
use chrono::Utc;
use karir_core::{
  Error,
  alumni::{AlumniDetails, AlumniProfile, NewAlumni},
  store::CareerStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{AdminCaller, Caller},
  error::ApiError,
  response::Envelope,
};

/// `POST /alumni`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AdminCaller(_): AdminCaller,
  body: Result<Json<NewAlumni>, JsonRejection>,
) -> Result<(StatusCode, Envelope<AlumniProfile>), ApiError>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  let Json(input) = body?;
  input.validate()?;
  let store = &state.store;

  let profile = state
    .engine
    .bounded(async {
      if let Some(user_id) = input.user_id
        && store.get_user(user_id).await?.is_none()
      {
        return Err(Error::InvalidInput(format!("user {user_id} does not exist")));
      }
      Ok::<_, Error>(store.add_alumni(input).await?)
    })
    .await?;

  tracing::info!(alumni_id = %profile.alumni_id, "alumni profile created");
  Ok((StatusCode::CREATED, Envelope::ok("alumni profile created", profile)))
}

/// `GET /alumni/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Caller(identity): Caller,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Envelope<AlumniProfile>, ApiError>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  let Path(id) = id?;
  let profile = state
    .engine
    .bounded(async { Ok::<_, Error>(state.store.get_alumni(id).await?) })
    .await?
    .filter(|p| identity.is_admin() || p.user_id == Some(identity.subject_id))
    .ok_or(ApiError::NotFound)?;
  Ok(Envelope::ok("alumni profile", profile))
}

/// `PUT /alumni/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  AdminCaller(_): AdminCaller,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<AlumniDetails>, JsonRejection>,
) -> Result<Envelope<AlumniProfile>, ApiError>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  let Path(id) = id?;
  let Json(details) = body?;
  details.validate()?;

  let profile = state
    .engine
    .bounded(async {
      Ok::<_, Error>(state.store.update_alumni(id, details, Utc::now()).await?)
    })
    .await?
    .ok_or(ApiError::NotFound)?;

  tracing::info!(alumni_id = %id, "alumni profile updated");
  Ok(Envelope::ok("alumni profile updated", profile))
}

/// `DELETE /alumni/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  AdminCaller(_): AdminCaller,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Envelope<()>, ApiError>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  let Path(id) = id?;
  let deleted = state
    .engine
    .bounded(async { Ok::<_, Error>(state.store.delete_alumni(id).await?) })
    .await?;
  if deleted == 0 {
    return Err(ApiError::NotFound);
  }

  tracing::info!(alumni_id = %id, "alumni profile deleted");
  Ok(Envelope::done("alumni profile deleted"))
}
