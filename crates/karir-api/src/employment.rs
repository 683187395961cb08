//! Handlers for active employment records under `/pekerjaan`.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/pekerjaan` | Datatable listing, scoped to the caller |
//! | `POST`   | `/pekerjaan` | Admin only |
//! | `GET`    | `/pekerjaan/{id}` | Scoped; trashed records are 404 |
//! | `PUT`    | `/pekerjaan/{id}` | Admin only; active records only |
//! | `GET`    | `/pekerjaan/alumni/{alumni_id}` | Admin only |
//! | `DELETE` | `/pekerjaan/{id}` | Soft delete, scoped |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
};
use karir_core::{
  Error,
  employment::{EmploymentDetails, EmploymentRecord, NewEmployment},
  store::CareerStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{AdminCaller, Caller},
  error::ApiError,
  pagination::DatatableParams,
  response::Envelope,
};

/// `GET /pekerjaan`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Caller(identity): Caller,
  params: Result<Query<DatatableParams>, QueryRejection>,
) -> Result<Envelope<Vec<EmploymentRecord>>, ApiError>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  let Query(params) = params?;
  let request = params.into_request()?;
  let listing = state.engine.list_active(&identity, &request).await?;
  Ok(Envelope::page("employment records", listing))
}

/// `POST /pekerjaan`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  AdminCaller(_): AdminCaller,
  body: Result<Json<NewEmployment>, JsonRejection>,
) -> Result<(StatusCode, Envelope<EmploymentRecord>), ApiError>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  let Json(input) = body?;
  let record = state.engine.create(input).await?;
  Ok((StatusCode::CREATED, Envelope::ok("employment record created", record)))
}

/// `GET /pekerjaan/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Caller(identity): Caller,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Envelope<EmploymentRecord>, ApiError>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  let Path(id) = id?;
  let record = state.engine.get(id, &identity).await?;
  Ok(Envelope::ok("employment record", record))
}

/// `PUT /pekerjaan/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  AdminCaller(identity): AdminCaller,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<EmploymentDetails>, JsonRejection>,
) -> Result<Envelope<EmploymentRecord>, ApiError>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  let Path(id) = id?;
  let Json(details) = body?;
  let record = state.engine.update(id, &identity, details).await?;
  Ok(Envelope::ok("employment record updated", record))
}

/// `GET /pekerjaan/alumni/{alumni_id}`
pub async fn list_for_alumni<S>(
  State(state): State<AppState<S>>,
  AdminCaller(_): AdminCaller,
  alumni_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Envelope<Vec<EmploymentRecord>>, ApiError>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  let Path(alumni_id) = alumni_id?;
  let records = state.engine.list_for_alumni(alumni_id).await?;
  Ok(Envelope::ok("employment records for alumni", records))
}

/// `DELETE /pekerjaan/{id}` moves the record to the trash.
pub async fn soft_delete<S>(
  State(state): State<AppState<S>>,
  Caller(identity): Caller,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Envelope<()>, ApiError>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  let Path(id) = id?;
  state.engine.soft_delete(id, &identity).await?;
  Ok(Envelope::done("employment record moved to trash"))
}
