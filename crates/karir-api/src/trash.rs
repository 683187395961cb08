//! Handlers for trashed employment records under `/pekerjaan/trash`.
//!
//! Every route is open to any authenticated caller; the lifecycle engine
//! scopes what each caller can see or touch. Records outside that scope are
//! reported exactly like missing ones.

use axum::extract::{
  Path, Query, State,
  rejection::{PathRejection, QueryRejection},
};
use karir_core::{Error, employment::EmploymentRecord, store::CareerStore};
use uuid::Uuid;

use crate::{
  AppState, auth::Caller, error::ApiError, pagination::DatatableParams,
  response::Envelope,
};

/// `GET /pekerjaan/trash?page&limit&search&sortBy&order`
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
  let listing = state.engine.list_trash(&identity, &request).await?;
  Ok(Envelope::page("trashed employment records", listing))
}

/// `PUT /pekerjaan/trash/restore/{id}`
pub async fn restore<S>(
  State(state): State<AppState<S>>,
  Caller(identity): Caller,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Envelope<()>, ApiError>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  let Path(id) = id?;
  state.engine.restore(id, &identity).await?;
  Ok(Envelope::done("employment record restored"))
}

/// `DELETE /pekerjaan/trash/{id}`
pub async fn hard_delete<S>(
  State(state): State<AppState<S>>,
  Caller(identity): Caller,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Envelope<()>, ApiError>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  let Path(id) = id?;
  state.engine.hard_delete(id, &identity).await?;
  Ok(Envelope::done("employment record permanently deleted"))
}
