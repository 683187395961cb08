//! Datatable query-string parameters.

use karir_core::query::{ListRequest, PageRequest};
use serde::Deserialize;

use crate::error::ApiError;

/// `?page&limit&search&sortBy&order`
///
/// Numbers arrive signed so that `page=-3` can be clamped rather than
/// rejected; anything non-numeric fails extraction with a 400.
#[derive(Debug, Default, Deserialize)]
pub struct DatatableParams {
  pub page:    Option<i64>,
  pub limit:   Option<i64>,
  pub search:  Option<String>,
  #[serde(rename = "sortBy")]
  pub sort_by: Option<String>,
  pub order:   Option<String>,
}

impl DatatableParams {
  pub fn into_request(self) -> Result<ListRequest, ApiError> {
    let page = self.page.map(|p| u32::try_from(p.max(1)).unwrap_or(u32::MAX));
    let limit = match self.limit {
      Some(l) if l < 1 => {
        return Err(ApiError::BadRequest("limit must be at least 1".into()));
      }
      Some(l) => Some(u32::try_from(l).unwrap_or(u32::MAX)),
      None => None,
    };
    Ok(ListRequest {
      page:    PageRequest::new(page, limit)?,
      search:  self.search,
      sort_by: self.sort_by,
      order:   self.order,
    })
  }
}
