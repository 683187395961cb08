//! The JSON envelope every endpoint answers with.

use axum::{
  Json,
  response::{IntoResponse, Response},
};
use karir_core::query::Listing;
use serde::Serialize;

/// `{success, message, data?, meta?}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub success: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:    Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub meta:    Option<PageMeta>,
}

/// Pagination metadata attached to datatable listings.
#[derive(Debug, Serialize)]
pub struct PageMeta {
  pub page:    u32,
  pub limit:   u32,
  pub total:   u64,
  pub pages:   u64,
  pub sort_by: &'static str,
  pub order:   &'static str,
  pub search:  String,
}

impl<T> Envelope<T> {
  pub fn ok(message: impl Into<String>, data: T) -> Self {
    Self { success: true, message: message.into(), data: Some(data), meta: None }
  }

  /// A success envelope with no payload.
  pub fn done(message: impl Into<String>) -> Self {
    Self { success: true, message: message.into(), data: None, meta: None }
  }

  pub fn failure(message: impl Into<String>) -> Self {
    Self { success: false, message: message.into(), data: None, meta: None }
  }
}

impl<T> Envelope<Vec<T>> {
  pub fn page(message: impl Into<String>, listing: Listing<T>) -> Self {
    let meta = PageMeta {
      page:    listing.page.page,
      limit:   listing.page.limit,
      total:   listing.total,
      pages:   listing.page.pages(listing.total),
      sort_by: listing.sort.as_str(),
      order:   listing.order.as_str(),
      search:  listing.search.unwrap_or_default(),
    };
    Self {
      success: true,
      message: message.into(),
      data:    Some(listing.items),
      meta:    Some(meta),
    }
  }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
  fn into_response(self) -> Response { Json(self).into_response() }
}
