//! JSON REST API for Karir.
//!
//! Exposes an axum [`Router`] backed by any [`karir_core::store::CareerStore`].
//! Every response uses the `{success, message, data?, meta?}` envelope from
//! [`response`]. TLS and listener setup are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = AppState::new(Arc::new(store), AuthConfig::default(), timeout);
//! axum::serve(listener, karir_api::api_router(state)).await?;
//! ```

pub mod alumni;
pub mod auth;
pub mod employment;
pub mod error;
pub mod pagination;
pub mod response;
pub mod trash;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use karir_core::{Error, lifecycle::LifecycleEngine, store::CareerStore};
use tower_http::trace::TraceLayer;

pub use auth::AuthConfig;
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub engine: LifecycleEngine<S>,
  pub auth:   Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      engine: self.engine.clone(),
      auth:   Arc::clone(&self.auth),
    }
  }
}

impl<S> AppState<S> {
  /// Wire `store` into a lifecycle engine bounded by `timeout`.
  pub fn new(store: Arc<S>, auth: AuthConfig, timeout: Duration) -> Self {
    let engine = LifecycleEngine::new(Arc::clone(&store)).with_timeout(timeout);
    Self { store, engine, auth: Arc::new(auth) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the fully-materialised API router for `state`.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  Router::new()
    // Auth
    .route("/auth/login", post(auth::login::<S>))
    .route("/auth/me", get(auth::me::<S>))
    // Alumni
    .route("/alumni", post(alumni::create::<S>))
    .route(
      "/alumni/{id}",
      get(alumni::get_one::<S>)
        .put(alumni::update::<S>)
        .delete(alumni::delete::<S>),
    )
    // Employment
    .route("/pekerjaan", get(employment::list::<S>).post(employment::create::<S>))
    .route(
      "/pekerjaan/{id}",
      get(employment::get_one::<S>)
        .put(employment::update::<S>)
        .delete(employment::soft_delete::<S>),
    )
    .route("/pekerjaan/alumni/{alumni_id}", get(employment::list_for_alumni::<S>))
    // Trash
    .route("/pekerjaan/trash", get(trash::list::<S>))
    .route("/pekerjaan/trash/restore/{id}", put(trash::restore::<S>))
    .route("/pekerjaan/trash/{id}", delete(trash::hard_delete::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
