//! Bearer-token authentication: login, token hashing and the extractors that
//! turn an `Authorization` header into an [`Identity`].
//!
//! Tokens are 32 random bytes, hex-encoded, handed to the client once. The
//! store only ever sees their SHA-256 digest.

use std::sync::LazyLock;

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, State, rejection::JsonRejection},
  http::{HeaderMap, header, request::Parts},
};
use chrono::{DateTime, Utc};
use karir_core::{
  Error,
  account::{Session, User},
  identity::Identity,
  store::CareerStore,
};
use rand_core::{OsRng, RngCore as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AppState, error::ApiError, response::Envelope};

/// Session settings for this server instance.
#[derive(Debug, Clone)]
pub struct AuthConfig {
  pub session_ttl: chrono::Duration,
}

impl Default for AuthConfig {
  fn default() -> Self { Self { session_ttl: chrono::Duration::hours(24) } }
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// A fresh opaque bearer token.
pub fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// Lowercase hex SHA-256 of `token`, as stored in the sessions table.
pub fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// The token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.split_once(' ')?;
  let token = token.trim();
  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Stand-in hash for logins that name no account. Both login branches run
/// exactly one argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(b"karir-no-such-account", &salt)
    .ok()
    .map(|hash| hash.to_string())
});

/// `true` if `password` matches the PHC string `stored`. Unparseable hashes
/// never match.
pub fn verify_password(stored: &str, password: &str) -> bool {
  PasswordHash::new(stored)
    .map(|hash| {
      Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
    })
    .unwrap_or(false)
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// Any authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Identity);

/// An authenticated caller holding the admin role. Non-admins get 403.
#[derive(Debug, Clone, Copy)]
pub struct AdminCaller(pub Identity);

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)
      .ok_or(ApiError::Unauthorized("missing bearer token"))?;
    let token_hash = hash_token(token);

    let identity = state
      .engine
      .bounded(async {
        Ok::<_, Error>(state.store.resolve_session(token_hash, Utc::now()).await?)
      })
      .await?
      .ok_or(ApiError::Unauthorized("invalid or expired token"))?;
    Ok(Caller(identity))
  }
}

impl<S> FromRequestParts<AppState<S>> for AdminCaller
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Caller(identity) = Caller::from_request_parts(parts, state).await?;
    if !identity.is_admin() {
      tracing::debug!(subject_id = %identity.subject_id, "admin route refused");
      return Err(ApiError::Forbidden);
    }
    Ok(AdminCaller(identity))
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  /// Username or email.
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token:      String,
  pub token_type: &'static str,
  pub expires_at: DateTime<Utc>,
  pub user:       User,
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Envelope<LoginResponse>, ApiError>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  let Json(body) = body?;
  let store = &state.store;

  let credentials = state
    .engine
    .bounded(async {
      Ok::<_, Error>(store.find_user_by_login(body.username.clone()).await?)
    })
    .await?;

  let stored = match &credentials {
    Some(c) => Some(c.password_hash.as_str()),
    None => DUMMY_HASH.as_deref(),
  };
  let verified = stored.is_some_and(|hash| verify_password(hash, &body.password));

  let credentials = match credentials {
    Some(c) if verified => c,
    Some(c) => {
      tracing::warn!(user_id = %c.user.user_id, "rejected password");
      return Err(ApiError::Unauthorized("invalid credentials"));
    }
    None => {
      tracing::warn!(login = %body.username, "login for unknown user");
      return Err(ApiError::Unauthorized("invalid credentials"));
    }
  };

  let token = generate_token();
  let now = Utc::now();
  let session = Session {
    token_hash: hash_token(&token),
    user_id:    credentials.user.user_id,
    issued_at:  now,
    expires_at: now + state.auth.session_ttl,
  };
  let expires_at = session.expires_at;

  state
    .engine
    .bounded(async {
      let purged = store.delete_expired_sessions(now).await?;
      if purged > 0 {
        tracing::debug!(purged, "expired sessions removed");
      }
      store.create_session(session).await?;
      Ok::<_, Error>(())
    })
    .await?;

  tracing::info!(user_id = %credentials.user.user_id, "login succeeded");
  Ok(Envelope::ok("login successful", LoginResponse {
    token,
    token_type: "Bearer",
    expires_at,
    user: credentials.user,
  }))
}

/// `GET /auth/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  Caller(identity): Caller,
) -> Result<Envelope<User>, ApiError>
where
  S: CareerStore + 'static,
  Error: From<S::Error>,
{
  let user = state
    .engine
    .bounded(async { Ok::<_, Error>(state.store.get_user(identity.subject_id).await?) })
    .await?
    .ok_or(ApiError::Unauthorized("account no longer exists"))?;
  Ok(Envelope::ok("current user", user))
}
