//! Bearer-token session extractor.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use tally_core::{services::MapLookup, session::SessionContext, store::ScoreStore};
use uuid::Uuid;

use crate::{AppState, error::Error, registry::SessionRegistry};

/// The session behind the request's `Authorization: Bearer <token>` header.
pub struct Session(pub SessionContext);

/// Parse the bearer token out of `headers`.
pub fn bearer_token(headers: &HeaderMap) -> Result<Uuid, Error> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;
  let token = value.strip_prefix("Bearer ").ok_or(Error::Unauthorized)?;
  Uuid::parse_str(token.trim()).map_err(|_| Error::Unauthorized)
}

pub async fn resolve(
  headers: &HeaderMap,
  sessions: &SessionRegistry,
) -> Result<SessionContext, Error> {
  let token = bearer_token(headers)?;
  sessions.get(&token).await.ok_or(Error::Unauthorized)
}

impl<S> FromRequestParts<AppState<S>> for Session
where
  S: ScoreStore + MapLookup + Clone + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    resolve(&parts.headers, &state.sessions).await.map(Session)
  }
}
