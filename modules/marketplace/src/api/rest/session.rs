//! Session cookie handling and the extractors that turn it into a `Caller`.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use modkit::ProblemResponse;

use crate::auth::JwtManager;
use crate::contract::model::Caller;
use crate::errors::ErrorCode;

pub const SESSION_COOKIE: &str = "token";

/// HTTP-only, SameSite=Lax session cookie living as long as the token.
pub fn session_cookie(token: String, ttl_secs: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(ttl_secs))
        .build()
}

/// Removal cookie for logout.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// The verified caller, or `None` when the cookie is absent, invalid or expired.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Caller>);

impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jwt = parts
            .extensions
            .get::<Arc<JwtManager>>()
            .cloned()
            .ok_or_else(|| {
                tracing::error!("session keys missing from request extensions");
                ErrorCode::Internal.to_response("An internal error occurred")
            })?;
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});

        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(Self(None));
        };
        match jwt.validate(cookie.value()) {
            Ok(claims) => Ok(Self(claims.caller())),
            Err(e) => {
                tracing::debug!(error = %e, "rejected session token");
                Ok(Self(None))
            }
        }
    }
}

/// A verified caller; rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct Session(pub Caller);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match MaybeSession::from_request_parts(parts, state).await? {
            MaybeSession(Some(caller)) => Ok(Self(caller)),
            MaybeSession(None) => Err(ErrorCode::Unauthenticated
                .to_problem("Unauthenticated")
                .with_instance(parts.uri.path())
                .into()),
        }
    }
}
