use std::sync::Arc;

use axum::{http::Uri, response::Json, Extension};
use axum_extra::extract::cookie::CookieJar;
use modkit::{JsonBody, JsonBodyOrDefault, ProblemResponse};
use tracing::{error, info};

use crate::api::rest::dto::{
    truthy, AuthResponse, LoginReq, MeResponse, OkResponse, RegisterReq, SettingsDto,
    SettingsReq, SettingsSavedDto, UserDto,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::session::{clear_session, session_cookie, MaybeSession, Session};
use crate::auth::JwtManager;
use crate::contract::model::User;
use crate::domain::service::Service;
use crate::errors::ErrorCode;

/// Attach a fresh session cookie for `user`.
fn sign_in(
    jwt: &JwtManager,
    jar: CookieJar,
    user: &User,
    instance: &str,
) -> Result<CookieJar, ProblemResponse> {
    let token = jwt.issue(&user.as_caller()).map_err(|e| {
        error!(error = %e, user_id = %user.id, "failed to sign session token");
        ProblemResponse(
            ErrorCode::Internal
                .to_problem("An internal error occurred")
                .with_instance(instance),
        )
    })?;
    Ok(jar.add(session_cookie(token, jwt.ttl_secs())))
}

pub async fn register(
    Extension(svc): Extension<Arc<Service>>,
    Extension(jwt): Extension<Arc<JwtManager>>,
    uri: Uri,
    jar: CookieJar,
    JsonBody(req): JsonBody<RegisterReq>,
) -> Result<(CookieJar, Json<AuthResponse>), ProblemResponse> {
    let user = svc.register(req.into()).await.map_err(|e| {
        info!(error = %e, "registration rejected");
        map_domain_error(&e, uri.path())
    })?;
    let jar = sign_in(&jwt, jar, &user, uri.path())?;
    Ok((
        jar,
        Json(AuthResponse {
            ok: true,
            user: user.into(),
        }),
    ))
}

pub async fn login(
    Extension(svc): Extension<Arc<Service>>,
    Extension(jwt): Extension<Arc<JwtManager>>,
    uri: Uri,
    jar: CookieJar,
    JsonBody(req): JsonBody<LoginReq>,
) -> Result<(CookieJar, Json<AuthResponse>), ProblemResponse> {
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();
    let user = svc
        .login(&email, &password)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    let jar = sign_in(&jwt, jar, &user, uri.path())?;
    Ok((
        jar,
        Json(AuthResponse {
            ok: true,
            user: user.into(),
        }),
    ))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<OkResponse>) {
    (clear_session(jar), Json(OkResponse::ok()))
}

/// Current account, or `{"user": null}` for anonymous or stale sessions.
pub async fn me(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    MaybeSession(caller): MaybeSession,
) -> Result<Json<MeResponse>, ProblemResponse> {
    let Some(caller) = caller else {
        return Ok(Json(MeResponse { user: None }));
    };
    let user = svc
        .current_user(&caller)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(MeResponse {
        user: user.map(UserDto::with_notify),
    }))
}

pub async fn get_settings(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
) -> Result<Json<SettingsDto>, ProblemResponse> {
    let notify = svc
        .get_settings(&caller)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(SettingsDto { notify }))
}

pub async fn save_settings(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
    JsonBodyOrDefault(req): JsonBodyOrDefault<SettingsReq>,
) -> Result<Json<SettingsSavedDto>, ProblemResponse> {
    let notify = svc
        .save_settings(&caller, truthy(req.notify.as_ref()))
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(SettingsSavedDto { ok: true, notify }))
}
