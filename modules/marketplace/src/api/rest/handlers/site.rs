use std::sync::Arc;

use axum::{
    http::{header, Uri},
    response::{IntoResponse, Json, Response},
    Extension,
};
use modkit::{JsonBody, ProblemResponse};

use crate::api::rest::dto::{OkResponse, TrackReq};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

/// Anonymous analytics beacon.
pub async fn track(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    JsonBody(req): JsonBody<TrackReq>,
) -> Result<Json<OkResponse>, ProblemResponse> {
    let meta = req
        .meta
        .unwrap_or_else(|| serde_json::Value::Object(Default::default()));
    svc.track_event(req.kind.as_deref(), meta)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(OkResponse::ok()))
}

pub async fn sitemap(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> Result<Response, ProblemResponse> {
    let xml = svc
        .sitemap_xml()
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml).into_response())
}
