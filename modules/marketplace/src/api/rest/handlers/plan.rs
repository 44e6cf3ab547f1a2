//! Customer planning board: saved suppliers, progress and private notes.

use std::sync::Arc;

use axum::{extract::Path, http::Uri, response::Json, Extension};
use modkit::{JsonBody, JsonBodyOrDefault, ProblemResponse};

use crate::api::rest::dto::{NotesDto, OkResponse, PlanProgressDto, SupplierListDto, SupplierRefReq};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::session::Session;
use crate::domain::service::Service;

pub async fn get_plan(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
) -> Result<Json<SupplierListDto>, ProblemResponse> {
    let items = svc
        .get_plan(&caller)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(items.into()))
}

pub async fn add_to_plan(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
    JsonBody(req): JsonBody<SupplierRefReq>,
) -> Result<Json<OkResponse>, ProblemResponse> {
    svc.add_to_plan(&caller, req.supplier_id.as_deref())
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(OkResponse::ok()))
}

pub async fn remove_from_plan(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
    Path(supplier_id): Path<String>,
) -> Result<Json<OkResponse>, ProblemResponse> {
    svc.remove_from_plan(&caller, &supplier_id)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(OkResponse::ok()))
}

pub async fn plan_progress(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
) -> Result<Json<PlanProgressDto>, ProblemResponse> {
    let progress = svc
        .plan_progress(&caller)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(progress.into()))
}

pub async fn get_notes(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
) -> Result<Json<NotesDto>, ProblemResponse> {
    let text = svc
        .get_notes(&caller)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(NotesDto { text }))
}

pub async fn save_notes(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
    JsonBodyOrDefault(req): JsonBodyOrDefault<NotesDto>,
) -> Result<Json<OkResponse>, ProblemResponse> {
    svc.save_notes(&caller, req.text)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(OkResponse::ok()))
}
