//! Moderation and platform metrics. The service enforces the admin role.

use std::sync::Arc;

use axum::{extract::Path, http::Uri, response::Json, Extension};
use modkit::{JsonBodyOrDefault, ProblemResponse};

use crate::api::rest::dto::{
    truthy, ApproveReq, FeatureReq, MetricsDto, PackageEnvelope, PackageListDto, SupplierEnvelope,
    SupplierListDto, TimeseriesDto,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::session::Session;
use crate::domain::service::Service;

pub async fn metrics(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
) -> Result<Json<MetricsDto>, ProblemResponse> {
    let counts = svc
        .metrics(&caller)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(counts.into()))
}

pub async fn metrics_timeseries(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
) -> Result<Json<TimeseriesDto>, ProblemResponse> {
    let activity = svc
        .metrics_timeseries(&caller)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(activity.into()))
}

pub async fn all_suppliers(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
) -> Result<Json<SupplierListDto>, ProblemResponse> {
    let items = svc
        .all_suppliers(&caller)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(items.into()))
}

pub async fn approve_supplier(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
    Path(id): Path<String>,
    JsonBodyOrDefault(req): JsonBodyOrDefault<ApproveReq>,
) -> Result<Json<SupplierEnvelope>, ProblemResponse> {
    let supplier = svc
        .set_supplier_approved(&caller, &id, truthy(req.approved.as_ref()))
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(supplier.into()))
}

pub async fn all_packages(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
) -> Result<Json<PackageListDto>, ProblemResponse> {
    let items = svc
        .all_packages(&caller)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(items.into()))
}

pub async fn approve_package(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
    Path(id): Path<String>,
    JsonBodyOrDefault(req): JsonBodyOrDefault<ApproveReq>,
) -> Result<Json<PackageEnvelope>, ProblemResponse> {
    let package = svc
        .set_package_approved(&caller, &id, truthy(req.approved.as_ref()))
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(package.into()))
}

pub async fn feature_package(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
    Path(id): Path<String>,
    JsonBodyOrDefault(req): JsonBodyOrDefault<FeatureReq>,
) -> Result<Json<PackageEnvelope>, ProblemResponse> {
    let package = svc
        .set_package_featured(&caller, &id, truthy(req.featured.as_ref()))
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(package.into()))
}
