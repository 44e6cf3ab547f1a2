//! Supplier self-service: own listings and packages.

use std::sync::Arc;

use axum::{extract::Path, http::Uri, response::Json, Extension};
use modkit::{JsonBody, ProblemResponse};
use tracing::info;

use crate::api::rest::dto::{
    CreatePackageReq, CreateSupplierReq, PackageEnvelope, PackageListDto, ScoredSupplierListDto,
    SupplierEnvelope, UpdatePackageReq, UpdateSupplierReq,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::session::Session;
use crate::domain::service::Service;

pub async fn my_suppliers(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
) -> Result<Json<ScoredSupplierListDto>, ProblemResponse> {
    let items = svc
        .my_suppliers(&caller)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(items.into()))
}

pub async fn create_supplier(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
    JsonBody(req): JsonBody<CreateSupplierReq>,
) -> Result<Json<SupplierEnvelope>, ProblemResponse> {
    let supplier = svc
        .create_supplier(&caller, req.into())
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    info!(supplier_id = %supplier.id, "supplier listing submitted for review");
    Ok(Json(supplier.into()))
}

pub async fn update_supplier(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateSupplierReq>,
) -> Result<Json<SupplierEnvelope>, ProblemResponse> {
    let supplier = svc
        .update_supplier(&caller, &id, req.into())
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(supplier.into()))
}

pub async fn my_packages(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
) -> Result<Json<PackageListDto>, ProblemResponse> {
    let items = svc
        .my_packages(&caller)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(items.into()))
}

pub async fn create_package(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
    JsonBody(req): JsonBody<CreatePackageReq>,
) -> Result<Json<PackageEnvelope>, ProblemResponse> {
    let package = svc
        .create_package(&caller, req.into())
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    info!(package_id = %package.id, "package submitted for review");
    Ok(Json(package.into()))
}

pub async fn update_package(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdatePackageReq>,
) -> Result<Json<PackageEnvelope>, ProblemResponse> {
    let package = svc
        .update_package(&caller, &id, req.into())
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(package.into()))
}
