use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::Uri,
    response::Json,
    Extension,
};
use modkit::ProblemResponse;
use tracing::debug;

use crate::api::rest::dto::{
    PackageListDto, SearchQuery, SupplierDto, SupplierListDto, SupplierQuery,
};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

/// Approved suppliers matching the optional filters.
pub async fn list_suppliers(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Query(query): Query<SupplierQuery>,
) -> Result<Json<SupplierListDto>, ProblemResponse> {
    debug!(?query, "listing suppliers");
    let items = svc
        .list_suppliers(&query.into())
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(items.into()))
}

pub async fn get_supplier(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Path(id): Path<String>,
) -> Result<Json<SupplierDto>, ProblemResponse> {
    let supplier = svc
        .get_supplier(&id)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(supplier.into()))
}

pub async fn supplier_packages(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Path(id): Path<String>,
) -> Result<Json<PackageListDto>, ProblemResponse> {
    let items = svc
        .supplier_packages(&id)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(items.into()))
}

pub async fn featured_packages(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> Result<Json<PackageListDto>, ProblemResponse> {
    let items = svc
        .featured_packages()
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(items.into()))
}

pub async fn search_packages(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PackageListDto>, ProblemResponse> {
    let q = query.q.unwrap_or_default();
    let items = svc
        .search_packages(q.trim())
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(items.into()))
}
