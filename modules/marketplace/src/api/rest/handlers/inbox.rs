use std::sync::Arc;

use axum::{extract::Path, http::Uri, response::Json, Extension};
use modkit::{JsonBody, ProblemResponse};

use crate::api::rest::dto::{
    MessageDto, MessageEnvelope, MessageListDto, PostMessageReq, SupplierRefReq, ThreadEnvelope,
    ThreadListDto,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::session::Session;
use crate::domain::service::Service;

/// Open (or reuse) the caller's conversation with a supplier.
pub async fn start_thread(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
    JsonBody(req): JsonBody<SupplierRefReq>,
) -> Result<Json<ThreadEnvelope>, ProblemResponse> {
    let thread = svc
        .start_thread(&caller, req.supplier_id.as_deref())
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(ThreadEnvelope {
        ok: true,
        thread: thread.into(),
    }))
}

pub async fn my_threads(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
) -> Result<Json<ThreadListDto>, ProblemResponse> {
    let items = svc
        .my_threads(&caller)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(items.into()))
}

pub async fn thread_messages(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
    Path(id): Path<String>,
) -> Result<Json<MessageListDto>, ProblemResponse> {
    let items = svc
        .thread_messages(&caller, &id)
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(MessageListDto {
        items: items.into_iter().map(MessageDto::from).collect(),
    }))
}

pub async fn post_message(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Session(caller): Session,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<PostMessageReq>,
) -> Result<Json<MessageEnvelope>, ProblemResponse> {
    let message = svc
        .post_message(&caller, &id, req.text.as_deref())
        .await
        .map_err(|e| map_domain_error(&e, uri.path()))?;
    Ok(Json(MessageEnvelope {
        ok: true,
        message: message.into(),
    }))
}
