use axum::{
    body::{Body, Bytes},
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;

use crate::api::problem::{Problem, ProblemResponse};

/// JSON body extractor whose rejections render as `400` problem documents
/// instead of axum's plain-text bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_to_problem(&rejection)),
        }
    }
}

/// Like [`JsonBody`], but an empty body reads as `T::default()`, with or
/// without a content type. Non-empty bodies go through [`JsonBody`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBodyOrDefault<T>(pub T);

impl<S, T> FromRequest<S> for JsonBodyOrDefault<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let headers = req.headers().clone();
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection, "failed to read request body");
            let status = rejection.status();
            ProblemResponse::from(Problem::new(
                status,
                status.canonical_reason().unwrap_or("Bad Request"),
                rejection.body_text(),
            ))
        })?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }

        let mut rebuilt = Request::new(Body::from(bytes));
        *rebuilt.headers_mut() = headers;
        let JsonBody(value) = JsonBody::<T>::from_request(rebuilt, state).await?;
        Ok(Self(value))
    }
}

fn rejection_to_problem(rejection: &JsonRejection) -> ProblemResponse {
    tracing::debug!(error = %rejection, "rejected request body");
    Problem::new(StatusCode::BAD_REQUEST, "Bad Request", rejection.body_text())
        .with_code("INVALID_JSON_BODY")
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header, response::IntoResponse, routing::post, Router};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Payload {
        name: String,
    }

    async fn echo(JsonBody(p): JsonBody<Payload>) -> String {
        p.name
    }

    fn app() -> Router {
        Router::new().route("/echo", post(echo))
    }

    async fn send(body: &'static str, content_type: Option<&str>) -> axum::response::Response {
        let mut req = axum::http::Request::builder().method("POST").uri("/echo");
        if let Some(ct) = content_type {
            req = req.header(header::CONTENT_TYPE, ct);
        }
        app()
            .oneshot(req.body(Body::from(body)).unwrap())
            .await
            .unwrap()
            .into_response()
    }

    #[derive(Deserialize, Default)]
    struct Flag {
        #[serde(default)]
        on: bool,
    }

    async fn flag(JsonBodyOrDefault(f): JsonBodyOrDefault<Flag>) -> String {
        f.on.to_string()
    }

    async fn send_flag(body: &'static str, content_type: Option<&str>) -> (StatusCode, String) {
        let mut req = axum::http::Request::builder().method("POST").uri("/flag");
        if let Some(ct) = content_type {
            req = req.header(header::CONTENT_TYPE, ct);
        }
        let resp = Router::new()
            .route("/flag", post(flag))
            .oneshot(req.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn empty_body_reads_as_default() {
        assert_eq!(send_flag("", None).await, (StatusCode::OK, "false".into()));
        assert_eq!(
            send_flag(" \n", Some("application/json")).await,
            (StatusCode::OK, "false".into())
        );
    }

    #[tokio::test]
    async fn present_body_still_needs_valid_json() {
        assert_eq!(
            send_flag(r#"{"on":true}"#, Some("application/json")).await,
            (StatusCode::OK, "true".into())
        );

        for (body, ct) in [
            ("{not json", Some("application/json")),
            (r#"{"on":true}"#, None),
        ] {
            let (status, text) = send_flag(body, ct).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
            let json: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(json["code"], "INVALID_JSON_BODY");
        }
    }

    #[tokio::test]
    async fn valid_body_passes_through() {
        let resp = send(r#"{"name":"ok"}"#, Some("application/json")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_body_is_a_400_problem() {
        for (body, ct) in [
            ("{not json", Some("application/json")),
            (r#"{"name": 5}"#, Some("application/json")),
            (r#"{"name":"x"}"#, None),
        ] {
            let resp = send(body, ct).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body}");
            let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
                .await
                .unwrap();
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(json["code"], "INVALID_JSON_BODY");
        }
    }
}
