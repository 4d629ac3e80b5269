use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use crate::core::http::response_envelope::ErrorBody;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn request_id(req: &Request<Body>) -> String {
    if let Some(v) = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.trim().is_empty())
    {
        return v.to_string();
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    format!("req-{nanos}")
}

fn is_json(parts: &axum::http::response::Parts) -> bool {
    parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn summary_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "Expected a JSON request body",
        StatusCode::UNPROCESSABLE_ENTITY => "Request body does not match the expected shape",
        _ => "Bad request",
    }
}

/// Stamps `X-Request-Id` on every response and rewrites axum's plain-text
/// extractor rejections (400/415/422) into the `{error, details}` shape.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let id = request_id(&req);
    let res = next.run(req).await;
    let status = res.status();

    let rejectable = matches!(
        status,
        StatusCode::BAD_REQUEST
            | StatusCode::UNSUPPORTED_MEDIA_TYPE
            | StatusCode::UNPROCESSABLE_ENTITY
    );

    let mut res = if rejectable {
        let (mut parts, bytes) = take_body(res).await;
        if is_json(&parts) {
            Response::from_parts(parts, Body::from(bytes))
        } else {
            let original = String::from_utf8_lossy(&bytes).trim().to_string();
            debug!(%id, status = status.as_u16(), %original, "mapping extractor rejection");

            let body = ErrorBody::new(
                summary_for(status),
                (!original.is_empty()).then_some(original),
            );
            let bytes = serde_json::to_vec(&body).unwrap_or_else(|_| bytes.to_vec());
            parts
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            parts.headers.remove(axum::http::header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(bytes))
        }
    } else {
        res
    };

    if let Ok(v) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, v);
    }
    res
}
