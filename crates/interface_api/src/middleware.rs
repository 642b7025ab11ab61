//! API middleware

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use core_kernel::OperationMetadata;

/// Header carrying the request id back to the caller
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id assigned by [`audit_middleware`]
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// Port metadata carrying this id as the correlation id
    pub fn metadata(&self) -> OperationMetadata {
        OperationMetadata::with_correlation_id(self.0.clone()).initiated_by("accounting-api")
    }
}

/// Audit logging middleware
///
/// Assigns every request a time-ordered id, echoes it in `x-request-id`
/// and logs the outcome.
pub async fn audit_middleware(mut request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    request.extensions_mut().insert(RequestId(request_id.clone()));

    let start = Utc::now();

    let mut response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
