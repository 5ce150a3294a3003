//! Request-id propagation.
//!
//! Every request carries an `x-request-id` header (inbound value reused,
//! otherwise generated). The id is held in a task-local so error responses
//! and log lines produced anywhere under the handler can attach it.

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::future::Future;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static REQUEST_ID: String;
}

/// The request id of the current task, if one is in scope.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// Runs a future with the given request id in scope. Used directly by tests;
/// the middleware wraps every handler call with this.
pub async fn scope_request_id<F>(request_id: String, fut: F) -> F::Output
where
    F: Future,
{
    REQUEST_ID.scope(request_id, fut).await
}

/// Middleware ensuring every request carries a request id for traceability.
pub async fn request_id_middleware(request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut response = scope_request_id(request_id.clone(), next.run(request)).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_id_visible_inside_scope() {
        let seen = scope_request_id("req-42".to_string(), async { current_request_id() }).await;
        assert_eq!(seen.as_deref(), Some("req-42"));
    }

    #[tokio::test]
    async fn request_id_absent_outside_scope() {
        assert!(current_request_id().is_none());
    }
}
