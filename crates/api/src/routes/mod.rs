//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                                              - Liveness check
//! GET   /health/ready                                        - Readiness check (store ping)
//!
//! # Shipping addresses (nested under the API namespace, default /wc/v3)
//! GET   {ns}/customers/multiple-shipping-address             - List, filter by user_id / type
//! POST  {ns}/customers/multiple-shipping-address             - Create
//! PATCH {ns}/customers/multiple-shipping-address/{id}        - Replace payload
//! ```
//!
//! Unmatched paths answer with a structured `rest_no_route` 404.

pub mod addresses;
pub mod health;
pub mod params;

use axum::{
    Router,
    routing::{get, patch},
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::ApiError;
use crate::state::AppState;

/// Base path of the address resource inside the API namespace.
pub const ADDRESSES_PATH: &str = "/customers/multiple-shipping-address";

/// Build the address routes, relative to the API namespace.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            ADDRESSES_PATH,
            get(addresses::list_addresses).post(addresses::create_address),
        )
        .route(
            &format!("{ADDRESSES_PATH}/{{id}}"),
            patch(addresses::update_address),
        )
}

/// Build the complete application router.
///
/// `namespace` must start with `/` and must not end with `/`; the config
/// loader enforces this.
pub fn build_router(state: AppState, namespace: &str) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest(namespace, routes())
        .fallback(no_route)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

async fn no_route() -> ApiError {
    ApiError::NoRoute
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::db::MemoryAddressStore;

    fn app() -> Router {
        let state = AppState::new(Arc::new(MemoryAddressStore::new()), false);
        build_router(state, "/wc/v3")
    }

    async fn send(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (status, _) = send("/health").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send("/health/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_is_mounted_under_namespace() {
        let (status, body) = send("/wc/v3/customers/multiple-shipping-address").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));

        let (status, body) = send("/customers/multiple-shipping-address").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "rest_no_route");
    }

    #[tokio::test]
    async fn test_unknown_path_is_structured_404() {
        let (status, body) = send("/wc/v3/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "rest_no_route");
        assert_eq!(body["data"]["status"], 404);
    }
}
