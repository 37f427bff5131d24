//! Integration test helpers for Multiship.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process router tests (no external services)
//! cargo test -p multiship-integration-tests
//!
//! # Include PostgreSQL-backed and live-server tests
//! export MULTISHIP_TEST_DATABASE_URL=postgres://localhost/multiship_test
//! export MULTISHIP_BASE_URL=http://localhost:3002
//! cargo test -p multiship-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `addresses` - full router over the in-memory store
//! - `postgres` - full router over `PgAddressStore`
//! - `live_server` - HTTP requests against a running `multiship-api`

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use multiship_api::db::{AddressStore, MemoryAddressStore};
use multiship_api::{AppState, build_router};
use serde_json::Value;
use tower::ServiceExt;

/// API namespace used by every in-process test.
pub const NAMESPACE: &str = "/wc/v3";

/// Address collection path including the namespace.
pub const ADDRESSES: &str = "/wc/v3/customers/multiple-shipping-address";

/// Build the full router over any store.
pub fn app_with_store(store: Arc<dyn AddressStore>, require_list_filter: bool) -> Router {
    build_router(AppState::new(store, require_list_filter), NAMESPACE)
}

/// Build the full router over a fresh in-memory store.
///
/// The store is returned as well so tests can inspect what was persisted.
pub fn memory_app() -> (Router, Arc<MemoryAddressStore>) {
    let store = Arc::new(MemoryAddressStore::new());
    (app_with_store(store.clone(), false), store)
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Send one request through the router.
///
/// A `Some` body is sent as JSON. A non-JSON response body decodes to
/// `Value::Null`.
///
/// # Panics
///
/// Panics if the request cannot be built or the router fails.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    send_request(app, request).await
}

/// Send a prebuilt request through the router.
///
/// # Panics
///
/// Panics if the router fails or the body cannot be read.
pub async fn send_request(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router failed");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse { status, body }
}

/// Path of a single address.
#[must_use]
pub fn address_path(id: impl std::fmt::Display) -> String {
    format!("{ADDRESSES}/{id}")
}

/// Connection string for the `PostgreSQL`-backed tests.
///
/// # Panics
///
/// Panics if `MULTISHIP_TEST_DATABASE_URL` is not set.
#[must_use]
pub fn test_database_url() -> secrecy::SecretString {
    std::env::var("MULTISHIP_TEST_DATABASE_URL")
        .map(secrecy::SecretString::from)
        .expect("MULTISHIP_TEST_DATABASE_URL must be set for PostgreSQL tests")
}

/// Base URL of a running `multiship-api` for live-server tests.
#[must_use]
pub fn live_base_url() -> String {
    std::env::var("MULTISHIP_BASE_URL").unwrap_or_else(|_| "http://localhost:3002".to_string())
}
