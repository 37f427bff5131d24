//! Smoke tests against a running `multiship-api`.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p multiship-api)
//!
//! Set `MULTISHIP_BASE_URL` to point at a non-default server.

use multiship_integration_tests::live_base_url;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

fn addresses_url() -> String {
    format!("{}/wc/v3/customers/multiple-shipping-address", live_base_url())
}

#[tokio::test]
#[ignore = "Requires a running multiship-api server"]
async fn test_live_health() {
    let resp = Client::new()
        .get(format!("{}/health/ready", live_base_url()))
        .send()
        .await
        .expect("Failed to reach server");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires a running multiship-api server"]
async fn test_live_create_then_list() {
    let client = Client::new();
    let user_id = 900_001;

    let resp = client
        .post(addresses_url())
        .json(&json!({
            "userid": user_id,
            "type": "shipping",
            "userdata": { "shipping_city": "Pune" }
        }))
        .send()
        .await
        .expect("Failed to create address");
    assert_eq!(resp.status(), StatusCode::OK);

    let rows: Vec<Value> = client
        .get(format!("{}?user_id={user_id}&type=shipping", addresses_url()))
        .send()
        .await
        .expect("Failed to list addresses")
        .json()
        .await
        .expect("List response is not JSON");

    assert!(
        rows.iter()
            .any(|row| row["user_data"]["shipping_city"] == "Pune")
    );
}

#[tokio::test]
#[ignore = "Requires a running multiship-api server"]
async fn test_live_create_missing_fields() {
    let resp = Client::new()
        .post(addresses_url())
        .json(&json!({ "type": "shipping" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Error body is not JSON");
    assert_eq!(body["code"], "invalid_params");
}
