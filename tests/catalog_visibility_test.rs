mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

fn draft_product_payload(sku: &str) -> serde_json::Value {
    json!({
        "sku": sku,
        "name": "Unreleased Respirator",
        "description": "Not yet in the catalog",
        "category": "respirators",
        "brand": "SafeGear",
        "use_life_months": 12,
        "price_tiers": [
            {"min_quantity": 1, "max_quantity": 100, "unit_price": "30"}
        ],
        "lead_time_tiers": [
            {"min_quantity": 1, "max_quantity": 100, "days": 7}
        ]
    })
}

fn skus(list: &serde_json::Value) -> Vec<String> {
    list["data"]
        .as_array()
        .expect("paginated data array")
        .iter()
        .map(|p| p["sku"].as_str().expect("sku").to_string())
        .collect()
}

#[tokio::test]
async fn contractors_only_ever_see_active_products() {
    let app = TestApp::new().await;
    let (_, _, token) = app.contractor().await;
    let (_, admin_token) = app.admin().await;

    app.seed_product("GLOVE-1", &[(1, 100, dec!(10))]).await;

    // New products default to draft until an admin activates them.
    let response = app
        .request(
            Method::POST,
            "/api/v1/admin/products",
            Some(draft_product_payload("RESP-1")),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // The status filter is ignored for callers without catalog
    // management rights.
    for uri in [
        "/api/v1/products",
        "/api/v1/products?status=draft",
        "/api/v1/products?status=archived",
    ] {
        let list = body_json(
            app.request(Method::GET, uri, None, Some(&token)).await,
        )
        .await;
        assert_eq!(skus(&list), vec!["GLOVE-1".to_string()], "uri: {}", uri);
    }
}

#[tokio::test]
async fn admins_can_filter_by_any_status() {
    let app = TestApp::new().await;
    let (_, admin_token) = app.admin().await;

    app.seed_product("GLOVE-2", &[(1, 100, dec!(10))]).await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/admin/products",
            Some(draft_product_payload("RESP-2")),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let drafts = body_json(
        app.request(
            Method::GET,
            "/api/v1/products?status=draft",
            None,
            Some(&admin_token),
        )
        .await,
    )
    .await;
    assert_eq!(skus(&drafts), vec!["RESP-2".to_string()]);
}
