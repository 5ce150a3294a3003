mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

fn contractor_payload() -> serde_json::Value {
    json!({
        "contractor": {
            "company_name": "Granite Construction",
            "contact_name": "Dana Smith",
            "email": "dana@granite.example",
            "phone": "+1-555-0100",
            "delivery_address": {
                "line1": "12 Quarry Rd",
                "city": "Bergen",
                "postal_code": "5003",
                "country": "NO"
            }
        }
    })
}

#[tokio::test]
async fn cart_captures_tier_price_at_add_time() {
    let app = TestApp::new().await;
    let (_, _tenant, token) = app.contractor().await;
    let product = app
        .seed_product("HELMET-01", &[(1, 10, dec!(100)), (11, 20, dec!(90))])
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart/items",
            Some(json!({
                "product_id": product.product.id,
                "color": "yellow",
                "size": "M",
                "quantity": 5
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request(Method::GET, "/api/v1/cart", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cart = body_json(response).await;
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
    assert_eq!(cart["lines"][0]["unit_price"], json!("100"));
    assert_eq!(cart["lines"][0]["line_total"], json!("500"));
    assert_eq!(cart["total"], json!("500"));
}

#[tokio::test]
async fn merging_lines_re_resolves_the_tier() {
    let app = TestApp::new().await;
    let (_, _tenant, token) = app.contractor().await;
    let product = app
        .seed_product("GLOVE-01", &[(1, 10, dec!(100)), (11, 20, dec!(90))])
        .await;

    for quantity in [5, 10] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/cart/items",
                Some(json!({
                    "product_id": product.product.id,
                    "color": "grey",
                    "size": "L",
                    "quantity": quantity
                })),
                Some(&token),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let cart = body_json(
        app.request(Method::GET, "/api/v1/cart", None, Some(&token))
            .await,
    )
    .await;
    // 5 + 10 = 15 lands in the second tier
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
    assert_eq!(cart["lines"][0]["quantity"], json!(15));
    assert_eq!(cart["lines"][0]["unit_price"], json!("90"));
}

#[tokio::test]
async fn quantity_outside_every_tier_is_rejected() {
    let app = TestApp::new().await;
    let (_, _tenant, token) = app.contractor().await;
    let product = app
        .seed_product("BOOT-01", &[(1, 10, dec!(100)), (11, 20, dec!(90))])
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart/items",
            Some(json!({
                "product_id": product.product.id,
                "color": "black",
                "size": "43",
                "quantity": 25
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn captured_prices_stay_until_refreshed() {
    let app = TestApp::new().await;
    let (_, _tenant, token) = app.contractor().await;
    let (_, admin_token) = app.admin().await;
    let product = app.seed_product("VEST-01", &[(1, 100, dec!(50))]).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart/items",
            Some(json!({
                "product_id": product.product.id,
                "color": "orange",
                "size": "XL",
                "quantity": 10
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Admin reprices the product; the cart keeps the captured price.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/products/{}/price-tiers", product.product.id),
            Some(json!([
                {"min_quantity": 1, "max_quantity": 100, "unit_price": "40"}
            ])),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cart = body_json(
        app.request(Method::GET, "/api/v1/cart", None, Some(&token))
            .await,
    )
    .await;
    assert_eq!(cart["lines"][0]["unit_price"], json!("50"));

    // Explicit refresh re-resolves against the current tiers.
    let refreshed = body_json(
        app.request(
            Method::POST,
            "/api/v1/cart/refresh-prices",
            None,
            Some(&token),
        )
        .await,
    )
    .await;
    assert_eq!(refreshed["lines"][0]["unit_price"], json!("40"));
    assert_eq!(refreshed["total"], json!("400"));
}

#[tokio::test]
async fn checkout_snapshots_the_cart_and_clears_it() {
    let app = TestApp::new().await;
    let (_, _tenant, token) = app.contractor().await;
    let product = app
        .seed_product("EARMUFF-01", &[(1, 10, dec!(30)), (11, 50, dec!(25))])
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart/items",
            Some(json!({
                "product_id": product.product.id,
                "color": "red",
                "size": "one-size",
                "quantity": 20
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders/checkout",
            Some(contractor_payload()),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = body_json(response).await;

    assert!(order["order"]["order_number"]
        .as_str()
        .unwrap()
        .starts_with("SG-"));
    assert_eq!(order["order"]["status"], json!("processing"));
    assert_eq!(order["order"]["total"], json!("500"));
    assert!(order["order"]["promised_by"].is_string());
    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_name"], json!("Test Product EARMUFF-01"));
    assert_eq!(items[0]["unit_price"], json!("25"));

    // Checkout empties the cart.
    let cart = body_json(
        app.request(Method::GET, "/api/v1/cart", None, Some(&token))
            .await,
    )
    .await;
    assert!(cart["lines"].as_array().unwrap().is_empty());

    // An empty cart cannot be checked out again.
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders/checkout",
            Some(contractor_payload()),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn carts_are_isolated_per_tenant() {
    let app = TestApp::new().await;
    let (_, _tenant_a, token_a) = app.contractor().await;
    let (_, _tenant_b, token_b) = app.contractor().await;
    let product = app.seed_product("GOGGLE-01", &[(1, 100, dec!(15))]).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart/items",
            Some(json!({
                "product_id": product.product.id,
                "color": "clear",
                "size": "one-size",
                "quantity": 3
            })),
            Some(&token_a),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let cart_b = body_json(
        app.request(Method::GET, "/api/v1/cart", None, Some(&token_b))
            .await,
    )
    .await;
    assert!(cart_b["lines"].as_array().unwrap().is_empty());
}
