mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

struct Fixture {
    token: String,
    employee_id: Uuid,
    batch_a: Uuid,
    batch_b: Uuid,
}

/// Seeds a contractor with one employee and two batches: batch A with
/// five available units, batch B with a single one.
async fn seed(app: &TestApp) -> Fixture {
    let (_, tenant, token) = app.contractor().await;
    let product = app.seed_product("HARNESS-01", &[(1, 100, dec!(80))]).await;

    let worksite = body_json(
        app.request(
            Method::POST,
            "/api/v1/worksites",
            Some(json!({"name": "North Yard", "address": "1 Dock St"})),
            Some(&token),
        )
        .await,
    )
    .await;
    let worksite_id: Uuid = serde_json::from_value(worksite["id"].clone()).unwrap();

    let employee = body_json(
        app.request(
            Method::POST,
            "/api/v1/employees",
            Some(json!({
                "name": "Robin Berg",
                "job_title": "Rigger",
                "worksite_id": worksite_id
            })),
            Some(&token),
        )
        .await,
    )
    .await;
    let employee_id: Uuid = serde_json::from_value(employee["id"].clone()).unwrap();

    let (_, warehouse_token) = {
        let (id, _, tok) = app
            .user_with_role(safegear_api::entities::user::UserRole::Warehouse, None)
            .await;
        (id, tok)
    };

    let mut batches = Vec::new();
    for quantity in [5, 1] {
        let batch = body_json(
            app.request(
                Method::POST,
                "/api/v1/warehouse/inventory/receive",
                Some(json!({
                    "tenant_id": tenant,
                    "worksite_id": worksite_id,
                    "product_id": product.product.id,
                    "color": "blue",
                    "size": if quantity == 5 { "M" } else { "L" },
                    "quantity": quantity
                })),
                Some(&warehouse_token),
            )
            .await,
        )
        .await;
        batches.push(serde_json::from_value(batch["id"].clone()).unwrap());
    }

    Fixture {
        token,
        employee_id,
        batch_a: batches[0],
        batch_b: batches[1],
    }
}

#[tokio::test]
async fn assignment_decrements_availability_and_tracks_use_life() {
    let app = TestApp::new().await;
    let fx = seed(&app).await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/equipment/employees/{}/assignments", fx.employee_id),
            Some(json!({"batch_ids": [fx.batch_a]})),
            Some(&fx.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let batch = body_json(
        app.request(
            Method::GET,
            &format!("/api/v1/inventory/{}", fx.batch_a),
            None,
            Some(&fx.token),
        )
        .await,
    )
    .await;
    assert_eq!(batch["available_quantity"], json!(4));

    let equipment = body_json(
        app.request(
            Method::GET,
            &format!("/api/v1/equipment/employees/{}/equipment", fx.employee_id),
            None,
            Some(&fx.token),
        )
        .await,
    )
    .await;
    let rows = equipment.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    // Seeded product has a six month use life, so the clock is running.
    assert!(rows[0]["expiration_date"].is_string());
    assert!(rows[0]["renewal_date"].is_string());
    assert!(rows[0]["remaining_life_days"].as_i64().unwrap() > 0);
    assert!(rows[0]["remaining_life_days"].as_i64().unwrap() <= 185);
}

#[tokio::test]
async fn multi_batch_assignment_is_all_or_nothing() {
    let app = TestApp::new().await;
    let fx = seed(&app).await;

    // Drain batch B down to zero available units.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/equipment/employees/{}/assignments", fx.employee_id),
            Some(json!({"batch_ids": [fx.batch_b]})),
            Some(&fx.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // A request naming both batches must leave batch A untouched.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/equipment/employees/{}/assignments", fx.employee_id),
            Some(json!({"batch_ids": [fx.batch_a, fx.batch_b]})),
            Some(&fx.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let batch = body_json(
        app.request(
            Method::GET,
            &format!("/api/v1/inventory/{}", fx.batch_a),
            None,
            Some(&fx.token),
        )
        .await,
    )
    .await;
    assert_eq!(batch["available_quantity"], json!(5));

    let equipment = body_json(
        app.request(
            Method::GET,
            &format!("/api/v1/equipment/employees/{}/equipment", fx.employee_id),
            None,
            Some(&fx.token),
        )
        .await,
    )
    .await;
    assert_eq!(equipment.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn returning_equipment_restores_the_batch() {
    let app = TestApp::new().await;
    let fx = seed(&app).await;

    let created = body_json(
        app.request(
            Method::POST,
            &format!("/api/v1/equipment/employees/{}/assignments", fx.employee_id),
            Some(json!({"batch_ids": [fx.batch_b]})),
            Some(&fx.token),
        )
        .await,
    )
    .await;
    let assignment_id = created[0]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/equipment/assignments/{}/return", assignment_id),
            None,
            Some(&fx.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let batch = body_json(
        app.request(
            Method::GET,
            &format!("/api/v1/inventory/{}", fx.batch_b),
            None,
            Some(&fx.token),
        )
        .await,
    )
    .await;
    assert_eq!(batch["available_quantity"], json!(1));

    // Returning the same assignment twice is rejected.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/equipment/assignments/{}/return", assignment_id),
            None,
            Some(&fx.token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let equipment = body_json(
        app.request(
            Method::GET,
            &format!("/api/v1/equipment/employees/{}/equipment", fx.employee_id),
            None,
            Some(&fx.token),
        )
        .await,
    )
    .await;
    assert!(equipment.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn cross_tenant_equipment_access_is_not_found() {
    let app = TestApp::new().await;
    let fx = seed(&app).await;
    let (_, _other_tenant, other_token) = app.contractor().await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/equipment/employees/{}/assignments", fx.employee_id),
            Some(json!({"batch_ids": [fx.batch_a]})),
            Some(&other_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
