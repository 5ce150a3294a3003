mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use serde_json::json;

async fn create_incident(app: &TestApp, token: &str) -> String {
    let incident = body_json(
        app.request(
            Method::POST,
            "/api/v1/incidents",
            Some(json!({
                "occurred_at": "2026-08-12T09:30:00Z",
                "severity": "high",
                "description": "Fall from scaffold on the north face"
            })),
            Some(token),
        )
        .await,
    )
    .await;
    incident["id"].as_str().unwrap().to_string()
}

async fn complete_step(app: &TestApp, token: &str, incident_id: &str, step: i32) {
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/incidents/{}/steps", incident_id),
            Some(json!({
                "step_number": step,
                "payload": {"notes": format!("step {} details", step)}
            })),
            Some(token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK, "step {}", step);
}

#[tokio::test]
async fn incident_starts_as_draft() {
    let app = TestApp::new().await;
    let (_, _tenant, token) = app.contractor().await;
    let id = create_incident(&app, &token).await;

    let detail = body_json(
        app.request(
            Method::GET,
            &format!("/api/v1/incidents/{}", id),
            None,
            Some(&token),
        )
        .await,
    )
    .await;
    assert_eq!(detail["incident"]["status"], json!("draft"));
    assert!(detail["steps"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn steps_must_be_completed_in_order() {
    let app = TestApp::new().await;
    let (_, _tenant, token) = app.contractor().await;
    let id = create_incident(&app, &token).await;

    // Step 3 before 1 and 2 is rejected.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/incidents/{}/steps", id),
            Some(json!({"step_number": 3, "payload": {}})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    complete_step(&app, &token, &id, 1).await;
    complete_step(&app, &token, &id, 2).await;
    complete_step(&app, &token, &id, 3).await;

    // Revisiting an earlier step overwrites its payload.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/incidents/{}/steps", id),
            Some(json!({"step_number": 2, "payload": {"notes": "amended"}})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let detail = body_json(
        app.request(
            Method::GET,
            &format!("/api/v1/incidents/{}", id),
            None,
            Some(&token),
        )
        .await,
    )
    .await;
    let steps = detail["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    let amended = steps
        .iter()
        .find(|s| s["step_number"] == json!(2))
        .unwrap();
    assert_eq!(amended["payload"]["notes"], json!("amended"));
}

#[tokio::test]
async fn step_number_out_of_bounds_is_rejected() {
    let app = TestApp::new().await;
    let (_, _tenant, token) = app.contractor().await;
    let id = create_incident(&app, &token).await;

    for step in [0, 6] {
        let response = app
            .request(
                Method::PUT,
                &format!("/api/v1/incidents/{}/steps", id),
                Some(json!({"step_number": step, "payload": {}})),
                Some(&token),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "step {}", step);
    }
}

#[tokio::test]
async fn submit_requires_all_five_steps() {
    let app = TestApp::new().await;
    let (_, _tenant, token) = app.contractor().await;
    let id = create_incident(&app, &token).await;

    for step in 1..=4 {
        complete_step(&app, &token, &id, step).await;
    }

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/incidents/{}/submit", id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    complete_step(&app, &token, &id, 5).await;

    let submitted = body_json(
        app.request(
            Method::POST,
            &format!("/api/v1/incidents/{}/submit", id),
            None,
            Some(&token),
        )
        .await,
    )
    .await;
    assert_eq!(submitted["status"], json!("submitted"));

    // A submitted report is frozen for the reporter.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/incidents/{}", id),
            Some(json!({"description": "edited after submit"})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn review_follows_the_status_ladder() {
    let app = TestApp::new().await;
    let (_, _tenant, token) = app.contractor().await;
    let (_, admin_token) = app.admin().await;
    let id = create_incident(&app, &token).await;

    for step in 1..=5 {
        complete_step(&app, &token, &id, step).await;
    }
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/incidents/{}/submit", id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Skipping straight to closed is rejected.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/incidents/{}/status", id),
            Some(json!({"status": "closed"})),
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for status in ["under_review", "closed"] {
        let updated = body_json(
            app.request(
                Method::PUT,
                &format!("/api/v1/admin/incidents/{}/status", id),
                Some(json!({"status": status})),
                Some(&admin_token),
            )
            .await,
        )
        .await;
        assert_eq!(updated["status"], json!(status));
    }

    // Contractors cannot use the review endpoint.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/incidents/{}/status", id),
            Some(json!({"status": "under_review"})),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
