mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{TestApp, ROLE_HEADER};
use serde_json::json;
use tower::ServiceExt;

async fn create_mill(app: &TestApp) -> String {
    app.create(
        "/api/equipment",
        json!({ "name": "DMG Mori NHX 4000", "location": "Bay 2", "purchase_date": "2019-06-01" }),
    )
    .await
}

#[tokio::test]
async fn test_equipment_crud() {
    let app = TestApp::spawn().await;
    let id = create_mill(&app).await;

    let (status, body) = app.get(&format!("/api/equipment/{id}"), "viewer").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "operational");
    assert_eq!(body["data"]["purchase_date"], "2019-06-01");

    let (status, body) = app
        .put(
            &format!("/api/equipment/{id}"),
            "manager",
            json!({ "status": "repair", "notes": "Spindle bearing noise" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "repair");
    assert_eq!(body["data"]["location"], "Bay 2");

    let (_, body) = app.get("/api/equipment?status=repair", "viewer").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (_, body) = app.get("/api/equipment?status=operational", "viewer").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (status, _) = app.delete(&format!("/api/equipment/{id}"), "admin").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&format!("/api/equipment/{id}"), "viewer").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_payloads_are_bad_requests() {
    let app = TestApp::spawn().await;

    let (status, body) = app.post("/api/equipment", "admin", json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "VALIDATION_ERROR");

    let request = Request::builder()
        .method("POST")
        .uri("/api/equipment")
        .header(ROLE_HEADER, "admin")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/equipment?status=broken", "viewer").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_equipment_with_tasks_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let mill = create_mill(&app).await;
    app.create(
        "/api/maintenance/tasks",
        json!({ "equipment_id": mill, "description": "Grease ball screws" }),
    )
    .await;

    let (status, body) = app.delete(&format!("/api/equipment/{mill}"), "admin").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["type"], "CONFLICT");

    let (_, body) = app
        .get(&format!("/api/equipment/{mill}/maintenance"), "viewer")
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_consumable_low_stock_and_adjust() {
    let app = TestApp::spawn().await;
    let low = app
        .create(
            "/api/consumables",
            json!({ "name": "Tap M6", "category": "taps", "quantity": 3, "min_quantity": 5 }),
        )
        .await;
    let ok = app
        .create(
            "/api/consumables",
            json!({ "name": "Tap M8", "category": "taps", "quantity": 6, "min_quantity": 5 }),
        )
        .await;

    let (_, body) = app.get("/api/consumables?low_stock=true", "viewer").await;
    let flagged = body["data"].as_array().unwrap();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0]["id"], low.as_str());

    let (status, body) = app
        .post(&format!("/api/consumables/{ok}/adjust"), "operator", json!({ "delta": -1 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quantity"], 5);
    assert!(body["message"].as_str().unwrap().contains("库存不足"));

    let (status, body) = app
        .post(&format!("/api/consumables/{ok}/adjust"), "operator", json!({ "delta": -10 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "VALIDATION_ERROR");

    let (_, body) = app.get(&format!("/api/consumables/{ok}"), "viewer").await;
    assert_eq!(body["data"]["quantity"], 5);
}

#[tokio::test]
async fn test_completing_recurring_task_spawns_next() {
    let app = TestApp::spawn().await;
    let mill = create_mill(&app).await;
    let task = app
        .create(
            "/api/maintenance/tasks",
            json!({
                "equipment_id": mill,
                "description": "Replace spindle coolant filter",
                "frequency_days": 90,
                "status": "in_progress",
                "parts_used": [{ "name": "Filter cartridge", "quantity": 1 }]
            }),
        )
        .await;

    let (status, body) = app
        .put(
            &format!("/api/maintenance/tasks/{task}"),
            "operator",
            json!({ "status": "completed", "last_performed_date": "2024-01-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    assert_eq!(data["task"]["status"], "completed");
    assert_eq!(data["next_task"]["status"], "pending");
    assert_eq!(data["next_task"]["next_due_date"], "2024-03-31");
    assert_eq!(data["next_task"]["parts_used"], json!([]));
    assert_eq!(data["next_task"]["equipment_id"], mill.as_str());
    assert!(data.get("previous_status").is_none());

    let (_, body) = app
        .put(
            &format!("/api/maintenance/tasks/{task}"),
            "operator",
            json!({ "status": "completed" }),
        )
        .await;
    assert!(body["data"]["next_task"].is_null());

    let (_, body) = app
        .get(&format!("/api/maintenance/tasks?equipment_id={mill}"), "viewer")
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_terminal_task_cannot_be_reopened() {
    let app = TestApp::spawn().await;
    let mill = create_mill(&app).await;
    let task = app
        .create(
            "/api/maintenance/tasks",
            json!({ "equipment_id": mill, "description": "Check way lube", "status": "skipped" }),
        )
        .await;

    let (status, body) = app
        .put(
            &format!("/api/maintenance/tasks/{task}"),
            "operator",
            json!({ "status": "in_progress" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["type"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_task_for_unknown_equipment_is_not_found() {
    let app = TestApp::spawn().await;
    let (status, _) = app
        .post(
            "/api/maintenance/tasks",
            "manager",
            json!({ "equipment_id": "ghost", "description": "Level the machine" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_due_overview_and_filters() {
    let app = TestApp::spawn().await;
    let mill = create_mill(&app).await;
    for (description, due) in [
        ("Overdue check", Some("2023-12-20")),
        ("Soon check", Some("2024-01-05")),
        ("Later check", Some("2024-03-01")),
        ("Unplanned check", None),
    ] {
        app.create(
            "/api/maintenance/tasks",
            json!({ "equipment_id": mill, "description": description, "next_due_date": due }),
        )
        .await;
    }

    let (status, body) = app.get("/api/maintenance/due", "viewer").await;
    assert_eq!(status, StatusCode::OK);
    let states: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["due_state"].as_str().unwrap())
        .collect();
    assert_eq!(states, vec!["overdue", "due_soon", "on_track", "unscheduled"]);

    let (_, body) = app
        .get("/api/maintenance/tasks?due_before=2024-01-05", "viewer")
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .get("/api/maintenance/tasks?due_before=someday", "viewer")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_calibration_recording() {
    let app = TestApp::spawn().await;
    let tool = app
        .create(
            "/api/metrology/tools",
            json!({ "name": "Mitutoyo 0-25mm micrometer", "calibration_interval_days": 365 }),
        )
        .await;

    let (_, body) = app.get(&format!("/api/metrology/tools/{tool}"), "viewer").await;
    assert_eq!(body["data"]["status"], "awaiting_calibration");

    let (status, body) = app
        .post(
            &format!("/api/metrology/tools/{tool}/calibrations"),
            "operator",
            json!({ "calibration_date": "2024-03-01", "result": "pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["tool"]["status"], "calibrated");
    assert_eq!(body["data"]["tool"]["next_calibration_date"], "2025-03-01");
    assert_eq!(body["data"]["log"]["performed_by"], "test-user");

    let (_, body) = app
        .post(
            &format!("/api/metrology/tools/{tool}/calibrations"),
            "operator",
            json!({ "calibration_date": "2024-04-01", "result": "fail", "performed_by": "QA lab" }),
        )
        .await;
    assert_eq!(body["data"]["tool"]["status"], "out_of_service");
    assert!(body["data"]["tool"]["next_calibration_date"].is_null());

    let (_, body) = app
        .get(&format!("/api/metrology/tools/{tool}/calibrations"), "viewer")
        .await;
    let history = body["data"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["result"], "fail");

    let (status, _) = app.delete(&format!("/api/metrology/tools/{tool}"), "admin").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(
            "/api/metrology/tools/missing/calibrations",
            "operator",
            json!({ "calibration_date": "2024-03-01", "result": "pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_and_status_refresh() {
    let app = TestApp::spawn().await;
    let mill = create_mill(&app).await;
    let overdue = app
        .create(
            "/api/maintenance/tasks",
            json!({ "equipment_id": mill, "description": "Align tailstock", "next_due_date": "2023-12-01" }),
        )
        .await;
    app.create(
        "/api/metrology/tools",
        json!({
            "name": "Height gauge",
            "next_calibration_date": "2023-11-30",
            "status": "calibrated"
        }),
    )
    .await;
    app.create(
        "/api/consumables",
        json!({ "name": "Tap M6", "category": "taps", "quantity": 3, "min_quantity": 5 }),
    )
    .await;

    let (status, body) = app.get("/api/dashboard", "viewer").await;
    assert_eq!(status, StatusCode::OK);
    let summary = &body["data"];
    assert_eq!(summary["equipment_by_status"]["operational"], 1);
    assert_eq!(summary["maintenance"]["overdue"], 1);
    assert_eq!(summary["calibration"]["overdue"], 1);
    assert_eq!(summary["calibration"]["calibrated"], 0);
    assert_eq!(summary["low_stock_consumables"], 1);

    let (status, body) = app.post("/api/status/refresh", "admin", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tasks"][0]["id"], overdue.as_str());
    assert_eq!(body["data"]["tasks"][0]["to"], "overdue");
    assert_eq!(body["data"]["tools"][0]["to"], "due_calibration");

    let (_, body) = app
        .get(&format!("/api/maintenance/tasks/{overdue}"), "viewer")
        .await;
    assert_eq!(body["data"]["status"], "overdue");

    let (_, body) = app.post("/api/status/refresh", "admin", json!({})).await;
    assert_eq!(body["data"]["tasks"], json!([]));
    assert_eq!(body["data"]["tools"], json!([]));
}
