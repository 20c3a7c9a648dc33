use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use migration::MigratorTrait;
use server::{ServerState, app};

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder().database(db).build().await.unwrap();
    app(ServerState {
        engine: Arc::new(engine),
    })
}

async fn request(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_account(app: &Router, name: &str, opening_minor: i64) -> Uuid {
    let (status, body) = request(
        app,
        "POST",
        "/accounts",
        Some(json!({ "name": name, "opening_balance_minor": opening_minor })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn goal_lifecycle_over_http() {
    let app = test_app().await;

    let checking = create_account(&app, "Checking", 100_000).await;
    let savings = create_account(&app, "Savings", 0).await;

    let (status, body) = request(
        &app,
        "POST",
        "/goals",
        Some(json!({
            "name": "New bike",
            "target_minor": 50_000,
            "deadline": null,
            "account_id": savings,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let goal: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let (status, body) = request(
        &app,
        "POST",
        &format!("/goals/{goal}/contribute"),
        Some(json!({
            "source_account_id": checking,
            "amount_minor": 10_000,
            "note": "first deposit",
            "occurred_at": "2026-01-10T12:00:00+00:00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance_minor"], 10_000);

    let (status, body) = request(&app, "GET", &format!("/goals/{goal}/progress"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_minor"], 10_000);
    assert_eq!(body["achieved"], false);
    assert_eq!(body["status"], "active");

    let (status, body) = request(&app, "GET", &format!("/goals/{goal}/history"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    assert_eq!(body["entries"][0]["kind"], "contribution");
}

#[tokio::test]
async fn contribution_errors_map_to_http_statuses() {
    let app = test_app().await;
    let checking = create_account(&app, "Checking", 50).await;
    let savings = create_account(&app, "Savings", 0).await;

    // Unknown goal id.
    let missing = Uuid::new_v4();
    let (status, _) = request(
        &app,
        "POST",
        &format!("/goals/{missing}/contribute"),
        Some(json!({
            "source_account_id": checking,
            "amount_minor": 10,
            "note": null,
            "occurred_at": "2026-01-10T12:00:00+00:00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Source account cannot cover the contribution.
    let (status, body) = request(
        &app,
        "POST",
        "/goals",
        Some(json!({
            "name": "Trip",
            "target_minor": 1_000,
            "deadline": null,
            "account_id": savings,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let goal = body["id"].as_str().unwrap();

    let (status, body) = request(
        &app,
        "POST",
        &format!("/goals/{goal}/contribute"),
        Some(json!({
            "source_account_id": checking,
            "amount_minor": 100,
            "note": null,
            "occurred_at": "2026-01-10T12:00:00+00:00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("insufficient funds"));

    // Duplicate account name.
    let (status, _) = request(
        &app,
        "POST",
        "/accounts",
        Some(json!({ "name": "Checking", "opening_balance_minor": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn reports_are_reversal_aware_over_http() {
    let app = test_app().await;
    let checking = create_account(&app, "Checking", 0).await;

    let (status, body) = request(
        &app,
        "POST",
        "/income",
        Some(json!({
            "account_id": checking,
            "amount_minor": 100_000,
            "category": "salary",
            "note": null,
            "occurred_at": "2026-06-10T12:00:00+00:00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reversed = body["id"].as_str().unwrap().to_string();

    let (status, _) = request(
        &app,
        "POST",
        "/income",
        Some(json!({
            "account_id": checking,
            "amount_minor": 50_000,
            "category": "salary",
            "note": null,
            "occurred_at": "2026-06-12T12:00:00+00:00",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &app,
        "POST",
        &format!("/transactions/{reversed}/reverse"),
        Some(json!({ "occurred_at": "2026-06-20T12:00:00+00:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &app,
        "GET",
        "/reports/by-kind?kind=income&start=2026-06-01T00:00:00%2B00:00&end=2026-06-30T00:00:00%2B00:00",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_minor"], 50_000);
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
}
