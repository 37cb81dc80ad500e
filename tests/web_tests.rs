//! API tests driving the router in-process.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use recipe_finder::web::server::create_router;
use recipe_finder::{MatchingConfig, RecipeCorpus};
use tower::ServiceExt;

fn app() -> Router {
    let corpus = RecipeCorpus::load_embedded().unwrap();
    create_router(corpus, MatchingConfig::default()).unwrap()
}

/// Send a request as if from a local client and decode the JSON body
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let mut request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40_000))));

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn new_session(app: &Router) -> String {
    let (status, json) = send(app, Method::POST, "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    json["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_and_corpus() {
    let app = app();

    let (status, json) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["recipes"], 20);

    let (status, json) = send(&app, Method::GET, "/api/corpus", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["recipes"]
        .as_array()
        .unwrap()
        .iter()
        .any(|name| name == "Veggie Stew"));
}

#[tokio::test]
async fn test_find_then_recipe() {
    let app = app();
    let id = new_session(&app).await;

    let (status, _) = send(&app, Method::GET, &format!("/api/sessions/{id}/recipe"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/find"),
        Some(serde_json::json!({"name": "chicken noodle soup", "restriction": "vegetarian"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Chicken Noodle Soup (Vegetarian)");

    let (status, json) = send(&app, Method::GET, &format!("/api/sessions/{id}/recipe"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Chicken Noodle Soup (Vegetarian)");
    assert!(!json["steps"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_match_errors_are_structured() {
    let app = app();
    let id = new_session(&app).await;

    let (status, json) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/find"),
        Some(serde_json::json!({"name": "pancakes", "restriction": "vegan"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error_type"], "restriction_conflict");
    assert!(json["details"].is_null());

    let (status, json) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/suggest"),
        Some(serde_json::json!({"ingredients": "pasta, bread", "restriction": "gluten-free"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error_type"], "all_ingredients_excluded");
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let app = app();
    let first = new_session(&app).await;
    let second = new_session(&app).await;
    assert_ne!(first, second);

    let (status, json) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{first}/suggest"),
        Some(serde_json::json!({"ingredients": "tomato, basil, garlic"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let top = json["suggestions"][0]["name"].as_str().unwrap().to_string();

    // the ordinal refers to the first session's suggestions only
    let (status, json) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{first}/find"),
        Some(serde_json::json!({"name": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], top.as_str());

    let (status, json) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{second}/find"),
        Some(serde_json::json!({"name": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error_type"], "not_found");

    let (status, _) = send(&app, Method::GET, &format!("/api/sessions/{second}/recipe"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_suggest_reports_excluded_ingredients() {
    let app = app();
    let id = new_session(&app).await;

    let (status, json) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/suggest"),
        Some(serde_json::json!({"ingredients": "tomato, basil, pasta", "restriction": "gluten-free"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["excluded"], serde_json::json!(["pasta"]));
    let names: Vec<&str> = json["suggestions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Caprese Salad"));
    assert!(!names.contains(&"Tomato Basil Pasta"));
}

#[tokio::test]
async fn test_unknown_and_deleted_sessions() {
    let app = app();

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/sessions/not-a-uuid/find",
        Some(serde_json::json!({"name": "pancakes"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error_type"], "session_not_found");

    let id = new_session(&app).await;
    let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/find"),
        Some(serde_json::json!({"name": "pancakes"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_control_characters_rejected() {
    let app = app();
    let id = new_session(&app).await;

    let (status, json) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/find"),
        Some(serde_json::json!({"name": "pan\u{0000}cakes"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "invalid_input");
}

#[tokio::test]
async fn test_security_headers() {
    let app = app();
    let mut request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40_001))));

    let response = app.oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
}
