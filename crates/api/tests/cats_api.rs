//! HTTP-level integration tests for the cats CRUD endpoints and the
//! per-user response cache.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use uuid::Uuid;

use chassis_api::config::TokenTransport;
use chassis_cache::Cache;
use chassis_db::repositories::CatStore;
use common::{body_json, login_cookies, send};

/// Build a request on a cats route carrying the access cookie.
fn cats_request(method: &str, uri: &str, access: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, format!("accessToken={access}"));
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

// ---------------------------------------------------------------------------
// CRUD flow
// ---------------------------------------------------------------------------

/// Create, read, update, and delete a cat through the full router.
#[tokio::test]
async fn test_cats_crud_flow() {
    let (app, _state) = common::build_test_app(TokenTransport::Cookie);
    let (access, _refresh) = login_cookies(&app).await;

    // Create.
    let response = send(
        &app,
        cats_request(
            "POST",
            "/cats",
            &access,
            Some(json!({
                "index": "mittens",
                "string": "tabby",
                "number": 4.0,
                "stringsArray": ["soft", "fast"]
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["index"], "mittens");
    assert_eq!(created["data"]["stringsArray"][1], "fast");
    let id = created["data"]["id"].as_str().expect("created id").to_string();

    // Read.
    let response = send(&app, cats_request("GET", &format!("/cats/{id}"), &access, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["data"]["string"], "tabby");

    // Partial update: untouched fields survive.
    let response = send(
        &app,
        cats_request(
            "PATCH",
            &format!("/cats/{id}"),
            &access,
            Some(json!({ "number": 5.0 })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["data"]["number"], 5.0);
    assert_eq!(updated["data"]["index"], "mittens");

    // Delete a second, never-fetched cat and confirm it is gone.
    let response = send(
        &app,
        cats_request("POST", "/cats", &access, Some(json!({ "index": "ghost" }))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let ghost = body_json(response).await;
    let ghost_id = ghost["data"]["id"].as_str().unwrap().to_string();

    let response = send(
        &app,
        cats_request("DELETE", &format!("/cats/{ghost_id}"), &access, None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        cats_request("GET", &format!("/cats/{ghost_id}"), &access, None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["errorCode"], "NOT_FOUND");
}

/// An empty `index` fails DTO validation with 400.
#[tokio::test]
async fn test_create_cat_validation_error() {
    let (app, _state) = common::build_test_app(TokenTransport::Cookie);
    let (access, _refresh) = login_cookies(&app).await;

    let response = send(
        &app,
        cats_request("POST", "/cats", &access, Some(json!({ "index": "" }))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["errorCode"], "VALIDATION_ERROR");
}

/// Fetching an unknown id returns 404 with the stable error code.
#[tokio::test]
async fn test_get_unknown_cat_not_found() {
    let (app, _state) = common::build_test_app(TokenTransport::Cookie);
    let (access, _refresh) = login_cookies(&app).await;

    let response = send(
        &app,
        cats_request("GET", &format!("/cats/{}", Uuid::new_v4()), &access, None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["errorCode"], "NOT_FOUND");
}

/// Listing respects limit/offset pagination.
#[tokio::test]
async fn test_list_cats_pagination() {
    let (app, _state) = common::build_test_app(TokenTransport::Cookie);
    let (access, _refresh) = login_cookies(&app).await;

    for name in ["a", "b", "c"] {
        let response = send(
            &app,
            cats_request("POST", "/cats", &access, Some(json!({ "index": name }))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(&app, cats_request("GET", "/cats?limit=2", &access, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = send(
        &app,
        cats_request("GET", "/cats?limit=2&offset=2", &access, None),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Response cache
// ---------------------------------------------------------------------------

/// A successful GET is cached per user and URI; later writes do not
/// invalidate it within the TTL.
#[tokio::test]
async fn test_get_is_served_from_cache() {
    let (app, state) = common::build_test_app(TokenTransport::Cookie);
    let (access, _refresh) = login_cookies(&app).await;

    let response = send(
        &app,
        cats_request("POST", "/cats", &access, Some(json!({ "index": "first" }))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // First list: a miss, stored under the user's key.
    let response = send(&app, cats_request("GET", "/cats", &access, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;
    assert_eq!(first["data"].as_array().unwrap().len(), 1);

    let cached = state
        .cache
        .get("chassis-cache:test:/cats")
        .await
        .expect("cache get should succeed");
    assert!(cached.is_some(), "GET response must be cached");

    // Write behind the cache's back.
    let response = send(
        &app,
        cats_request("POST", "/cats", &access, Some(json!({ "index": "second" }))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Second list is served from the cache and does not see the new cat.
    let response = send(&app, cats_request("GET", "/cats", &access, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;
    assert_eq!(second["data"].as_array().unwrap().len(), 1);

    // The store itself has both cats.
    let all = state.cats.find_all(10, 0).await.unwrap();
    assert_eq!(all.len(), 2);
}

/// Non-GET requests are never cached.
#[tokio::test]
async fn test_post_is_not_cached() {
    let (app, state) = common::build_test_app(TokenTransport::Cookie);
    let (access, _refresh) = login_cookies(&app).await;

    let response = send(
        &app,
        cats_request("POST", "/cats", &access, Some(json!({ "index": "x" }))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let cached = state
        .cache
        .get("chassis-cache:test:/cats")
        .await
        .expect("cache get should succeed");
    assert!(cached.is_none(), "POST responses must not be cached");
}
