mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use watersports_jobboard::{models::user::Role, services::location_search::LocationSearch};

use common::{app, bearer, body_json};

#[tokio::test]
async fn health_reports_ok() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "watersports-jobboard");
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let response = app()
        .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn me_requires_a_session() {
    let response = app()
        .oneshot(Request::get("/api/auth/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "not_logged_in");

    let response = app()
        .oneshot(
            Request::get("/api/auth/me")
                .header(header::COOKIE, "session=garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid_token");
}

#[tokio::test]
async fn role_gates_reject_the_other_side() {
    let response = app()
        .oneshot(
            Request::get("/api/cv")
                .header(header::AUTHORIZATION, bearer(Role::Recruiter))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app()
        .oneshot(
            Request::get("/api/candidates-list")
                .header(header::AUTHORIZATION, bearer(Role::JobSeeker))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app()
        .oneshot(
            Request::get("/api/admin/users")
                .header(header::AUTHORIZATION, bearer(Role::Recruiter))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_deletes_need_confirmation() {
    let uri = format!("/api/admin/jobs/{}", Uuid::new_v4());
    let response = app()
        .oneshot(
            Request::delete(uri.as_str())
                .header(header::AUTHORIZATION, bearer(Role::Admin))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "confirmation_required");
}

#[tokio::test]
async fn admin_edits_skip_the_confirmation_gate() {
    let uri = format!("/api/admin/jobs/{}", Uuid::new_v4());
    let response = app()
        .oneshot(
            Request::patch(uri.as_str())
                .header(header::AUTHORIZATION, bearer(Role::Admin))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "featured": true }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_ne!(response.status(), StatusCode::BAD_REQUEST);
    assert_ne!(body_json(response).await["error"], "confirmation_required");
}

#[tokio::test]
async fn company_without_coordinates_is_rejected() {
    let response = app()
        .oneshot(
            Request::post("/api/company")
                .header(header::AUTHORIZATION, bearer(Role::Recruiter))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "name": "Tarifa Kite Centre", "offeredActivities": ["Kitesurfing"] })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn geocode_search_swallows_short_queries_and_failures() {
    let response = app()
        .oneshot(
            Request::get("/api/geocode/search?q=ta")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "results": [] }));

    let response = app()
        .oneshot(
            Request::get("/api/geocode/search?q=tarifa")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "results": [] }));
}

#[tokio::test]
async fn location_search_against_unreachable_geocoder_yields_nothing() {
    let state = common::state();
    let search = LocationSearch::with_configured_delay(Arc::new(state.geocode_service.clone()));
    search.input("dahab");
    tokio::time::sleep(Duration::from_millis(2500)).await;

    let snapshot = search.snapshot();
    assert_eq!(snapshot.query, "dahab");
    assert!(snapshot.results.is_empty());
    assert!(!snapshot.open);
}

#[tokio::test]
async fn vocabulary_lists_sports() {
    let response = app()
        .oneshot(Request::get("/api/vocabulary").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let sports = body["sports"].as_array().unwrap();
    assert!(sports.iter().any(|s| s == "Kitesurfing"));
}

#[tokio::test]
async fn cookie_consent_round_trip() {
    let response = app()
        .oneshot(
            Request::get("/api/account/cookie-consent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(response).await["decided"], false);

    let response = app()
        .oneshot(
            Request::put("/api/account/cookie-consent")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "analytics": true, "marketing": false }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    let pair = set_cookie.split(';').next().unwrap().to_string();

    let response = app()
        .oneshot(
            Request::get("/api/account/cookie-consent")
                .header(header::COOKIE, pair)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["decided"], true);
    assert_eq!(body["analytics"], true);
    assert_eq!(body["marketing"], false);
    assert_eq!(body["necessary"], true);
}
