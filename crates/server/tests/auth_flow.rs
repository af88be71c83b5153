//! Router-level tests for the authentication gate.
//!
//! The store client connects lazily and the owner check runs before any
//! store round trip, so none of these tests needs a running database.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use visahub_server::{AppServer, ServerConfig};

fn test_config() -> ServerConfig {
    ServerConfig {
        mongodb_uri: "mongodb://127.0.0.1:27017".to_string(),
        db_name: "VisaDBTest".to_string(),
        token_secret: "test-secret".to_string(),
        allowed_origin: "http://localhost:5173".to_string(),
    }
}

async fn test_router() -> Router {
    AppServer::new(test_config()).await.unwrap().router()
}

async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST /jwt and return the `token=...` cookie pair.
async fn login(app: &Router, email: &str) -> String {
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jwt")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(format!(r#"{{"email":"{}"}}"#, email)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .expect("token cookie set")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_health_route() {
    let app = test_router().await;
    let res = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_jwt_sets_http_only_cookie() {
    let app = test_router().await;
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jwt")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"a@x.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .expect("token cookie set")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(!set_cookie.contains("Secure"));

    let body = body_json(res).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_jwt_rejects_empty_email() {
    let app = test_router().await;
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jwt")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"  "}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_protected_route_without_cookie_is_unauthorized() {
    let app = test_router().await;
    for uri in ["/my-added-visas?email=a@x.com", "/applied-visas?email=a@x.com"] {
        let res = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(res).await;
        assert_eq!(body["message"], "Unauthorized access");
    }
}

#[tokio::test]
async fn test_tampered_cookie_is_unauthorized() {
    let app = test_router().await;
    let cookie = login(&app, "a@x.com").await;

    let mut tampered = cookie.into_bytes();
    let last = tampered.last_mut().unwrap();
    *last = if *last == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/my-added-visas?email=a@x.com")
                .header(header::COOKIE, tampered)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_owner_mismatch_is_forbidden() {
    let app = test_router().await;
    let cookie = login(&app, "a@x.com").await;

    for uri in ["/my-added-visas?email=b@x.com", "/applied-visas?email=b@x.com"] {
        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::COOKIE, cookie.clone())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let body = body_json(res).await;
        assert_eq!(body["message"], "Forbidden access");
    }
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = test_router().await;
    let res = app
        .oneshot(
            Request::builder()
                .uri("/no-such-route")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
