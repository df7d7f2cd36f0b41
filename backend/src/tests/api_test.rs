use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use crate::tests::common::{
    StubAuthGateway, add_translation, build_test_app, create_test_db, create_test_post,
};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, client_ip: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", client_ip)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_posts_api_serves_requested_locale() {
    let pool = create_test_db().await;

    let post_id = create_test_post(&pool, "koken", "blog", true, "en", "Cooking").await;
    add_translation(&pool, &post_id, "nl", "Koken").await;

    let app = build_test_app(pool, Arc::new(StubAuthGateway::anonymous()));

    let response = app.oneshot(get("/nl/api/posts?kind=blog")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let posts = json_body(response).await;
    assert_eq!(posts.as_array().unwrap().len(), 1);
    assert_eq!(posts[0]["locale"], "nl");
    assert_eq!(posts[0]["title"], "Koken");
}

#[tokio::test]
async fn test_newsletter_subscribe_and_check_flow() {
    let pool = create_test_db().await;
    let app = build_test_app(pool, Arc::new(StubAuthGateway::anonymous()));

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/newsletter/subscribe",
            "198.51.100.7",
            r#"{"email": "chef@example.com", "locale": "nl"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["subscribed"], true);
    assert_eq!(body["already_subscribed"], false);

    let response = app
        .oneshot(post_json(
            "/api/newsletter/check",
            "198.51.100.7",
            r#"{"email": "chef@example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["subscribed"], true);
}

#[tokio::test]
async fn test_newsletter_rejects_invalid_email() {
    let pool = create_test_db().await;
    let app = build_test_app(pool, Arc::new(StubAuthGateway::anonymous()));

    let response = app
        .oneshot(post_json("/api/newsletter/check", "198.51.100.8", r#"{"email": "not-an-email"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_newsletter_rate_limit() {
    let pool = create_test_db().await;
    let app = build_test_app(pool, Arc::new(StubAuthGateway::anonymous()));

    // Default test config allows 10 requests per window per client.
    for _ in 0..10 {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/newsletter/check",
                "203.0.113.5",
                r#"{"email": "chef@example.com"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/newsletter/check",
            "203.0.113.5",
            r#"{"email": "chef@example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));

    // Another client is unaffected.
    let response = app
        .oneshot(post_json(
            "/api/newsletter/check",
            "203.0.113.99",
            r#"{"email": "chef@example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_api_me_returns_principal() {
    let pool = create_test_db().await;
    let principal = crate::tests::common::test_principal();
    crate::tests::common::seed_admin(&pool, &principal).await;

    let expected_id = principal.id.to_string();
    let app = build_test_app(pool, Arc::new(StubAuthGateway::signed_in(principal)));

    let response = app.oneshot(get("/admin/api/me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["id"], expected_id.as_str());
}
