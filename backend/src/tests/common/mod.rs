// Common test utilities and helpers

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use uuid::Uuid;

use crate::config::{Config, StaticConfig};
use crate::middleware::SessionState;
use crate::models::{Principal, RequestCookie, SessionCookie, SessionResolution};
use crate::services::{
    AdminService, AuthGateway, ContentService, RateLimitService, SubscriberService,
};
use crate::utils::{ApiError, ApiResult};
use crate::{AppState, build_app};

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Auth gateway stub with scripted answers and a call counter, so tests
/// can assert both the guard's decisions and that static-asset requests
/// never reach the gateway at all.
pub struct StubAuthGateway {
    principal: Option<Principal>,
    cookies_to_set: Vec<SessionCookie>,
    fail: bool,
    calls: AtomicUsize,
}

impl StubAuthGateway {
    pub fn anonymous() -> Self {
        Self { principal: None, cookies_to_set: Vec::new(), fail: false, calls: AtomicUsize::new(0) }
    }

    pub fn signed_in(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            cookies_to_set: Vec::new(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self { principal: None, cookies_to_set: Vec::new(), fail: true, calls: AtomicUsize::new(0) }
    }

    pub fn with_cookies(mut self, cookies: Vec<SessionCookie>) -> Self {
        self.cookies_to_set = cookies;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthGateway for StubAuthGateway {
    async fn resolve(&self, _cookies: &[RequestCookie]) -> ApiResult<SessionResolution> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(ApiError::auth_gateway_unavailable("stub gateway down"));
        }

        Ok(SessionResolution {
            principal: self.principal.clone(),
            cookies_to_set: self.cookies_to_set.clone(),
        })
    }
}

pub fn test_principal() -> Principal {
    Principal { id: Uuid::new_v4(), email: Some("chef@example.com".to_string()) }
}

/// Insert a principal into the administrators set
pub async fn seed_admin(pool: &SqlitePool, principal: &Principal) {
    sqlx::query("INSERT INTO admins (user_id, email) VALUES (?, ?)")
        .bind(principal.id.to_string())
        .bind(&principal.email)
        .execute(pool)
        .await
        .expect("Failed to seed admin");
}

/// Build the full application router against an in-memory database and
/// the given gateway stub. Static serving is off so unmatched paths are
/// plain 404s.
pub fn build_test_app(pool: SqlitePool, gateway: Arc<dyn AuthGateway>) -> Router {
    let config = Config {
        static_config: StaticConfig { enabled: false, web_root: "web".to_string() },
        ..Config::default()
    };

    let state = Arc::new(AppState {
        content_service: ContentService::new(pool.clone()),
        subscriber_service: SubscriberService::new(pool.clone()),
        admin_service: AdminService::new(pool.clone()),
        rate_limit_service: RateLimitService::with_in_memory_store(config.rate_limit.clone()),
        config,
    });

    let session_state =
        SessionState { auth_gateway: gateway, admin_service: AdminService::new(pool) };

    build_app(state, session_state)
}

/// Create a test post with one translation, returning its id
pub async fn create_test_post(
    pool: &SqlitePool,
    slug: &str,
    kind: &str,
    published: bool,
    locale: &str,
    title: &str,
) -> String {
    let post_id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO posts (id, slug, kind, published) VALUES (?, ?, ?, ?)")
        .bind(&post_id)
        .bind(slug)
        .bind(kind)
        .bind(published)
        .execute(pool)
        .await
        .expect("Failed to create test post");

    add_translation(pool, &post_id, locale, title).await;

    post_id
}

/// Add a translation to an existing test post
pub async fn add_translation(pool: &SqlitePool, post_id: &str, locale: &str, title: &str) {
    sqlx::query(
        "INSERT INTO post_translations (post_id, locale, title, summary, body) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(post_id)
    .bind(locale)
    .bind(title)
    .bind(format!("{} summary", title))
    .bind(format!("{} body", title))
    .execute(pool)
    .await
    .expect("Failed to add translation");
}
