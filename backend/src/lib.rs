pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, services::{ServeDir, ServeFile}, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::middleware::{SessionState, locale_middleware, session_middleware};
use crate::services::{AdminService, ContentService, RateLimitService, SubscriberService};

rust_i18n::i18n!("locales", fallback = "en");

/// Shared handler state. Session/auth state lives separately in
/// [`SessionState`] because only the middleware needs it.
pub struct AppState {
    pub config: Config,
    pub content_service: ContentService,
    pub subscriber_service: SubscriberService,
    pub admin_service: AdminService,
    pub rate_limit_service: RateLimitService,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::content::list_posts,
        handlers::content::get_post,
        handlers::content::get_site_content,
        handlers::newsletter::check_subscription,
        handlers::newsletter::subscribe,
        handlers::admin::me,
        handlers::admin::list_all_posts,
        handlers::admin::create_post,
        handlers::admin::update_post,
        handlers::admin::upsert_translation,
        handlers::admin::delete_post,
        handlers::admin::put_site_content,
    ),
    components(schemas(
        handlers::health::HealthResponse,
        models::Principal,
        models::Post,
        models::PostKind,
        models::PostTranslation,
        models::PostWithTranslations,
        models::LocalizedPost,
        models::SiteContentEntry,
        models::CreatePostRequest,
        models::TranslationPayload,
        models::UpdatePostRequest,
        models::UpsertTranslationRequest,
        models::PutSiteContentRequest,
        models::CheckSubscriptionRequest,
        models::SubscribeRequest,
        models::SubscribeResponse,
        models::SubscriptionStatusResponse,
    )),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Content", description = "Public localized content"),
        (name = "Newsletter", description = "Subscription functions"),
        (name = "Admin", description = "Content management (admin session required)"),
    )
)]
pub struct ApiDoc;

/// Assemble the full application router.
///
/// Layer order matters and mirrors the per-request pipeline: the locale
/// middleware runs outermost (resolve locale, preference redirect, URI
/// rewrite, `NEXT_LOCALE` stamp), then the session middleware (relay,
/// admin guard), then routing. Static files are the fallback, so admin
/// page paths like `/admin/login` are served by the static site after
/// the guard has had its say.
pub fn build_app(state: Arc<AppState>, session_state: SessionState) -> Router {
    let api = Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/posts", get(handlers::content::list_posts))
        .route("/api/posts/:slug", get(handlers::content::get_post))
        .route("/api/content/:key", get(handlers::content::get_site_content))
        .route("/api/newsletter/check", post(handlers::newsletter::check_subscription))
        .route("/api/newsletter/subscribe", post(handlers::newsletter::subscribe));

    let admin_api = Router::new()
        .route("/admin/api/me", get(handlers::admin::me))
        .route(
            "/admin/api/posts",
            get(handlers::admin::list_all_posts).post(handlers::admin::create_post),
        )
        .route(
            "/admin/api/posts/:id",
            put(handlers::admin::update_post).delete(handlers::admin::delete_post),
        )
        .route(
            "/admin/api/posts/:id/translations/:locale",
            put(handlers::admin::upsert_translation),
        )
        .route("/admin/api/content/:key", put(handlers::admin::put_site_content));

    let mut app = Router::new()
        .merge(api)
        .merge(admin_api)
        .with_state(state.clone())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if state.config.static_config.enabled {
        let web_root = state.config.static_config.web_root.clone();
        let index = format!("{}/index.html", web_root);
        app = app.fallback_service(ServeDir::new(web_root).not_found_service(ServeFile::new(index)));
    }

    app.layer(axum::middleware::from_fn_with_state(session_state, session_middleware))
        .layer(axum::middleware::from_fn(locale_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
