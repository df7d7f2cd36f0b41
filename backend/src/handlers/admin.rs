use std::sync::Arc;

use axum::{Extension, Json, extract::Path, extract::State};
use validator::Validate;

use crate::AppState;
use crate::models::{
    CreatePostRequest, CurrentPrincipal, Principal, PostWithTranslations, PutSiteContentRequest,
    SiteContentEntry, UpdatePostRequest, UpsertTranslationRequest,
};
use crate::utils::{ApiError, ApiResult};

/// Identity of the signed-in administrator
#[utoipa::path(
    get,
    path = "/admin/api/me",
    responses(
        (status = 200, description = "Current administrator", body = Principal),
        (status = 401, description = "No session"),
    ),
    tag = "Admin"
)]
pub async fn me(
    Extension(principal): Extension<CurrentPrincipal>,
) -> ApiResult<Json<Principal>> {
    // The guard redirects anonymous requests before they get here; this
    // is the API-shaped answer for fetches that race a session expiry.
    principal
        .0
        .map(Json)
        .ok_or_else(|| ApiError::unauthorized("No active session"))
}

/// List every post with all translations, drafts included
#[utoipa::path(
    get,
    path = "/admin/api/posts",
    responses(
        (status = 200, description = "All posts", body = Vec<PostWithTranslations>)
    ),
    tag = "Admin"
)]
pub async fn list_all_posts(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<PostWithTranslations>>> {
    tracing::debug!("Listing all posts for admin dashboard");
    let posts = state.content_service.list_all_posts().await?;
    Ok(Json(posts))
}

/// Create a post with its initial translations
#[utoipa::path(
    post,
    path = "/admin/api/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post created", body = PostWithTranslations),
        (status = 400, description = "Validation error"),
    ),
    tag = "Admin"
)]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePostRequest>,
) -> ApiResult<Json<PostWithTranslations>> {
    payload.validate()?;
    tracing::info!("Creating {} post: {}", payload.kind.as_str(), payload.slug);
    let post = state.content_service.create_post(payload).await?;
    Ok(Json(post))
}

/// Update a post's slug or published flag
#[utoipa::path(
    put,
    path = "/admin/api/posts/{id}",
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostWithTranslations),
        (status = 404, description = "Post not found"),
        (status = 400, description = "Validation error"),
    ),
    tag = "Admin"
)]
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
    Json(payload): Json<UpdatePostRequest>,
) -> ApiResult<Json<PostWithTranslations>> {
    payload.validate()?;
    tracing::info!("Updating post {}", post_id);
    let post = state.content_service.update_post(&post_id, payload).await?;
    Ok(Json(post))
}

/// Create or replace one translation of a post
#[utoipa::path(
    put,
    path = "/admin/api/posts/{id}/translations/{locale}",
    request_body = UpsertTranslationRequest,
    responses(
        (status = 200, description = "Translation stored", body = PostWithTranslations),
        (status = 404, description = "Post not found"),
        (status = 400, description = "Unsupported locale"),
    ),
    tag = "Admin"
)]
pub async fn upsert_translation(
    State(state): State<Arc<AppState>>,
    Path((post_id, locale)): Path<(String, String)>,
    Json(payload): Json<UpsertTranslationRequest>,
) -> ApiResult<Json<PostWithTranslations>> {
    payload.validate()?;
    tracing::info!("Upserting {} translation for post {}", locale, post_id);
    let post = state
        .content_service
        .upsert_translation(&post_id, &locale, payload)
        .await?;
    Ok(Json(post))
}

/// Delete a post and its translations
#[utoipa::path(
    delete,
    path = "/admin/api/posts/{id}",
    responses(
        (status = 200, description = "Post deleted"),
        (status = 404, description = "Post not found"),
    ),
    tag = "Admin"
)]
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    tracing::info!("Deleting post {}", post_id);
    state.content_service.delete_post(&post_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Create or replace a structured site content blob
#[utoipa::path(
    put,
    path = "/admin/api/content/{key}",
    request_body = PutSiteContentRequest,
    responses(
        (status = 200, description = "Content stored", body = SiteContentEntry),
        (status = 400, description = "Unsupported locale"),
    ),
    tag = "Admin"
)]
pub async fn put_site_content(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(payload): Json<PutSiteContentRequest>,
) -> ApiResult<Json<SiteContentEntry>> {
    tracing::info!("Storing site content {} ({})", key, payload.locale);
    let entry = state.content_service.put_site_content(&key, payload).await?;
    Ok(Json(entry))
}
