use std::sync::Arc;

use axum::{Json, extract::Path, extract::Query, extract::State};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::AppState;
use crate::middleware::RequestLocale;
use crate::models::{LocalizedPost, PostKind, SiteContentEntry};
use crate::utils::ApiResult;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPostsQuery {
    pub kind: PostKind,
}

/// List published posts of a kind, localized for the request's locale
#[utoipa::path(
    get,
    path = "/api/posts",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Published posts", body = Vec<LocalizedPost>)
    ),
    tag = "Content"
)]
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
    Query(query): Query<ListPostsQuery>,
) -> ApiResult<Json<Vec<LocalizedPost>>> {
    tracing::debug!("Listing {} posts for locale {}", query.kind.as_str(), locale);
    let posts = state.content_service.list_posts(query.kind, locale).await?;
    Ok(Json(posts))
}

/// Get one published post by slug
#[utoipa::path(
    get,
    path = "/api/posts/{slug}",
    responses(
        (status = 200, description = "Post detail", body = LocalizedPost),
        (status = 404, description = "Post not found"),
    ),
    tag = "Content"
)]
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
    Path(slug): Path<String>,
) -> ApiResult<Json<LocalizedPost>> {
    tracing::debug!("Fetching post {} for locale {}", slug, locale);
    let post = state.content_service.get_post(&slug, locale).await?;
    Ok(Json(post))
}

/// Get a structured site content blob by key
#[utoipa::path(
    get,
    path = "/api/content/{key}",
    responses(
        (status = 200, description = "Site content", body = SiteContentEntry),
        (status = 404, description = "Key not found"),
    ),
    tag = "Content"
)]
pub async fn get_site_content(
    State(state): State<Arc<AppState>>,
    RequestLocale(locale): RequestLocale,
    Path(key): Path<String>,
) -> ApiResult<Json<SiteContentEntry>> {
    let entry = state.content_service.get_site_content(&key, locale).await?;
    Ok(Json(entry))
}
