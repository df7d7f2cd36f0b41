use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// The two post collections the site publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PostKind {
    Blog,
    Learning,
}

impl PostKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::Learning => "learning",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Post {
    pub id: String,
    pub slug: String,
    pub kind: PostKind,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PostTranslation {
    pub post_id: String,
    pub locale: String,
    pub title: String,
    pub summary: Option<String>,
    pub body: String,
}

/// A post joined with the translation chosen for the request's locale.
/// `locale` names the translation actually served, which falls back to
/// the default locale when the requested one does not exist.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LocalizedPost {
    pub id: String,
    pub slug: String,
    pub kind: PostKind,
    pub locale: String,
    pub title: String,
    pub summary: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TranslationPayload {
    pub locale: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 500))]
    pub summary: Option<String>,
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 120))]
    pub slug: String,
    pub kind: PostKind,
    #[serde(default)]
    pub published: bool,
    #[validate(nested)]
    pub translations: Vec<TranslationPayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 120))]
    pub slug: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpsertTranslationRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 500))]
    pub summary: Option<String>,
    #[validate(length(min = 1))]
    pub body: String,
}

/// Full post view for the admin dashboard: every translation, draft or not.
#[derive(Debug, Serialize, ToSchema)]
pub struct PostWithTranslations {
    #[serde(flatten)]
    pub post: Post,
    pub translations: Vec<PostTranslation>,
}

/// A keyed blob of structured page content (home sections, pricing
/// tables) in one locale.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SiteContentEntry {
    pub key: String,
    pub locale: String,
    #[sqlx(json)]
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PutSiteContentRequest {
    pub locale: String,
    pub value: serde_json::Value,
}
