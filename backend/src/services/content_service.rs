use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool, Transaction, sqlite::Sqlite};
use uuid::Uuid;

use crate::models::{
    CreatePostRequest, LocalizedPost, Post, PostKind, PostTranslation, PostWithTranslations,
    PutSiteContentRequest, SiteContentEntry, UpdatePostRequest, UpsertTranslationRequest,
};
use crate::utils::{ApiError, ApiResult, DEFAULT_LOCALE, Locale};

#[derive(FromRow)]
struct LocalizedRow {
    id: String,
    slug: String,
    kind: PostKind,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    locale: String,
    title: String,
    summary: Option<String>,
    body: String,
}

#[derive(Clone)]
pub struct ContentService {
    pool: SqlitePool,
}

impl ContentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Published posts of one kind, localized for `locale`.
    ///
    /// A post missing the requested translation falls back to its
    /// default-locale translation; a post with neither is omitted.
    pub async fn list_posts(&self, kind: PostKind, locale: Locale) -> ApiResult<Vec<LocalizedPost>> {
        let rows: Vec<LocalizedRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.slug, p.kind, p.created_at, p.updated_at,
                   t.locale, t.title, t.summary, t.body
            FROM posts p
            JOIN post_translations t ON t.post_id = p.id
            WHERE p.published = 1 AND p.kind = ? AND t.locale IN (?, ?)
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(kind)
        .bind(locale.as_str())
        .bind(DEFAULT_LOCALE.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(pick_per_post(rows, locale))
    }

    /// One published post by slug, localized with the same fallback as
    /// `list_posts`.
    pub async fn get_post(&self, slug: &str, locale: Locale) -> ApiResult<LocalizedPost> {
        let rows: Vec<LocalizedRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.slug, p.kind, p.created_at, p.updated_at,
                   t.locale, t.title, t.summary, t.body
            FROM posts p
            JOIN post_translations t ON t.post_id = p.id
            WHERE p.published = 1 AND p.slug = ? AND t.locale IN (?, ?)
            "#,
        )
        .bind(slug)
        .bind(locale.as_str())
        .bind(DEFAULT_LOCALE.as_str())
        .fetch_all(&self.pool)
        .await?;

        pick_per_post(rows, locale)
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::PostNotFound { slug: slug.to_string() })
    }

    /// Every post with every translation, drafts included. Admin view.
    pub async fn list_all_posts(&self) -> ApiResult<Vec<PostWithTranslations>> {
        let posts: Vec<Post> = sqlx::query_as("SELECT * FROM posts ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        let translations: Vec<PostTranslation> =
            sqlx::query_as("SELECT * FROM post_translations ORDER BY locale")
                .fetch_all(&self.pool)
                .await?;

        let mut by_post: HashMap<String, Vec<PostTranslation>> = HashMap::new();
        for translation in translations {
            by_post.entry(translation.post_id.clone()).or_default().push(translation);
        }

        Ok(posts
            .into_iter()
            .map(|post| {
                let translations = by_post.remove(&post.id).unwrap_or_default();
                PostWithTranslations { post, translations }
            })
            .collect())
    }

    pub async fn get_post_with_translations(&self, post_id: &str) -> ApiResult<PostWithTranslations> {
        let post = self.fetch_post(post_id).await?;
        let translations: Vec<PostTranslation> =
            sqlx::query_as("SELECT * FROM post_translations WHERE post_id = ? ORDER BY locale")
                .bind(post_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(PostWithTranslations { post, translations })
    }

    pub async fn create_post(&self, req: CreatePostRequest) -> ApiResult<PostWithTranslations> {
        let mut tx = self.pool.begin().await?;

        self.ensure_slug_available(&mut tx, &req.slug, None).await?;

        let post_id = Uuid::new_v4().to_string();
        {
            let conn = tx.as_mut();
            sqlx::query("INSERT INTO posts (id, slug, kind, published) VALUES (?, ?, ?, ?)")
                .bind(&post_id)
                .bind(&req.slug)
                .bind(req.kind)
                .bind(req.published)
                .execute(conn)
                .await?;
        }

        for translation in &req.translations {
            let locale = parse_locale(&translation.locale)?;
            let conn = tx.as_mut();
            sqlx::query(
                "INSERT INTO post_translations (post_id, locale, title, summary, body) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&post_id)
            .bind(locale.as_str())
            .bind(&translation.title)
            .bind(&translation.summary)
            .bind(&translation.body)
            .execute(conn)
            .await?;
        }

        tx.commit().await?;

        self.get_post_with_translations(&post_id).await
    }

    pub async fn update_post(
        &self,
        post_id: &str,
        req: UpdatePostRequest,
    ) -> ApiResult<PostWithTranslations> {
        let mut tx = self.pool.begin().await?;

        self.fetch_post_in_tx(&mut tx, post_id).await?;

        if let Some(slug) = &req.slug {
            self.ensure_slug_available(&mut tx, slug, Some(post_id)).await?;
            let conn = tx.as_mut();
            sqlx::query("UPDATE posts SET slug = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?")
                .bind(slug)
                .bind(post_id)
                .execute(conn)
                .await?;
        }

        if let Some(published) = req.published {
            let conn = tx.as_mut();
            sqlx::query(
                "UPDATE posts SET published = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            )
            .bind(published)
            .bind(post_id)
            .execute(conn)
            .await?;
        }

        tx.commit().await?;

        self.get_post_with_translations(post_id).await
    }

    pub async fn upsert_translation(
        &self,
        post_id: &str,
        locale: &str,
        req: UpsertTranslationRequest,
    ) -> ApiResult<PostWithTranslations> {
        let locale = parse_locale(locale)?;

        let mut tx = self.pool.begin().await?;
        self.fetch_post_in_tx(&mut tx, post_id).await?;

        {
            let conn = tx.as_mut();
            sqlx::query(
                r#"
                INSERT INTO post_translations (post_id, locale, title, summary, body)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(post_id, locale)
                DO UPDATE SET title = excluded.title, summary = excluded.summary, body = excluded.body
                "#,
            )
            .bind(post_id)
            .bind(locale.as_str())
            .bind(&req.title)
            .bind(&req.summary)
            .bind(&req.body)
            .execute(conn)
            .await?;
        }

        {
            let conn = tx.as_mut();
            sqlx::query("UPDATE posts SET updated_at = CURRENT_TIMESTAMP WHERE id = ?")
                .bind(post_id)
                .execute(conn)
                .await?;
        }

        tx.commit().await?;

        self.get_post_with_translations(post_id).await
    }

    pub async fn delete_post(&self, post_id: &str) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        self.fetch_post_in_tx(&mut tx, post_id).await?;

        {
            let conn = tx.as_mut();
            sqlx::query("DELETE FROM post_translations WHERE post_id = ?")
                .bind(post_id)
                .execute(conn)
                .await?;
        }

        {
            let conn = tx.as_mut();
            sqlx::query("DELETE FROM posts WHERE id = ?")
                .bind(post_id)
                .execute(conn)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Structured page content by key, with the same locale fallback the
    /// post reads use.
    pub async fn get_site_content(&self, key: &str, locale: Locale) -> ApiResult<SiteContentEntry> {
        let entry: Option<SiteContentEntry> =
            sqlx::query_as("SELECT * FROM site_content WHERE key = ? AND locale = ?")
                .bind(key)
                .bind(locale.as_str())
                .fetch_optional(&self.pool)
                .await?;

        if let Some(entry) = entry {
            return Ok(entry);
        }

        if locale != DEFAULT_LOCALE {
            let fallback: Option<SiteContentEntry> =
                sqlx::query_as("SELECT * FROM site_content WHERE key = ? AND locale = ?")
                    .bind(key)
                    .bind(DEFAULT_LOCALE.as_str())
                    .fetch_optional(&self.pool)
                    .await?;

            if let Some(entry) = fallback {
                return Ok(entry);
            }
        }

        Err(ApiError::not_found(format!("Site content '{}' not found", key)))
    }

    pub async fn put_site_content(
        &self,
        key: &str,
        req: PutSiteContentRequest,
    ) -> ApiResult<SiteContentEntry> {
        let locale = parse_locale(&req.locale)?;
        let value = serde_json::to_string(&req.value)?;

        sqlx::query(
            r#"
            INSERT INTO site_content (key, locale, value) VALUES (?, ?, ?)
            ON CONFLICT(key, locale)
            DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key)
        .bind(locale.as_str())
        .bind(&value)
        .execute(&self.pool)
        .await?;

        self.get_site_content(key, locale).await
    }

    async fn fetch_post(&self, post_id: &str) -> ApiResult<Post> {
        sqlx::query_as("SELECT * FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Post {} not found", post_id)))
    }

    async fn fetch_post_in_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        post_id: &str,
    ) -> ApiResult<Post> {
        let conn = tx.as_mut();
        sqlx::query_as("SELECT * FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Post {} not found", post_id)))
    }

    async fn ensure_slug_available(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        slug: &str,
        current_post: Option<&str>,
    ) -> ApiResult<()> {
        let existing: Option<(String,)> = {
            let conn = tx.as_mut();
            sqlx::query_as("SELECT id FROM posts WHERE slug = ?")
                .bind(slug)
                .fetch_optional(conn)
                .await?
        };

        if let Some((id,)) = existing {
            if current_post.map(|pid| pid != id).unwrap_or(true) {
                return Err(ApiError::DuplicateSlug(slug.to_string()));
            }
        }

        Ok(())
    }
}

fn parse_locale(value: &str) -> ApiResult<Locale> {
    Locale::parse(value)
        .ok_or_else(|| ApiError::invalid_data(format!("Unsupported locale '{}'", value)))
}

/// Collapse joined post/translation rows to one entry per post,
/// preferring the requested locale over the default fallback. Input
/// order (newest post first) is preserved.
fn pick_per_post(rows: Vec<LocalizedRow>, locale: Locale) -> Vec<LocalizedPost> {
    let mut order: Vec<String> = Vec::new();
    let mut chosen: HashMap<String, LocalizedRow> = HashMap::new();

    for row in rows {
        match chosen.get(&row.id) {
            None => {
                order.push(row.id.clone());
                chosen.insert(row.id.clone(), row);
            }
            Some(existing) if existing.locale != locale.as_str() => {
                if row.locale == locale.as_str() {
                    chosen.insert(row.id.clone(), row);
                }
            }
            Some(_) => {}
        }
    }

    order
        .into_iter()
        .filter_map(|id| chosen.remove(&id))
        .map(|row| LocalizedPost {
            id: row.id,
            slug: row.slug,
            kind: row.kind,
            locale: row.locale,
            title: row.title,
            summary: row.summary,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect()
}
