use crate::models::{
    CreatePostRequest, PostKind, PutSiteContentRequest, TranslationPayload, UpdatePostRequest,
    UpsertTranslationRequest,
};
use crate::services::ContentService;
use crate::tests::common::{add_translation, create_test_db, create_test_post};
use crate::utils::{ApiError, Locale};

#[tokio::test]
async fn test_list_posts_empty() {
    let pool = create_test_db().await;
    let service = ContentService::new(pool);

    let posts = service.list_posts(PostKind::Blog, Locale::En).await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_list_posts_localizes_with_fallback() {
    let pool = create_test_db().await;
    let service = ContentService::new(pool.clone());

    let translated =
        create_test_post(&pool, "koken-thuis", "blog", true, "en", "Cooking at home").await;
    add_translation(&pool, &translated, "nl", "Thuis koken").await;
    create_test_post(&pool, "knife-skills", "blog", true, "en", "Knife skills").await;

    let posts = service.list_posts(PostKind::Blog, Locale::Nl).await.unwrap();
    assert_eq!(posts.len(), 2);

    let translated_post = posts.iter().find(|p| p.slug == "koken-thuis").unwrap();
    assert_eq!(translated_post.locale, "nl");
    assert_eq!(translated_post.title, "Thuis koken");

    // No nl translation: served in the default locale instead.
    let fallback_post = posts.iter().find(|p| p.slug == "knife-skills").unwrap();
    assert_eq!(fallback_post.locale, "en");
    assert_eq!(fallback_post.title, "Knife skills");
}

#[tokio::test]
async fn test_list_posts_filters_kind_and_published() {
    let pool = create_test_db().await;
    let service = ContentService::new(pool.clone());

    create_test_post(&pool, "published-blog", "blog", true, "en", "Published").await;
    create_test_post(&pool, "draft-blog", "blog", false, "en", "Draft").await;
    create_test_post(&pool, "course-intro", "learning", true, "en", "Course intro").await;

    let posts = service.list_posts(PostKind::Blog, Locale::En).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].slug, "published-blog");
}

#[tokio::test]
async fn test_get_post_by_slug() {
    let pool = create_test_db().await;
    let service = ContentService::new(pool.clone());

    let post_id = create_test_post(&pool, "sourdough", "blog", true, "en", "Sourdough").await;
    add_translation(&pool, &post_id, "fr", "Levain").await;

    let post = service.get_post("sourdough", Locale::Fr).await.unwrap();
    assert_eq!(post.locale, "fr");
    assert_eq!(post.title, "Levain");

    let post = service.get_post("sourdough", Locale::Nl).await.unwrap();
    assert_eq!(post.locale, "en");
}

#[tokio::test]
async fn test_get_post_unknown_slug() {
    let pool = create_test_db().await;
    let service = ContentService::new(pool);

    let result = service.get_post("missing", Locale::En).await;
    assert!(matches!(result, Err(ApiError::PostNotFound { .. })));
}

#[tokio::test]
async fn test_get_post_ignores_drafts() {
    let pool = create_test_db().await;
    let service = ContentService::new(pool.clone());

    create_test_post(&pool, "draft", "blog", false, "en", "Draft").await;

    let result = service.get_post("draft", Locale::En).await;
    assert!(matches!(result, Err(ApiError::PostNotFound { .. })));
}

#[tokio::test]
async fn test_create_post_with_translations() {
    let pool = create_test_db().await;
    let service = ContentService::new(pool);

    let created = service
        .create_post(CreatePostRequest {
            slug: "mise-en-place".to_string(),
            kind: PostKind::Learning,
            published: true,
            translations: vec![
                TranslationPayload {
                    locale: "en".to_string(),
                    title: "Mise en place".to_string(),
                    summary: None,
                    body: "Get organized first.".to_string(),
                },
                TranslationPayload {
                    locale: "FR".to_string(),
                    title: "Mise en place".to_string(),
                    summary: None,
                    body: "Organisez-vous d'abord.".to_string(),
                },
            ],
        })
        .await
        .unwrap();

    assert_eq!(created.post.slug, "mise-en-place");
    assert_eq!(created.post.kind, PostKind::Learning);
    assert_eq!(created.translations.len(), 2);
    // Locale identifiers are stored canonically lower-cased.
    assert!(created.translations.iter().any(|t| t.locale == "fr"));
}

#[tokio::test]
async fn test_create_post_rejects_duplicate_slug() {
    let pool = create_test_db().await;
    let service = ContentService::new(pool.clone());

    create_test_post(&pool, "taken", "blog", true, "en", "Taken").await;

    let result = service
        .create_post(CreatePostRequest {
            slug: "taken".to_string(),
            kind: PostKind::Blog,
            published: false,
            translations: vec![],
        })
        .await;

    assert!(matches!(result, Err(ApiError::DuplicateSlug(_))));
}

#[tokio::test]
async fn test_create_post_rejects_unsupported_locale() {
    let pool = create_test_db().await;
    let service = ContentService::new(pool);

    let result = service
        .create_post(CreatePostRequest {
            slug: "weird-locale".to_string(),
            kind: PostKind::Blog,
            published: false,
            translations: vec![TranslationPayload {
                locale: "de".to_string(),
                title: "Nope".to_string(),
                summary: None,
                body: "Nope".to_string(),
            }],
        })
        .await;

    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_update_post_publish_and_slug() {
    let pool = create_test_db().await;
    let service = ContentService::new(pool.clone());

    let post_id = create_test_post(&pool, "old-slug", "blog", false, "en", "Post").await;

    let updated = service
        .update_post(
            &post_id,
            UpdatePostRequest { slug: Some("new-slug".to_string()), published: Some(true) },
        )
        .await
        .unwrap();

    assert_eq!(updated.post.slug, "new-slug");
    assert!(updated.post.published);

    // The published post is now publicly visible under the new slug.
    let post = service.get_post("new-slug", Locale::En).await.unwrap();
    assert_eq!(post.id, post_id);
}

#[tokio::test]
async fn test_update_unknown_post() {
    let pool = create_test_db().await;
    let service = ContentService::new(pool);

    let result = service
        .update_post("nope", UpdatePostRequest { slug: None, published: Some(true) })
        .await;

    assert!(matches!(result, Err(ApiError::ResourceNotFound(_))));
}

#[tokio::test]
async fn test_upsert_translation_inserts_then_replaces() {
    let pool = create_test_db().await;
    let service = ContentService::new(pool.clone());

    let post_id = create_test_post(&pool, "pantry", "blog", true, "en", "Pantry basics").await;

    let with_nl = service
        .upsert_translation(
            &post_id,
            "nl",
            UpsertTranslationRequest {
                title: "Voorraadkast".to_string(),
                summary: None,
                body: "De basis.".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(with_nl.translations.len(), 2);

    let replaced = service
        .upsert_translation(
            &post_id,
            "nl",
            UpsertTranslationRequest {
                title: "Voorraadkast, herzien".to_string(),
                summary: Some("v2".to_string()),
                body: "De basis, herzien.".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(replaced.translations.len(), 2);
    let nl = replaced.translations.iter().find(|t| t.locale == "nl").unwrap();
    assert_eq!(nl.title, "Voorraadkast, herzien");
    assert_eq!(nl.summary.as_deref(), Some("v2"));
}

#[tokio::test]
async fn test_delete_post_removes_translations() {
    let pool = create_test_db().await;
    let service = ContentService::new(pool.clone());

    let post_id = create_test_post(&pool, "gone", "blog", true, "en", "Gone").await;
    service.delete_post(&post_id).await.unwrap();

    let posts = service.list_all_posts().await.unwrap();
    assert!(posts.is_empty());

    let orphans: Vec<(String,)> =
        sqlx::query_as("SELECT post_id FROM post_translations WHERE post_id = ?")
            .bind(&post_id)
            .fetch_all(&pool)
            .await
            .unwrap();
    assert!(orphans.is_empty());
}

#[tokio::test]
async fn test_site_content_upsert_and_fallback() {
    let pool = create_test_db().await;
    let service = ContentService::new(pool);

    service
        .put_site_content(
            "home.hero",
            PutSiteContentRequest {
                locale: "en".to_string(),
                value: serde_json::json!({ "headline": "Eat like family" }),
            },
        )
        .await
        .unwrap();

    service
        .put_site_content(
            "home.hero",
            PutSiteContentRequest {
                locale: "nl".to_string(),
                value: serde_json::json!({ "headline": "Eet als familie" }),
            },
        )
        .await
        .unwrap();

    let nl = service.get_site_content("home.hero", Locale::Nl).await.unwrap();
    assert_eq!(nl.value["headline"], "Eet als familie");

    // No fr entry: the default-locale content is served.
    let fr = service.get_site_content("home.hero", Locale::Fr).await.unwrap();
    assert_eq!(fr.locale, "en");

    let missing = service.get_site_content("pricing.table", Locale::En).await;
    assert!(matches!(missing, Err(ApiError::ResourceNotFound(_))));
}
