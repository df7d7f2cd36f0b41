use sqlx::SqlitePool;

use crate::models::{SubscribeResponse, SubscriptionStatusResponse};
use crate::utils::{ApiResult, Locale};

#[derive(Clone)]
pub struct SubscriberService {
    pool: SqlitePool,
}

impl SubscriberService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Check whether an address is already on the newsletter list.
    pub async fn check(&self, email: &str) -> ApiResult<SubscriptionStatusResponse> {
        let email = normalize_email(email);
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM subscribers WHERE email = ?")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(SubscriptionStatusResponse { subscribed: row.is_some() })
    }

    /// Subscribe an address. Re-subscribing an existing address is
    /// reported, not treated as an error.
    pub async fn subscribe(&self, email: &str, locale: Locale) -> ApiResult<SubscribeResponse> {
        let email = normalize_email(email);

        let result = sqlx::query(
            "INSERT INTO subscribers (email, locale) VALUES (?, ?) ON CONFLICT(email) DO NOTHING",
        )
        .bind(&email)
        .bind(locale.as_str())
        .execute(&self.pool)
        .await?;

        let already_subscribed = result.rows_affected() == 0;
        if already_subscribed {
            tracing::debug!("Subscription request for already-subscribed address");
        } else {
            tracing::info!("New newsletter subscriber ({})", locale);
        }

        Ok(SubscribeResponse { subscribed: true, already_subscribed })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
