use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Subscriber {
    pub id: i64,
    pub email: String,
    pub locale: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckSubscriptionRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubscribeRequest {
    #[validate(email)]
    pub email: String,
    pub locale: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionStatusResponse {
    pub subscribed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscribeResponse {
    pub subscribed: bool,
    /// True when the address was already on the list and nothing was inserted.
    pub already_subscribed: bool,
}
