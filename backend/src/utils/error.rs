use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_i18n::t;
use serde::Serialize;
use thiserror::Error;

use super::i18n::get_locale;

/// API Error with rich context and automatic error trait implementations
///
/// Design: Uses thiserror for ergonomic error handling with context.
/// Each variant carries meaningful context to help with debugging.
#[derive(Error, Debug)]
pub enum ApiError {
    // Authentication errors 1xxx
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // Auth gateway errors 2xxx
    #[error("Auth service unavailable: {message}")]
    AuthGatewayUnavailable { message: String },

    // Resource errors 3xxx
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Post {slug} not found")]
    PostNotFound { slug: String },

    #[error("Translation {locale} for post {post_id} not found")]
    TranslationNotFound { post_id: String, locale: String },

    // Validation errors 4xxx
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate slug: {0}")]
    DuplicateSlug(String),

    // Rate limiting 4290
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    // System errors 5xxx
    #[error("Internal error: {0}")]
    InternalError(String),

    // Database errors - auto-convert from sqlx::Error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Generic wrapper for other errors - auto-convert from anyhow::Error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Helper to create unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Helper to create forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Helper to create auth gateway error
    pub fn auth_gateway_unavailable(message: impl Into<String>) -> Self {
        Self::AuthGatewayUnavailable { message: message.into() }
    }

    /// Helper to create not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::ResourceNotFound(message.into())
    }

    /// Helper to create validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Helper to create invalid data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Helper to create internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// Get numeric error code
    pub fn error_code(&self) -> i32 {
        match self {
            // Authentication errors 1xxx
            Self::Unauthorized(_) => 1001,
            Self::Forbidden(_) => 1002,

            // Auth gateway errors 2xxx
            Self::AuthGatewayUnavailable { .. } => 2001,

            // Resource errors 3xxx
            Self::ResourceNotFound(_) => 3000,
            Self::PostNotFound { .. } => 3001,
            Self::TranslationNotFound { .. } => 3002,

            // Validation errors 4xxx
            Self::ValidationError(_) => 4001,
            Self::InvalidInput(_) => 4002,
            Self::DuplicateSlug(_) => 4003,
            Self::RateLimited { .. } => 4290,

            // System errors 5xxx
            Self::InternalError(_) => 5001,
            Self::Database(_) => 5002,
            Self::Other(_) => 5001,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get localized error message based on current locale
    pub fn localized_message(&self) -> String {
        let locale = get_locale().as_str();
        match self {
            Self::Unauthorized(msg) => {
                t!("auth.unauthorized", locale = locale, message = msg).to_string()
            }
            Self::Forbidden(msg) => {
                t!("auth.forbidden", locale = locale, message = msg).to_string()
            }
            Self::AuthGatewayUnavailable { message } => {
                t!("auth.gateway_unavailable", locale = locale, message = message).to_string()
            }
            Self::ResourceNotFound(name) => {
                t!("resource.not_found", locale = locale, name = name).to_string()
            }
            Self::PostNotFound { slug } => {
                t!("content.post_not_found", locale = locale, slug = slug).to_string()
            }
            Self::TranslationNotFound { post_id, locale: missing } => {
                t!("content.translation_not_found", locale = locale, id = post_id, missing = missing)
                    .to_string()
            }
            Self::ValidationError(details) => {
                t!("validation.failed", locale = locale, details = details).to_string()
            }
            Self::InvalidInput(msg) => msg.clone(),
            Self::DuplicateSlug(slug) => {
                t!("content.duplicate_slug", locale = locale, slug = slug).to_string()
            }
            Self::RateLimited { retry_after_secs } => {
                t!("rate_limit.exceeded", locale = locale, seconds = retry_after_secs).to_string()
            }
            Self::InternalError(msg) => {
                t!("internal.error", locale = locale, message = msg).to_string()
            }
            Self::Database(err) => {
                t!("database.error", locale = locale, error = err.to_string()).to_string()
            }
            Self::Other(err) => {
                t!("internal.error", locale = locale, message = err.to_string()).to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let message = self.localized_message();

        let status = match code {
            1001 => StatusCode::UNAUTHORIZED,
            1002 => StatusCode::FORBIDDEN,
            2001..=2999 => StatusCode::BAD_GATEWAY,
            3000..=3999 => StatusCode::NOT_FOUND,
            4290 => StatusCode::TOO_MANY_REQUESTS,
            4001..=4999 => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let retry_after = match &self {
            Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let response = ApiErrorResponse { code, message, details: None };
        let mut response = (status, Json(response)).into_response();

        if let Some(seconds) = retry_after
            && let Ok(value) = seconds.to_string().parse()
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }

        response
    }
}

/// Implement From for serde_json::Error
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal_error(format!("JSON serialization error: {}", err))
    }
}

/// Implement From for validator errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::validation_error(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
