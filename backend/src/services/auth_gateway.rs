//! Client for the hosted auth service that owns user sessions.
//!
//! The contract is deliberately narrow: hand the service the request's
//! cookies, get back the current principal (if any) plus the refreshed
//! session cookies the response must carry. Token material is opaque
//! end to end.

use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, SameSite};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::{CookieOptions, Principal, RequestCookie, SessionCookie, SessionResolution};
use crate::utils::{ApiError, ApiResult};

#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// One session-relay round trip for the current request.
    ///
    /// "Not logged in" is a normal outcome (`principal: None`), never an
    /// error; `Err` is reserved for the service being unreachable or
    /// answering garbage, and callers are expected to degrade that to
    /// the unauthenticated case.
    async fn resolve(&self, cookies: &[RequestCookie]) -> ApiResult<SessionResolution>;
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: Uuid,
    email: Option<String>,
}

pub struct HttpAuthGateway {
    pub http_client: Client,
    gateway_url: String,
    api_key: String,
}

impl HttpAuthGateway {
    pub fn new(config: &AuthConfig) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            gateway_url: config.gateway_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn user_endpoint(&self) -> String {
        format!("{}/auth/v1/user", self.gateway_url)
    }

    fn cookie_header(cookies: &[RequestCookie]) -> Option<HeaderValue> {
        if cookies.is_empty() {
            return None;
        }
        let joined = cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&joined).ok()
    }

    fn relayed_cookies(headers: &HeaderMap) -> Vec<SessionCookie> {
        headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(parse_set_cookie)
            .collect()
    }
}

/// Map one Set-Cookie header value from the auth service into the
/// relay representation. Unparseable values are dropped with a warning
/// rather than failing the request.
fn parse_set_cookie(raw: &str) -> Option<SessionCookie> {
    match Cookie::parse(raw.to_owned()) {
        Ok(cookie) => Some(SessionCookie {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            options: CookieOptions {
                domain: cookie.domain().map(str::to_string),
                path: cookie.path().map(str::to_string),
                same_site_lax: matches!(cookie.same_site(), Some(SameSite::Lax)),
                max_age_secs: cookie.max_age().map(|age| age.whole_seconds()),
                http_only: cookie.http_only().unwrap_or(false),
                secure: cookie.secure().unwrap_or(false),
            },
        }),
        Err(e) => {
            tracing::warn!("Dropping unparseable Set-Cookie from auth service: {}", e);
            None
        }
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn resolve(&self, cookies: &[RequestCookie]) -> ApiResult<SessionResolution> {
        let mut request = self
            .http_client
            .get(self.user_endpoint())
            .header("apikey", &self.api_key);

        if let Some(header) = Self::cookie_header(cookies) {
            request = request.header(COOKIE, header);
        }

        let response = request.send().await.map_err(|e| {
            ApiError::auth_gateway_unavailable(format!("user lookup failed: {}", e))
        })?;

        let status = response.status();
        let cookies_to_set = Self::relayed_cookies(response.headers());

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // No live session. Normal case, nothing to log.
            return Ok(SessionResolution { principal: None, cookies_to_set });
        }

        if !status.is_success() {
            return Err(ApiError::auth_gateway_unavailable(format!(
                "user endpoint returned {}",
                status
            )));
        }

        let user: UserPayload = response.json().await.map_err(|e| {
            ApiError::auth_gateway_unavailable(format!("invalid user payload: {}", e))
        })?;

        tracing::debug!("Auth service resolved principal {}", user.id);

        Ok(SessionResolution {
            principal: Some(Principal { id: user.id, email: user.email }),
            cookies_to_set,
        })
    }
}
