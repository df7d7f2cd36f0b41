use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::HeaderMap,
};
use validator::Validate;

use crate::AppState;
use crate::middleware::RequestLocale;
use crate::models::{
    CheckSubscriptionRequest, SubscribeRequest, SubscribeResponse, SubscriptionStatusResponse,
};
use crate::utils::{ApiError, ApiResult, Locale};

/// Check whether an email address is subscribed to the newsletter
#[utoipa::path(
    post,
    path = "/api/newsletter/check",
    request_body = CheckSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription status", body = SubscriptionStatusResponse),
        (status = 400, description = "Invalid email"),
        (status = 429, description = "Rate limit exceeded"),
    ),
    tag = "Newsletter"
)]
pub async fn check_subscription(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(payload): Json<CheckSubscriptionRequest>,
) -> ApiResult<Json<SubscriptionStatusResponse>> {
    enforce_rate_limit(&state, &headers, connect_info.map(|ConnectInfo(addr)| addr)).await?;
    payload.validate()?;

    let status = state.subscriber_service.check(&payload.email).await?;
    Ok(Json(status))
}

/// Subscribe an email address to the newsletter
#[utoipa::path(
    post,
    path = "/api/newsletter/subscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscribed", body = SubscribeResponse),
        (status = 400, description = "Invalid email"),
        (status = 429, description = "Rate limit exceeded"),
    ),
    tag = "Newsletter"
)]
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    RequestLocale(request_locale): RequestLocale,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(payload): Json<SubscribeRequest>,
) -> ApiResult<Json<SubscribeResponse>> {
    enforce_rate_limit(&state, &headers, connect_info.map(|ConnectInfo(addr)| addr)).await?;
    payload.validate()?;

    // An explicit locale in the payload wins over the path-resolved one,
    // so a signup widget on an unprefixed page can still record `nl`.
    let locale = payload
        .locale
        .as_deref()
        .and_then(Locale::parse)
        .unwrap_or(request_locale);

    let result = state.subscriber_service.subscribe(&payload.email, locale).await?;
    Ok(Json(result))
}

async fn enforce_rate_limit(
    state: &AppState,
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
) -> ApiResult<()> {
    let key = client_ip(headers, peer);
    let decision = state.rate_limit_service.check(&key).await;

    if decision.allowed {
        Ok(())
    } else {
        Err(ApiError::RateLimited { retry_after_secs: decision.retry_after_secs })
    }
}

/// Rate-limit key for this request: the first hop in x-forwarded-for
/// when a proxy supplied one, otherwise the peer address.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(addr)), "203.0.113.7");
        assert_eq!(client_ip(&HeaderMap::new(), Some(addr)), "127.0.0.1");
        assert_eq!(client_ip(&HeaderMap::new(), None), "unknown");
    }
}
