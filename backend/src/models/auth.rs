use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Identity resolved by the hosted auth service for the current request.
///
/// The session token itself is never inspected here; the auth service
/// owns it and this is the only fact we get back.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    pub id: Uuid,
    pub email: Option<String>,
}

/// A cookie as read from the incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCookie {
    pub name: String,
    pub value: String,
}

/// Cookie attributes the auth service asks us to set alongside a
/// refreshed session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub same_site_lax: bool,
    pub max_age_secs: Option<i64>,
    pub http_only: bool,
    pub secure: bool,
}

/// A cookie to write onto the outgoing response, relayed verbatim from
/// the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
}

/// Outcome of one session-relay round trip: who the request belongs to
/// (if anyone) and which refreshed cookies the response must carry.
///
/// Resolution is pure with respect to the response: applying
/// `cookies_to_set` is the caller's explicit, separate step.
#[derive(Debug, Clone, Default)]
pub struct SessionResolution {
    pub principal: Option<Principal>,
    pub cookies_to_set: Vec<SessionCookie>,
}

/// Request-extension wrapper for the resolved principal, written by the
/// session middleware and read by handlers.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Option<Principal>);
