//! Session relay + admin route guard
//!
//! Every non-static request makes exactly one round trip to the hosted
//! auth service: the request's cookies go out, the current principal
//! and any refreshed session cookies come back. The refreshed cookies
//! are applied to the outgoing response no matter how the request ends,
//! redirects included. Requests under `/admin` (judged on the
//! locale-agnostic path) additionally pass the guard:
//!
//! 1. not an admin path            -> continue
//! 2. `/admin/login`, signed in    -> redirect `/admin`
//! 3. `/admin/*`, anonymous        -> redirect `/admin/login`
//! 4. `/admin/*`, not a member     -> redirect `/`
//! 5. `/admin/*`, member           -> continue
//!
//! Membership is looked up per request, only after a principal is
//! confirmed, and never cached.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::models::{CurrentPrincipal, Principal, RequestCookie, SessionCookie, SessionResolution};
use crate::services::{AdminService, AuthGateway};

use super::locale::{RoutePath, is_static_asset};

pub const ADMIN_PREFIX: &str = "/admin";
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";

#[derive(Clone)]
pub struct SessionState {
    pub auth_gateway: Arc<dyn AuthGateway>,
    pub admin_service: AdminService,
}

pub async fn session_middleware(
    State(state): State<SessionState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    if is_static_asset(&path) {
        return next.run(req).await;
    }

    let request_cookies = collect_cookies(&req);

    let resolution = match state.auth_gateway.resolve(&request_cookies).await {
        Ok(resolution) => resolution,
        Err(e) => {
            // An unreachable auth service reads as "not logged in";
            // the request itself never fails here.
            tracing::warn!("Session resolution failed, treating request as unauthenticated: {}", e);
            SessionResolution::default()
        }
    };

    let principal = resolution.principal.clone();
    req.extensions_mut().insert(CurrentPrincipal(principal.clone()));

    let route_path = req
        .extensions()
        .get::<RoutePath>()
        .map(|p| p.0.clone())
        .unwrap_or_else(|| crate::utils::strip_locale_prefix(&path));

    let response = match admin_gate(&state, &route_path, principal.as_ref()).await {
        GateDecision::Continue => next.run(req).await,
        GateDecision::Redirect(target) => {
            tracing::debug!("Admin guard redirect: {} -> {}", path, target);
            Redirect::temporary(&target).into_response()
        }
    };

    apply_session_cookies(response, &resolution.cookies_to_set)
}

enum GateDecision {
    Continue,
    Redirect(String),
}

async fn admin_gate(
    state: &SessionState,
    route_path: &str,
    principal: Option<&Principal>,
) -> GateDecision {
    if !is_admin_path(route_path) {
        return GateDecision::Continue;
    }

    if route_path == ADMIN_LOGIN_PATH {
        // A live session has no business on the login page.
        return match principal {
            Some(_) => GateDecision::Redirect(ADMIN_PREFIX.to_string()),
            None => GateDecision::Continue,
        };
    }

    let Some(principal) = principal else {
        return GateDecision::Redirect(ADMIN_LOGIN_PATH.to_string());
    };

    let is_member = match state.admin_service.is_admin(&principal.id).await {
        Ok(is_member) => is_member,
        Err(e) => {
            // Least privilege: an unanswered membership lookup reads as
            // "not a member".
            tracing::warn!("Admin membership lookup failed for {}: {}", principal.id, e);
            false
        }
    };

    if is_member {
        GateDecision::Continue
    } else {
        tracing::warn!("Authenticated non-admin {} denied {}", principal.id, route_path);
        GateDecision::Redirect("/".to_string())
    }
}

fn is_admin_path(path: &str) -> bool {
    path == ADMIN_PREFIX || path.starts_with("/admin/")
}

fn collect_cookies(req: &Request) -> Vec<RequestCookie> {
    CookieJar::from_headers(req.headers())
        .iter()
        .map(|cookie| RequestCookie {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
        })
        .collect()
}

fn apply_session_cookies(mut response: Response, cookies: &[SessionCookie]) -> Response {
    for cookie in cookies {
        if let Ok(value) = HeaderValue::from_str(&format_set_cookie(cookie)) {
            response.headers_mut().append(SET_COOKIE, value);
        } else {
            tracing::warn!("Dropping session cookie {} with non-header-safe value", cookie.name);
        }
    }
    response
}

/// Serialize a relayed cookie with the options the auth service asked
/// for. Values pass through verbatim.
fn format_set_cookie(cookie: &SessionCookie) -> String {
    let mut header = format!("{}={}", cookie.name, cookie.value);
    if let Some(path) = &cookie.options.path {
        header.push_str("; Path=");
        header.push_str(path);
    }
    if let Some(domain) = &cookie.options.domain {
        header.push_str("; Domain=");
        header.push_str(domain);
    }
    if let Some(max_age) = cookie.options.max_age_secs {
        header.push_str("; Max-Age=");
        header.push_str(&max_age.to_string());
    }
    if cookie.options.same_site_lax {
        header.push_str("; SameSite=Lax");
    }
    if cookie.options.http_only {
        header.push_str("; HttpOnly");
    }
    if cookie.options.secure {
        header.push_str("; Secure");
    }
    header
}
