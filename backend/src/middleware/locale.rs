//! Locale routing middleware
//!
//! Runs first for every non-static request, in a fixed order: resolve
//! the locale from the path, honor a stored language preference with a
//! redirect (terminal), then hand off inward and stamp the resolved
//! locale onto whatever response comes back. The locale-agnostic path
//! is computed once here and shared with the admin guard through a
//! request extension.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderValue, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::{Locale, set_locale, strip_locale_prefix};

/// Written by the application when a user explicitly switches language;
/// only ever read here.
pub const PREFERRED_LANGUAGE_COOKIE: &str = "preferredLanguage";

/// Request-scoped echo of the resolved locale, consumed by downstream
/// rendering. Not a preference store.
pub const RESOLVED_LOCALE_COOKIE: &str = "NEXT_LOCALE";

// Static assets skip locale handling and the admin guard entirely.
static STATIC_ASSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/(?:static|assets)/|^/favicon\.ico$|\.(?:png|jpe?g|gif|svg|webp|ico)$")
        .expect("static asset pattern must compile")
});

pub fn is_static_asset(path: &str) -> bool {
    STATIC_ASSET.is_match(path)
}

/// Request-extension carrying the locale-agnostic path, so route-prefix
/// checks downstream never see `/nl/admin` where they expect `/admin`.
#[derive(Debug, Clone)]
pub struct RoutePath(pub String);

/// Extractor for the locale this middleware resolved. Requests that
/// bypassed the middleware (static-asset shaped paths) read as the
/// default locale rather than failing extraction.
#[derive(Debug, Clone, Copy)]
pub struct RequestLocale(pub Locale);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestLocale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Locale>().copied().unwrap_or(crate::utils::DEFAULT_LOCALE)))
    }
}

pub async fn locale_middleware(mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();

    if is_static_asset(&path) {
        return next.run(req).await;
    }

    let locale = Locale::resolve_from_path(&path);

    // A stored preference only redirects requests that are not already
    // locale-prefixed; prefixed requests are served as addressed.
    if locale.is_default()
        && let Some(preferred) = preferred_locale(&req)
    {
        let target = match req.uri().query() {
            Some(query) => format!("/{}{}?{}", preferred, path, query),
            None => format!("/{}{}", preferred, path),
        };
        tracing::debug!("Language preference redirect: {} -> {}", path, target);
        return Redirect::temporary(&target).into_response();
    }

    set_locale(locale);
    req.extensions_mut().insert(locale);

    let stripped = strip_locale_prefix(&path);
    req.extensions_mut().insert(RoutePath(stripped.clone()));

    // Routes are registered locale-agnostic; rewrite `/nl/pricing` to
    // `/pricing` so both address the same handler.
    if !locale.is_default() {
        let rewritten = match req.uri().query() {
            Some(query) => format!("{}?{}", stripped, query),
            None => stripped,
        };
        if let Ok(uri) = rewritten.parse() {
            *req.uri_mut() = uri;
        }
    }

    let mut response = next.run(req).await;

    let cookie = Cookie::build((RESOLVED_LOCALE_COOKIE, locale.as_str()))
        .path("/")
        .same_site(SameSite::Lax)
        .build();
    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        response.headers_mut().append(SET_COOKIE, value);
    }

    response
}

/// The stored language preference, when it names a recognized
/// non-default locale. Malformed or default-locale values mean "no
/// redirect", matching case-insensitively (`NL` and `nl` agree).
fn preferred_locale(req: &Request) -> Option<Locale> {
    let jar = CookieJar::from_headers(req.headers());
    let cookie = jar.get(PREFERRED_LANGUAGE_COOKIE)?;
    Locale::parse(&cookie.value().to_ascii_lowercase()).filter(|locale| !locale.is_default())
}
