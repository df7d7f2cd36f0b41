//! Internationalization utilities for the backend
//!
//! This module owns the supported-locale set, resolves the active locale
//! from the request path, and provides thread-local storage for the
//! current locale so error messages localize without threading state
//! through every call.

use std::cell::RefCell;

// Thread-local storage for current locale
thread_local! {
    static CURRENT_LOCALE: RefCell<Locale> = const { RefCell::new(Locale::En) };
}

/// Supported locales.
///
/// `En` is the default and is served unprefixed; every other locale is
/// addressed by a leading path segment equal to its identifier
/// (`/nl/...`, `/fr/...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    En,
    Nl,
    Fr,
}

pub const DEFAULT_LOCALE: Locale = Locale::En;
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Nl, Locale::Fr];

impl Locale {
    /// Canonical lower-case identifier, as used in path prefixes and cookies.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Nl => "nl",
            Self::Fr => "fr",
        }
    }

    pub const fn is_default(self) -> bool {
        matches!(self, Locale::En)
    }

    /// Parse a locale value (case-insensitive, tolerant of region tags
    /// like `nl-BE` or `fr_FR`). Returns `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        let primary = value
            .trim()
            .split(['-', '_', ','])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "en" => Some(Self::En),
            "nl" => Some(Self::Nl),
            "fr" => Some(Self::Fr),
            _ => None,
        }
    }

    /// Resolve the active locale from a request path.
    ///
    /// If the first path segment is a recognized non-default locale
    /// identifier, that locale is active; any other path (including
    /// unrecognized segments) resolves to the default. This fallback is
    /// policy, not an error condition.
    pub fn resolve_from_path(path: &str) -> Self {
        match first_segment(path).and_then(Self::parse) {
            Some(locale) if !locale.is_default() => locale,
            _ => DEFAULT_LOCALE,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remove a leading locale segment from a path, if present.
///
/// Works on segments, not substrings: only the first segment is ever
/// compared and removed, so `/pricing/nl-menu` or `/blog/nl` are left
/// untouched. Stripping an already-agnostic path is a no-op, and a bare
/// prefix (`/nl`) normalizes to `/`.
pub fn strip_locale_prefix(path: &str) -> String {
    let is_prefixed = first_segment(path)
        .and_then(Locale::parse)
        .is_some_and(|locale| !locale.is_default());

    if !is_prefixed {
        return path.to_string();
    }

    let rest: Vec<&str> = path.split('/').skip(2).collect();
    if rest.is_empty() || (rest.len() == 1 && rest[0].is_empty()) {
        "/".to_string()
    } else {
        format!("/{}", rest.join("/"))
    }
}

fn first_segment(path: &str) -> Option<&str> {
    path.split('/').find(|segment| !segment.is_empty())
}

/// Set the current locale for the current thread
pub fn set_locale(locale: Locale) {
    CURRENT_LOCALE.with(|l| {
        *l.borrow_mut() = locale;
    });
}

/// Get the current locale for the current thread
pub fn get_locale() -> Locale {
    CURRENT_LOCALE.with(|l| *l.borrow())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_locales_round_trip() {
        for locale in SUPPORTED_LOCALES {
            assert_eq!(Locale::parse(locale.as_str()), Some(*locale));
        }
        assert!(SUPPORTED_LOCALES.contains(&DEFAULT_LOCALE));
    }

    #[test]
    fn test_parse_locale() {
        assert_eq!(Locale::parse("nl"), Some(Locale::Nl));
        assert_eq!(Locale::parse("NL"), Some(Locale::Nl));
        assert_eq!(Locale::parse("nl-BE"), Some(Locale::Nl));
        assert_eq!(Locale::parse("fr_FR"), Some(Locale::Fr));
        assert_eq!(Locale::parse("en-US"), Some(Locale::En));
        assert_eq!(Locale::parse("de"), None);
        assert_eq!(Locale::parse(""), None);
    }

    #[test]
    fn test_resolve_from_path() {
        assert_eq!(Locale::resolve_from_path("/"), Locale::En);
        assert_eq!(Locale::resolve_from_path("/pricing"), Locale::En);
        assert_eq!(Locale::resolve_from_path("/nl"), Locale::Nl);
        assert_eq!(Locale::resolve_from_path("/nl/pricing"), Locale::Nl);
        assert_eq!(Locale::resolve_from_path("/fr/blog/post-1"), Locale::Fr);
        // Unrecognized first segments fall back to the default
        assert_eq!(Locale::resolve_from_path("/de/pricing"), Locale::En);
        // A locale code later in the path does not change resolution
        assert_eq!(Locale::resolve_from_path("/blog/nl"), Locale::En);
    }

    #[test]
    fn test_strip_locale_prefix() {
        assert_eq!(strip_locale_prefix("/nl/pricing"), "/pricing");
        assert_eq!(strip_locale_prefix("/fr/blog/post-1"), "/blog/post-1");
        assert_eq!(strip_locale_prefix("/nl"), "/");
        assert_eq!(strip_locale_prefix("/nl/"), "/");
        // Already-agnostic paths are untouched (idempotence)
        assert_eq!(strip_locale_prefix("/pricing"), "/pricing");
        assert_eq!(strip_locale_prefix(strip_locale_prefix("/nl/pricing").as_str()), "/pricing");
        // Segment matching, never substring matching
        assert_eq!(strip_locale_prefix("/pricing/nl-menu"), "/pricing/nl-menu");
        assert_eq!(strip_locale_prefix("/blog/nl"), "/blog/nl");
        // The default locale never carries a prefix, so "/en/..." is not stripped
        assert_eq!(strip_locale_prefix("/en/pricing"), "/en/pricing");
    }

    #[test]
    fn test_set_get_locale() {
        set_locale(Locale::Nl);
        assert_eq!(get_locale(), Locale::Nl);

        set_locale(Locale::Fr);
        assert_eq!(get_locale(), Locale::Fr);
    }
}
