pub mod locale;
pub mod session;

pub use locale::{
    PREFERRED_LANGUAGE_COOKIE, RESOLVED_LOCALE_COOKIE, RequestLocale, RoutePath, is_static_asset,
    locale_middleware,
};
pub use session::{ADMIN_LOGIN_PATH, ADMIN_PREFIX, SessionState, session_middleware};
