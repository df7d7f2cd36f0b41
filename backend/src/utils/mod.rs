pub mod error;
pub mod i18n;

pub use error::{ApiError, ApiResult};
pub use i18n::{DEFAULT_LOCALE, Locale, SUPPORTED_LOCALES, get_locale, set_locale, strip_locale_prefix};
