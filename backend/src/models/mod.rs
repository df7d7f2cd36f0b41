pub mod auth;
pub mod content;
pub mod subscriber;

pub use auth::{
    CookieOptions, CurrentPrincipal, Principal, RequestCookie, SessionCookie, SessionResolution,
};
pub use content::{
    CreatePostRequest, LocalizedPost, Post, PostKind, PostTranslation, PostWithTranslations,
    PutSiteContentRequest, SiteContentEntry, TranslationPayload, UpdatePostRequest,
    UpsertTranslationRequest,
};
pub use subscriber::{
    CheckSubscriptionRequest, SubscribeRequest, SubscribeResponse, Subscriber,
    SubscriptionStatusResponse,
};
