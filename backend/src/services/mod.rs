pub mod admin_service;
pub mod auth_gateway;
pub mod content_service;
pub mod rate_limit_service;
pub mod subscriber_service;

pub use admin_service::AdminService;
pub use auth_gateway::{AuthGateway, HttpAuthGateway};
pub use content_service::ContentService;
pub use rate_limit_service::{
    CounterStore, InMemoryCounterStore, RateLimitDecision, RateLimitService,
};
pub use subscriber_service::SubscriberService;
