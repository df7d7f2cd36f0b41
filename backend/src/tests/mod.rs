pub mod common;

mod api_test;
mod content_service_test;
