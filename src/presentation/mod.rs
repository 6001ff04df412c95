// Presentation layer - Rendered dashboard state over HTTP
pub mod app_state;
pub mod dashboard_store;
pub mod handlers;
