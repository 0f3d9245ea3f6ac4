// Library entry point for tests and the binary

pub mod api_docs;
pub mod app;
pub mod config;
pub mod handlers;
pub mod provider_manager;
pub mod routes;
pub mod simple_logger;

// Re-export commonly used types
pub use app::AppState;
