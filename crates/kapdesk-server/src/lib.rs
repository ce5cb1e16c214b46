//! KAPDESK Server — HTTP surface over the ticket core.
//!
//! Exposed as a library so integration tests can build the router
//! against an in-memory database.

pub mod api;
pub mod config;
pub mod state;

pub use config::ServerConfig;
pub use state::AppState;
