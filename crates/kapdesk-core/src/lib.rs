//! KAPDESK Core — domain models, repository traits, and the
//! role-scoped ticket visibility model.
//!
//! This crate has no I/O. Storage lives in `kapdesk-db`, the lifecycle
//! operations in `kapdesk-service`.

pub mod error;
pub mod models;
pub mod number;
pub mod repository;
pub mod scope;
pub mod status;

pub use error::{KapdeskError, KapdeskResult};
