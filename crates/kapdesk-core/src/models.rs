//! Domain models for KAPDESK.
//!
//! These are the core types shared across all crates. Field names use
//! camelCase on the wire and enums use SCREAMING_SNAKE_CASE, matching
//! the contract the existing frontend consumes.

pub mod department;
pub mod organization;
pub mod ticket;
pub mod transfer;
pub mod user;
