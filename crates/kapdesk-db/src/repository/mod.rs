//! SurrealDB repository implementations.

mod counter;
mod department;
mod organization;
mod ticket;
mod transfer;
mod user;

pub use counter::SurrealTicketNumberAllocator;
pub use department::SurrealDepartmentRepository;
pub use organization::SurrealOrganizationRepository;
pub use ticket::SurrealTicketRepository;
pub use transfer::SurrealTransferRequestRepository;
pub use user::SurrealUserRepository;

use uuid::Uuid;

use crate::error::DbError;

/// Parse a stored UUID string, labelling the field on failure.
pub(crate) fn parse_uuid(value: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Corrupt(format!("invalid {what} UUID: {e}")))
}

/// Parse an optional stored UUID string.
pub(crate) fn parse_opt_uuid(value: Option<&str>, what: &str) -> Result<Option<Uuid>, DbError> {
    value.map(|v| parse_uuid(v, what)).transpose()
}
