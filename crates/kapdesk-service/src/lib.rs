//! KAPDESK Service — ticket lifecycle operations, role-scoped
//! listing, projections, and directory management.
//!
//! Services are generic over the `kapdesk-core` repository traits so
//! this layer has no dependency on the database crate.

pub mod directory;
pub mod password;
pub mod ticket;
pub mod views;

pub use directory::{DirectoryService, OrganizationView, UserView};
pub use ticket::TicketService;
pub use views::{TicketDetailView, TicketListRow, TicketViews};
