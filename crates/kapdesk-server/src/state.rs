//! Application state: the services wired to their SurrealDB
//! repositories.

use std::sync::Arc;

use surrealdb::{Connection, Surreal};

use kapdesk_core::status::TransitionPolicy;
use kapdesk_db::repository::{
    SurrealDepartmentRepository, SurrealOrganizationRepository, SurrealTicketNumberAllocator,
    SurrealTicketRepository, SurrealTransferRequestRepository, SurrealUserRepository,
};
use kapdesk_service::{DirectoryService, TicketService, TicketViews};

pub type Tickets<C> = TicketService<
    SurrealTicketRepository<C>,
    SurrealUserRepository<C>,
    SurrealTicketNumberAllocator<C>,
    SurrealTransferRequestRepository<C>,
>;

pub type Views<C> = TicketViews<
    SurrealTicketRepository<C>,
    SurrealUserRepository<C>,
    SurrealOrganizationRepository<C>,
    SurrealDepartmentRepository<C>,
>;

pub type Directory<C> = DirectoryService<
    SurrealOrganizationRepository<C>,
    SurrealDepartmentRepository<C>,
    SurrealUserRepository<C>,
>;

pub struct AppState<C: Connection> {
    pub tickets: Arc<Tickets<C>>,
    pub views: Arc<Views<C>>,
    pub directory: Arc<Directory<C>>,
}

impl<C: Connection> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            tickets: Arc::clone(&self.tickets),
            views: Arc::clone(&self.views),
            directory: Arc::clone(&self.directory),
        }
    }
}

impl<C: Connection> AppState<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self::with_policy(db, TransitionPolicy::default())
    }

    pub fn with_policy(db: Surreal<C>, policy: TransitionPolicy) -> Self {
        let tickets = TicketService::with_policy(
            SurrealTicketRepository::new(db.clone()),
            SurrealUserRepository::new(db.clone()),
            SurrealTicketNumberAllocator::new(db.clone()),
            SurrealTransferRequestRepository::new(db.clone()),
            policy,
        );
        let views = TicketViews::new(
            SurrealTicketRepository::new(db.clone()),
            SurrealUserRepository::new(db.clone()),
            SurrealOrganizationRepository::new(db.clone()),
            SurrealDepartmentRepository::new(db.clone()),
        );
        let directory = DirectoryService::new(
            SurrealOrganizationRepository::new(db.clone()),
            SurrealDepartmentRepository::new(db.clone()),
            SurrealUserRepository::new(db),
        );

        Self {
            tickets: Arc::new(tickets),
            views: Arc::new(views),
            directory: Arc::new(directory),
        }
    }
}
