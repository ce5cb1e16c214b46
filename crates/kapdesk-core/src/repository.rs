//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Ticket sub-collection appends
//! must be atomic single-document updates (the store's array-push),
//! never read-modify-write cycles.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::KapdeskResult;
use crate::models::{
    department::{CreateDepartment, Department},
    organization::{CreateOrganization, Organization},
    ticket::{Assignment, KapNote, NewTicket, OrgNote, PartySide, ProgressEntry, Ticket,
        TicketStatus},
    transfer::{Decision, NewTransferRequest, TransferRequest},
    user::{CreateUser, User},
};
use crate::scope::TicketScope;

/// Pagination parameters for directory list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

pub trait TicketRepository: Send + Sync {
    fn create(&self, input: NewTicket) -> impl Future<Output = KapdeskResult<Ticket>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = KapdeskResult<Ticket>> + Send;

    /// All tickets visible under the given scope, newest first.
    fn list(&self, scope: &TicketScope) -> impl Future<Output = KapdeskResult<Vec<Ticket>>> + Send;

    fn append_progress(
        &self,
        id: Uuid,
        entry: ProgressEntry,
    ) -> impl Future<Output = KapdeskResult<Ticket>> + Send;

    fn append_kap_note(
        &self,
        id: Uuid,
        note: KapNote,
    ) -> impl Future<Output = KapdeskResult<Ticket>> + Send;

    fn append_org_note(
        &self,
        id: Uuid,
        note: OrgNote,
    ) -> impl Future<Output = KapdeskResult<Ticket>> + Send;

    fn set_status(
        &self,
        id: Uuid,
        status: TicketStatus,
        end_date: Option<DateTime<Utc>>,
    ) -> impl Future<Output = KapdeskResult<Ticket>> + Send;

    /// Overwrite the assignment for one side wholesale.
    fn set_assignment(
        &self,
        id: Uuid,
        side: PartySide,
        assignment: Assignment,
    ) -> impl Future<Output = KapdeskResult<Ticket>> + Send;

    /// Hard delete. Fails with NotFound if the ticket is absent.
    fn delete(&self, id: Uuid) -> impl Future<Output = KapdeskResult<()>> + Send;
}

/// Allocates the per-day ticket-number sequence. Implementations must
/// be atomic under concurrent creation within the same day.
pub trait TicketNumberAllocator: Send + Sync {
    /// The next 1-based sequence for the given local calendar day.
    fn next_sequence(&self, day: NaiveDate) -> impl Future<Output = KapdeskResult<u32>> + Send;
}

// ---------------------------------------------------------------------------
// Transfer requests (separate collection, linked by ticket id)
// ---------------------------------------------------------------------------

pub trait TransferRequestRepository: Send + Sync {
    fn create(
        &self,
        input: NewTransferRequest,
    ) -> impl Future<Output = KapdeskResult<TransferRequest>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = KapdeskResult<TransferRequest>> + Send;

    fn list_by_ticket(
        &self,
        ticket_id: Uuid,
    ) -> impl Future<Output = KapdeskResult<Vec<TransferRequest>>> + Send;

    fn set_decision(
        &self,
        id: Uuid,
        approval: Decision,
        acceptance: Decision,
    ) -> impl Future<Output = KapdeskResult<TransferRequest>> + Send;
}

// ---------------------------------------------------------------------------
// Directory (organizations, departments, users)
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = KapdeskResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = KapdeskResult<Organization>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = KapdeskResult<Organization>> + Send;
    fn get_by_mobile(
        &self,
        mobile: &str,
    ) -> impl Future<Output = KapdeskResult<Organization>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = KapdeskResult<PaginatedResult<Organization>>> + Send;
}

pub trait DepartmentRepository: Send + Sync {
    fn create(
        &self,
        input: CreateDepartment,
    ) -> impl Future<Output = KapdeskResult<Department>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = KapdeskResult<Department>> + Send;
    fn get_by_name(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> impl Future<Output = KapdeskResult<Department>> + Send;
    fn list_by_organization(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = KapdeskResult<PaginatedResult<Department>>> + Send;
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = KapdeskResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = KapdeskResult<User>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = KapdeskResult<User>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = KapdeskResult<PaginatedResult<User>>> + Send;
}
