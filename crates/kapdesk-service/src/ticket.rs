//! Ticket lifecycle operations.

use chrono::{DateTime, Local, Utc};
use tracing::info;
use uuid::Uuid;

use kapdesk_core::error::{KapdeskError, KapdeskResult};
use kapdesk_core::models::ticket::{
    Assignment, AssignmentStatus, CreateTicket, KapNote, NewTicket, OrgNote, PartySide,
    ProgressEntry, Ticket, TicketStatus, TicketType,
};
use kapdesk_core::models::transfer::{Decision, NewTransferRequest, TransferRequest};
use kapdesk_core::models::user::UserRole;
use kapdesk_core::number::format_ticket_number;
use kapdesk_core::repository::{
    TicketNumberAllocator, TicketRepository, TransferRequestRepository, UserRepository,
};
use kapdesk_core::status::{TransitionPolicy, check_transition};

/// Ticket lifecycle service.
///
/// Generic over repository implementations so this layer has no
/// dependency on the database crate. Every operation returns the
/// affected ticket; callers that need a fresh list go through the
/// listing path.
pub struct TicketService<T, U, N, X> {
    tickets: T,
    users: U,
    numbers: N,
    transfers: X,
    policy: TransitionPolicy,
}

impl<T, U, N, X> TicketService<T, U, N, X>
where
    T: TicketRepository,
    U: UserRepository,
    N: TicketNumberAllocator,
    X: TransferRequestRepository,
{
    pub fn new(tickets: T, users: U, numbers: N, transfers: X) -> Self {
        Self {
            tickets,
            users,
            numbers,
            transfers,
            policy: TransitionPolicy::default(),
        }
    }

    pub fn with_policy(
        tickets: T,
        users: U,
        numbers: N,
        transfers: X,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            tickets,
            users,
            numbers,
            transfers,
            policy,
        }
    }

    /// Create a ticket: validate, allocate the day-scoped number,
    /// derive the start date, and persist with status CREATED.
    pub async fn create(&self, input: CreateTicket) -> KapdeskResult<Ticket> {
        // 1. Presence of the request text (the other required fields
        //    are enforced by the input type).
        if input.request.trim().is_empty() {
            return Err(KapdeskError::Validation {
                message: "request is required".into(),
            });
        }

        // 2. The scheduled-date rule, which also fixes the start date.
        let start_date = match (input.ticket_type, input.scheduled_date) {
            (TicketType::Scheduled, Some(date)) => date,
            (TicketType::Scheduled, None) => return Err(KapdeskError::ScheduledDateRequired),
            (TicketType::Instant, Some(_)) => {
                return Err(KapdeskError::Validation {
                    message: "instant tickets do not take a scheduled date".into(),
                });
            }
            (TicketType::Instant, None) => Utc::now(),
        };

        // 3. Allocate the next sequence for the local calendar day.
        let day = Local::now().date_naive();
        let sequence = self.numbers.next_sequence(day).await?;
        let ticket_number = format_ticket_number(day, sequence);

        // 4. Persist.
        let ticket = self
            .tickets
            .create(NewTicket {
                ticket_number,
                request: input.request,
                description: input.description,
                ticket_type: input.ticket_type,
                scheduled_date: input.scheduled_date,
                priority: input.priority,
                status: TicketStatus::Created,
                requestor: input.requestor,
                operator: input.operator,
                created_by: input.created_by,
                start_date,
            })
            .await?;

        info!(ticket_number = %ticket.ticket_number, "Ticket created");
        Ok(ticket)
    }

    pub async fn get(&self, id: Uuid) -> KapdeskResult<Ticket> {
        self.tickets.get_by_id(id).await
    }

    /// Append a note. The author's role decides the destination: KAP
    /// employees write to the KAP notes (targeted at one side's
    /// organization), everyone else writes to the organization notes.
    /// The caller cannot choose the destination.
    pub async fn add_note(
        &self,
        ticket_id: Uuid,
        text: String,
        added_by: Uuid,
        target: Option<PartySide>,
    ) -> KapdeskResult<Ticket> {
        if text.trim().is_empty() {
            return Err(KapdeskError::Validation {
                message: "note text is required".into(),
            });
        }

        // 1. Load the ticket and the authoring user.
        let ticket = self.tickets.get_by_id(ticket_id).await?;
        let user = match self.users.get_by_id(added_by).await {
            Ok(user) => user,
            Err(KapdeskError::NotFound { .. }) => {
                return Err(KapdeskError::UserNotFound {
                    id: added_by.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        // 2. Route by role.
        if user.role == UserRole::KapEmployee {
            let side = target.ok_or_else(|| KapdeskError::Validation {
                message: "note target (requestor or operator) is required".into(),
            })?;
            let note = KapNote {
                text,
                added_by,
                target_organization_id: ticket.organization_for(side),
                created_at: Utc::now(),
            };
            self.tickets.append_kap_note(ticket_id, note).await
        } else {
            let note = OrgNote {
                text,
                added_by,
                created_at: Utc::now(),
            };
            self.tickets.append_org_note(ticket_id, note).await
        }
    }

    /// Append a progress entry. Employee-submitted percentages must be
    /// between 20 and 100.
    pub async fn update_progress(
        &self,
        ticket_id: Uuid,
        percentage: u8,
        observation: String,
        added_by: Uuid,
    ) -> KapdeskResult<Ticket> {
        if !(20..=100).contains(&percentage) {
            return Err(KapdeskError::Validation {
                message: "percentage must be between 20 and 100".into(),
            });
        }

        let entry = ProgressEntry {
            percentage,
            observation,
            updated_by: added_by,
            updated_at: Utc::now(),
        };
        self.tickets.append_progress(ticket_id, entry).await
    }

    /// Set the ticket status, routed through the transition policy.
    /// The end date is caller-set when the lifecycle reaches a
    /// terminal state; it is never derived here.
    pub async fn update_status(
        &self,
        ticket_id: Uuid,
        new_status: TicketStatus,
        end_date: Option<DateTime<Utc>>,
    ) -> KapdeskResult<Ticket> {
        let ticket = self.tickets.get_by_id(ticket_id).await?;
        check_transition(self.policy, ticket.status, new_status)?;

        let updated = self.tickets.set_status(ticket_id, new_status, end_date).await?;
        info!(
            ticket_number = %updated.ticket_number,
            status = new_status.as_str(),
            "Ticket status updated"
        );
        Ok(updated)
    }

    /// Overwrite one side's assignment wholesale.
    pub async fn assign(
        &self,
        ticket_id: Uuid,
        side: PartySide,
        user_id: Uuid,
        status: AssignmentStatus,
    ) -> KapdeskResult<Ticket> {
        let assignment = Assignment {
            user_id,
            status,
            assigned_at: Utc::now(),
        };
        self.tickets.set_assignment(ticket_id, side, assignment).await
    }

    /// Open a transfer request and force the ticket into the
    /// TRANSFER_REQUESTED side-state.
    pub async fn open_transfer(&self, input: NewTransferRequest) -> KapdeskResult<Ticket> {
        let ticket = self.tickets.get_by_id(input.ticket_id).await?;
        check_transition(self.policy, ticket.status, TicketStatus::TransferRequested)?;

        let request = self.transfers.create(input).await?;
        info!(
            ticket_number = %ticket.ticket_number,
            request_id = %request.id,
            "Transfer request opened"
        );

        self.tickets
            .set_status(ticket.id, TicketStatus::TransferRequested, None)
            .await
    }

    /// Record the decision on a transfer request and move the ticket
    /// back into normal flow.
    pub async fn resolve_transfer(
        &self,
        request_id: Uuid,
        approval: Decision,
        acceptance: Decision,
        return_status: TicketStatus,
    ) -> KapdeskResult<Ticket> {
        let request = self.transfers.get_by_id(request_id).await?;
        let ticket = self.tickets.get_by_id(request.ticket_id).await?;
        check_transition(self.policy, ticket.status, return_status)?;

        self.transfers
            .set_decision(request_id, approval, acceptance)
            .await?;
        self.tickets
            .set_status(request.ticket_id, return_status, None)
            .await
    }

    /// All transfer requests opened against a ticket, newest first.
    pub async fn transfers_for(&self, ticket_id: Uuid) -> KapdeskResult<Vec<TransferRequest>> {
        self.transfers.list_by_ticket(ticket_id).await
    }

    /// Hard delete. Fails with NotFound if the ticket is absent.
    pub async fn delete(&self, ticket_id: Uuid) -> KapdeskResult<()> {
        self.tickets.delete(ticket_id).await?;
        info!(ticket_id = %ticket_id, "Ticket deleted");
        Ok(())
    }
}
