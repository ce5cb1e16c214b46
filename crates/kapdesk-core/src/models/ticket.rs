//! Ticket domain model.
//!
//! A ticket is the unit of work flowing from a requestor (government)
//! organization to an operator (company) organization, mediated by the
//! central authority (KAP). Progress entries, notes, and assignments
//! are embedded sub-collections of the ticket document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::KapdeskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketType {
    Instant,
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Created,
    Accepted,
    InProgress,
    Completed,
    Closed,
    TransferRequested,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Created => "CREATED",
            TicketStatus::Accepted => "ACCEPTED",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::Completed => "COMPLETED",
            TicketStatus::Closed => "CLOSED",
            TicketStatus::TransferRequested => "TRANSFER_REQUESTED",
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = KapdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(TicketStatus::Created),
            "ACCEPTED" => Ok(TicketStatus::Accepted),
            "IN_PROGRESS" => Ok(TicketStatus::InProgress),
            "COMPLETED" => Ok(TicketStatus::Completed),
            "CLOSED" => Ok(TicketStatus::Closed),
            "TRANSFER_REQUESTED" => Ok(TicketStatus::TransferRequested),
            other => Err(KapdeskError::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// One side of a ticket: which organization/department occupies the
/// requestor or operator position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub organization_id: Uuid,
    pub department_id: Uuid,
}

/// Names the requestor or operator side of a ticket. Serialized as the
/// literal strings `requestor`/`operator` the frontend sends for note
/// targeting and assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartySide {
    Requestor,
    Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::str::FromStr for AssignmentStatus {
    type Err = KapdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(AssignmentStatus::Pending),
            "ACCEPTED" => Ok(AssignmentStatus::Accepted),
            "REJECTED" => Ok(AssignmentStatus::Rejected),
            other => Err(KapdeskError::InvalidStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// An assignment of a ticket side to an individual user. Overwritten
/// wholesale on reassignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub user_id: Uuid,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignments {
    pub requestor: Option<Assignment>,
    pub operator: Option<Assignment>,
}

/// Append-only progress entry. The service boundary enforces 20–100
/// for employee-submitted percentages; the stored range is 0–100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub percentage: u8,
    pub observation: String,
    pub updated_by: Uuid,
    pub updated_at: DateTime<Utc>,
}

/// A note written by a KAP employee, directed at one side's
/// organization. The target is resolved from the side name to the
/// organization reference at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KapNote {
    pub text: String,
    pub added_by: Uuid,
    pub target_organization_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A note written by an organization-affiliated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgNote {
    pub text: String,
    pub added_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    /// Human-readable identifier, `YYMMDD-NNNN`. Unique, immutable.
    pub ticket_number: String,
    pub request: String,
    pub description: Option<String>,
    pub ticket_type: TicketType,
    pub priority: Priority,
    pub status: TicketStatus,
    pub requestor: Party,
    pub operator: Party,
    pub created_by: Uuid,
    pub assignments: Assignments,
    pub progress: Vec<ProgressEntry>,
    pub kap_notes: Vec<KapNote>,
    pub org_notes: Vec<OrgNote>,
    /// Creation time for INSTANT tickets, the scheduled date otherwise.
    pub start_date: DateTime<Utc>,
    pub scheduled_date: Option<DateTime<Utc>>,
    /// Set by the caller when the lifecycle reaches a terminal state.
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// The organization occupying the given side.
    pub fn organization_for(&self, side: PartySide) -> Uuid {
        match side {
            PartySide::Requestor => self.requestor.organization_id,
            PartySide::Operator => self.operator.organization_id,
        }
    }
}

/// Caller-facing creation input. Presence of required fields is
/// enforced by the type; the scheduled-date rule is checked by the
/// service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicket {
    pub request: String,
    pub description: Option<String>,
    pub ticket_type: TicketType,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub requestor: Party,
    pub operator: Party,
    pub created_by: Uuid,
}

/// Fully-populated record handed to the store once the service has
/// allocated the ticket number and derived the start date.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub ticket_number: String,
    pub request: String,
    pub description: Option<String>,
    pub ticket_type: TicketType,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub status: TicketStatus,
    pub requestor: Party,
    pub operator: Party,
    pub created_by: Uuid,
    pub start_date: DateTime<Utc>,
}
