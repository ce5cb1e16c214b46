//! Transfer request domain model.
//!
//! A transfer request proposes moving a ticket to a different
//! department or assigned employee. Requests live in their own
//! collection, linked to the ticket by id, so approval and acceptance
//! can be tracked independently of the ticket document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferKind {
    Department,
    Employee,
}

/// What the ticket should be transferred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferTarget {
    Department(Uuid),
    Employee(Uuid),
}

/// Decision state for the two-party sign-off: approval by the owning
/// side, acceptance by the receiving side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub kind: TransferKind,
    pub requested_by: Uuid,
    pub organization_id: Uuid,
    pub current_department_id: Uuid,
    pub reason: String,
    pub target: TransferTarget,
    pub approval: Decision,
    pub acceptance: Decision,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to open a transfer request. Both decisions start
/// out pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransferRequest {
    pub ticket_id: Uuid,
    pub kind: TransferKind,
    pub requested_by: Uuid,
    pub organization_id: Uuid,
    pub current_department_id: Uuid,
    pub reason: String,
    pub target: TransferTarget,
}
