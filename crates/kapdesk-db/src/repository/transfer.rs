//! SurrealDB implementation of [`TransferRequestRepository`].

use chrono::{DateTime, Utc};
use kapdesk_core::error::KapdeskResult;
use kapdesk_core::models::transfer::{
    Decision, NewTransferRequest, TransferKind, TransferRequest, TransferTarget,
};
use kapdesk_core::repository::TransferRequestRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct TargetRow {
    kind: String,
    id: String,
}

/// DB-side row struct. Every query projects
/// `meta::id(id) AS record_id` alongside `*`.
#[derive(Debug, SurrealValue)]
struct TransferRequestRow {
    record_id: String,
    ticket_id: String,
    kind: String,
    requested_by: String,
    organization_id: String,
    current_department_id: String,
    reason: String,
    target: TargetRow,
    approval: String,
    acceptance: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const TRANSFER_PROJECTION: &str = "meta::id(id) AS record_id, *";
const TRANSFER_REFETCH: &str =
    "SELECT meta::id(id) AS record_id, * FROM type::record('transfer_request', $id)";

fn parse_kind(s: &str) -> Result<TransferKind, DbError> {
    match s {
        "DEPARTMENT" => Ok(TransferKind::Department),
        "EMPLOYEE" => Ok(TransferKind::Employee),
        other => Err(DbError::Corrupt(format!("unknown transfer kind: {other}"))),
    }
}

fn kind_to_str(k: TransferKind) -> &'static str {
    match k {
        TransferKind::Department => "DEPARTMENT",
        TransferKind::Employee => "EMPLOYEE",
    }
}

fn parse_decision(s: &str) -> Result<Decision, DbError> {
    match s {
        "PENDING" => Ok(Decision::Pending),
        "APPROVED" => Ok(Decision::Approved),
        "REJECTED" => Ok(Decision::Rejected),
        other => Err(DbError::Corrupt(format!("unknown decision: {other}"))),
    }
}

fn decision_to_str(d: Decision) -> &'static str {
    match d {
        Decision::Pending => "PENDING",
        Decision::Approved => "APPROVED",
        Decision::Rejected => "REJECTED",
    }
}

impl TargetRow {
    fn from_target(target: TransferTarget) -> Self {
        match target {
            TransferTarget::Department(id) => Self {
                kind: "DEPARTMENT".into(),
                id: id.to_string(),
            },
            TransferTarget::Employee(id) => Self {
                kind: "EMPLOYEE".into(),
                id: id.to_string(),
            },
        }
    }

    fn try_into_target(self) -> Result<TransferTarget, DbError> {
        let id = parse_uuid(&self.id, "transfer target")?;
        match self.kind.as_str() {
            "DEPARTMENT" => Ok(TransferTarget::Department(id)),
            "EMPLOYEE" => Ok(TransferTarget::Employee(id)),
            other => Err(DbError::Corrupt(format!(
                "unknown transfer target kind: {other}"
            ))),
        }
    }
}

impl TransferRequestRow {
    fn try_into_request(self) -> Result<TransferRequest, DbError> {
        Ok(TransferRequest {
            id: parse_uuid(&self.record_id, "transfer request")?,
            ticket_id: parse_uuid(&self.ticket_id, "ticket")?,
            kind: parse_kind(&self.kind)?,
            requested_by: parse_uuid(&self.requested_by, "requester")?,
            organization_id: parse_uuid(&self.organization_id, "organization")?,
            current_department_id: parse_uuid(&self.current_department_id, "department")?,
            reason: self.reason,
            target: self.target.try_into_target()?,
            approval: parse_decision(&self.approval)?,
            acceptance: parse_decision(&self.acceptance)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the transfer-request repository.
#[derive(Clone)]
pub struct SurrealTransferRequestRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTransferRequestRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TransferRequestRepository for SurrealTransferRequestRepository<C> {
    async fn create(&self, input: NewTransferRequest) -> KapdeskResult<TransferRequest> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(format!(
                "CREATE type::record('transfer_request', $id) SET \
                 ticket_id = $ticket_id, kind = $kind, \
                 requested_by = $requested_by, \
                 organization_id = $organization_id, \
                 current_department_id = $current_department_id, \
                 reason = $reason, target = $target, \
                 approval = 'PENDING', acceptance = 'PENDING' \
                 RETURN NONE; \
                 {TRANSFER_REFETCH}"
            ))
            .bind(("id", id_str.clone()))
            .bind(("ticket_id", input.ticket_id.to_string()))
            .bind(("kind", kind_to_str(input.kind)))
            .bind(("requested_by", input.requested_by.to_string()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind((
                "current_department_id",
                input.current_department_id.to_string(),
            ))
            .bind(("reason", input.reason))
            .bind(("target", TargetRow::from_target(input.target)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;
        let rows: Vec<TransferRequestRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "transfer_request".into(),
            id: id_str,
        })?;

        Ok(row.try_into_request()?)
    }

    async fn get_by_id(&self, id: Uuid) -> KapdeskResult<TransferRequest> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {TRANSFER_PROJECTION} \
                 FROM type::record('transfer_request', $id)"
            ))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TransferRequestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "transfer_request".into(),
            id: id_str,
        })?;

        Ok(row.try_into_request()?)
    }

    async fn list_by_ticket(&self, ticket_id: Uuid) -> KapdeskResult<Vec<TransferRequest>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {TRANSFER_PROJECTION} FROM transfer_request \
                 WHERE ticket_id = $ticket_id \
                 ORDER BY created_at DESC"
            ))
            .bind(("ticket_id", ticket_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TransferRequestRow> = result.take(0).map_err(DbError::from)?;

        let requests = rows
            .into_iter()
            .map(TransferRequestRow::try_into_request)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(requests)
    }

    async fn set_decision(
        &self,
        id: Uuid,
        approval: Decision,
        acceptance: Decision,
    ) -> KapdeskResult<TransferRequest> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(format!(
                "UPDATE type::record('transfer_request', $id) SET \
                 approval = $approval, acceptance = $acceptance, \
                 updated_at = time::now() \
                 RETURN NONE; \
                 {TRANSFER_REFETCH}"
            ))
            .bind(("id", id_str.clone()))
            .bind(("approval", decision_to_str(approval)))
            .bind(("acceptance", decision_to_str(acceptance)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;
        let rows: Vec<TransferRequestRow> = result.take(1).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "transfer_request".into(),
            id: id_str,
        })?;

        Ok(row.try_into_request()?)
    }
}
