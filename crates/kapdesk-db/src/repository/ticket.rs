//! SurrealDB implementation of [`TicketRepository`].
//!
//! Tickets are single documents with embedded sub-collections
//! (progress, notes, assignments). Every append is a single-statement
//! `UPDATE … SET field += $entry`, so concurrent appends to the same
//! ticket cannot overwrite one another.

use chrono::{DateTime, Utc};
use kapdesk_core::error::KapdeskResult;
use kapdesk_core::models::ticket::{
    Assignment, AssignmentStatus, Assignments, KapNote, NewTicket, OrgNote, Party, PartySide,
    Priority, ProgressEntry, Ticket, TicketStatus, TicketType,
};
use kapdesk_core::repository::TicketRepository;
use kapdesk_core::scope::TicketScope;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct PartyRow {
    organization_id: String,
    department_id: String,
}

#[derive(Debug, SurrealValue)]
struct AssignmentRow {
    user_id: String,
    status: String,
    assigned_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AssignmentsRow {
    requestor: Option<AssignmentRow>,
    operator: Option<AssignmentRow>,
}

#[derive(Debug, SurrealValue)]
struct ProgressRow {
    percentage: u32,
    observation: String,
    updated_by: String,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct KapNoteRow {
    text: String,
    added_by: String,
    target_organization_id: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct OrgNoteRow {
    text: String,
    added_by: String,
    created_at: DateTime<Utc>,
}

/// DB-side row struct. Every ticket query projects
/// `meta::id(id) AS record_id` alongside `*`.
#[derive(Debug, SurrealValue)]
struct TicketRow {
    record_id: String,
    ticket_number: String,
    request: String,
    description: Option<String>,
    ticket_type: String,
    priority: String,
    status: String,
    requestor: PartyRow,
    operator: PartyRow,
    created_by: String,
    assignments: AssignmentsRow,
    progress: Vec<ProgressRow>,
    kap_notes: Vec<KapNoteRow>,
    org_notes: Vec<OrgNoteRow>,
    start_date: DateTime<Utc>,
    scheduled_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Row struct for id-only projections (delete existence check).
#[derive(Debug, SurrealValue)]
struct IdRow {
    #[allow(dead_code)]
    record_id: String,
}

const TICKET_PROJECTION: &str = "meta::id(id) AS record_id, *";
const TICKET_REFETCH: &str = "SELECT meta::id(id) AS record_id, * FROM type::record('ticket', $id)";

fn parse_ticket_type(s: &str) -> Result<TicketType, DbError> {
    match s {
        "INSTANT" => Ok(TicketType::Instant),
        "SCHEDULED" => Ok(TicketType::Scheduled),
        other => Err(DbError::Corrupt(format!("unknown ticket type: {other}"))),
    }
}

fn ticket_type_to_str(t: TicketType) -> &'static str {
    match t {
        TicketType::Instant => "INSTANT",
        TicketType::Scheduled => "SCHEDULED",
    }
}

fn parse_priority(s: &str) -> Result<Priority, DbError> {
    match s {
        "LOW" => Ok(Priority::Low),
        "MEDIUM" => Ok(Priority::Medium),
        "HIGH" => Ok(Priority::High),
        other => Err(DbError::Corrupt(format!("unknown priority: {other}"))),
    }
}

fn priority_to_str(p: Priority) -> &'static str {
    match p {
        Priority::Low => "LOW",
        Priority::Medium => "MEDIUM",
        Priority::High => "HIGH",
    }
}

fn parse_status(s: &str) -> Result<TicketStatus, DbError> {
    match s {
        "CREATED" => Ok(TicketStatus::Created),
        "ACCEPTED" => Ok(TicketStatus::Accepted),
        "IN_PROGRESS" => Ok(TicketStatus::InProgress),
        "COMPLETED" => Ok(TicketStatus::Completed),
        "CLOSED" => Ok(TicketStatus::Closed),
        "TRANSFER_REQUESTED" => Ok(TicketStatus::TransferRequested),
        other => Err(DbError::Corrupt(format!("unknown ticket status: {other}"))),
    }
}

fn parse_assignment_status(s: &str) -> Result<AssignmentStatus, DbError> {
    match s {
        "PENDING" => Ok(AssignmentStatus::Pending),
        "ACCEPTED" => Ok(AssignmentStatus::Accepted),
        "REJECTED" => Ok(AssignmentStatus::Rejected),
        other => Err(DbError::Corrupt(format!(
            "unknown assignment status: {other}"
        ))),
    }
}

fn assignment_status_to_str(s: AssignmentStatus) -> &'static str {
    match s {
        AssignmentStatus::Pending => "PENDING",
        AssignmentStatus::Accepted => "ACCEPTED",
        AssignmentStatus::Rejected => "REJECTED",
    }
}

impl PartyRow {
    fn from_party(party: Party) -> Self {
        Self {
            organization_id: party.organization_id.to_string(),
            department_id: party.department_id.to_string(),
        }
    }

    fn try_into_party(self) -> Result<Party, DbError> {
        Ok(Party {
            organization_id: parse_uuid(&self.organization_id, "organization")?,
            department_id: parse_uuid(&self.department_id, "department")?,
        })
    }
}

impl AssignmentRow {
    fn from_assignment(a: Assignment) -> Self {
        Self {
            user_id: a.user_id.to_string(),
            status: assignment_status_to_str(a.status).to_string(),
            assigned_at: a.assigned_at,
        }
    }

    fn try_into_assignment(self) -> Result<Assignment, DbError> {
        Ok(Assignment {
            user_id: parse_uuid(&self.user_id, "assignee")?,
            status: parse_assignment_status(&self.status)?,
            assigned_at: self.assigned_at,
        })
    }
}

impl ProgressRow {
    fn from_entry(e: ProgressEntry) -> Self {
        Self {
            percentage: u32::from(e.percentage),
            observation: e.observation,
            updated_by: e.updated_by.to_string(),
            updated_at: e.updated_at,
        }
    }

    fn try_into_entry(self) -> Result<ProgressEntry, DbError> {
        let percentage = u8::try_from(self.percentage)
            .map_err(|_| DbError::Corrupt(format!("percentage out of range: {}", self.percentage)))?;
        Ok(ProgressEntry {
            percentage,
            observation: self.observation,
            updated_by: parse_uuid(&self.updated_by, "progress author")?,
            updated_at: self.updated_at,
        })
    }
}

impl KapNoteRow {
    fn from_note(n: KapNote) -> Self {
        Self {
            text: n.text,
            added_by: n.added_by.to_string(),
            target_organization_id: n.target_organization_id.to_string(),
            created_at: n.created_at,
        }
    }

    fn try_into_note(self) -> Result<KapNote, DbError> {
        Ok(KapNote {
            text: self.text,
            added_by: parse_uuid(&self.added_by, "note author")?,
            target_organization_id: parse_uuid(&self.target_organization_id, "target org")?,
            created_at: self.created_at,
        })
    }
}

impl OrgNoteRow {
    fn from_note(n: OrgNote) -> Self {
        Self {
            text: n.text,
            added_by: n.added_by.to_string(),
            created_at: n.created_at,
        }
    }

    fn try_into_note(self) -> Result<OrgNote, DbError> {
        Ok(OrgNote {
            text: self.text,
            added_by: parse_uuid(&self.added_by, "note author")?,
            created_at: self.created_at,
        })
    }
}

impl TicketRow {
    fn try_into_ticket(self) -> Result<Ticket, DbError> {
        let id = parse_uuid(&self.record_id, "ticket")?;
        Ok(Ticket {
            id,
            ticket_number: self.ticket_number,
            request: self.request,
            description: self.description,
            ticket_type: parse_ticket_type(&self.ticket_type)?,
            priority: parse_priority(&self.priority)?,
            status: parse_status(&self.status)?,
            requestor: self.requestor.try_into_party()?,
            operator: self.operator.try_into_party()?,
            created_by: parse_uuid(&self.created_by, "creator")?,
            assignments: Assignments {
                requestor: self
                    .assignments
                    .requestor
                    .map(AssignmentRow::try_into_assignment)
                    .transpose()?,
                operator: self
                    .assignments
                    .operator
                    .map(AssignmentRow::try_into_assignment)
                    .transpose()?,
            },
            progress: self
                .progress
                .into_iter()
                .map(ProgressRow::try_into_entry)
                .collect::<Result<Vec<_>, _>>()?,
            kap_notes: self
                .kap_notes
                .into_iter()
                .map(KapNoteRow::try_into_note)
                .collect::<Result<Vec<_>, _>>()?,
            org_notes: self
                .org_notes
                .into_iter()
                .map(OrgNoteRow::try_into_note)
                .collect::<Result<Vec<_>, _>>()?,
            start_date: self.start_date,
            scheduled_date: self.scheduled_date,
            end_date: self.end_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Translate a visibility scope into a WHERE clause and its binds.
fn scope_filter(scope: &TicketScope) -> (String, Vec<(&'static str, String)>) {
    let mut conditions: Vec<&'static str> = Vec::new();
    let mut binds: Vec<(&'static str, String)> = Vec::new();

    match scope {
        TicketScope::CreatedBy { user_id } => {
            conditions.push("created_by = $user_id");
            binds.push(("user_id", user_id.to_string()));
        }
        TicketScope::GovEmployee {
            user_id,
            department_id,
        } => {
            binds.push(("user_id", user_id.to_string()));
            match department_id {
                Some(dept) => {
                    conditions.push(
                        "(assignments.operator.user_id = $user_id \
                         OR requestor.department_id = $department_id)",
                    );
                    binds.push(("department_id", dept.to_string()));
                }
                None => conditions.push("assignments.operator.user_id = $user_id"),
            }
        }
        TicketScope::OpEmployee {
            user_id,
            department_id,
        } => {
            binds.push(("user_id", user_id.to_string()));
            match department_id {
                Some(dept) => {
                    conditions.push(
                        "(assignments.requestor.user_id = $user_id \
                         OR operator.department_id = $department_id)",
                    );
                    binds.push(("department_id", dept.to_string()));
                }
                None => conditions.push("assignments.requestor.user_id = $user_id"),
            }
        }
        TicketScope::GovManager {
            organization_id,
            department_id,
        } => {
            if let Some(org) = organization_id {
                conditions.push("requestor.organization_id = $organization_id");
                binds.push(("organization_id", org.to_string()));
            }
            if let Some(dept) = department_id {
                conditions.push("requestor.department_id = $department_id");
                binds.push(("department_id", dept.to_string()));
            }
        }
        TicketScope::OpManager {
            organization_id,
            department_id,
        } => {
            if let Some(org) = organization_id {
                conditions.push("operator.organization_id = $organization_id");
                binds.push(("organization_id", org.to_string()));
            }
            if let Some(dept) = department_id {
                conditions.push("operator.department_id = $department_id");
                binds.push(("department_id", dept.to_string()));
            }
        }
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {} ", conditions.join(" AND "))
    };
    (clause, binds)
}

/// SurrealDB implementation of the Ticket repository.
#[derive(Clone)]
pub struct SurrealTicketRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTicketRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Extract the re-fetched ticket from statement 1 of a
    /// mutate-then-select query, mapping an empty result set to
    /// NotFound.
    fn take_refetched(result: surrealdb::Response, id_str: String) -> Result<Ticket, DbError> {
        let mut result = result.check().map_err(DbError::from)?;
        let rows: Vec<TicketRow> = result.take(1)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ticket".into(),
            id: id_str,
        })?;
        row.try_into_ticket()
    }
}

impl<C: Connection> TicketRepository for SurrealTicketRepository<C> {
    async fn create(&self, input: NewTicket) -> KapdeskResult<Ticket> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(format!(
                "CREATE type::record('ticket', $id) SET \
                 ticket_number = $ticket_number, request = $request, \
                 description = $description, \
                 ticket_type = $ticket_type, priority = $priority, \
                 status = $status, requestor = $requestor, \
                 operator = $operator, created_by = $created_by, \
                 assignments = {{}}, progress = [], \
                 kap_notes = [], org_notes = [], \
                 start_date = $start_date, \
                 scheduled_date = $scheduled_date, end_date = NONE \
                 RETURN NONE; \
                 {TICKET_REFETCH}"
            ))
            .bind(("id", id_str.clone()))
            .bind(("ticket_number", input.ticket_number))
            .bind(("request", input.request))
            .bind(("description", input.description))
            .bind(("ticket_type", ticket_type_to_str(input.ticket_type)))
            .bind(("priority", priority_to_str(input.priority)))
            .bind(("status", input.status.as_str()))
            .bind(("requestor", PartyRow::from_party(input.requestor)))
            .bind(("operator", PartyRow::from_party(input.operator)))
            .bind(("created_by", input.created_by.to_string()))
            .bind(("start_date", input.start_date))
            .bind(("scheduled_date", input.scheduled_date))
            .await
            .map_err(DbError::from)?;

        Ok(Self::take_refetched(result, id_str)?)
    }

    async fn get_by_id(&self, id: Uuid) -> KapdeskResult<Ticket> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {TICKET_PROJECTION} FROM type::record('ticket', $id)"
            ))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TicketRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ticket".into(),
            id: id_str,
        })?;

        Ok(row.try_into_ticket()?)
    }

    async fn list(&self, scope: &TicketScope) -> KapdeskResult<Vec<Ticket>> {
        let (clause, binds) = scope_filter(scope);
        let query = format!(
            "SELECT {TICKET_PROJECTION} FROM ticket {clause}ORDER BY created_at DESC"
        );

        let mut builder = self.db.query(&query);
        for (key, value) in binds {
            builder = builder.bind((key, value));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<TicketRow> = result.take(0).map_err(DbError::from)?;

        let tickets = rows
            .into_iter()
            .map(TicketRow::try_into_ticket)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(tickets)
    }

    async fn append_progress(&self, id: Uuid, entry: ProgressEntry) -> KapdeskResult<Ticket> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(format!(
                "UPDATE type::record('ticket', $id) SET \
                 progress += $entry, updated_at = time::now() \
                 RETURN NONE; \
                 {TICKET_REFETCH}"
            ))
            .bind(("id", id_str.clone()))
            .bind(("entry", ProgressRow::from_entry(entry)))
            .await
            .map_err(DbError::from)?;

        Ok(Self::take_refetched(result, id_str)?)
    }

    async fn append_kap_note(&self, id: Uuid, note: KapNote) -> KapdeskResult<Ticket> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(format!(
                "UPDATE type::record('ticket', $id) SET \
                 kap_notes += $note, updated_at = time::now() \
                 RETURN NONE; \
                 {TICKET_REFETCH}"
            ))
            .bind(("id", id_str.clone()))
            .bind(("note", KapNoteRow::from_note(note)))
            .await
            .map_err(DbError::from)?;

        Ok(Self::take_refetched(result, id_str)?)
    }

    async fn append_org_note(&self, id: Uuid, note: OrgNote) -> KapdeskResult<Ticket> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(format!(
                "UPDATE type::record('ticket', $id) SET \
                 org_notes += $note, updated_at = time::now() \
                 RETURN NONE; \
                 {TICKET_REFETCH}"
            ))
            .bind(("id", id_str.clone()))
            .bind(("note", OrgNoteRow::from_note(note)))
            .await
            .map_err(DbError::from)?;

        Ok(Self::take_refetched(result, id_str)?)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: TicketStatus,
        end_date: Option<DateTime<Utc>>,
    ) -> KapdeskResult<Ticket> {
        let id_str = id.to_string();

        let query = if end_date.is_some() {
            format!(
                "UPDATE type::record('ticket', $id) SET \
                 status = $status, end_date = $end_date, \
                 updated_at = time::now() \
                 RETURN NONE; \
                 {TICKET_REFETCH}"
            )
        } else {
            format!(
                "UPDATE type::record('ticket', $id) SET \
                 status = $status, updated_at = time::now() \
                 RETURN NONE; \
                 {TICKET_REFETCH}"
            )
        };

        let mut builder = self
            .db
            .query(query)
            .bind(("id", id_str.clone()))
            .bind(("status", status.as_str()));
        if let Some(date) = end_date {
            builder = builder.bind(("end_date", date));
        }

        let result = builder.await.map_err(DbError::from)?;

        Ok(Self::take_refetched(result, id_str)?)
    }

    async fn set_assignment(
        &self,
        id: Uuid,
        side: PartySide,
        assignment: Assignment,
    ) -> KapdeskResult<Ticket> {
        let id_str = id.to_string();

        let field = match side {
            PartySide::Requestor => "assignments.requestor",
            PartySide::Operator => "assignments.operator",
        };

        let result = self
            .db
            .query(format!(
                "UPDATE type::record('ticket', $id) SET \
                 {field} = $assignment, updated_at = time::now() \
                 RETURN NONE; \
                 {TICKET_REFETCH}"
            ))
            .bind(("id", id_str.clone()))
            .bind(("assignment", AssignmentRow::from_assignment(assignment)))
            .await
            .map_err(DbError::from)?;

        Ok(Self::take_refetched(result, id_str)?)
    }

    async fn delete(&self, id: Uuid) -> KapdeskResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id \
                 FROM type::record('ticket', $id); \
                 DELETE type::record('ticket', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IdRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "ticket".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }
}
