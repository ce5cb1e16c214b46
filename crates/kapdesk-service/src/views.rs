//! Ticket projections.
//!
//! Two read shapes: the detail view resolves every reference into a
//! flattened structure for direct display; the list view resolves
//! only organization and department names for table rows. Reference
//! resolution is lenient: a dangling reference renders as `null`
//! rather than failing the whole projection.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use kapdesk_core::error::{KapdeskError, KapdeskResult};
use kapdesk_core::models::ticket::{
    Assignment, AssignmentStatus, Party, Priority, TicketStatus, TicketType,
};
use kapdesk_core::models::user::UserRole;
use kapdesk_core::repository::{
    DepartmentRepository, OrganizationRepository, TicketRepository, UserRepository,
};
use kapdesk_core::scope::TicketScope;

/// One side of a ticket with its organization/department names
/// resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyView {
    pub organization_id: Uuid,
    pub organization_name: Option<String>,
    pub department_id: Uuid,
    pub department_name: Option<String>,
}

/// A resolved user reference. `role` is the display category (`GOV`,
/// `OP`, `ADMIN`); KAP employees show their specialized sub-role
/// instead.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentView {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentsView {
    pub requestor: Option<AssignmentView>,
    pub operator: Option<AssignmentView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressView {
    pub percentage: u8,
    pub observation: String,
    pub updated_by: AuthorView,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KapNoteView {
    pub text: String,
    pub added_by: AuthorView,
    pub target_organization_id: Uuid,
    pub target_organization_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgNoteView {
    pub text: String,
    pub added_by: AuthorView,
    pub created_at: DateTime<Utc>,
}

/// Fully-resolved detail view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetailView {
    pub id: Uuid,
    pub ticket_number: String,
    pub request: String,
    pub description: Option<String>,
    pub ticket_type: TicketType,
    pub priority: Priority,
    pub status: TicketStatus,
    pub requestor: PartyView,
    pub operator: PartyView,
    pub created_by: AuthorView,
    pub assignments: AssignmentsView,
    pub progress: Vec<ProgressView>,
    pub kap_notes: Vec<KapNoteView>,
    pub org_notes: Vec<OrgNoteView>,
    pub start_date: DateTime<Utc>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Table-row view: only organization/department names are resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListRow {
    pub id: Uuid,
    pub ticket_number: String,
    pub request: String,
    pub ticket_type: TicketType,
    pub priority: Priority,
    pub status: TicketStatus,
    pub requestor: PartyView,
    pub operator: PartyView,
    pub start_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Per-call resolution caches so repeated references hit the store
/// once.
#[derive(Default)]
struct NameCache {
    organizations: HashMap<Uuid, Option<String>>,
    departments: HashMap<Uuid, Option<String>>,
    users: HashMap<Uuid, Option<(String, Option<String>)>>,
}

/// Ticket read service: role-scoped listing and reference-resolving
/// projections.
pub struct TicketViews<T, U, O, D> {
    tickets: T,
    users: U,
    organizations: O,
    departments: D,
}

impl<T, U, O, D> TicketViews<T, U, O, D>
where
    T: TicketRepository,
    U: UserRepository,
    O: OrganizationRepository,
    D: DepartmentRepository,
{
    pub fn new(tickets: T, users: U, organizations: O, departments: D) -> Self {
        Self {
            tickets,
            users,
            organizations,
            departments,
        }
    }

    /// Role-scoped list view. Fails with InvalidRole for roles outside
    /// the visibility table.
    pub async fn list_for(
        &self,
        role: UserRole,
        user_id: Uuid,
        organization_id: Option<Uuid>,
        department_id: Option<Uuid>,
    ) -> KapdeskResult<Vec<TicketListRow>> {
        let scope = TicketScope::for_user(role, user_id, organization_id, department_id)?;
        let tickets = self.tickets.list(&scope).await?;

        let mut cache = NameCache::default();
        let mut rows = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let requestor = self.party_view(&mut cache, ticket.requestor).await?;
            let operator = self.party_view(&mut cache, ticket.operator).await?;
            rows.push(TicketListRow {
                id: ticket.id,
                ticket_number: ticket.ticket_number,
                request: ticket.request,
                ticket_type: ticket.ticket_type,
                priority: ticket.priority,
                status: ticket.status,
                requestor,
                operator,
                start_date: ticket.start_date,
                created_at: ticket.created_at,
            });
        }
        Ok(rows)
    }

    /// Detail view with every reference resolved.
    pub async fn get_detail(&self, id: Uuid) -> KapdeskResult<TicketDetailView> {
        let ticket = self.tickets.get_by_id(id).await?;
        let mut cache = NameCache::default();

        let requestor = self.party_view(&mut cache, ticket.requestor).await?;
        let operator = self.party_view(&mut cache, ticket.operator).await?;
        let created_by = self.author_view(&mut cache, ticket.created_by).await?;

        let assignments = AssignmentsView {
            requestor: match ticket.assignments.requestor {
                Some(a) => Some(self.assignment_view(&mut cache, a).await?),
                None => None,
            },
            operator: match ticket.assignments.operator {
                Some(a) => Some(self.assignment_view(&mut cache, a).await?),
                None => None,
            },
        };

        let mut progress = Vec::with_capacity(ticket.progress.len());
        for entry in ticket.progress {
            let updated_by = self.author_view(&mut cache, entry.updated_by).await?;
            progress.push(ProgressView {
                percentage: entry.percentage,
                observation: entry.observation,
                updated_by,
                updated_at: entry.updated_at,
            });
        }

        let mut kap_notes = Vec::with_capacity(ticket.kap_notes.len());
        for note in ticket.kap_notes {
            let added_by = self.author_view(&mut cache, note.added_by).await?;
            let target_organization_name = self
                .organization_name(&mut cache, note.target_organization_id)
                .await?;
            kap_notes.push(KapNoteView {
                text: note.text,
                added_by,
                target_organization_id: note.target_organization_id,
                target_organization_name,
                created_at: note.created_at,
            });
        }

        let mut org_notes = Vec::with_capacity(ticket.org_notes.len());
        for note in ticket.org_notes {
            let added_by = self.author_view(&mut cache, note.added_by).await?;
            org_notes.push(OrgNoteView {
                text: note.text,
                added_by,
                created_at: note.created_at,
            });
        }

        Ok(TicketDetailView {
            id: ticket.id,
            ticket_number: ticket.ticket_number,
            request: ticket.request,
            description: ticket.description,
            ticket_type: ticket.ticket_type,
            priority: ticket.priority,
            status: ticket.status,
            requestor,
            operator,
            created_by,
            assignments,
            progress,
            kap_notes,
            org_notes,
            start_date: ticket.start_date,
            scheduled_date: ticket.scheduled_date,
            end_date: ticket.end_date,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        })
    }

    async fn party_view(&self, cache: &mut NameCache, party: Party) -> KapdeskResult<PartyView> {
        let organization_name = self
            .organization_name(cache, party.organization_id)
            .await?;
        let department_name = self.department_name(cache, party.department_id).await?;
        Ok(PartyView {
            organization_id: party.organization_id,
            organization_name,
            department_id: party.department_id,
            department_name,
        })
    }

    async fn assignment_view(
        &self,
        cache: &mut NameCache,
        assignment: Assignment,
    ) -> KapdeskResult<AssignmentView> {
        let name = self
            .user_entry(cache, assignment.user_id)
            .await?
            .map(|(name, _)| name);
        Ok(AssignmentView {
            user_id: assignment.user_id,
            name,
            status: assignment.status,
            assigned_at: assignment.assigned_at,
        })
    }

    async fn author_view(&self, cache: &mut NameCache, user_id: Uuid) -> KapdeskResult<AuthorView> {
        let entry = self.user_entry(cache, user_id).await?;
        let (name, role) = match entry {
            Some((name, role)) => (Some(name), role),
            None => (None, None),
        };
        Ok(AuthorView {
            user_id,
            name,
            role,
        })
    }

    async fn organization_name(
        &self,
        cache: &mut NameCache,
        id: Uuid,
    ) -> KapdeskResult<Option<String>> {
        if let Some(hit) = cache.organizations.get(&id) {
            return Ok(hit.clone());
        }
        let name = match self.organizations.get_by_id(id).await {
            Ok(org) => Some(org.name),
            Err(KapdeskError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };
        cache.organizations.insert(id, name.clone());
        Ok(name)
    }

    async fn department_name(
        &self,
        cache: &mut NameCache,
        id: Uuid,
    ) -> KapdeskResult<Option<String>> {
        if let Some(hit) = cache.departments.get(&id) {
            return Ok(hit.clone());
        }
        let name = match self.departments.get_by_id(id).await {
            Ok(dept) => Some(dept.name),
            Err(KapdeskError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };
        cache.departments.insert(id, name.clone());
        Ok(name)
    }

    /// Resolve a user to `(name, display role)`. KAP employees display
    /// their specialized sub-role; everyone else shows the role's
    /// display category.
    async fn user_entry(
        &self,
        cache: &mut NameCache,
        id: Uuid,
    ) -> KapdeskResult<Option<(String, Option<String>)>> {
        if let Some(hit) = cache.users.get(&id) {
            return Ok(hit.clone());
        }
        let entry = match self.users.get_by_id(id).await {
            Ok(user) => {
                let role = if user.role == UserRole::KapEmployee {
                    user.kap_role
                        .clone()
                        .or_else(|| Some(user.role.display_category().to_string()))
                } else {
                    Some(user.role.display_category().to_string())
                };
                Some((user.name, role))
            }
            Err(KapdeskError::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };
        cache.users.insert(id, entry.clone());
        Ok(entry)
    }
}
