//! Integration tests for role-scoped listing and projections.

use kapdesk_core::error::KapdeskError;
use kapdesk_core::models::department::CreateDepartment;
use kapdesk_core::models::organization::{CreateOrganization, OrgType};
use kapdesk_core::models::ticket::{
    AssignmentStatus, CreateTicket, Party, PartySide, Priority, TicketType,
};
use kapdesk_core::models::user::{CreateUser, UserRole};
use kapdesk_core::repository::{DepartmentRepository, OrganizationRepository, UserRepository};
use kapdesk_db::repository::{
    SurrealDepartmentRepository, SurrealOrganizationRepository, SurrealTicketNumberAllocator,
    SurrealTicketRepository, SurrealTransferRequestRepository, SurrealUserRepository,
};
use kapdesk_service::{TicketService, TicketViews};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;

struct Harness {
    tickets: TicketService<
        SurrealTicketRepository<Db>,
        SurrealUserRepository<Db>,
        SurrealTicketNumberAllocator<Db>,
        SurrealTransferRequestRepository<Db>,
    >,
    views: TicketViews<
        SurrealTicketRepository<Db>,
        SurrealUserRepository<Db>,
        SurrealOrganizationRepository<Db>,
        SurrealDepartmentRepository<Db>,
    >,
    organizations: SurrealOrganizationRepository<Db>,
    departments: SurrealDepartmentRepository<Db>,
    users: SurrealUserRepository<Db>,
}

async fn setup() -> Harness {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    kapdesk_db::run_migrations(&db).await.unwrap();

    Harness {
        tickets: TicketService::new(
            SurrealTicketRepository::new(db.clone()),
            SurrealUserRepository::new(db.clone()),
            SurrealTicketNumberAllocator::new(db.clone()),
            SurrealTransferRequestRepository::new(db.clone()),
        ),
        views: TicketViews::new(
            SurrealTicketRepository::new(db.clone()),
            SurrealUserRepository::new(db.clone()),
            SurrealOrganizationRepository::new(db.clone()),
            SurrealDepartmentRepository::new(db.clone()),
        ),
        organizations: SurrealOrganizationRepository::new(db.clone()),
        departments: SurrealDepartmentRepository::new(db.clone()),
        users: SurrealUserRepository::new(db),
    }
}

impl Harness {
    /// Register an organization with one department, returning the
    /// party reference.
    async fn seed_party(&self, name: &str, org_type: OrgType, dept: &str) -> Party {
        let org = self
            .organizations
            .create(CreateOrganization {
                name: name.into(),
                org_type,
                username: format!("{}-login", name.to_lowercase().replace(' ', "-")),
                mobile: format!("{}", Uuid::new_v4().as_u128() % 10_000_000),
                password: "org-password-123".into(),
            })
            .await
            .unwrap();
        let dept = self
            .departments
            .create(CreateDepartment {
                organization_id: org.id,
                name: dept.into(),
            })
            .await
            .unwrap();
        Party {
            organization_id: org.id,
            department_id: dept.id,
        }
    }

    async fn seed_user(&self, name: &str, role: UserRole, party: Option<Party>) -> Uuid {
        let kap_role = (role == UserRole::KapEmployee).then(|| "COORDINATOR".to_string());
        self.users
            .create(CreateUser {
                name: name.into(),
                username: format!("{}-{}", name.to_lowercase(), Uuid::new_v4()),
                password: "user-password-123".into(),
                role,
                organization_id: party.map(|p| p.organization_id),
                department_id: party.map(|p| p.department_id),
                kap_role,
            })
            .await
            .unwrap()
            .id
    }

    fn ticket_input(&self, requestor: Party, operator: Party, creator: Uuid) -> CreateTicket {
        CreateTicket {
            request: "Restore the water supply".into(),
            description: None,
            ticket_type: TicketType::Instant,
            scheduled_date: None,
            priority: Priority::High,
            requestor,
            operator,
            created_by: creator,
        }
    }
}

// -----------------------------------------------------------------------
// Role-scoped listing
// -----------------------------------------------------------------------

#[tokio::test]
async fn manager_visibility_follows_the_ticket_sides() {
    let h = setup().await;
    let gov = h.seed_party("City Hall", OrgType::Government, "Utilities").await;
    let company = h.seed_party("PipeWorks", OrgType::Company, "Field Ops").await;
    let kap = h.seed_user("Dana", UserRole::KapEmployee, None).await;

    h.tickets
        .create(h.ticket_input(gov, company, kap))
        .await
        .unwrap();

    // The requestor-side manager, scoped to org + department, sees it.
    let rows = h
        .views
        .list_for(
            UserRole::GovManager,
            Uuid::new_v4(),
            Some(gov.organization_id),
            Some(gov.department_id),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].requestor.organization_name.as_deref(),
        Some("City Hall")
    );
    assert_eq!(
        rows[0].operator.department_name.as_deref(),
        Some("Field Ops")
    );

    // An operator-side manager scoped to the *requestor's* org sees
    // nothing: the sides do not leak into each other.
    let rows = h
        .views
        .list_for(
            UserRole::OpManager,
            Uuid::new_v4(),
            Some(gov.organization_id),
            None,
        )
        .await
        .unwrap();
    assert!(rows.is_empty());

    // The operator-side manager scoped to their own org sees it.
    let rows = h
        .views
        .list_for(
            UserRole::OpManager,
            Uuid::new_v4(),
            Some(company.organization_id),
            None,
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn kap_employee_sees_only_own_tickets() {
    let h = setup().await;
    let gov = h.seed_party("City Hall", OrgType::Government, "Utilities").await;
    let company = h.seed_party("PipeWorks", OrgType::Company, "Field Ops").await;
    let dana = h.seed_user("Dana", UserRole::KapEmployee, None).await;
    let erlan = h.seed_user("Erlan", UserRole::KapEmployee, None).await;

    h.tickets
        .create(h.ticket_input(gov, company, dana))
        .await
        .unwrap();
    h.tickets
        .create(h.ticket_input(gov, company, erlan))
        .await
        .unwrap();

    let rows = h
        .views
        .list_for(UserRole::KapEmployee, dana, None, None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn admin_role_is_rejected_for_listing() {
    let h = setup().await;
    let err = h
        .views
        .list_for(UserRole::Admin, Uuid::new_v4(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, KapdeskError::InvalidRole { .. }));
}

// -----------------------------------------------------------------------
// Detail projection
// -----------------------------------------------------------------------

#[tokio::test]
async fn detail_view_resolves_every_reference() {
    let h = setup().await;
    let gov = h.seed_party("City Hall", OrgType::Government, "Utilities").await;
    let company = h.seed_party("PipeWorks", OrgType::Company, "Field Ops").await;
    let kap = h.seed_user("Dana", UserRole::KapEmployee, None).await;
    let employee = h.seed_user("Aigerim", UserRole::GovEmployee, Some(gov)).await;
    let fitter = h.seed_user("Bolat", UserRole::OpEmployee, Some(company)).await;

    let ticket = h
        .tickets
        .create(h.ticket_input(gov, company, kap))
        .await
        .unwrap();
    h.tickets
        .add_note(
            ticket.id,
            "Please expedite".into(),
            kap,
            Some(PartySide::Requestor),
        )
        .await
        .unwrap();
    h.tickets
        .add_note(ticket.id, "Crew on site".into(), employee, None)
        .await
        .unwrap();
    h.tickets
        .update_progress(ticket.id, 40, "Excavation done".into(), fitter)
        .await
        .unwrap();
    h.tickets
        .assign(ticket.id, PartySide::Operator, fitter, AssignmentStatus::Accepted)
        .await
        .unwrap();

    let view = h.views.get_detail(ticket.id).await.unwrap();

    assert_eq!(view.requestor.organization_name.as_deref(), Some("City Hall"));
    assert_eq!(view.requestor.department_name.as_deref(), Some("Utilities"));
    assert_eq!(view.operator.organization_name.as_deref(), Some("PipeWorks"));

    // KAP creators display their specialized sub-role.
    assert_eq!(view.created_by.name.as_deref(), Some("Dana"));
    assert_eq!(view.created_by.role.as_deref(), Some("COORDINATOR"));

    // Org-affiliated authors display the role category, not the full
    // role string.
    assert_eq!(view.org_notes.len(), 1);
    assert_eq!(view.org_notes[0].added_by.role.as_deref(), Some("GOV"));

    assert_eq!(view.kap_notes.len(), 1);
    assert_eq!(
        view.kap_notes[0].target_organization_name.as_deref(),
        Some("City Hall")
    );

    assert_eq!(view.progress.len(), 1);
    assert_eq!(view.progress[0].updated_by.role.as_deref(), Some("OP"));

    let assignment = view.assignments.operator.expect("operator assignment");
    assert_eq!(assignment.name.as_deref(), Some("Bolat"));
}

#[tokio::test]
async fn detail_view_tolerates_dangling_references() {
    let h = setup().await;
    let gov = h.seed_party("City Hall", OrgType::Government, "Utilities").await;
    // The operator side points at records that were never created.
    let ghost = Party {
        organization_id: Uuid::new_v4(),
        department_id: Uuid::new_v4(),
    };
    let kap = h.seed_user("Dana", UserRole::KapEmployee, None).await;

    let ticket = h
        .tickets
        .create(h.ticket_input(gov, ghost, kap))
        .await
        .unwrap();

    let view = h.views.get_detail(ticket.id).await.unwrap();
    assert_eq!(view.operator.organization_name, None);
    assert_eq!(view.operator.department_name, None);
    assert_eq!(view.requestor.organization_name.as_deref(), Some("City Hall"));
}

#[tokio::test]
async fn detail_of_missing_ticket_is_not_found() {
    let h = setup().await;
    let err = h.views.get_detail(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, KapdeskError::NotFound { .. }));
}
