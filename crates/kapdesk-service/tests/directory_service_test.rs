//! Integration tests for the directory service.

use kapdesk_core::error::KapdeskError;
use kapdesk_core::models::department::CreateDepartment;
use kapdesk_core::models::organization::{CreateOrganization, OrgType};
use kapdesk_core::models::user::{CreateUser, UserRole};
use kapdesk_db::repository::{
    SurrealDepartmentRepository, SurrealOrganizationRepository, SurrealUserRepository,
};
use kapdesk_service::DirectoryService;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;
type Directory = DirectoryService<
    SurrealOrganizationRepository<Db>,
    SurrealDepartmentRepository<Db>,
    SurrealUserRepository<Db>,
>;

async fn setup() -> Directory {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    kapdesk_db::run_migrations(&db).await.unwrap();

    DirectoryService::new(
        SurrealOrganizationRepository::new(db.clone()),
        SurrealDepartmentRepository::new(db.clone()),
        SurrealUserRepository::new(db),
    )
}

fn org_input(username: &str, mobile: &str) -> CreateOrganization {
    CreateOrganization {
        name: "Water Authority".into(),
        org_type: OrgType::Government,
        username: username.into(),
        mobile: mobile.into(),
        password: "org-password-123".into(),
    }
}

fn user_input(username: &str, role: UserRole) -> CreateUser {
    let org_affiliated = role.is_org_affiliated();
    CreateUser {
        name: "Aigerim".into(),
        username: username.into(),
        password: "user-password-123".into(),
        role,
        organization_id: org_affiliated.then(Uuid::new_v4),
        department_id: org_affiliated.then(Uuid::new_v4),
        kap_role: (role == UserRole::KapEmployee).then(|| "COORDINATOR".into()),
    }
}

// -----------------------------------------------------------------------
// Organizations
// -----------------------------------------------------------------------

#[tokio::test]
async fn duplicate_organization_username_is_rejected() {
    let directory = setup().await;

    directory
        .create_organization(org_input("water-auth", "5550001"))
        .await
        .unwrap();
    let err = directory
        .create_organization(org_input("water-auth", "5550002"))
        .await
        .unwrap_err();
    assert!(matches!(err, KapdeskError::AlreadyExists { .. }));
}

#[tokio::test]
async fn duplicate_organization_mobile_is_rejected() {
    let directory = setup().await;

    directory
        .create_organization(org_input("water-auth", "5550001"))
        .await
        .unwrap();
    let err = directory
        .create_organization(org_input("other-org", "5550001"))
        .await
        .unwrap_err();
    assert!(matches!(err, KapdeskError::AlreadyExists { .. }));
}

// -----------------------------------------------------------------------
// Departments
// -----------------------------------------------------------------------

#[tokio::test]
async fn department_requires_an_existing_organization() {
    let directory = setup().await;

    let err = directory
        .create_department(CreateDepartment {
            organization_id: Uuid::new_v4(),
            name: "Maintenance".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, KapdeskError::NotFound { .. }));
}

#[tokio::test]
async fn duplicate_department_name_within_an_org_is_rejected() {
    let directory = setup().await;
    let org = directory
        .create_organization(org_input("water-auth", "5550001"))
        .await
        .unwrap();

    directory
        .create_department(CreateDepartment {
            organization_id: org.id,
            name: "Maintenance".into(),
        })
        .await
        .unwrap();
    let err = directory
        .create_department(CreateDepartment {
            organization_id: org.id,
            name: "Maintenance".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, KapdeskError::AlreadyExists { .. }));
}

// -----------------------------------------------------------------------
// Users
// -----------------------------------------------------------------------

#[tokio::test]
async fn org_affiliated_roles_require_org_and_department() {
    let directory = setup().await;

    let mut input = user_input("aigerim", UserRole::GovEmployee);
    input.department_id = None;
    let err = directory.create_user(input).await.unwrap_err();
    assert!(matches!(err, KapdeskError::Validation { .. }));
}

#[tokio::test]
async fn kap_employee_requires_a_sub_role() {
    let directory = setup().await;

    let mut input = user_input("dana", UserRole::KapEmployee);
    input.kap_role = None;
    let err = directory.create_user(input).await.unwrap_err();
    assert!(matches!(err, KapdeskError::Validation { .. }));
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let directory = setup().await;

    directory
        .create_user(user_input("aigerim", UserRole::GovEmployee))
        .await
        .unwrap();
    let err = directory
        .create_user(user_input("aigerim", UserRole::OpEmployee))
        .await
        .unwrap_err();
    assert!(matches!(err, KapdeskError::AlreadyExists { .. }));
}

// -----------------------------------------------------------------------
// Login
// -----------------------------------------------------------------------

#[tokio::test]
async fn login_verifies_credentials() {
    let directory = setup().await;
    directory
        .create_user(user_input("aigerim", UserRole::GovEmployee))
        .await
        .unwrap();

    let user = directory
        .login("aigerim", "user-password-123")
        .await
        .unwrap();
    assert_eq!(user.username, "aigerim");

    let err = directory.login("aigerim", "wrong").await.unwrap_err();
    assert!(matches!(err, KapdeskError::Validation { .. }));

    // Unknown usernames report the same failure as a bad password.
    let err = directory.login("ghost", "user-password-123").await.unwrap_err();
    assert!(matches!(err, KapdeskError::Validation { .. }));
}
