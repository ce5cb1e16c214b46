//! Directory operations: organizations, departments, and users.
//!
//! Thin create/list flows with unique-field checks, plus the login
//! verification the ticket endpoints sit behind.

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use kapdesk_core::error::{KapdeskError, KapdeskResult};
use kapdesk_core::models::department::{CreateDepartment, Department};
use kapdesk_core::models::organization::{CreateOrganization, OrgType, Organization};
use kapdesk_core::models::user::{CreateUser, User, UserRole};
use kapdesk_core::repository::{
    DepartmentRepository, OrganizationRepository, PaginatedResult, Pagination, UserRepository,
};

use crate::password::verify_password;

/// Organization shaped for API responses, without credential fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationView {
    pub id: Uuid,
    pub name: String,
    pub org_type: OrgType,
    pub username: String,
    pub mobile: String,
}

impl From<Organization> for OrganizationView {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id,
            name: org.name,
            org_type: org.org_type,
            username: org.username,
            mobile: org.mobile,
        }
    }
}

/// User shaped for API responses. The password hash never leaves the
/// service layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub role: UserRole,
    pub organization_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub kap_role: Option<String>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            role: user.role,
            organization_id: user.organization_id,
            department_id: user.department_id,
            kap_role: user.kap_role,
        }
    }
}

/// Directory service, generic over the repository implementations.
pub struct DirectoryService<O, D, U> {
    organizations: O,
    departments: D,
    users: U,
}

impl<O, D, U> DirectoryService<O, D, U>
where
    O: OrganizationRepository,
    D: DepartmentRepository,
    U: UserRepository,
{
    pub fn new(organizations: O, departments: D, users: U) -> Self {
        Self {
            organizations,
            departments,
            users,
        }
    }

    pub async fn create_organization(
        &self,
        input: CreateOrganization,
    ) -> KapdeskResult<OrganizationView> {
        if input.name.trim().is_empty() || input.username.trim().is_empty() {
            return Err(KapdeskError::Validation {
                message: "name and username are required".into(),
            });
        }

        // Unique-field checks before insert; the store's unique
        // indexes are the backstop.
        match self.organizations.get_by_username(&input.username).await {
            Ok(_) => {
                return Err(KapdeskError::AlreadyExists {
                    entity: format!("organization with username {}", input.username),
                });
            }
            Err(KapdeskError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }
        match self.organizations.get_by_mobile(&input.mobile).await {
            Ok(_) => {
                return Err(KapdeskError::AlreadyExists {
                    entity: format!("organization with mobile {}", input.mobile),
                });
            }
            Err(KapdeskError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let org = self.organizations.create(input).await?;
        info!(organization = %org.name, "Organization registered");
        Ok(org.into())
    }

    pub async fn list_organizations(
        &self,
        pagination: Pagination,
    ) -> KapdeskResult<PaginatedResult<OrganizationView>> {
        let result = self.organizations.list(pagination).await?;
        Ok(PaginatedResult {
            items: result.items.into_iter().map(Into::into).collect(),
            total: result.total,
            offset: result.offset,
            limit: result.limit,
        })
    }

    pub async fn create_department(&self, input: CreateDepartment) -> KapdeskResult<Department> {
        if input.name.trim().is_empty() {
            return Err(KapdeskError::Validation {
                message: "name is required".into(),
            });
        }

        // The owning organization must exist.
        self.organizations.get_by_id(input.organization_id).await?;

        match self
            .departments
            .get_by_name(input.organization_id, &input.name)
            .await
        {
            Ok(_) => {
                return Err(KapdeskError::AlreadyExists {
                    entity: format!("department {}", input.name),
                });
            }
            Err(KapdeskError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        self.departments.create(input).await
    }

    pub async fn list_departments(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> KapdeskResult<PaginatedResult<Department>> {
        self.departments
            .list_by_organization(organization_id, pagination)
            .await
    }

    /// Create a user, enforcing the conditional field requirements:
    /// organization and department for org-affiliated roles, the KAP
    /// sub-role for KAP employees.
    pub async fn create_user(&self, input: CreateUser) -> KapdeskResult<UserView> {
        if input.name.trim().is_empty() || input.username.trim().is_empty() {
            return Err(KapdeskError::Validation {
                message: "name and username are required".into(),
            });
        }

        if input.role.is_org_affiliated()
            && (input.organization_id.is_none() || input.department_id.is_none())
        {
            return Err(KapdeskError::Validation {
                message: format!(
                    "organization and department are required for role {}",
                    input.role.as_str()
                ),
            });
        }
        if input.role == UserRole::KapEmployee && input.kap_role.is_none() {
            return Err(KapdeskError::Validation {
                message: "kapRole is required for KAP employees".into(),
            });
        }

        match self.users.get_by_username(&input.username).await {
            Ok(_) => {
                return Err(KapdeskError::AlreadyExists {
                    entity: format!("user with username {}", input.username),
                });
            }
            Err(KapdeskError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let user = self.users.create(input).await?;
        info!(username = %user.username, role = user.role.as_str(), "User created");
        Ok(user.into())
    }

    pub async fn list_users(
        &self,
        pagination: Pagination,
    ) -> KapdeskResult<PaginatedResult<UserView>> {
        let result = self.users.list(pagination).await?;
        Ok(PaginatedResult {
            items: result.items.into_iter().map(Into::into).collect(),
            total: result.total,
            offset: result.offset,
            limit: result.limit,
        })
    }

    /// Verify user credentials. Both an unknown username and a wrong
    /// password report the same failure.
    pub async fn login(&self, username: &str, password: &str) -> KapdeskResult<UserView> {
        let invalid = || KapdeskError::Validation {
            message: "invalid username or password".into(),
        };

        let user = match self.users.get_by_username(username).await {
            Ok(user) => user,
            Err(KapdeskError::NotFound { .. }) => return Err(invalid()),
            Err(e) => return Err(e),
        };

        if !verify_password(password, &user.password_hash)? {
            return Err(invalid());
        }

        info!(username = %user.username, "User logged in");
        Ok(user.into())
    }
}
