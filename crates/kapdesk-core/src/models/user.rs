//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::KapdeskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    KapEmployee,
    GovManager,
    OpManager,
    GovEmployee,
    OpEmployee,
}

impl UserRole {
    /// Display category shown next to note and progress authors.
    ///
    /// KAP employees are displayed by their specialized `kap_role`
    /// instead of this generic category; see the projection layer.
    pub fn display_category(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::KapEmployee => "KAP",
            UserRole::GovManager | UserRole::GovEmployee => "GOV",
            UserRole::OpManager | UserRole::OpEmployee => "OP",
        }
    }

    /// Whether this role belongs to a requestor/operator organization
    /// (and therefore requires organization and department references).
    pub fn is_org_affiliated(&self) -> bool {
        matches!(
            self,
            UserRole::GovManager
                | UserRole::OpManager
                | UserRole::GovEmployee
                | UserRole::OpEmployee
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::KapEmployee => "KAP_EMPLOYEE",
            UserRole::GovManager => "GOV_MANAGER",
            UserRole::OpManager => "OP_MANAGER",
            UserRole::GovEmployee => "GOV_EMPLOYEE",
            UserRole::OpEmployee => "OP_EMPLOYEE",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = KapdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(UserRole::Admin),
            "KAP_EMPLOYEE" => Ok(UserRole::KapEmployee),
            "GOV_MANAGER" => Ok(UserRole::GovManager),
            "OP_MANAGER" => Ok(UserRole::OpManager),
            "GOV_EMPLOYEE" => Ok(UserRole::GovEmployee),
            "OP_EMPLOYEE" => Ok(UserRole::OpEmployee),
            other => Err(KapdeskError::InvalidRole {
                role: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    /// Required for GOV_*/OP_* roles.
    pub organization_id: Option<Uuid>,
    /// Required for GOV_*/OP_* roles.
    pub department_id: Option<Uuid>,
    /// Specialized sub-role, required for KAP_EMPLOYEE.
    pub kap_role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new user. Conditional requirements
/// (organization/department/kapRole) are validated by the directory
/// service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub name: String,
    pub username: String,
    /// Raw password; hashed with Argon2id before storage.
    pub password: String,
    pub role: UserRole,
    pub organization_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub kap_role: Option<String>,
}
