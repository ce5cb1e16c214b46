//! Role-scoped ticket visibility.
//!
//! Every ticket has two sides (requestor and operator), and a user's
//! visibility is determined by which side their role occupies plus
//! whether they match by individual assignment or by organizational
//! department. [`TicketScope`] captures the resulting filter as data;
//! the store translates it into a query.

use uuid::Uuid;

use crate::error::{KapdeskError, KapdeskResult};
use crate::models::user::UserRole;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketScope {
    /// KAP employees see the tickets they created.
    CreatedBy { user_id: Uuid },
    /// Government employees: assigned on the operator side, or any
    /// ticket requested by their department.
    GovEmployee {
        user_id: Uuid,
        department_id: Option<Uuid>,
    },
    /// Operator employees: assigned on the requestor side, or any
    /// ticket operated by their department.
    OpEmployee {
        user_id: Uuid,
        department_id: Option<Uuid>,
    },
    /// Government managers: the requestor side of their organization
    /// and/or department. Each conjunct applies only if provided.
    GovManager {
        organization_id: Option<Uuid>,
        department_id: Option<Uuid>,
    },
    /// Operator managers: the operator side, same conjunct rules.
    OpManager {
        organization_id: Option<Uuid>,
        department_id: Option<Uuid>,
    },
}

impl TicketScope {
    /// Build the visibility filter for a `(role, user, org, department)`
    /// tuple. Roles outside the visibility table, including ADMIN,
    /// are rejected.
    pub fn for_user(
        role: UserRole,
        user_id: Uuid,
        organization_id: Option<Uuid>,
        department_id: Option<Uuid>,
    ) -> KapdeskResult<Self> {
        match role {
            UserRole::KapEmployee => Ok(TicketScope::CreatedBy { user_id }),
            UserRole::GovEmployee => Ok(TicketScope::GovEmployee {
                user_id,
                department_id,
            }),
            UserRole::OpEmployee => Ok(TicketScope::OpEmployee {
                user_id,
                department_id,
            }),
            UserRole::GovManager => Ok(TicketScope::GovManager {
                organization_id,
                department_id,
            }),
            UserRole::OpManager => Ok(TicketScope::OpManager {
                organization_id,
                department_id,
            }),
            UserRole::Admin => Err(KapdeskError::InvalidRole {
                role: role.as_str().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kap_employee_scopes_to_creator() {
        let user = Uuid::new_v4();
        let scope = TicketScope::for_user(UserRole::KapEmployee, user, None, None).unwrap();
        assert_eq!(scope, TicketScope::CreatedBy { user_id: user });
    }

    #[test]
    fn employees_keep_their_department_arm_optional() {
        let user = Uuid::new_v4();
        let scope = TicketScope::for_user(UserRole::GovEmployee, user, None, None).unwrap();
        assert_eq!(
            scope,
            TicketScope::GovEmployee {
                user_id: user,
                department_id: None,
            }
        );
    }

    #[test]
    fn managers_carry_both_conjuncts() {
        let user = Uuid::new_v4();
        let org = Uuid::new_v4();
        let dept = Uuid::new_v4();
        let scope =
            TicketScope::for_user(UserRole::OpManager, user, Some(org), Some(dept)).unwrap();
        assert_eq!(
            scope,
            TicketScope::OpManager {
                organization_id: Some(org),
                department_id: Some(dept),
            }
        );
    }

    #[test]
    fn admin_is_rejected() {
        let err = TicketScope::for_user(UserRole::Admin, Uuid::new_v4(), None, None).unwrap_err();
        assert!(matches!(err, KapdeskError::InvalidRole { .. }));
    }
}
