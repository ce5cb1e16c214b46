//! SurrealDB implementation of [`UserRepository`].
//!
//! Passwords are hashed with Argon2id before storage (see the
//! organization repository for the shared hashing helper).

use chrono::{DateTime, Utc};
use kapdesk_core::error::KapdeskResult;
use kapdesk_core::models::user::{CreateUser, User, UserRole};
use kapdesk_core::repository::{PaginatedResult, Pagination, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::organization::hash_password;
use crate::repository::{parse_opt_uuid, parse_uuid};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    name: String,
    username: String,
    password_hash: String,
    role: String,
    organization_id: Option<String>,
    department_id: Option<String>,
    kap_role: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    name: String,
    username: String,
    password_hash: String,
    role: String,
    organization_id: Option<String>,
    department_id: Option<String>,
    kap_role: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_role(s: &str) -> Result<UserRole, DbError> {
    match s {
        "ADMIN" => Ok(UserRole::Admin),
        "KAP_EMPLOYEE" => Ok(UserRole::KapEmployee),
        "GOV_MANAGER" => Ok(UserRole::GovManager),
        "OP_MANAGER" => Ok(UserRole::OpManager),
        "GOV_EMPLOYEE" => Ok(UserRole::GovEmployee),
        "OP_EMPLOYEE" => Ok(UserRole::OpEmployee),
        other => Err(DbError::Corrupt(format!("unknown user role: {other}"))),
    }
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            name: self.name,
            username: self.username,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            organization_id: parse_opt_uuid(self.organization_id.as_deref(), "organization")?,
            department_id: parse_opt_uuid(self.department_id.as_deref(), "department")?,
            kap_role: self.kap_role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = parse_uuid(&self.record_id, "user")?;
        Ok(User {
            id,
            name: self.name,
            username: self.username,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            organization_id: parse_opt_uuid(self.organization_id.as_deref(), "organization")?,
            department_id: parse_opt_uuid(self.department_id.as_deref(), "department")?,
            kap_role: self.kap_role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> KapdeskResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = hash_password(&input.password)?;

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 name = $name, username = $username, \
                 password_hash = $password_hash, role = $role, \
                 organization_id = $organization_id, \
                 department_id = $department_id, \
                 kap_role = $kap_role",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("username", input.username))
            .bind(("password_hash", password_hash))
            .bind(("role", input.role.as_str()))
            .bind((
                "organization_id",
                input.organization_id.map(|v| v.to_string()),
            ))
            .bind(("department_id", input.department_id.map(|v| v.to_string())))
            .bind(("kap_role", input.kap_role))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> KapdeskResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_username(&self, username: &str) -> KapdeskResult<User> {
        let username_owned = username.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM user WHERE username = $username",
            )
            .bind(("username", username_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("username={username}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn list(&self, pagination: Pagination) -> KapdeskResult<PaginatedResult<User>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM user \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
