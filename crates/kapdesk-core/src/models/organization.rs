//! Organization domain model.
//!
//! Organizations are the tenants of the system: government bodies
//! raising tickets and companies fulfilling them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrgType {
    Government,
    Company,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub org_type: OrgType,
    /// Login name, unique across organizations.
    pub username: String,
    /// Contact number, unique across organizations.
    pub mobile: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to register a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganization {
    pub name: String,
    pub org_type: OrgType,
    pub username: String,
    pub mobile: String,
    /// Raw password; hashed with Argon2id before storage.
    pub password: String,
}
