//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Ticket sub-collections
//! (progress, notes, assignments) are embedded on the ticket
//! document; transfer requests live in their own table.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Organizations (tenants: government bodies and companies)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD org_type ON TABLE organization TYPE string \
    ASSERT $value IN ['GOVERNMENT', 'COMPANY'];
DEFINE FIELD username ON TABLE organization TYPE string;
DEFINE FIELD mobile ON TABLE organization TYPE string;
DEFINE FIELD password_hash ON TABLE organization TYPE string;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_username ON TABLE organization \
    COLUMNS username UNIQUE;
DEFINE INDEX idx_organization_mobile ON TABLE organization \
    COLUMNS mobile UNIQUE;

-- =======================================================================
-- Departments (scoped to organization, name unique per org)
-- =======================================================================
DEFINE TABLE department SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE department TYPE string;
DEFINE FIELD name ON TABLE department TYPE string;
DEFINE FIELD created_at ON TABLE department TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE department TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_department_org_name ON TABLE department \
    COLUMNS organization_id, name UNIQUE;

-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['ADMIN', 'KAP_EMPLOYEE', 'GOV_MANAGER', \
    'OP_MANAGER', 'GOV_EMPLOYEE', 'OP_EMPLOYEE'];
DEFINE FIELD organization_id ON TABLE user TYPE option<string>;
DEFINE FIELD department_id ON TABLE user TYPE option<string>;
DEFINE FIELD kap_role ON TABLE user TYPE option<string>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;

-- =======================================================================
-- Tickets (embedded progress, notes, and assignments)
-- =======================================================================
DEFINE TABLE ticket SCHEMAFULL;
DEFINE FIELD ticket_number ON TABLE ticket TYPE string;
DEFINE FIELD request ON TABLE ticket TYPE string;
DEFINE FIELD description ON TABLE ticket TYPE option<string>;
DEFINE FIELD ticket_type ON TABLE ticket TYPE string \
    ASSERT $value IN ['INSTANT', 'SCHEDULED'];
DEFINE FIELD priority ON TABLE ticket TYPE string \
    ASSERT $value IN ['LOW', 'MEDIUM', 'HIGH'];
DEFINE FIELD status ON TABLE ticket TYPE string \
    ASSERT $value IN ['CREATED', 'ACCEPTED', 'IN_PROGRESS', \
    'COMPLETED', 'CLOSED', 'TRANSFER_REQUESTED'];
DEFINE FIELD requestor ON TABLE ticket TYPE object;
DEFINE FIELD requestor.organization_id ON TABLE ticket TYPE string;
DEFINE FIELD requestor.department_id ON TABLE ticket TYPE string;
DEFINE FIELD operator ON TABLE ticket TYPE object;
DEFINE FIELD operator.organization_id ON TABLE ticket TYPE string;
DEFINE FIELD operator.department_id ON TABLE ticket TYPE string;
DEFINE FIELD created_by ON TABLE ticket TYPE string;
DEFINE FIELD assignments ON TABLE ticket FLEXIBLE TYPE object \
    DEFAULT {};
DEFINE FIELD progress ON TABLE ticket TYPE array DEFAULT [];
DEFINE FIELD progress.* ON TABLE ticket FLEXIBLE TYPE object;
DEFINE FIELD progress.*.percentage ON TABLE ticket TYPE int \
    ASSERT $value >= 0 AND $value <= 100;
DEFINE FIELD kap_notes ON TABLE ticket TYPE array DEFAULT [];
DEFINE FIELD kap_notes.* ON TABLE ticket FLEXIBLE TYPE object;
DEFINE FIELD org_notes ON TABLE ticket TYPE array DEFAULT [];
DEFINE FIELD org_notes.* ON TABLE ticket FLEXIBLE TYPE object;
DEFINE FIELD start_date ON TABLE ticket TYPE datetime;
DEFINE FIELD scheduled_date ON TABLE ticket TYPE option<datetime>;
DEFINE FIELD end_date ON TABLE ticket TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE ticket TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE ticket TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_ticket_number ON TABLE ticket \
    COLUMNS ticket_number UNIQUE;

-- =======================================================================
-- Transfer requests (own table, linked by ticket_id)
-- =======================================================================
DEFINE TABLE transfer_request SCHEMAFULL;
DEFINE FIELD ticket_id ON TABLE transfer_request TYPE string;
DEFINE FIELD kind ON TABLE transfer_request TYPE string \
    ASSERT $value IN ['DEPARTMENT', 'EMPLOYEE'];
DEFINE FIELD requested_by ON TABLE transfer_request TYPE string;
DEFINE FIELD organization_id ON TABLE transfer_request TYPE string;
DEFINE FIELD current_department_id ON TABLE transfer_request \
    TYPE string;
DEFINE FIELD reason ON TABLE transfer_request TYPE string;
DEFINE FIELD target ON TABLE transfer_request FLEXIBLE TYPE object;
DEFINE FIELD approval ON TABLE transfer_request TYPE string \
    ASSERT $value IN ['PENDING', 'APPROVED', 'REJECTED'];
DEFINE FIELD acceptance ON TABLE transfer_request TYPE string \
    ASSERT $value IN ['PENDING', 'APPROVED', 'REJECTED'];
DEFINE FIELD created_at ON TABLE transfer_request TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE transfer_request TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_transfer_ticket ON TABLE transfer_request \
    COLUMNS ticket_id;

-- =======================================================================
-- Ticket number counters (one record per local calendar day)
-- =======================================================================
DEFINE TABLE ticket_counter SCHEMAFULL;
DEFINE FIELD value ON TABLE ticket_counter TYPE int DEFAULT 0;
";

pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // The tracking table itself is created idempotently.
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let applied: Vec<MigrationRecord> = result.take(0)?;
    let current = applied.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "recording migration v{} failed: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
