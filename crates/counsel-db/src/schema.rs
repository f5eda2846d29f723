//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity. UUIDs
//! are stored as strings, enums as strings with ASSERT constraints.
//! The two booking tables are deliberately parallel: the same field set
//! backs the user-to-expert and expert-to-expert flows.

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
// Schema v1 — booking tables, cancellations, ratings
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- User-to-expert sessions
-- =======================================================================
DEFINE TABLE user_session SCHEMAFULL;
DEFINE FIELD initiator_id ON TABLE user_session TYPE string;
DEFINE FIELD counterpart_id ON TABLE user_session TYPE string;
DEFINE FIELD area_of_expertise ON TABLE user_session TYPE string;
DEFINE FIELD slots ON TABLE user_session TYPE array DEFAULT [];
DEFINE FIELD slots.* ON TABLE user_session TYPE object;
DEFINE FIELD slots.*.date ON TABLE user_session TYPE string;
DEFINE FIELD slots.*.time ON TABLE user_session TYPE string;
DEFINE FIELD duration ON TABLE user_session TYPE string;
DEFINE FIELD note ON TABLE user_session TYPE string DEFAULT '';
DEFINE FIELD status ON TABLE user_session TYPE string \
    ASSERT $value IN ['pending', 'unconfirmed', 'confirmed', \
    'payment_failed', 'rejected', 'completed', 'rating_submitted'];
DEFINE FIELD payment_status ON TABLE user_session TYPE string;
DEFINE FIELD payment_reference ON TABLE user_session \
    TYPE option<string>;
DEFINE FIELD payment_amount ON TABLE user_session TYPE float \
    DEFAULT 0.0;
DEFINE FIELD first_name ON TABLE user_session TYPE string DEFAULT '';
DEFINE FIELD last_name ON TABLE user_session TYPE string DEFAULT '';
DEFINE FIELD email ON TABLE user_session TYPE string DEFAULT '';
DEFINE FIELD phone ON TABLE user_session TYPE string DEFAULT '';
DEFINE FIELD meeting_join_url ON TABLE user_session \
    TYPE option<string>;
DEFINE FIELD meeting_external_id ON TABLE user_session \
    TYPE option<string>;
DEFINE FIELD meeting_password ON TABLE user_session \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE user_session TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user_session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_session_counterpart ON TABLE user_session \
    COLUMNS counterpart_id;
DEFINE INDEX idx_user_session_initiator ON TABLE user_session \
    COLUMNS initiator_id;

-- =======================================================================
-- Expert-to-expert sessions
-- =======================================================================
DEFINE TABLE expert_session SCHEMAFULL;
DEFINE FIELD initiator_id ON TABLE expert_session TYPE string;
DEFINE FIELD counterpart_id ON TABLE expert_session TYPE string;
DEFINE FIELD area_of_expertise ON TABLE expert_session TYPE string;
DEFINE FIELD slots ON TABLE expert_session TYPE array DEFAULT [];
DEFINE FIELD slots.* ON TABLE expert_session TYPE object;
DEFINE FIELD slots.*.date ON TABLE expert_session TYPE string;
DEFINE FIELD slots.*.time ON TABLE expert_session TYPE string;
DEFINE FIELD duration ON TABLE expert_session TYPE string;
DEFINE FIELD note ON TABLE expert_session TYPE string DEFAULT '';
DEFINE FIELD status ON TABLE expert_session TYPE string \
    ASSERT $value IN ['pending', 'unconfirmed', 'confirmed', \
    'payment_failed', 'rejected', 'completed', 'rating_submitted'];
DEFINE FIELD payment_status ON TABLE expert_session TYPE string;
DEFINE FIELD payment_reference ON TABLE expert_session \
    TYPE option<string>;
DEFINE FIELD payment_amount ON TABLE expert_session TYPE float \
    DEFAULT 0.0;
DEFINE FIELD first_name ON TABLE expert_session TYPE string DEFAULT '';
DEFINE FIELD last_name ON TABLE expert_session TYPE string DEFAULT '';
DEFINE FIELD email ON TABLE expert_session TYPE string DEFAULT '';
DEFINE FIELD phone ON TABLE expert_session TYPE string DEFAULT '';
DEFINE FIELD meeting_join_url ON TABLE expert_session \
    TYPE option<string>;
DEFINE FIELD meeting_external_id ON TABLE expert_session \
    TYPE option<string>;
DEFINE FIELD meeting_password ON TABLE expert_session \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE expert_session TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE expert_session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_expert_session_counterpart ON TABLE expert_session \
    COLUMNS counterpart_id;
DEFINE INDEX idx_expert_session_initiator ON TABLE expert_session \
    COLUMNS initiator_id;

-- =======================================================================
-- Cancellations (append-only archive)
-- =======================================================================
DEFINE TABLE cancellation SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD session_id ON TABLE cancellation TYPE string;
DEFINE FIELD session_kind ON TABLE cancellation TYPE string \
    ASSERT $value IN ['user-to-expert', 'expert-to-expert'];
DEFINE FIELD cancelled_by ON TABLE cancellation TYPE string;
DEFINE FIELD reasons ON TABLE cancellation TYPE array DEFAULT [];
DEFINE FIELD reasons.* ON TABLE cancellation TYPE string;
DEFINE FIELD other_reason ON TABLE cancellation TYPE option<string>;
DEFINE FIELD policy ON TABLE cancellation TYPE string \
    ASSERT $value IN ['no_fee', 'fee_may_apply'];
DEFINE FIELD cancelled_at ON TABLE cancellation TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_cancellation_party ON TABLE cancellation \
    COLUMNS cancelled_by;

-- =======================================================================
-- Ratings
-- =======================================================================
DEFINE TABLE rating SCHEMAFULL;
DEFINE FIELD expert_id ON TABLE rating TYPE string;
DEFINE FIELD rater_id ON TABLE rating TYPE string;
DEFINE FIELD session_id ON TABLE rating TYPE string;
DEFINE FIELD session_kind ON TABLE rating TYPE string \
    ASSERT $value IN ['user-to-expert', 'expert-to-expert'];
DEFINE FIELD score ON TABLE rating TYPE int \
    ASSERT $value >= 1 AND $value <= 5;
DEFINE FIELD comment ON TABLE rating TYPE string DEFAULT '';
DEFINE FIELD created_at ON TABLE rating TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_rating_expert ON TABLE rating COLUMNS expert_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn booking_tables_stay_parallel() {
        // Both tables must carry the same field set; a field defined on
        // one side only breaks the cross-table lookups.
        let fields = |table: &str| {
            let prefix = format!("ON TABLE {table} ");
            SCHEMA_V1
                .lines()
                .filter(|l| l.contains(&prefix) && l.starts_with("DEFINE FIELD"))
                .map(|l| l.split_whitespace().nth(2).unwrap_or("").to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(fields("user_session"), fields("expert_session"));
    }

    #[test]
    fn status_assertion_covers_every_status() {
        for status in [
            "'pending'",
            "'unconfirmed'",
            "'confirmed'",
            "'payment_failed'",
            "'rejected'",
            "'completed'",
            "'rating_submitted'",
        ] {
            assert!(SCHEMA_V1.contains(status), "missing {status}");
        }
    }
}
