//! Embedded schema migrations.

use std::collections::HashSet;

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use tutorhub_core::error::{AppError, ErrorKind};
use tutorhub_core::result::AppResult;

/// Migrations compiled in from `migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// One embedded migration and whether the database has it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    /// Version prefix of the migration file.
    pub version: i64,
    /// Description taken from the file name.
    pub description: String,
    /// Whether the migration is recorded as applied.
    pub applied: bool,
}

/// Every embedded migration with its applied flag, oldest first.
pub async fn migration_status(pool: &PgPool) -> AppResult<Vec<MigrationState>> {
    let applied = applied_versions(pool).await?;
    Ok(MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| MigrationState {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect())
}

/// Apply pending migrations. Returns how many were applied.
pub async fn run_migrations(pool: &PgPool) -> AppResult<usize> {
    let pending = migration_status(pool)
        .await?
        .into_iter()
        .filter(|m| !m.applied)
        .count();

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!(applied = pending, "Schema is up to date");
    Ok(pending)
}

/// Versions recorded by sqlx. Empty before the first run.
async fn applied_versions(pool: &PgPool) -> AppResult<HashSet<i64>> {
    let tracked: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to inspect schema", e))?;
    if !tracked {
        return Ok(HashSet::new());
    }

    let versions: Vec<i64> =
        sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to read migration history", e)
            })?;
    Ok(versions.into_iter().collect())
}
