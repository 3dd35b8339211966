//! Visibility grant repository and its access-change transaction.

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres};
use tracing::{debug, warn};

use tutorhub_core::error::AppError;
use tutorhub_core::result::AppResult;
use tutorhub_core::types::{MaterialId, StudentId, raw_ids};
use tutorhub_entity::material::TreeLink;

use super::{db_error, tree};
use crate::store::{VisibilityStore, VisibilityTx};

/// Repository for (material, student) visibility grants.
#[derive(Debug, Clone)]
pub struct VisibilityRepository {
    pool: PgPool,
}

impl VisibilityRepository {
    /// Create a new visibility repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisibilityStore for VisibilityRepository {
    async fn begin(&self) -> AppResult<Box<dyn VisibilityTx>> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(db_error("Failed to acquire connection"))?;
        Ok(Box::new(PgVisibilityTx {
            conn: Some(conn),
            phase: Phase::Unlocked,
        }))
    }

    async fn student_ids(&self, material_id: MaterialId) -> AppResult<BTreeSet<StudentId>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(db_error("Failed to acquire connection"))?;
        fetch_student_ids(&mut conn, material_id).await
    }

    async fn visible_among(
        &self,
        student_id: StudentId,
        candidates: &[MaterialId],
    ) -> AppResult<HashSet<MaterialId>> {
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }
        let rows = sqlx::query_scalar::<_, MaterialId>(
            "SELECT material_id FROM material_visibility \
             WHERE student_id = $1 AND material_id = ANY($2)",
        )
        .bind(student_id)
        .bind(raw_ids(candidates))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to filter visible materials"))?;
        Ok(rows.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// No lock held. Reads run in autocommit mode.
    Unlocked,
    /// Tree lock held and a repeatable-read transaction open.
    Locked(MaterialId),
    /// Committed and unlocked.
    Finished,
    /// The session may still hold a lock or an open transaction.
    Poisoned,
}

/// An access change on one pooled session.
///
/// [`VisibilityTx::lock_tree`] takes a session-level advisory lock on the
/// tree root and only then opens a REPEATABLE READ transaction, so the
/// snapshot is taken after every earlier holder of the lock has committed.
/// Dropped before commit, the session is closed instead of being returned
/// to the pool, which rolls the transaction back and frees the lock.
pub struct PgVisibilityTx {
    conn: Option<PoolConnection<Postgres>>,
    phase: Phase,
}

impl PgVisibilityTx {
    fn conn(&mut self) -> AppResult<&mut PgConnection> {
        match self.phase {
            Phase::Unlocked | Phase::Locked(_) => self
                .conn
                .as_deref_mut()
                .ok_or_else(|| AppError::internal("Access transaction lost its connection")),
            Phase::Finished | Phase::Poisoned => {
                Err(AppError::internal("Access transaction already finished"))
            }
        }
    }

    fn locked_conn(&mut self) -> AppResult<&mut PgConnection> {
        if !matches!(self.phase, Phase::Locked(_)) {
            return Err(AppError::internal(
                "Access transaction must lock its tree before writing",
            ));
        }
        self.conn()
    }
}

impl Drop for PgVisibilityTx {
    fn drop(&mut self) {
        if matches!(self.phase, Phase::Locked(_) | Phase::Poisoned) {
            if let Some(conn) = self.conn.take() {
                debug!("Closing session of an unfinished access transaction");
                drop(conn.detach());
            }
        }
    }
}

#[async_trait]
impl VisibilityTx for PgVisibilityTx {
    async fn ancestry_links(&mut self, id: MaterialId) -> AppResult<Vec<TreeLink>> {
        tree::ancestry_links(self.conn()?, id).await
    }

    async fn subtree_links(&mut self, root: MaterialId) -> AppResult<Vec<TreeLink>> {
        tree::subtree_links(self.conn()?, root).await
    }

    async fn lock_tree(&mut self, tree_root: MaterialId) -> AppResult<()> {
        if self.phase != Phase::Unlocked {
            return Err(AppError::internal("Access transaction already locked a tree"));
        }
        tree::lock_tree_session(self.conn()?, tree_root).await?;
        self.phase = Phase::Locked(tree_root);

        let conn = self.conn()?;
        sqlx::Executor::execute(conn, sqlx::raw_sql("BEGIN ISOLATION LEVEL REPEATABLE READ"))
            .await
            .map_err(db_error("Failed to begin access transaction"))?;
        Ok(())
    }

    async fn student_ids(&mut self, material_id: MaterialId) -> AppResult<BTreeSet<StudentId>> {
        fetch_student_ids(self.conn()?, material_id).await
    }

    async fn grant(&mut self, materials: &[MaterialId], students: &[StudentId]) -> AppResult<u64> {
        if materials.is_empty() || students.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "INSERT INTO material_visibility (material_id, student_id) \
             SELECT m, s FROM UNNEST($1::BIGINT[]) AS m CROSS JOIN UNNEST($2::BIGINT[]) AS s \
             ON CONFLICT (material_id, student_id) DO NOTHING",
        )
        .bind(raw_ids(materials))
        .bind(raw_ids(students))
        .execute(self.locked_conn()?)
        .await
        .map_err(db_error("Failed to grant material visibility"))?;
        Ok(result.rows_affected())
    }

    async fn revoke(
        &mut self,
        materials: &[MaterialId],
        students: &[StudentId],
    ) -> AppResult<u64> {
        if materials.is_empty() || students.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "DELETE FROM material_visibility \
             WHERE material_id = ANY($1) AND student_id = ANY($2)",
        )
        .bind(raw_ids(materials))
        .bind(raw_ids(students))
        .execute(self.locked_conn()?)
        .await
        .map_err(db_error("Failed to revoke material visibility"))?;
        Ok(result.rows_affected())
    }

    async fn commit(&mut self) -> AppResult<()> {
        let Phase::Locked(tree_root) = self.phase else {
            return Err(AppError::internal(
                "Access transaction has nothing to commit",
            ));
        };

        let conn = self.conn()?;
        sqlx::Executor::execute(conn, sqlx::raw_sql("COMMIT"))
            .await
            .map_err(db_error("Failed to commit access change"))?;

        match tree::unlock_tree_session(self.conn()?, tree_root).await {
            Ok(true) => self.phase = Phase::Finished,
            Ok(false) => {
                warn!(tree_root = %tree_root, "Tree lock was not held at commit");
                self.phase = Phase::Poisoned;
            }
            Err(e) => {
                warn!(tree_root = %tree_root, error = %e, "Failed to release tree lock");
                self.phase = Phase::Poisoned;
            }
        }
        Ok(())
    }
}

async fn fetch_student_ids(
    conn: &mut PgConnection,
    material_id: MaterialId,
) -> AppResult<BTreeSet<StudentId>> {
    let rows = sqlx::query_scalar::<_, StudentId>(
        "SELECT student_id FROM material_visibility WHERE material_id = $1 ORDER BY student_id",
    )
    .bind(material_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error("Failed to load material visibility"))?;
    Ok(rows.into_iter().collect())
}
