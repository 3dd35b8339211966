//! PostgreSQL fixture for access-change tests.
//!
//! The tests run only when `TUTORHUB_TEST_DATABASE_URL` points at a
//! database the user may create schemas in. Each fixture migrates a fresh
//! schema and drops it again in `teardown`.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use tutorhub_core::config::DatabaseConfig;
use tutorhub_core::error::AppError;
use tutorhub_core::result::AppResult;
use tutorhub_core::types::{MaterialId, StudentId, TeacherId};
use tutorhub_database::DatabasePool;
use tutorhub_database::migration::run_migrations;
use tutorhub_database::repositories::{MaterialRepository, VisibilityRepository};
use tutorhub_database::store::{MaterialStore, VisibilityStore, VisibilityTx};
use tutorhub_entity::material::{MaterialKind, NewMaterial, TreeLink};
use tutorhub_service::access::{AccessChange, AccessPropagationEngine};

/// Environment variable holding the test database URL.
pub const DATABASE_URL_VAR: &str = "TUTORHUB_TEST_DATABASE_URL";

/// Repositories and engine over a private, migrated schema.
pub struct PgFixture {
    /// Pool whose sessions resolve names in the test schema.
    pub pool: PgPool,
    /// Material repository.
    pub materials: Arc<MaterialRepository>,
    /// Visibility repository.
    pub visibility: Arc<VisibilityRepository>,
    /// Engine over `visibility`.
    pub engine: AccessPropagationEngine,
    url: String,
    schema: String,
}

impl PgFixture {
    /// Fixture with a generous tree-lock wait.
    pub async fn new() -> Option<Self> {
        Self::with_lock_timeout(10_000).await
    }

    /// Fixture whose sessions give up on a tree lock after `lock_timeout_ms`.
    pub async fn with_lock_timeout(lock_timeout_ms: u64) -> Option<Self> {
        let Ok(url) = std::env::var(DATABASE_URL_VAR) else {
            eprintln!("{DATABASE_URL_VAR} is not set, skipping PostgreSQL test");
            return None;
        };

        let schema = format!("tutorhub_test_{}", Uuid::new_v4().simple());
        let admin = PgPool::connect(&url)
            .await
            .expect("Failed to connect to test database");
        let ddl = format!("CREATE SCHEMA {schema}");
        sqlx::raw_sql(&ddl)
            .execute(&admin)
            .await
            .expect("Failed to create test schema");
        admin.close().await;

        let config = DatabaseConfig {
            url: url.clone(),
            schema: Some(schema.clone()),
            max_connections: 8,
            min_connections: 0,
            lock_timeout_ms,
            ..DatabaseConfig::default()
        };
        let pool = DatabasePool::connect(&config)
            .await
            .expect("Failed to open test pool")
            .into_pool();
        run_migrations(&pool).await.expect("Failed to run migrations");

        // Tree locks are keyed by material id across the whole database, so
        // each schema draws ids from its own range.
        let first_id = (Uuid::new_v4().as_u128() % 1_000_000_000) as i64 + 1;
        let restart = format!("ALTER SEQUENCE materials_id_seq RESTART WITH {first_id}");
        sqlx::raw_sql(&restart)
            .execute(&pool)
            .await
            .expect("Failed to offset material ids");

        let materials = Arc::new(MaterialRepository::new(pool.clone()));
        let visibility = Arc::new(VisibilityRepository::new(pool.clone()));
        let engine = AccessPropagationEngine::new(visibility.clone());

        Some(Self {
            pool,
            materials,
            visibility,
            engine,
            url,
            schema,
        })
    }

    /// Close the pool and drop the schema.
    pub async fn teardown(self) {
        self.pool.close().await;
        let admin = PgPool::connect(&self.url)
            .await
            .expect("Failed to connect to test database");
        let ddl = format!("DROP SCHEMA {} CASCADE", self.schema);
        sqlx::raw_sql(&ddl)
            .execute(&admin)
            .await
            .expect("Failed to drop test schema");
        admin.close().await;
    }

    pub async fn folder(&self, name: &str, parent_id: Option<MaterialId>) -> MaterialId {
        self.create(name, MaterialKind::Folder, parent_id).await
    }

    pub async fn file(&self, name: &str, parent_id: Option<MaterialId>) -> MaterialId {
        self.create(name, MaterialKind::File, parent_id).await
    }

    async fn create(
        &self,
        name: &str,
        kind: MaterialKind,
        parent_id: Option<MaterialId>,
    ) -> MaterialId {
        let storage_locator = (kind == MaterialKind::File).then(|| format!("/files/{name}"));
        self.materials
            .create(&NewMaterial {
                name: name.to_string(),
                kind,
                parent_id,
                owner_teacher_id: TeacherId::new(1),
                storage_locator,
            })
            .await
            .expect("Failed to create material")
            .id
    }

    /// Students granted on a material.
    pub async fn granted(&self, material_id: MaterialId) -> BTreeSet<StudentId> {
        VisibilityStore::student_ids(self.visibility.as_ref(), material_id)
            .await
            .expect("Failed to read grants")
    }

    /// Apply a desired student set through the engine.
    pub async fn set(&self, material_id: MaterialId, raw: &[i64]) -> AccessChange {
        self.engine
            .set_access(material_id, &students(raw))
            .await
            .expect("set_access failed")
    }

    /// Total grant rows in the schema.
    pub async fn grant_rows(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM material_visibility")
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count grants")
    }

    /// Wait until some session is queued on the tree lock keyed by `key`.
    pub async fn wait_for_lock_waiter(&self, key: MaterialId) {
        for _ in 0..250 {
            let waiting: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM pg_locks \
                 WHERE locktype = 'advisory' AND NOT granted AND objsubid = 1 \
                   AND ((classid::BIGINT << 32) | objid::BIGINT) = $1",
            )
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .expect("Failed to inspect pg_locks");
            if waiting > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("no session ever waited on the tree lock");
    }
}

pub fn students(raw: &[i64]) -> BTreeSet<StudentId> {
    raw.iter().copied().map(StudentId::new).collect()
}

/// Visibility store whose transactions fail on the n-th grant call.
#[derive(Debug)]
pub struct FailingVisibility {
    pub inner: Arc<VisibilityRepository>,
    pub fail_on_grant: usize,
}

struct FailingTx {
    inner: Box<dyn VisibilityTx>,
    grants: usize,
    fail_on_grant: usize,
}

#[async_trait]
impl VisibilityStore for FailingVisibility {
    async fn begin(&self) -> AppResult<Box<dyn VisibilityTx>> {
        Ok(Box::new(FailingTx {
            inner: self.inner.begin().await?,
            grants: 0,
            fail_on_grant: self.fail_on_grant,
        }))
    }

    async fn student_ids(&self, material_id: MaterialId) -> AppResult<BTreeSet<StudentId>> {
        VisibilityStore::student_ids(self.inner.as_ref(), material_id).await
    }

    async fn visible_among(
        &self,
        student_id: StudentId,
        candidates: &[MaterialId],
    ) -> AppResult<std::collections::HashSet<MaterialId>> {
        self.inner.visible_among(student_id, candidates).await
    }
}

#[async_trait]
impl VisibilityTx for FailingTx {
    async fn ancestry_links(&mut self, id: MaterialId) -> AppResult<Vec<TreeLink>> {
        self.inner.ancestry_links(id).await
    }

    async fn subtree_links(&mut self, root: MaterialId) -> AppResult<Vec<TreeLink>> {
        self.inner.subtree_links(root).await
    }

    async fn lock_tree(&mut self, tree_root: MaterialId) -> AppResult<()> {
        self.inner.lock_tree(tree_root).await
    }

    async fn student_ids(&mut self, material_id: MaterialId) -> AppResult<BTreeSet<StudentId>> {
        self.inner.student_ids(material_id).await
    }

    async fn grant(&mut self, materials: &[MaterialId], students: &[StudentId]) -> AppResult<u64> {
        self.grants += 1;
        if self.grants == self.fail_on_grant {
            return Err(AppError::database("connection reset during grant"));
        }
        self.inner.grant(materials, students).await
    }

    async fn revoke(
        &mut self,
        materials: &[MaterialId],
        students: &[StudentId],
    ) -> AppResult<u64> {
        self.inner.revoke(materials, students).await
    }

    async fn commit(&mut self) -> AppResult<()> {
        self.inner.commit().await
    }
}
