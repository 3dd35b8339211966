//! Tree queries shared by the material and visibility repositories.
//!
//! All functions run on a borrowed connection so callers can compose them
//! inside one transaction.

use sqlx::PgConnection;

use tutorhub_core::result::AppResult;
use tutorhub_core::types::MaterialId;
use tutorhub_entity::material::{Material, TreeLink};

use super::db_error;

/// Edges from `id` up to its root, unordered. Empty when `id` is unknown.
pub async fn ancestry_links(conn: &mut PgConnection, id: MaterialId) -> AppResult<Vec<TreeLink>> {
    sqlx::query_as::<_, TreeLink>(
        "WITH RECURSIVE chain AS ( \
            SELECT id, parent_id FROM materials WHERE id = $1 \
            UNION \
            SELECT m.id, m.parent_id FROM materials m \
            INNER JOIN chain c ON m.id = c.parent_id \
         ) SELECT id, parent_id FROM chain",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error("Failed to load material ancestry"))
}

/// Edges of the subtree rooted at `root`, root included.
pub async fn subtree_links(conn: &mut PgConnection, root: MaterialId) -> AppResult<Vec<TreeLink>> {
    sqlx::query_as::<_, TreeLink>(
        "WITH RECURSIVE tree AS ( \
            SELECT id, parent_id FROM materials WHERE id = $1 \
            UNION \
            SELECT m.id, m.parent_id FROM materials m \
            INNER JOIN tree t ON m.parent_id = t.id \
         ) SELECT id, parent_id FROM tree ORDER BY id ASC",
    )
    .bind(root)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error("Failed to load material subtree"))
}

/// The root of the tree `id` belongs to, or `None` when `id` is unknown.
pub async fn tree_root(conn: &mut PgConnection, id: MaterialId) -> AppResult<Option<MaterialId>> {
    let links = ancestry_links(conn, id).await?;
    Ok(links
        .iter()
        .find(|link| link.parent_id.is_none())
        .or(links.last())
        .map(|link| link.id))
}

/// Rows of the subtree rooted at `root`, root included, in id order.
pub async fn subtree_rows(conn: &mut PgConnection, root: MaterialId) -> AppResult<Vec<Material>> {
    sqlx::query_as::<_, Material>(
        "WITH RECURSIVE tree AS ( \
            SELECT * FROM materials WHERE id = $1 \
            UNION \
            SELECT m.* FROM materials m INNER JOIN tree t ON m.parent_id = t.id \
         ) SELECT * FROM tree ORDER BY id ASC",
    )
    .bind(root)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error("Failed to load material subtree"))
}

/// Take a transaction-scoped advisory lock keyed by the tree root.
pub async fn lock_tree(conn: &mut PgConnection, tree_root: MaterialId) -> AppResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(tree_root)
        .execute(&mut *conn)
        .await
        .map_err(db_error("Failed to lock material tree"))?;
    Ok(())
}

/// Take a session-level advisory lock keyed by the tree root. Conflicts
/// with [`lock_tree`] on the same key. Held until [`unlock_tree_session`]
/// or until the session ends.
pub async fn lock_tree_session(conn: &mut PgConnection, tree_root: MaterialId) -> AppResult<()> {
    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(tree_root)
        .execute(&mut *conn)
        .await
        .map_err(db_error("Failed to lock material tree"))?;
    Ok(())
}

/// Release a lock taken with [`lock_tree_session`]. Returns whether it was held.
pub async fn unlock_tree_session(
    conn: &mut PgConnection,
    tree_root: MaterialId,
) -> AppResult<bool> {
    sqlx::query_scalar::<_, bool>("SELECT pg_advisory_unlock($1)")
        .bind(tree_root)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error("Failed to unlock material tree"))
}
