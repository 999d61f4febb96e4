//! Delegated role permission repository.

use rolekeeper_common::models::{DelegatedPermission, GuildId, RoleId};
use sqlx::PgPool;
use std::collections::BTreeSet;

/// Allow `manager_role_id` to manage `managed_role_id`. No-op if already allowed.
pub async fn grant(
    pool: &PgPool,
    guild_id: GuildId,
    manager_role_id: RoleId,
    managed_role_id: RoleId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO delegated_role_permissions (guild_id, manager_role_id, managed_role_id)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(guild_id)
    .bind(manager_role_id)
    .bind(managed_role_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Withdraw a delegated permission. No-op if it does not exist.
pub async fn revoke(
    pool: &PgPool,
    guild_id: GuildId,
    manager_role_id: RoleId,
    managed_role_id: RoleId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        DELETE FROM delegated_role_permissions
        WHERE guild_id = $1 AND manager_role_id = $2 AND managed_role_id = $3
        "#,
    )
    .bind(guild_id)
    .bind(manager_role_id)
    .bind(managed_role_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// List all delegated permissions in a guild.
pub async fn list_all(
    pool: &PgPool,
    guild_id: GuildId,
) -> Result<Vec<DelegatedPermission>, sqlx::Error> {
    sqlx::query_as::<_, DelegatedPermission>(
        r#"
        SELECT guild_id, manager_role_id, managed_role_id
        FROM delegated_role_permissions
        WHERE guild_id = $1
        ORDER BY manager_role_id, managed_role_id
        "#,
    )
    .bind(guild_id)
    .fetch_all(pool)
    .await
}

/// Roles that holders of any of `user_role_ids` may manage.
///
/// An empty role list never touches the database.
pub async fn manageable_roles(
    pool: &PgPool,
    guild_id: GuildId,
    user_role_ids: &[RoleId],
) -> Result<BTreeSet<RoleId>, sqlx::Error> {
    if user_role_ids.is_empty() {
        return Ok(BTreeSet::new());
    }
    let manager_ids: Vec<i64> = user_role_ids.iter().map(|r| r.0).collect();

    let rows = sqlx::query_scalar::<_, RoleId>(
        r#"
        SELECT DISTINCT managed_role_id
        FROM delegated_role_permissions
        WHERE guild_id = $1 AND manager_role_id = ANY($2)
        "#,
    )
    .bind(guild_id)
    .bind(manager_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Delete every permission where the role is manager or managed.
pub async fn purge_role(
    pool: &PgPool,
    guild_id: GuildId,
    role_id: RoleId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM delegated_role_permissions
        WHERE guild_id = $1 AND (manager_role_id = $2 OR managed_role_id = $2)
        "#,
    )
    .bind(guild_id)
    .bind(role_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
