//! Role dependency repository.

use rolekeeper_common::models::{GuildId, RoleDependency, RoleId};
use sqlx::PgPool;

/// Record that `role_id` requires `required_role_id`. No-op if already recorded.
pub async fn add(
    pool: &PgPool,
    guild_id: GuildId,
    role_id: RoleId,
    required_role_id: RoleId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO role_dependencies (guild_id, role_id, required_role_id)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(guild_id)
    .bind(role_id)
    .bind(required_role_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Drop a dependency edge. Returns whether it existed.
pub async fn remove(
    pool: &PgPool,
    guild_id: GuildId,
    role_id: RoleId,
    required_role_id: RoleId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM role_dependencies WHERE guild_id = $1 AND role_id = $2 AND required_role_id = $3",
    )
    .bind(guild_id)
    .bind(role_id)
    .bind(required_role_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// List every dependency edge in a guild.
pub async fn list_all(pool: &PgPool, guild_id: GuildId) -> Result<Vec<RoleDependency>, sqlx::Error> {
    sqlx::query_as::<_, RoleDependency>(
        r#"
        SELECT guild_id, role_id, required_role_id
        FROM role_dependencies
        WHERE guild_id = $1
        ORDER BY role_id, required_role_id
        "#,
    )
    .bind(guild_id)
    .fetch_all(pool)
    .await
}

/// Delete every edge touching a role, on either end.
pub async fn purge_role(
    pool: &PgPool,
    guild_id: GuildId,
    role_id: RoleId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM role_dependencies WHERE guild_id = $1 AND (role_id = $2 OR required_role_id = $2)",
    )
    .bind(guild_id)
    .bind(role_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
