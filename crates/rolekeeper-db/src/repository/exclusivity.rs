//! Exclusivity group repository.

use rolekeeper_common::models::{ExclusivityGroupMembership, GuildId, RoleId};
use sqlx::PgPool;

/// Put a role in a group, moving it out of any group it was in before.
/// `group_name` must already be normalized.
pub async fn add(
    pool: &PgPool,
    guild_id: GuildId,
    group_name: &str,
    role_id: RoleId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO role_exclusivity_groups (guild_id, group_name, role_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (guild_id, role_id)
        DO UPDATE SET group_name = EXCLUDED.group_name
        "#,
    )
    .bind(guild_id)
    .bind(group_name)
    .bind(role_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Take a role out of its group. Returns whether it was in one.
pub async fn remove(pool: &PgPool, guild_id: GuildId, role_id: RoleId) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM role_exclusivity_groups WHERE guild_id = $1 AND role_id = $2")
            .bind(guild_id)
            .bind(role_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// List all group memberships in a guild, ordered by group then role.
pub async fn list_all(
    pool: &PgPool,
    guild_id: GuildId,
) -> Result<Vec<ExclusivityGroupMembership>, sqlx::Error> {
    sqlx::query_as::<_, ExclusivityGroupMembership>(
        r#"
        SELECT guild_id, group_name, role_id
        FROM role_exclusivity_groups
        WHERE guild_id = $1
        ORDER BY group_name, role_id
        "#,
    )
    .bind(guild_id)
    .fetch_all(pool)
    .await
}

/// Every role in the same group as `role_id`, the role itself included.
/// Empty when the role is in no group.
pub async fn group_peers(
    pool: &PgPool,
    guild_id: GuildId,
    role_id: RoleId,
) -> Result<Vec<RoleId>, sqlx::Error> {
    sqlx::query_scalar::<_, RoleId>(
        r#"
        SELECT role_id FROM role_exclusivity_groups
        WHERE guild_id = $1 AND group_name = (
            SELECT group_name FROM role_exclusivity_groups WHERE guild_id = $1 AND role_id = $2
        )
        ORDER BY role_id
        "#,
    )
    .bind(guild_id)
    .bind(role_id)
    .fetch_all(pool)
    .await
}
