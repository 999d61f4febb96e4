//! Nickname history repository.

use rolekeeper_common::models::{GuildId, NicknameHistoryEntry, RoleId, UserId};
use sqlx::PgPool;

/// Record the nickname a member had before a rule renamed them.
/// Overwrites any previous entry for the same role and refreshes its timestamp.
pub async fn save(
    pool: &PgPool,
    user_id: UserId,
    guild_id: GuildId,
    role_id: RoleId,
    previous_nickname: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO nickname_history (user_id, guild_id, role_id, previous_nickname, timestamp)
        VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT (user_id, guild_id, role_id)
        DO UPDATE SET previous_nickname = EXCLUDED.previous_nickname, timestamp = NOW()
        "#,
    )
    .bind(user_id)
    .bind(guild_id)
    .bind(role_id)
    .bind(previous_nickname)
    .execute(pool)
    .await?;
    Ok(())
}

/// Find the saved nickname for a (member, role) pair.
pub async fn get(
    pool: &PgPool,
    user_id: UserId,
    guild_id: GuildId,
    role_id: RoleId,
) -> Result<Option<NicknameHistoryEntry>, sqlx::Error> {
    sqlx::query_as::<_, NicknameHistoryEntry>(
        r#"
        SELECT user_id, guild_id, role_id, previous_nickname, timestamp
        FROM nickname_history
        WHERE user_id = $1 AND guild_id = $2 AND role_id = $3
        "#,
    )
    .bind(user_id)
    .bind(guild_id)
    .bind(role_id)
    .fetch_optional(pool)
    .await
}

/// Delete a history entry after it has been consumed.
pub async fn delete(
    pool: &PgPool,
    user_id: UserId,
    guild_id: GuildId,
    role_id: RoleId,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM nickname_history WHERE user_id = $1 AND guild_id = $2 AND role_id = $3")
        .bind(user_id)
        .bind(guild_id)
        .bind(role_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete every entry recorded for a role. Returns the number of rows removed.
pub async fn purge_role(
    pool: &PgPool,
    guild_id: GuildId,
    role_id: RoleId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM nickname_history WHERE guild_id = $1 AND role_id = $2")
        .bind(guild_id)
        .bind(role_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Distinct roles that still have history in a guild.
pub async fn referenced_roles(pool: &PgPool, guild_id: GuildId) -> Result<Vec<RoleId>, sqlx::Error> {
    sqlx::query_scalar::<_, RoleId>(
        "SELECT DISTINCT role_id FROM nickname_history WHERE guild_id = $1 ORDER BY role_id",
    )
    .bind(guild_id)
    .fetch_all(pool)
    .await
}
