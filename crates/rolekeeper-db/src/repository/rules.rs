//! Nickname rule repository.

use rolekeeper_common::models::{GuildId, NicknameRule, RoleId};
use sqlx::PgPool;

/// Create a rule, or replace the format of an existing one.
pub async fn set_rule(
    pool: &PgPool,
    guild_id: GuildId,
    role_id: RoleId,
    nickname_format: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO nickname_configs (guild_id, role_id, nickname_format)
        VALUES ($1, $2, $3)
        ON CONFLICT (guild_id, role_id)
        DO UPDATE SET nickname_format = EXCLUDED.nickname_format
        "#,
    )
    .bind(guild_id)
    .bind(role_id)
    .bind(nickname_format)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete a rule. Returns whether a row was removed.
pub async fn remove_rule(
    pool: &PgPool,
    guild_id: GuildId,
    role_id: RoleId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM nickname_configs WHERE guild_id = $1 AND role_id = $2")
        .bind(guild_id)
        .bind(role_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Find the rule for a role.
pub async fn get_rule(
    pool: &PgPool,
    guild_id: GuildId,
    role_id: RoleId,
) -> Result<Option<NicknameRule>, sqlx::Error> {
    sqlx::query_as::<_, NicknameRule>(
        "SELECT guild_id, role_id, nickname_format FROM nickname_configs WHERE guild_id = $1 AND role_id = $2",
    )
    .bind(guild_id)
    .bind(role_id)
    .fetch_optional(pool)
    .await
}

/// List all rules in a guild.
pub async fn list_rules(pool: &PgPool, guild_id: GuildId) -> Result<Vec<NicknameRule>, sqlx::Error> {
    sqlx::query_as::<_, NicknameRule>(
        "SELECT guild_id, role_id, nickname_format FROM nickname_configs WHERE guild_id = $1 ORDER BY role_id",
    )
    .bind(guild_id)
    .fetch_all(pool)
    .await
}
