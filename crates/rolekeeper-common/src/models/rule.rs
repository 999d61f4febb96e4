//! Nickname rule model: a role that renames whoever receives it.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{GuildId, RoleId};
use crate::validation::validate_nickname_format;

/// Placeholder replaced by the member's immutable username.
pub const USERNAME_PLACEHOLDER: &str = "{username}";

/// Placeholder replaced by the member's display name, minus any leading `[TAG]`.
pub const DISPLAY_NAME_PLACEHOLDER: &str = "{display_name}";

/// A nickname rule, unique per (guild, role).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NicknameRule {
    pub guild_id: GuildId,
    pub role_id: RoleId,

    /// Format string containing `{username}` and/or `{display_name}`
    pub nickname_format: String,
}

impl NicknameRule {
    pub fn new(guild_id: GuildId, role_id: RoleId, nickname_format: impl Into<String>) -> Self {
        Self {
            guild_id,
            role_id,
            nickname_format: nickname_format.into(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetRuleRequest {
    pub role_id: RoleId,

    #[validate(
        length(min = 1, max = 100, message = "Format must be 1-100 characters"),
        custom(function = "validate_nickname_format")
    )]
    pub nickname_format: String,
}
