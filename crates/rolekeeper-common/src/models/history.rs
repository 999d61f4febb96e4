//! Nickname history: what a member was called before a rule renamed them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GuildId, RoleId, UserId};

/// The nickname a member had right before a rule-triggered rename.
///
/// At most one entry exists per (user, guild, role); saving again overwrites
/// the nickname and refreshes the timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NicknameHistoryEntry {
    pub user_id: UserId,
    pub guild_id: GuildId,
    pub role_id: RoleId,

    /// `None` when the member had no guild nickname
    pub previous_nickname: Option<String>,

    pub timestamp: DateTime<Utc>,
}
