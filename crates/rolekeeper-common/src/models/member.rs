//! Member model: what the platform tells us about people and roles in a guild.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{GuildId, RoleId, UserId};
use crate::nickname;

/// A guild member as reported by the platform at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub user_id: UserId,
    pub guild_id: GuildId,

    /// Immutable account handle
    pub username: String,

    /// Account-wide display name, if the user set one
    pub global_name: Option<String>,

    /// Guild-specific nickname
    pub nickname: Option<String>,

    /// Role IDs assigned to this member
    pub role_ids: BTreeSet<RoleId>,

    pub is_bot: bool,
}

impl MemberSnapshot {
    pub fn new(guild_id: GuildId, user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            guild_id,
            username: username.into(),
            global_name: None,
            nickname: None,
            role_ids: BTreeSet::new(),
            is_bot: false,
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = RoleId>) -> Self {
        self.role_ids.extend(roles);
        self
    }

    /// The name shown in the guild: nickname, then global name, then username.
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .or(self.global_name.as_deref())
            .unwrap_or(&self.username)
    }

    pub fn has_role(&self, role: RoleId) -> bool {
        self.role_ids.contains(&role)
    }

    /// Render a nickname rule for this member.
    pub fn formatted_nickname(&self, format: &str) -> String {
        nickname::format_nickname(format, &self.username, self.display_name())
    }
}

/// The user running a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub username: String,
    pub role_ids: BTreeSet<RoleId>,

    /// Guild administrators bypass delegated-permission checks
    pub is_admin: bool,
}

impl Actor {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            role_ids: BTreeSet::new(),
            is_admin: false,
        }
    }

    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = RoleId>) -> Self {
        self.role_ids.extend(roles);
        self
    }
}

/// A role as listed by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildRole {
    pub id: RoleId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_nickname_then_global_name() {
        let mut member = MemberSnapshot::new(GuildId(1), UserId(2), "sam");
        assert_eq!(member.display_name(), "sam");

        member.global_name = Some("Samantha".into());
        assert_eq!(member.display_name(), "Samantha");

        member.nickname = Some("Sam!".into());
        assert_eq!(member.display_name(), "Sam!");
    }

    #[test]
    fn formatted_nickname_uses_member_identity() {
        let member = MemberSnapshot::new(GuildId(1), UserId(2), "sam").with_nickname("[OLD] Sam");
        assert_eq!(member.formatted_nickname("{display_name} ({username})"), "Sam (sam)");
    }
}
