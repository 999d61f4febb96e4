//! Recording platform double for engine tests.

use async_trait::async_trait;
use rolekeeper_common::models::{GuildId, GuildRole, MemberSnapshot, RoleId, UserId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::platform::{GuildPlatform, PlatformError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    AddRoles {
        user: UserId,
        roles: Vec<RoleId>,
        reason: String,
    },
    RemoveRoles {
        user: UserId,
        roles: Vec<RoleId>,
        reason: String,
    },
    SetNickname {
        user: UserId,
        nickname: Option<String>,
    },
}

#[derive(Default)]
struct State {
    roles: BTreeMap<GuildId, Vec<GuildRole>>,
    members: BTreeMap<GuildId, Vec<MemberSnapshot>>,
    calls: Vec<PlatformCall>,
    forbidden: BTreeSet<UserId>,
    unreachable: BTreeSet<GuildId>,
}

#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<State>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_role(self, guild: GuildId, id: i64, name: &str) -> Self {
        self.state().roles.entry(guild).or_default().push(GuildRole {
            id: RoleId(id),
            name: name.to_string(),
        });
        self
    }

    pub fn with_member(self, member: MemberSnapshot) -> Self {
        self.state()
            .members
            .entry(member.guild_id)
            .or_default()
            .push(member);
        self
    }

    /// Every mutation touching `user` fails with `Forbidden`.
    pub fn forbid(self, user: UserId) -> Self {
        self.state().forbidden.insert(user);
        self
    }

    /// Every read of `guild` fails.
    pub fn unreachable(self, guild: GuildId) -> Self {
        self.state().unreachable.insert(guild);
        self
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.state().calls.clone()
    }

    fn check_guild(&self, guild: GuildId) -> Result<(), PlatformError> {
        if self.state().unreachable.contains(&guild) {
            return Err(PlatformError::Other(format!("guild {guild} unreachable")));
        }
        Ok(())
    }

    fn record(&self, user: UserId, call: PlatformCall) -> Result<(), PlatformError> {
        let mut state = self.state();
        if state.forbidden.contains(&user) {
            return Err(PlatformError::Forbidden("role hierarchy".into()));
        }
        state.calls.push(call);
        Ok(())
    }
}

#[async_trait]
impl GuildPlatform for FakePlatform {
    async fn guilds(&self) -> Result<Vec<GuildId>, PlatformError> {
        let state = self.state();
        let guilds: BTreeSet<GuildId> = state
            .roles
            .keys()
            .chain(state.members.keys())
            .chain(state.unreachable.iter())
            .copied()
            .collect();
        Ok(guilds.into_iter().collect())
    }

    async fn roles(&self, guild: GuildId) -> Result<Vec<GuildRole>, PlatformError> {
        self.check_guild(guild)?;
        Ok(self.state().roles.get(&guild).cloned().unwrap_or_default())
    }

    async fn members(&self, guild: GuildId) -> Result<Vec<MemberSnapshot>, PlatformError> {
        self.check_guild(guild)?;
        Ok(self.state().members.get(&guild).cloned().unwrap_or_default())
    }

    async fn add_roles(
        &self,
        _guild: GuildId,
        user: UserId,
        roles: &[RoleId],
        reason: &str,
    ) -> Result<(), PlatformError> {
        self.record(
            user,
            PlatformCall::AddRoles {
                user,
                roles: roles.to_vec(),
                reason: reason.to_string(),
            },
        )
    }

    async fn remove_roles(
        &self,
        _guild: GuildId,
        user: UserId,
        roles: &[RoleId],
        reason: &str,
    ) -> Result<(), PlatformError> {
        self.record(
            user,
            PlatformCall::RemoveRoles {
                user,
                roles: roles.to_vec(),
                reason: reason.to_string(),
            },
        )
    }

    async fn set_nickname(
        &self,
        _guild: GuildId,
        user: UserId,
        nickname: Option<&str>,
    ) -> Result<(), PlatformError> {
        self.record(
            user,
            PlatformCall::SetNickname {
                user,
                nickname: nickname.map(str::to_string),
            },
        )
    }
}
