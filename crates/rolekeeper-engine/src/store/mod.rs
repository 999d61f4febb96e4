//! Storage seams.
//!
//! One trait per stored entity. [`postgres`] implements them for the pooled
//! [`rolekeeper_db::Database`]; [`memory::MemoryStore`] keeps everything in
//! process for tests and dry runs.
//!
//! Stores only read and write rows. Closure, conflict, and grant logic live in
//! the engine modules on top of them.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rolekeeper_common::error::KeeperResult;
use rolekeeper_common::models::{
    DelegatedPermission, ExclusivityGroupMembership, GuildId, NicknameHistoryEntry, NicknameRule,
    RoleDependency, RoleId, UserId,
};
use std::collections::BTreeSet;

pub use memory::MemoryStore;

/// (guild, role) → nickname format.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Upsert; an existing format is overwritten.
    async fn set_rule(&self, guild: GuildId, role: RoleId, format: &str) -> KeeperResult<()>;

    /// Returns whether a rule was deleted.
    async fn remove_rule(&self, guild: GuildId, role: RoleId) -> KeeperResult<bool>;

    async fn get_rule(&self, guild: GuildId, role: RoleId) -> KeeperResult<Option<NicknameRule>>;

    async fn all_rules(&self, guild: GuildId) -> KeeperResult<Vec<NicknameRule>>;
}

/// (member, guild, role) → nickname before the rule fired.
#[async_trait]
pub trait HistoryLedger: Send + Sync {
    /// Upsert; last write wins and the timestamp is refreshed.
    async fn save_history(
        &self,
        user: UserId,
        guild: GuildId,
        role: RoleId,
        previous_nickname: Option<&str>,
    ) -> KeeperResult<()>;

    async fn get_history(
        &self,
        user: UserId,
        guild: GuildId,
        role: RoleId,
    ) -> KeeperResult<Option<NicknameHistoryEntry>>;

    async fn delete_history(&self, user: UserId, guild: GuildId, role: RoleId) -> KeeperResult<()>;

    /// Delete every entry for a role. Returns the number removed.
    async fn purge_history(&self, guild: GuildId, role: RoleId) -> KeeperResult<u64>;

    /// Roles that still have at least one entry.
    async fn history_roles(&self, guild: GuildId) -> KeeperResult<Vec<RoleId>>;
}

/// manager role → managed role grants.
#[async_trait]
pub trait DelegationStore: Send + Sync {
    /// Idempotent.
    async fn grant_permission(
        &self,
        guild: GuildId,
        manager: RoleId,
        managed: RoleId,
    ) -> KeeperResult<()>;

    /// Idempotent.
    async fn revoke_permission(
        &self,
        guild: GuildId,
        manager: RoleId,
        managed: RoleId,
    ) -> KeeperResult<()>;

    async fn all_permissions(&self, guild: GuildId) -> KeeperResult<Vec<DelegatedPermission>>;

    /// Distinct managed roles over every grant whose manager is in
    /// `user_roles`. Empty input yields an empty set without a lookup.
    async fn manageable_roles(
        &self,
        guild: GuildId,
        user_roles: &[RoleId],
    ) -> KeeperResult<BTreeSet<RoleId>>;

    /// Delete grants where the role is manager or managed.
    async fn purge_permissions(&self, guild: GuildId, role: RoleId) -> KeeperResult<u64>;
}

/// role → exclusivity group name.
#[async_trait]
pub trait ExclusivityStore: Send + Sync {
    /// Upsert; the name is case-folded and re-adding moves the role.
    async fn add_to_group(&self, guild: GuildId, group_name: &str, role: RoleId)
    -> KeeperResult<()>;

    /// Returns whether the role was in a group.
    async fn remove_from_group(&self, guild: GuildId, role: RoleId) -> KeeperResult<bool>;

    async fn all_group_memberships(
        &self,
        guild: GuildId,
    ) -> KeeperResult<Vec<ExclusivityGroupMembership>>;

    /// Every role sharing `role`'s group, `role` included, ascending by id.
    /// Empty when the role has no group.
    async fn group_peers(&self, guild: GuildId, role: RoleId) -> KeeperResult<Vec<RoleId>>;
}

/// role → required role edges.
#[async_trait]
pub trait DependencyStore: Send + Sync {
    /// Idempotent.
    async fn add_dependency(&self, guild: GuildId, role: RoleId, requires: RoleId)
    -> KeeperResult<()>;

    /// Returns whether the edge existed.
    async fn remove_dependency(
        &self,
        guild: GuildId,
        role: RoleId,
        requires: RoleId,
    ) -> KeeperResult<bool>;

    async fn all_dependencies(&self, guild: GuildId) -> KeeperResult<Vec<RoleDependency>>;

    /// Delete every edge touching the role.
    async fn purge_dependencies(&self, guild: GuildId, role: RoleId) -> KeeperResult<u64>;
}

/// Everything the engine needs from storage.
pub trait Store: RuleStore + HistoryLedger + DelegationStore + ExclusivityStore + DependencyStore {}

impl<T> Store for T where
    T: RuleStore + HistoryLedger + DelegationStore + ExclusivityStore + DependencyStore
{
}
