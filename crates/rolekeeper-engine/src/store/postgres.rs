//! Store traits over the PostgreSQL repositories.

use async_trait::async_trait;
use rolekeeper_common::error::KeeperResult;
use rolekeeper_common::models::{
    DelegatedPermission, ExclusivityGroupMembership, GuildId, NicknameHistoryEntry, NicknameRule,
    RoleDependency, RoleId, UserId, normalize_group_name,
};
use rolekeeper_db::Database;
use rolekeeper_db::repository::{delegations, dependencies, exclusivity, history, rules};
use std::collections::BTreeSet;

use super::{DelegationStore, DependencyStore, ExclusivityStore, HistoryLedger, RuleStore};

#[async_trait]
impl RuleStore for Database {
    async fn set_rule(&self, guild: GuildId, role: RoleId, format: &str) -> KeeperResult<()> {
        rules::set_rule(&self.pg, guild, role, format).await?;
        Ok(())
    }

    async fn remove_rule(&self, guild: GuildId, role: RoleId) -> KeeperResult<bool> {
        Ok(rules::remove_rule(&self.pg, guild, role).await?)
    }

    async fn get_rule(&self, guild: GuildId, role: RoleId) -> KeeperResult<Option<NicknameRule>> {
        Ok(rules::get_rule(&self.pg, guild, role).await?)
    }

    async fn all_rules(&self, guild: GuildId) -> KeeperResult<Vec<NicknameRule>> {
        Ok(rules::list_rules(&self.pg, guild).await?)
    }
}

#[async_trait]
impl HistoryLedger for Database {
    async fn save_history(
        &self,
        user: UserId,
        guild: GuildId,
        role: RoleId,
        previous_nickname: Option<&str>,
    ) -> KeeperResult<()> {
        history::save(&self.pg, user, guild, role, previous_nickname).await?;
        Ok(())
    }

    async fn get_history(
        &self,
        user: UserId,
        guild: GuildId,
        role: RoleId,
    ) -> KeeperResult<Option<NicknameHistoryEntry>> {
        Ok(history::get(&self.pg, user, guild, role).await?)
    }

    async fn delete_history(&self, user: UserId, guild: GuildId, role: RoleId) -> KeeperResult<()> {
        history::delete(&self.pg, user, guild, role).await?;
        Ok(())
    }

    async fn purge_history(&self, guild: GuildId, role: RoleId) -> KeeperResult<u64> {
        Ok(history::purge_role(&self.pg, guild, role).await?)
    }

    async fn history_roles(&self, guild: GuildId) -> KeeperResult<Vec<RoleId>> {
        Ok(history::referenced_roles(&self.pg, guild).await?)
    }
}

#[async_trait]
impl DelegationStore for Database {
    async fn grant_permission(
        &self,
        guild: GuildId,
        manager: RoleId,
        managed: RoleId,
    ) -> KeeperResult<()> {
        delegations::grant(&self.pg, guild, manager, managed).await?;
        Ok(())
    }

    async fn revoke_permission(
        &self,
        guild: GuildId,
        manager: RoleId,
        managed: RoleId,
    ) -> KeeperResult<()> {
        delegations::revoke(&self.pg, guild, manager, managed).await?;
        Ok(())
    }

    async fn all_permissions(&self, guild: GuildId) -> KeeperResult<Vec<DelegatedPermission>> {
        Ok(delegations::list_all(&self.pg, guild).await?)
    }

    async fn manageable_roles(
        &self,
        guild: GuildId,
        user_roles: &[RoleId],
    ) -> KeeperResult<BTreeSet<RoleId>> {
        Ok(delegations::manageable_roles(&self.pg, guild, user_roles).await?)
    }

    async fn purge_permissions(&self, guild: GuildId, role: RoleId) -> KeeperResult<u64> {
        Ok(delegations::purge_role(&self.pg, guild, role).await?)
    }
}

#[async_trait]
impl ExclusivityStore for Database {
    async fn add_to_group(
        &self,
        guild: GuildId,
        group_name: &str,
        role: RoleId,
    ) -> KeeperResult<()> {
        exclusivity::add(&self.pg, guild, &normalize_group_name(group_name), role).await?;
        Ok(())
    }

    async fn remove_from_group(&self, guild: GuildId, role: RoleId) -> KeeperResult<bool> {
        Ok(exclusivity::remove(&self.pg, guild, role).await?)
    }

    async fn all_group_memberships(
        &self,
        guild: GuildId,
    ) -> KeeperResult<Vec<ExclusivityGroupMembership>> {
        Ok(exclusivity::list_all(&self.pg, guild).await?)
    }

    async fn group_peers(&self, guild: GuildId, role: RoleId) -> KeeperResult<Vec<RoleId>> {
        Ok(exclusivity::group_peers(&self.pg, guild, role).await?)
    }
}

#[async_trait]
impl DependencyStore for Database {
    async fn add_dependency(
        &self,
        guild: GuildId,
        role: RoleId,
        requires: RoleId,
    ) -> KeeperResult<()> {
        dependencies::add(&self.pg, guild, role, requires).await?;
        Ok(())
    }

    async fn remove_dependency(
        &self,
        guild: GuildId,
        role: RoleId,
        requires: RoleId,
    ) -> KeeperResult<bool> {
        Ok(dependencies::remove(&self.pg, guild, role, requires).await?)
    }

    async fn all_dependencies(&self, guild: GuildId) -> KeeperResult<Vec<RoleDependency>> {
        Ok(dependencies::list_all(&self.pg, guild).await?)
    }

    async fn purge_dependencies(&self, guild: GuildId, role: RoleId) -> KeeperResult<u64> {
        Ok(dependencies::purge_role(&self.pg, guild, role).await?)
    }
}
