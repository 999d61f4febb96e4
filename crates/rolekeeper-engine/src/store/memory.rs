//! In-process store.
//!
//! Same semantics as the PostgreSQL tables, including the unique keys, held in
//! ordered maps behind a single mutex.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rolekeeper_common::error::KeeperResult;
use rolekeeper_common::models::{
    DelegatedPermission, ExclusivityGroupMembership, GuildId, NicknameHistoryEntry, NicknameRule,
    RoleDependency, RoleId, UserId, normalize_group_name,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{DelegationStore, DependencyStore, ExclusivityStore, HistoryLedger, RuleStore};

#[derive(Default)]
struct Tables {
    rules: BTreeMap<(GuildId, RoleId), String>,
    history: BTreeMap<(UserId, GuildId, RoleId), (Option<String>, DateTime<Utc>)>,
    delegations: BTreeSet<DelegatedPermission>,
    groups: BTreeMap<(GuildId, RoleId), String>,
    dependencies: BTreeSet<RoleDependency>,
    /// Users whose history saves are rejected.
    #[cfg(test)]
    rejected_history: BTreeSet<UserId>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every history save for `user` fail.
    #[cfg(test)]
    pub(crate) fn reject_history_for(self, user: UserId) -> Self {
        self.tables().rejected_history.insert(user);
        self
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock cannot leave a half-applied row change.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RuleStore for MemoryStore {
    async fn set_rule(&self, guild: GuildId, role: RoleId, format: &str) -> KeeperResult<()> {
        self.tables().rules.insert((guild, role), format.to_string());
        Ok(())
    }

    async fn remove_rule(&self, guild: GuildId, role: RoleId) -> KeeperResult<bool> {
        Ok(self.tables().rules.remove(&(guild, role)).is_some())
    }

    async fn get_rule(&self, guild: GuildId, role: RoleId) -> KeeperResult<Option<NicknameRule>> {
        Ok(self
            .tables()
            .rules
            .get(&(guild, role))
            .map(|format| NicknameRule::new(guild, role, format.clone())))
    }

    async fn all_rules(&self, guild: GuildId) -> KeeperResult<Vec<NicknameRule>> {
        Ok(self
            .tables()
            .rules
            .iter()
            .filter(|((g, _), _)| *g == guild)
            .map(|((g, r), format)| NicknameRule::new(*g, *r, format.clone()))
            .collect())
    }
}

#[async_trait]
impl HistoryLedger for MemoryStore {
    async fn save_history(
        &self,
        user: UserId,
        guild: GuildId,
        role: RoleId,
        previous_nickname: Option<&str>,
    ) -> KeeperResult<()> {
        let mut tables = self.tables();
        #[cfg(test)]
        if tables.rejected_history.contains(&user) {
            return Err(rolekeeper_common::error::KeeperError::ActionFailed {
                message: format!("history write rejected for {user}"),
            });
        }
        tables.history.insert(
            (user, guild, role),
            (previous_nickname.map(str::to_string), Utc::now()),
        );
        Ok(())
    }

    async fn get_history(
        &self,
        user: UserId,
        guild: GuildId,
        role: RoleId,
    ) -> KeeperResult<Option<NicknameHistoryEntry>> {
        Ok(self
            .tables()
            .history
            .get(&(user, guild, role))
            .map(|(previous, timestamp)| NicknameHistoryEntry {
                user_id: user,
                guild_id: guild,
                role_id: role,
                previous_nickname: previous.clone(),
                timestamp: *timestamp,
            }))
    }

    async fn delete_history(&self, user: UserId, guild: GuildId, role: RoleId) -> KeeperResult<()> {
        self.tables().history.remove(&(user, guild, role));
        Ok(())
    }

    async fn purge_history(&self, guild: GuildId, role: RoleId) -> KeeperResult<u64> {
        let mut tables = self.tables();
        let before = tables.history.len();
        tables
            .history
            .retain(|(_, g, r), _| !(*g == guild && *r == role));
        Ok((before - tables.history.len()) as u64)
    }

    async fn history_roles(&self, guild: GuildId) -> KeeperResult<Vec<RoleId>> {
        let roles: BTreeSet<RoleId> = self
            .tables()
            .history
            .keys()
            .filter(|(_, g, _)| *g == guild)
            .map(|(_, _, r)| *r)
            .collect();
        Ok(roles.into_iter().collect())
    }
}

#[async_trait]
impl DelegationStore for MemoryStore {
    async fn grant_permission(
        &self,
        guild: GuildId,
        manager: RoleId,
        managed: RoleId,
    ) -> KeeperResult<()> {
        self.tables().delegations.insert(DelegatedPermission {
            guild_id: guild,
            manager_role_id: manager,
            managed_role_id: managed,
        });
        Ok(())
    }

    async fn revoke_permission(
        &self,
        guild: GuildId,
        manager: RoleId,
        managed: RoleId,
    ) -> KeeperResult<()> {
        self.tables().delegations.remove(&DelegatedPermission {
            guild_id: guild,
            manager_role_id: manager,
            managed_role_id: managed,
        });
        Ok(())
    }

    async fn all_permissions(&self, guild: GuildId) -> KeeperResult<Vec<DelegatedPermission>> {
        Ok(self
            .tables()
            .delegations
            .iter()
            .filter(|p| p.guild_id == guild)
            .copied()
            .collect())
    }

    async fn manageable_roles(
        &self,
        guild: GuildId,
        user_roles: &[RoleId],
    ) -> KeeperResult<BTreeSet<RoleId>> {
        if user_roles.is_empty() {
            return Ok(BTreeSet::new());
        }
        Ok(self
            .tables()
            .delegations
            .iter()
            .filter(|p| p.guild_id == guild && user_roles.contains(&p.manager_role_id))
            .map(|p| p.managed_role_id)
            .collect())
    }

    async fn purge_permissions(&self, guild: GuildId, role: RoleId) -> KeeperResult<u64> {
        let mut tables = self.tables();
        let before = tables.delegations.len();
        tables.delegations.retain(|p| {
            !(p.guild_id == guild && (p.manager_role_id == role || p.managed_role_id == role))
        });
        Ok((before - tables.delegations.len()) as u64)
    }
}

#[async_trait]
impl ExclusivityStore for MemoryStore {
    async fn add_to_group(
        &self,
        guild: GuildId,
        group_name: &str,
        role: RoleId,
    ) -> KeeperResult<()> {
        self.tables()
            .groups
            .insert((guild, role), normalize_group_name(group_name));
        Ok(())
    }

    async fn remove_from_group(&self, guild: GuildId, role: RoleId) -> KeeperResult<bool> {
        Ok(self.tables().groups.remove(&(guild, role)).is_some())
    }

    async fn all_group_memberships(
        &self,
        guild: GuildId,
    ) -> KeeperResult<Vec<ExclusivityGroupMembership>> {
        let mut memberships: Vec<ExclusivityGroupMembership> = self
            .tables()
            .groups
            .iter()
            .filter(|((g, _), _)| *g == guild)
            .map(|((g, r), name)| ExclusivityGroupMembership {
                guild_id: *g,
                group_name: name.clone(),
                role_id: *r,
            })
            .collect();
        memberships.sort_by(|a, b| {
            a.group_name
                .cmp(&b.group_name)
                .then(a.role_id.cmp(&b.role_id))
        });
        Ok(memberships)
    }

    async fn group_peers(&self, guild: GuildId, role: RoleId) -> KeeperResult<Vec<RoleId>> {
        let tables = self.tables();
        let Some(name) = tables.groups.get(&(guild, role)) else {
            return Ok(Vec::new());
        };
        // BTreeMap iteration keeps the (guild, role) order, so peers come out sorted.
        Ok(tables
            .groups
            .iter()
            .filter(|((g, _), n)| *g == guild && *n == name)
            .map(|((_, r), _)| *r)
            .collect())
    }
}

#[async_trait]
impl DependencyStore for MemoryStore {
    async fn add_dependency(
        &self,
        guild: GuildId,
        role: RoleId,
        requires: RoleId,
    ) -> KeeperResult<()> {
        self.tables().dependencies.insert(RoleDependency {
            guild_id: guild,
            role_id: role,
            required_role_id: requires,
        });
        Ok(())
    }

    async fn remove_dependency(
        &self,
        guild: GuildId,
        role: RoleId,
        requires: RoleId,
    ) -> KeeperResult<bool> {
        Ok(self.tables().dependencies.remove(&RoleDependency {
            guild_id: guild,
            role_id: role,
            required_role_id: requires,
        }))
    }

    async fn all_dependencies(&self, guild: GuildId) -> KeeperResult<Vec<RoleDependency>> {
        Ok(self
            .tables()
            .dependencies
            .iter()
            .filter(|d| d.guild_id == guild)
            .copied()
            .collect())
    }

    async fn purge_dependencies(&self, guild: GuildId, role: RoleId) -> KeeperResult<u64> {
        let mut tables = self.tables();
        let before = tables.dependencies.len();
        tables.dependencies.retain(|d| {
            !(d.guild_id == guild && (d.role_id == role || d.required_role_id == role))
        });
        Ok((before - tables.dependencies.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUILD: GuildId = GuildId(1);

    #[tokio::test]
    async fn granting_twice_leaves_one_row() {
        let store = MemoryStore::new();
        store.grant_permission(GUILD, RoleId(10), RoleId(20)).await.unwrap();
        store.grant_permission(GUILD, RoleId(10), RoleId(20)).await.unwrap();

        assert_eq!(store.all_permissions(GUILD).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn manageable_roles_is_a_distinct_union() {
        let store = MemoryStore::new();
        store.grant_permission(GUILD, RoleId(10), RoleId(20)).await.unwrap();
        store.grant_permission(GUILD, RoleId(11), RoleId(20)).await.unwrap();
        store.grant_permission(GUILD, RoleId(11), RoleId(21)).await.unwrap();
        store.grant_permission(GuildId(2), RoleId(10), RoleId(99)).await.unwrap();

        let roles = store
            .manageable_roles(GUILD, &[RoleId(10), RoleId(11)])
            .await
            .unwrap();
        assert_eq!(roles, BTreeSet::from([RoleId(20), RoleId(21)]));
        assert!(store.manageable_roles(GUILD, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn re_adding_a_role_moves_it_between_groups() {
        let store = MemoryStore::new();
        store.add_to_group(GUILD, "Tier", RoleId(1)).await.unwrap();
        store.add_to_group(GUILD, "tier", RoleId(2)).await.unwrap();
        assert_eq!(
            store.group_peers(GUILD, RoleId(1)).await.unwrap(),
            vec![RoleId(1), RoleId(2)]
        );

        store.add_to_group(GUILD, "colour", RoleId(2)).await.unwrap();
        assert_eq!(store.group_peers(GUILD, RoleId(1)).await.unwrap(), vec![RoleId(1)]);
        assert!(store.group_peers(GUILD, RoleId(3)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saving_history_overwrites_the_previous_entry() {
        let store = MemoryStore::new();
        store
            .save_history(UserId(5), GUILD, RoleId(1), Some("first"))
            .await
            .unwrap();
        store
            .save_history(UserId(5), GUILD, RoleId(1), None)
            .await
            .unwrap();

        let entry = store
            .get_history(UserId(5), GUILD, RoleId(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.previous_nickname, None);
        assert_eq!(store.history_roles(GUILD).await.unwrap(), vec![RoleId(1)]);
    }
}
