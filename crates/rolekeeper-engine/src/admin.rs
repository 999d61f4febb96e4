//! Administrative operations behind the configuration commands.
//!
//! Each function validates its input before it reaches a store, so every
//! command surface shares the same rules.

use rolekeeper_common::error::{KeeperError, KeeperResult};
use rolekeeper_common::models::{
    DelegatedPermission, ExclusivityGroup, GuildId, NicknameRule, RoleDependency, RoleId,
    SetRuleRequest, group_memberships, normalize_group_name,
};
use rolekeeper_common::validation::{validate_dependency, validate_group_name, validate_request};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::dependencies::DependencyGraph;
use crate::store::{DelegationStore, DependencyStore, ExclusivityStore, RuleStore, Store};

// --- Nickname rules ---

pub async fn set_rule<S>(store: &S, guild: GuildId, request: &SetRuleRequest) -> KeeperResult<NicknameRule>
where
    S: RuleStore + ?Sized,
{
    validate_request(request)?;
    store
        .set_rule(guild, request.role_id, &request.nickname_format)
        .await?;
    tracing::info!(guild = %guild, role = %request.role_id, "Nickname rule set");
    Ok(NicknameRule::new(guild, request.role_id, request.nickname_format.clone()))
}

pub async fn remove_rule<S>(store: &S, guild: GuildId, role: RoleId) -> KeeperResult<bool>
where
    S: RuleStore + ?Sized,
{
    let removed = store.remove_rule(guild, role).await?;
    tracing::info!(guild = %guild, role = %role, removed, "Nickname rule removed");
    Ok(removed)
}

pub async fn get_rule<S>(store: &S, guild: GuildId, role: RoleId) -> KeeperResult<NicknameRule>
where
    S: RuleStore + ?Sized,
{
    store
        .get_rule(guild, role)
        .await?
        .ok_or_else(|| KeeperError::not_found(format!("Nickname rule for role {role}")))
}

pub async fn list_rules<S>(store: &S, guild: GuildId) -> KeeperResult<Vec<NicknameRule>>
where
    S: RuleStore + ?Sized,
{
    store.all_rules(guild).await
}

// --- Delegated permissions ---

pub async fn grant_permission<S>(
    store: &S,
    guild: GuildId,
    manager: RoleId,
    managed: RoleId,
) -> KeeperResult<()>
where
    S: DelegationStore + ?Sized,
{
    store.grant_permission(guild, manager, managed).await?;
    tracing::info!(guild = %guild, manager = %manager, managed = %managed, "Delegated permission granted");
    Ok(())
}

pub async fn revoke_permission<S>(
    store: &S,
    guild: GuildId,
    manager: RoleId,
    managed: RoleId,
) -> KeeperResult<()>
where
    S: DelegationStore + ?Sized,
{
    store.revoke_permission(guild, manager, managed).await?;
    tracing::info!(guild = %guild, manager = %manager, managed = %managed, "Delegated permission revoked");
    Ok(())
}

pub async fn list_permissions<S>(store: &S, guild: GuildId) -> KeeperResult<Vec<DelegatedPermission>>
where
    S: DelegationStore + ?Sized,
{
    store.all_permissions(guild).await
}

// --- Exclusivity groups ---

/// Put a role in a group, moving it out of any group it was in. Returns the
/// stored group name.
pub async fn add_exclusive_role<S>(
    store: &S,
    guild: GuildId,
    group: &str,
    role: RoleId,
) -> KeeperResult<String>
where
    S: ExclusivityStore + ?Sized,
{
    validate_group_name(group)?;
    let name = normalize_group_name(group);
    store.add_to_group(guild, &name, role).await?;
    tracing::info!(guild = %guild, role = %role, group = %name, "Role added to exclusive group");
    Ok(name)
}

pub async fn remove_exclusive_role<S>(store: &S, guild: GuildId, role: RoleId) -> KeeperResult<bool>
where
    S: ExclusivityStore + ?Sized,
{
    store.remove_from_group(guild, role).await
}

pub async fn list_exclusive_groups<S>(store: &S, guild: GuildId) -> KeeperResult<Vec<ExclusivityGroup>>
where
    S: ExclusivityStore + ?Sized,
{
    Ok(group_memberships(store.all_group_memberships(guild).await?))
}

// --- Dependencies ---

pub async fn add_dependency<S>(
    store: &S,
    guild: GuildId,
    role: RoleId,
    requires: RoleId,
) -> KeeperResult<()>
where
    S: DependencyStore + ?Sized,
{
    validate_dependency(role, requires)?;
    store.add_dependency(guild, role, requires).await?;
    tracing::info!(guild = %guild, role = %role, requires = %requires, "Dependency added");
    Ok(())
}

pub async fn remove_dependency<S>(
    store: &S,
    guild: GuildId,
    role: RoleId,
    requires: RoleId,
) -> KeeperResult<bool>
where
    S: DependencyStore + ?Sized,
{
    store.remove_dependency(guild, role, requires).await
}

pub async fn list_dependencies<S>(store: &S, guild: GuildId) -> KeeperResult<Vec<RoleDependency>>
where
    S: DependencyStore + ?Sized,
{
    store.all_dependencies(guild).await
}

/// What granting a role would pull in and what it competes with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyPreview {
    pub role: RoleId,
    pub requires: BTreeSet<RoleId>,
    pub hierarchy: BTreeSet<RoleId>,
    pub group: Option<String>,
    pub exclusive_with: Vec<RoleId>,
}

pub async fn preview_hierarchy<S>(store: &S, guild: GuildId, role: RoleId) -> KeeperResult<HierarchyPreview>
where
    S: Store + ?Sized,
{
    let graph = DependencyGraph::load(store, guild).await?;

    let group = store
        .all_group_memberships(guild)
        .await?
        .into_iter()
        .find(|m| m.role_id == role)
        .map(|m| m.group_name);
    let exclusive_with = store
        .group_peers(guild, role)
        .await?
        .into_iter()
        .filter(|peer| *peer != role)
        .collect();

    Ok(HierarchyPreview {
        role,
        requires: graph.resolve_dependencies(role),
        hierarchy: graph.resolve_full_hierarchy(role),
        group,
        exclusive_with,
    })
}
