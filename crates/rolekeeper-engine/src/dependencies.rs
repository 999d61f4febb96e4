//! Role dependency graph.
//!
//! Edges read "role requires required role". The graph is not assumed acyclic:
//! every traversal keeps a visited set, so cycles terminate.

use rolekeeper_common::error::KeeperResult;
use rolekeeper_common::models::{GuildId, RoleDependency, RoleId};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::store::DependencyStore;

/// A guild's dependency edges, indexed by dependent role.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    requires: BTreeMap<RoleId, BTreeSet<RoleId>>,
}

impl DependencyGraph {
    pub fn from_edges(edges: impl IntoIterator<Item = RoleDependency>) -> Self {
        let mut requires: BTreeMap<RoleId, BTreeSet<RoleId>> = BTreeMap::new();
        for edge in edges {
            requires
                .entry(edge.role_id)
                .or_default()
                .insert(edge.required_role_id);
        }
        Self { requires }
    }

    /// Load every edge of a guild in one query.
    pub async fn load<S>(store: &S, guild: GuildId) -> KeeperResult<Self>
    where
        S: DependencyStore + ?Sized,
    {
        Ok(Self::from_edges(store.all_dependencies(guild).await?))
    }

    /// Roles `role` requires directly.
    pub fn direct_requirements(&self, role: RoleId) -> impl Iterator<Item = RoleId> + '_ {
        self.requires.get(&role).into_iter().flatten().copied()
    }

    /// Every role reachable from `role` through requires-edges, `role` excluded
    /// even when a cycle leads back to it.
    pub fn resolve_dependencies(&self, role: RoleId) -> BTreeSet<RoleId> {
        let mut visited = BTreeSet::from([role]);
        let mut queue = VecDeque::from([role]);

        while let Some(current) = queue.pop_front() {
            for next in self.direct_requirements(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited.remove(&role);
        visited
    }

    /// `role` together with everything it requires: the unit stripped from a
    /// member when `role` loses an exclusivity conflict.
    pub fn resolve_full_hierarchy(&self, role: RoleId) -> BTreeSet<RoleId> {
        let mut hierarchy = self.resolve_dependencies(role);
        hierarchy.insert(role);
        hierarchy
    }

    pub fn is_empty(&self) -> bool {
        self.requires.is_empty()
    }
}

/// Transitive requirements of `role` in `guild`, `role` excluded.
pub async fn resolve_dependencies<S>(
    store: &S,
    guild: GuildId,
    role: RoleId,
) -> KeeperResult<BTreeSet<RoleId>>
where
    S: DependencyStore + ?Sized,
{
    Ok(DependencyGraph::load(store, guild)
        .await?
        .resolve_dependencies(role))
}

/// `role` plus its transitive requirements in `guild`.
pub async fn resolve_full_hierarchy<S>(
    store: &S,
    guild: GuildId,
    role: RoleId,
) -> KeeperResult<BTreeSet<RoleId>>
where
    S: DependencyStore + ?Sized,
{
    Ok(DependencyGraph::load(store, guild)
        .await?
        .resolve_full_hierarchy(role))
}
