//! Exclusivity groups: named sets of roles a member should hold at most one of.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{GuildId, RoleId};

/// A role's membership in an exclusivity group. A role belongs to at most one
/// group per guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExclusivityGroupMembership {
    pub guild_id: GuildId,
    /// Always stored case-folded, see [`normalize_group_name`]
    pub group_name: String,
    pub role_id: RoleId,
}

/// All roles of one exclusivity group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExclusivityGroup {
    pub name: String,
    pub role_ids: Vec<RoleId>,
}

/// Case-fold a group name so "Tier" and "tier " address the same group.
pub fn normalize_group_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Group memberships by name. Groups come out sorted by name and their roles
/// sorted by id.
pub fn group_memberships(
    memberships: impl IntoIterator<Item = ExclusivityGroupMembership>,
) -> Vec<ExclusivityGroup> {
    let mut groups: BTreeMap<String, Vec<RoleId>> = BTreeMap::new();
    for m in memberships {
        groups.entry(m.group_name).or_default().push(m.role_id);
    }

    groups
        .into_iter()
        .map(|(name, mut role_ids)| {
            role_ids.sort_unstable();
            role_ids.dedup();
            ExclusivityGroup { name, role_ids }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(group: &str, role: i64) -> ExclusivityGroupMembership {
        ExclusivityGroupMembership {
            guild_id: GuildId(1),
            group_name: group.to_string(),
            role_id: RoleId(role),
        }
    }

    #[test]
    fn group_names_are_case_folded() {
        assert_eq!(normalize_group_name("  Tier "), "tier");
        assert_eq!(normalize_group_name("TIER"), normalize_group_name("tier"));
    }

    #[test]
    fn memberships_are_grouped_and_sorted() {
        let groups = group_memberships(vec![
            membership("tier", 30),
            membership("colour", 5),
            membership("tier", 10),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "colour");
        assert_eq!(groups[1].name, "tier");
        assert_eq!(groups[1].role_ids, vec![RoleId(10), RoleId(30)]);
    }
}
