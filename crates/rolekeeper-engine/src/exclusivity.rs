//! Mutually exclusive role groups.

use rolekeeper_common::error::KeeperResult;
use rolekeeper_common::models::{GuildId, RoleId};
use std::collections::BTreeSet;

use crate::store::ExclusivityStore;

/// Find a role in `user_roles` that shares `candidate`'s exclusivity group.
///
/// The candidate itself never counts as a conflict. When several roles
/// conflict, the one with the lowest id is returned.
pub async fn find_conflict<S>(
    store: &S,
    guild: GuildId,
    user_roles: &BTreeSet<RoleId>,
    candidate: RoleId,
) -> KeeperResult<Option<RoleId>>
where
    S: ExclusivityStore + ?Sized,
{
    let peers = store.group_peers(guild, candidate).await?;
    if peers.is_empty() {
        return Ok(None);
    }

    Ok(peers
        .into_iter()
        .filter(|role| *role != candidate && user_roles.contains(role))
        .min())
}
