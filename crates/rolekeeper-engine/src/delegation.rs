//! Delegated role management: who may grant or revoke which role.

use rolekeeper_common::error::{KeeperError, KeeperResult};
use rolekeeper_common::models::{Actor, GuildId, GuildRole, RoleId};
use std::collections::BTreeSet;

use crate::platform::GuildPlatform;
use crate::store::DelegationStore;

/// Most choices a role picker can show at once.
pub const MAX_ROLE_CHOICES: usize = 25;

/// Roles the actor may manage through delegation.
pub async fn manageable_by<S>(store: &S, guild: GuildId, actor: &Actor) -> KeeperResult<BTreeSet<RoleId>>
where
    S: DelegationStore + ?Sized,
{
    let held: Vec<RoleId> = actor.role_ids.iter().copied().collect();
    store.manageable_roles(guild, &held).await
}

/// Fail with `PermissionDenied` unless the actor is an administrator or holds
/// a manager role for `role`.
pub async fn authorize<S>(store: &S, guild: GuildId, actor: &Actor, role: RoleId) -> KeeperResult<()>
where
    S: DelegationStore + ?Sized,
{
    if actor.is_admin {
        return Ok(());
    }

    if manageable_by(store, guild, actor).await?.contains(&role) {
        Ok(())
    } else {
        tracing::debug!(guild = %guild, role = %role, user = %actor.user_id, "Delegated permission missing");
        Err(KeeperError::PermissionDenied { role })
    }
}

/// Roles the actor could pick, filtered by a case-insensitive name fragment.
///
/// Administrators see every role of the guild. At most [`MAX_ROLE_CHOICES`]
/// come back, ordered by name.
pub async fn manageable_role_choices<S, P>(
    store: &S,
    platform: &P,
    guild: GuildId,
    actor: &Actor,
    query: &str,
) -> KeeperResult<Vec<GuildRole>>
where
    S: DelegationStore + ?Sized,
    P: GuildPlatform + ?Sized,
{
    let manageable = if actor.is_admin {
        None
    } else {
        let roles = manageable_by(store, guild, actor).await?;
        if roles.is_empty() {
            return Ok(Vec::new());
        }
        Some(roles)
    };

    let needle = query.trim().to_lowercase();
    let mut choices: Vec<GuildRole> = platform
        .roles(guild)
        .await?
        .into_iter()
        .filter(|role| manageable.as_ref().is_none_or(|m| m.contains(&role.id)))
        .filter(|role| role.name.to_lowercase().contains(&needle))
        .collect();

    choices.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    choices.truncate(MAX_ROLE_CHOICES);
    Ok(choices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::FakePlatform;
    use rolekeeper_common::models::UserId;

    const GUILD: GuildId = GuildId(1);
    const LEAD: RoleId = RoleId(100);

    async fn store_with_grants() -> MemoryStore {
        let store = MemoryStore::new();
        store.grant_permission(GUILD, LEAD, RoleId(1)).await.unwrap();
        store.grant_permission(GUILD, LEAD, RoleId(2)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn manager_role_authorizes() {
        let store = store_with_grants().await;
        let lead = Actor::new(UserId(9), "lead").with_roles([LEAD]);

        assert!(authorize(&store, GUILD, &lead, RoleId(1)).await.is_ok());
        let err = authorize(&store, GUILD, &lead, RoleId(3)).await.unwrap_err();
        assert!(matches!(err, KeeperError::PermissionDenied { role } if role == RoleId(3)));
    }

    #[tokio::test]
    async fn administrators_bypass_delegation() {
        let store = MemoryStore::new();
        let admin = Actor::new(UserId(9), "admin").admin();
        assert!(authorize(&store, GUILD, &admin, RoleId(42)).await.is_ok());
    }

    #[tokio::test]
    async fn choices_filter_by_name_and_permission() {
        let store = store_with_grants().await;
        let platform = FakePlatform::new()
            .with_role(GUILD, 1, "Gold")
            .with_role(GUILD, 2, "Golden Hour")
            .with_role(GUILD, 3, "Goldfish");
        let lead = Actor::new(UserId(9), "lead").with_roles([LEAD]);

        let choices = manageable_role_choices(&store, &platform, GUILD, &lead, "GOLD")
            .await
            .unwrap();
        let names: Vec<&str> = choices.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Gold", "Golden Hour"]);

        let nobody = Actor::new(UserId(8), "nobody");
        let none = manageable_role_choices(&store, &platform, GUILD, &nobody, "")
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn choices_are_capped() {
        let store = MemoryStore::new();
        let mut platform = FakePlatform::new();
        for id in 0..40 {
            platform = platform.with_role(GUILD, id, &format!("role-{id:02}"));
        }
        let admin = Actor::new(UserId(9), "admin").admin();

        let choices = manageable_role_choices(&store, &platform, GUILD, &admin, "role")
            .await
            .unwrap();
        assert_eq!(choices.len(), MAX_ROLE_CHOICES);
        assert_eq!(choices[0].name, "role-00");
    }
}
