//! Nickname rules reacting to role changes.
//!
//! When a member gains a role that carries a rule, their nickname before the
//! change goes into the history ledger and the rule's rendering is applied.
//! When they lose it again, the saved nickname comes back, but only if nobody
//! touched the nickname in between.

use rolekeeper_common::error::{KeeperError, KeeperResult};
use rolekeeper_common::models::{GuildId, MemberSnapshot, RoleId};
use serde::Serialize;

use crate::platform::GuildPlatform;
use crate::store::{HistoryLedger, RuleStore};

/// What happened to a member's nickname for one changed role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NicknameChange {
    /// A rule fired; the previous nickname was saved.
    Applied { role: RoleId, nickname: String },
    /// The saved nickname was restored.
    Reverted {
        role: RoleId,
        nickname: Option<String>,
    },
    /// The nickname was changed by someone else since the rule fired.
    Kept { role: RoleId },
    Failed { role: RoleId, error: String },
}

/// React to a member update reported by the platform.
///
/// Roles without a rule or ledger entry produce no change. A failure on one
/// role is logged and reported without stopping the others.
pub async fn on_member_update<S, P>(
    store: &S,
    platform: &P,
    before: &MemberSnapshot,
    after: &MemberSnapshot,
) -> Vec<NicknameChange>
where
    S: RuleStore + HistoryLedger + ?Sized,
    P: GuildPlatform + ?Sized,
{
    if after.is_bot || before.role_ids == after.role_ids {
        return Vec::new();
    }

    let mut changes = Vec::new();

    for role in after.role_ids.difference(&before.role_ids) {
        match apply_rule(store, platform, before, after, *role).await {
            Ok(Some(change)) => changes.push(change),
            Ok(None) => {}
            Err(e) => changes.push(failed(after, *role, e)),
        }
    }

    for role in before.role_ids.difference(&after.role_ids) {
        match revert_rule(store, platform, after, *role).await {
            Ok(Some(change)) => changes.push(change),
            Ok(None) => {}
            Err(e) => changes.push(failed(after, *role, e)),
        }
    }

    changes
}

async fn apply_rule<S, P>(
    store: &S,
    platform: &P,
    before: &MemberSnapshot,
    after: &MemberSnapshot,
    role: RoleId,
) -> KeeperResult<Option<NicknameChange>>
where
    S: RuleStore + HistoryLedger + ?Sized,
    P: GuildPlatform + ?Sized,
{
    let Some(rule) = store.get_rule(after.guild_id, role).await? else {
        return Ok(None);
    };

    store
        .save_history(after.user_id, after.guild_id, role, before.nickname.as_deref())
        .await?;

    let nickname = after.formatted_nickname(&rule.nickname_format);
    platform
        .set_nickname(after.guild_id, after.user_id, Some(&nickname))
        .await?;

    tracing::info!(
        guild = %after.guild_id,
        user = %after.user_id,
        role = %role,
        nickname = %nickname,
        "Nickname rule applied"
    );
    Ok(Some(NicknameChange::Applied { role, nickname }))
}

async fn revert_rule<S, P>(
    store: &S,
    platform: &P,
    after: &MemberSnapshot,
    role: RoleId,
) -> KeeperResult<Option<NicknameChange>>
where
    S: RuleStore + HistoryLedger + ?Sized,
    P: GuildPlatform + ?Sized,
{
    let (guild, user) = (after.guild_id, after.user_id);
    let Some(entry) = store.get_history(user, guild, role).await? else {
        return Ok(None);
    };

    let outcome = revert_if_unchanged(store, platform, after, role, entry.previous_nickname).await;

    // The entry is consumed whether or not the revert went through.
    store.delete_history(user, guild, role).await?;
    outcome.map(Some)
}

async fn revert_if_unchanged<S, P>(
    store: &S,
    platform: &P,
    after: &MemberSnapshot,
    role: RoleId,
    previous: Option<String>,
) -> KeeperResult<NicknameChange>
where
    S: RuleStore + ?Sized,
    P: GuildPlatform + ?Sized,
{
    let revert = match store.get_rule(after.guild_id, role).await? {
        Some(rule) => {
            after.nickname.as_deref() == Some(after.formatted_nickname(&rule.nickname_format).as_str())
        }
        None => true,
    };

    if !revert {
        tracing::debug!(
            guild = %after.guild_id,
            user = %after.user_id,
            role = %role,
            "Nickname changed since the rule fired, keeping it"
        );
        return Ok(NicknameChange::Kept { role });
    }

    platform
        .set_nickname(after.guild_id, after.user_id, previous.as_deref())
        .await?;
    tracing::info!(guild = %after.guild_id, user = %after.user_id, role = %role, "Nickname reverted");
    Ok(NicknameChange::Reverted {
        role,
        nickname: previous,
    })
}

fn failed(member: &MemberSnapshot, role: RoleId, e: KeeperError) -> NicknameChange {
    tracing::warn!(
        guild = %member.guild_id,
        user = %member.user_id,
        role = %role,
        error = %e,
        "Nickname update failed"
    );
    NicknameChange::Failed {
        role,
        error: e.to_string(),
    }
}

/// Counters from applying a rule to every holder of its role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunRuleReport {
    pub updated: u32,
    pub skipped: u32,
    pub failed: u32,
}

/// Apply an existing rule retroactively to every non-bot member holding the
/// role. Failures are counted and the scan moves on.
pub async fn run_rule<S, P>(
    store: &S,
    platform: &P,
    guild: GuildId,
    role: RoleId,
) -> KeeperResult<RunRuleReport>
where
    S: RuleStore + HistoryLedger + ?Sized,
    P: GuildPlatform + ?Sized,
{
    let rule = store
        .get_rule(guild, role)
        .await?
        .ok_or_else(|| KeeperError::not_found(format!("Nickname rule for role {role}")))?;

    let mut report = RunRuleReport::default();
    for member in platform.members(guild).await? {
        if member.is_bot || !member.has_role(role) {
            continue;
        }

        let expected = member.formatted_nickname(&rule.nickname_format);
        if member.nickname.as_deref() == Some(expected.as_str()) {
            report.skipped += 1;
            continue;
        }

        let result = async {
            store
                .save_history(member.user_id, guild, role, member.nickname.as_deref())
                .await?;
            platform
                .set_nickname(guild, member.user_id, Some(&expected))
                .await?;
            Ok::<_, KeeperError>(())
        }
        .await;

        match result {
            Ok(()) => report.updated += 1,
            Err(e) => {
                tracing::info!(guild = %guild, user = %member.user_id, error = %e, "Rule run failed for member");
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        guild = %guild,
        role = %role,
        updated = report.updated,
        skipped = report.skipped,
        failed = report.failed,
        "Rule run complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::{FakePlatform, PlatformCall};
    use rolekeeper_common::models::UserId;

    const GUILD: GuildId = GuildId(1);
    const SAM: UserId = UserId(7);
    const MOD: RoleId = RoleId(10);

    async fn store_with_rule() -> MemoryStore {
        let store = MemoryStore::new();
        store.set_rule(GUILD, MOD, "[MOD] {display_name}").await.unwrap();
        store
    }

    fn sam() -> MemberSnapshot {
        MemberSnapshot::new(GUILD, SAM, "sam")
    }

    fn set_nickname(nickname: Option<&str>) -> PlatformCall {
        PlatformCall::SetNickname {
            user: SAM,
            nickname: nickname.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn rule_applies_on_add_and_reverts_on_remove() {
        let store = store_with_rule().await;
        let platform = FakePlatform::new();

        let before = sam();
        let after = sam().with_roles([MOD]);
        let changes = on_member_update(&store, &platform, &before, &after).await;
        assert_eq!(
            changes,
            vec![NicknameChange::Applied { role: MOD, nickname: "[MOD] sam".into() }]
        );
        let entry = store.get_history(SAM, GUILD, MOD).await.unwrap().unwrap();
        assert_eq!(entry.previous_nickname, None);

        let before = sam().with_nickname("[MOD] sam").with_roles([MOD]);
        let after = sam().with_nickname("[MOD] sam");
        let changes = on_member_update(&store, &platform, &before, &after).await;
        assert_eq!(changes, vec![NicknameChange::Reverted { role: MOD, nickname: None }]);

        assert_eq!(platform.calls(), vec![set_nickname(Some("[MOD] sam")), set_nickname(None)]);
        assert!(store.get_history(SAM, GUILD, MOD).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn alt_rule_round_trip_restores_the_custom_nickname() {
        const ALT: RoleId = RoleId(20);
        let store = MemoryStore::new();
        store.set_rule(GUILD, ALT, "{username}'s Alt").await.unwrap();
        let platform = FakePlatform::new();

        let before = sam().with_nickname("Sam!");
        let after = sam().with_nickname("Sam!").with_roles([ALT]);
        let changes = on_member_update(&store, &platform, &before, &after).await;
        assert_eq!(
            changes,
            vec![NicknameChange::Applied { role: ALT, nickname: "sam's Alt".into() }]
        );
        let entry = store.get_history(SAM, GUILD, ALT).await.unwrap().unwrap();
        assert_eq!(entry.previous_nickname.as_deref(), Some("Sam!"));

        let before = sam().with_nickname("sam's Alt").with_roles([ALT]);
        let after = sam().with_nickname("sam's Alt");
        let changes = on_member_update(&store, &platform, &before, &after).await;
        assert_eq!(
            changes,
            vec![NicknameChange::Reverted { role: ALT, nickname: Some("Sam!".into()) }]
        );

        assert_eq!(
            platform.calls(),
            vec![set_nickname(Some("sam's Alt")), set_nickname(Some("Sam!"))]
        );
        assert!(store.get_history(SAM, GUILD, ALT).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn nickname_changed_by_someone_else_is_kept() {
        let store = store_with_rule().await;
        store.save_history(SAM, GUILD, MOD, Some("Sammy")).await.unwrap();
        let platform = FakePlatform::new();

        let before = sam().with_nickname("Custom").with_roles([MOD]);
        let after = sam().with_nickname("Custom");
        let changes = on_member_update(&store, &platform, &before, &after).await;

        assert_eq!(changes, vec![NicknameChange::Kept { role: MOD }]);
        assert!(platform.calls().is_empty());
        assert!(store.get_history(SAM, GUILD, MOD).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleted_rule_reverts_unconditionally() {
        let store = MemoryStore::new();
        store.save_history(SAM, GUILD, MOD, Some("Sammy")).await.unwrap();
        let platform = FakePlatform::new();

        let before = sam().with_nickname("Anything").with_roles([MOD]);
        let after = sam().with_nickname("Anything");
        let changes = on_member_update(&store, &platform, &before, &after).await;

        assert_eq!(
            changes,
            vec![NicknameChange::Reverted { role: MOD, nickname: Some("Sammy".into()) }]
        );
        assert_eq!(platform.calls(), vec![set_nickname(Some("Sammy"))]);
    }

    #[tokio::test]
    async fn ledger_entry_is_consumed_when_the_platform_refuses() {
        let store = store_with_rule().await;
        store.save_history(SAM, GUILD, MOD, None).await.unwrap();
        let platform = FakePlatform::new().forbid(SAM);

        let before = sam().with_nickname("[MOD] sam").with_roles([MOD]);
        let after = sam().with_nickname("[MOD] sam");
        let changes = on_member_update(&store, &platform, &before, &after).await;

        assert!(matches!(changes.as_slice(), [NicknameChange::Failed { role, .. }] if *role == MOD));
        assert!(store.get_history(SAM, GUILD, MOD).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bots_and_unchanged_roles_are_ignored() {
        let store = store_with_rule().await;
        let platform = FakePlatform::new();

        let mut bot = sam().with_roles([MOD]);
        bot.is_bot = true;
        assert!(on_member_update(&store, &platform, &sam(), &bot).await.is_empty());

        let renamed = sam().with_nickname("new");
        assert!(on_member_update(&store, &platform, &sam(), &renamed).await.is_empty());
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn run_rule_counts_updates_skips_and_failures() {
        let store = store_with_rule().await;
        let mut bot = MemberSnapshot::new(GUILD, UserId(4), "bot").with_roles([MOD]);
        bot.is_bot = true;
        let platform = FakePlatform::new()
            .with_member(sam().with_roles([MOD]))
            .with_member(MemberSnapshot::new(GUILD, UserId(2), "ann").with_nickname("[MOD] ann").with_roles([MOD]))
            .with_member(MemberSnapshot::new(GUILD, UserId(3), "bob").with_roles([MOD]))
            .with_member(MemberSnapshot::new(GUILD, UserId(5), "eve"))
            .with_member(bot)
            .forbid(UserId(3));

        let report = run_rule(&store, &platform, GUILD, MOD).await.unwrap();
        assert_eq!(report, RunRuleReport { updated: 1, skipped: 1, failed: 1 });
        assert_eq!(platform.calls(), vec![set_nickname(Some("[MOD] sam"))]);
        assert!(store.get_history(SAM, GUILD, MOD).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn run_rule_needs_a_rule() {
        let store = MemoryStore::new();
        let platform = FakePlatform::new();

        let err = run_rule(&store, &platform, GUILD, MOD).await.unwrap_err();
        assert!(matches!(err, KeeperError::NotFound { .. }));
    }
}
