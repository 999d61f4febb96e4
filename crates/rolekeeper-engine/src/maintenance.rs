//! Background scans over every guild.
//!
//! Both scans are best effort: a guild that fails is logged and counted, and
//! the scan moves on to the next one.

use rolekeeper_common::config::MaintenanceConfig;
use rolekeeper_common::error::KeeperResult;
use rolekeeper_common::models::{GuildId, RoleId};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::platform::GuildPlatform;
use crate::store::{
    DelegationStore, DependencyStore, ExclusivityStore, HistoryLedger, RuleStore, Store,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub guilds_synced: u32,
    pub guilds_failed: u32,
    pub members_failed: u32,
    pub entries_saved: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub guilds_scanned: u32,
    pub guilds_failed: u32,
    pub roles_purged: u32,
    pub rows_removed: u64,
}

/// Record every member's current nickname for each rule-bearing role they
/// hold, so later removals have something to revert to.
pub async fn sync_nickname_history<S, P>(store: &S, platform: &P) -> KeeperResult<SyncReport>
where
    S: Store + ?Sized,
    P: GuildPlatform + ?Sized,
{
    tracing::info!("Starting nickname history sync");
    let guilds = platform.guilds().await?;

    let mut report = SyncReport::default();
    for guild in &guilds {
        match sync_guild(store, platform, *guild).await {
            Ok(Some(guild_report)) => {
                report.guilds_synced += 1;
                report.entries_saved += guild_report.saved;
                report.members_failed += guild_report.failed;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(guild = %guild, error = %e, "History sync failed, skipping guild");
                report.guilds_failed += 1;
            }
        }
    }

    tracing::info!(
        synced = report.guilds_synced,
        total = guilds.len(),
        entries = report.entries_saved,
        member_failures = report.members_failed,
        "Nickname history sync complete"
    );
    Ok(report)
}

struct GuildSync {
    saved: u64,
    failed: u32,
}

async fn sync_guild<S, P>(store: &S, platform: &P, guild: GuildId) -> KeeperResult<Option<GuildSync>>
where
    S: Store + ?Sized,
    P: GuildPlatform + ?Sized,
{
    let rule_roles: BTreeSet<RoleId> = store
        .all_rules(guild)
        .await?
        .into_iter()
        .map(|rule| rule.role_id)
        .collect();
    if rule_roles.is_empty() {
        tracing::debug!(guild = %guild, "No rules, skipping");
        return Ok(None);
    }

    let members = platform.members(guild).await?;
    let mut sync = GuildSync { saved: 0, failed: 0 };
    for member in members.iter().filter(|m| !m.is_bot) {
        let mut member_failed = false;
        for role in member.role_ids.intersection(&rule_roles) {
            match store
                .save_history(member.user_id, guild, *role, member.nickname.as_deref())
                .await
            {
                Ok(()) => sync.saved += 1,
                Err(e) => {
                    tracing::warn!(guild = %guild, user = %member.user_id, error = %e, "History save failed");
                    member_failed = true;
                }
            }
        }
        if member_failed {
            sync.failed += 1;
        }
    }

    tracing::info!(
        guild = %guild,
        members = members.len(),
        saved = sync.saved,
        failed = sync.failed,
        "Guild history synced"
    );
    Ok(Some(sync))
}

/// Purge every stored reference to roles that no longer exist on the platform.
pub async fn cleanup_stale_roles<S, P>(store: &S, platform: &P) -> KeeperResult<CleanupReport>
where
    S: Store + ?Sized,
    P: GuildPlatform + ?Sized,
{
    tracing::info!("Starting stale role cleanup");
    let mut report = CleanupReport::default();

    for guild in platform.guilds().await? {
        report.guilds_scanned += 1;
        match cleanup_guild(store, platform, guild).await {
            Ok((roles, rows)) => {
                report.roles_purged += roles;
                report.rows_removed += rows;
            }
            Err(e) => {
                tracing::warn!(guild = %guild, error = %e, "Cleanup failed, skipping guild");
                report.guilds_failed += 1;
            }
        }
    }

    tracing::info!(
        guilds = report.guilds_scanned,
        failed = report.guilds_failed,
        roles = report.roles_purged,
        rows = report.rows_removed,
        "Stale role cleanup complete"
    );
    Ok(report)
}

async fn cleanup_guild<S, P>(store: &S, platform: &P, guild: GuildId) -> KeeperResult<(u32, u64)>
where
    S: Store + ?Sized,
    P: GuildPlatform + ?Sized,
{
    let live: BTreeSet<RoleId> = platform
        .roles(guild)
        .await?
        .into_iter()
        .map(|role| role.id)
        .collect();

    let mut referenced = BTreeSet::new();
    referenced.extend(store.all_rules(guild).await?.into_iter().map(|r| r.role_id));
    for p in store.all_permissions(guild).await? {
        referenced.extend([p.manager_role_id, p.managed_role_id]);
    }
    referenced.extend(
        store
            .all_group_memberships(guild)
            .await?
            .into_iter()
            .map(|m| m.role_id),
    );
    for d in store.all_dependencies(guild).await? {
        referenced.extend([d.role_id, d.required_role_id]);
    }
    referenced.extend(store.history_roles(guild).await?);

    let mut roles = 0;
    let mut rows = 0;
    for role in referenced.difference(&live) {
        rows += purge_role(store, guild, *role).await?;
        roles += 1;
        tracing::info!(guild = %guild, role = %role, "Purged stale role");
    }
    Ok((roles, rows))
}

/// Remove a role from every table. Returns the number of rows deleted.
pub async fn purge_role<S>(store: &S, guild: GuildId, role: RoleId) -> KeeperResult<u64>
where
    S: Store + ?Sized,
{
    let mut rows = 0;
    if store.remove_rule(guild, role).await? {
        rows += 1;
    }
    rows += store.purge_permissions(guild, role).await?;
    if store.remove_from_group(guild, role).await? {
        rows += 1;
    }
    rows += store.purge_dependencies(guild, role).await?;
    rows += store.purge_history(guild, role).await?;
    Ok(rows)
}

/// Run [`cleanup_stale_roles`] every `interval`, starting one interval from
/// now, until the returned handle is aborted.
pub fn spawn_daily_cleanup<S, P>(store: Arc<S>, platform: Arc<P>, interval: Duration) -> JoinHandle<()>
where
    S: Store + ?Sized + 'static,
    P: GuildPlatform + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = cleanup_stale_roles(&*store, &*platform).await {
                tracing::error!(error = %e, "Scheduled cleanup failed");
            }
        }
    })
}

/// Start [`spawn_daily_cleanup`] with the configured interval.
pub fn spawn_cleanup_from_config<S, P>(
    store: Arc<S>,
    platform: Arc<P>,
    config: &MaintenanceConfig,
) -> JoinHandle<()>
where
    S: Store + ?Sized + 'static,
    P: GuildPlatform + ?Sized + 'static,
{
    spawn_daily_cleanup(store, platform, config.cleanup_interval())
}
