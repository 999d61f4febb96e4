//! Delegated role grants.
//!
//! A grant pulls in every role the requested one depends on. When one of those
//! roles shares an exclusivity group with a role the member already holds,
//! the member's whole conflicting hierarchy is offered for removal and the
//! requester has to confirm before anything changes.

use rolekeeper_common::config::{DEFAULT_CONFIRMATION_TIMEOUT_SECS, GrantsConfig};
use rolekeeper_common::error::{KeeperError, KeeperResult};
use rolekeeper_common::models::{Actor, GuildId, GuildRole, MemberSnapshot, RoleId, UserId};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::confirmation::{ConflictChoice, DecisionHandle};
use crate::delegation;
use crate::dependencies::DependencyGraph;
use crate::exclusivity;
use crate::platform::GuildPlatform;
use crate::store::Store;

/// One grant or revoke request.
#[derive(Debug, Clone, Copy)]
pub struct GrantRequest<'a> {
    pub guild: GuildId,
    pub actor: &'a Actor,
    pub target: &'a MemberSnapshot,
    pub role: RoleId,
}

/// The role changes a grant resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantPlan {
    pub guild: GuildId,
    pub target: UserId,
    pub requested: GuildRole,
    /// Requested role and its dependencies the member does not hold yet
    pub to_add: BTreeSet<RoleId>,
    /// Held role sharing an exclusivity group with something in `to_add`
    pub conflict: Option<RoleId>,
    /// Conflicting role and the dependencies of it the member holds
    pub to_remove: BTreeSet<RoleId>,
    pub actor: String,
}

impl GrantPlan {
    fn add_reason(&self) -> String {
        format!("Granted by {}", self.actor)
    }

    fn swap_reason(&self) -> String {
        format!("Swapped for {} by {}", self.requested.name, self.actor)
    }
}

#[derive(Debug)]
pub enum GrantOutcome {
    /// No conflict; the roles in the plan were added.
    Granted(GrantPlan),
    /// The member already holds the role and everything it requires.
    AlreadySatisfied { role: RoleId },
    /// Waiting for the requester; finish with [`GrantEngine::resolve_conflict`].
    ConflictPending(PendingGrant),
}

/// A conflicting grant waiting on its confirmation.
#[derive(Debug)]
pub struct PendingGrant {
    pub plan: GrantPlan,
    pub decision: DecisionHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictResolution {
    Transferred {
        removed: BTreeSet<RoleId>,
        added: BTreeSet<RoleId>,
    },
    AddedOnly {
        added: BTreeSet<RoleId>,
    },
    Cancelled,
    TimedOut,
}

impl ConflictResolution {
    /// Message shown to the requester once the decision is settled.
    pub fn notice(&self) -> &'static str {
        match self {
            Self::Transferred { .. } => "Action complete. The conflicting roles were swapped out.",
            Self::AddedOnly { .. } => "Action complete. The member now holds both roles.",
            Self::Cancelled => "Action cancelled. No roles were changed.",
            Self::TimedOut => "Timed out. No action was taken.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked { role: RoleId },
    /// The member did not hold the role; nothing changed.
    NotHeld { role: RoleId },
}

/// Resolves and applies delegated grants against a store and a platform.
pub struct GrantEngine<S: ?Sized, P: ?Sized> {
    store: Arc<S>,
    platform: Arc<P>,
    confirmation_timeout: Duration,
}

impl<S, P> GrantEngine<S, P>
where
    S: Store + ?Sized,
    P: GuildPlatform + ?Sized,
{
    pub fn new(store: Arc<S>, platform: Arc<P>) -> Self {
        Self {
            store,
            platform,
            confirmation_timeout: Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
        }
    }

    /// Build an engine using the configured confirmation timeout.
    pub fn from_config(store: Arc<S>, platform: Arc<P>, config: &GrantsConfig) -> Self {
        Self::new(store, platform).with_confirmation_timeout(config.confirmation_timeout())
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn confirmation_timeout(&self) -> Duration {
        self.confirmation_timeout
    }

    /// Resolve a grant and apply it unless it conflicts.
    pub async fn grant_role(&self, request: GrantRequest<'_>) -> KeeperResult<GrantOutcome> {
        let plan = match self.plan_grant(request).await? {
            Some(plan) => plan,
            None => return Ok(GrantOutcome::AlreadySatisfied { role: request.role }),
        };

        if !plan.to_remove.is_empty() {
            let decision = DecisionHandle::new(self.confirmation_timeout);
            tracing::info!(
                guild = %plan.guild,
                target = %plan.target,
                role = %plan.requested.id,
                conflict = ?plan.conflict,
                decision = %decision.id(),
                "Grant needs confirmation"
            );
            return Ok(GrantOutcome::ConflictPending(PendingGrant { plan, decision }));
        }

        let reason = format!("Role granted by {} via delegation.", plan.actor);
        self.add(&plan, &reason).await?;
        tracing::info!(
            guild = %plan.guild,
            target = %plan.target,
            role = %plan.requested.id,
            added = plan.to_add.len(),
            "Role granted"
        );
        Ok(GrantOutcome::Granted(plan))
    }

    /// Compute the plan without touching the member. `None` when nothing is
    /// missing.
    pub async fn plan_grant(&self, request: GrantRequest<'_>) -> KeeperResult<Option<GrantPlan>> {
        let GrantRequest {
            guild,
            actor,
            target,
            role,
        } = request;

        delegation::authorize(&*self.store, guild, actor, role).await?;
        let requested = self.existing_role(guild, role).await?;

        let graph = DependencyGraph::load(&*self.store, guild).await?;
        let to_add: BTreeSet<RoleId> = graph
            .resolve_full_hierarchy(role)
            .difference(&target.role_ids)
            .copied()
            .collect();
        if to_add.is_empty() {
            return Ok(None);
        }

        let mut conflict = None;
        for candidate in &to_add {
            if let Some(found) =
                exclusivity::find_conflict(&*self.store, guild, &target.role_ids, *candidate)
                    .await?
            {
                conflict = Some(found);
                break;
            }
        }

        let to_remove = match conflict {
            Some(conflict) => graph
                .resolve_full_hierarchy(conflict)
                .intersection(&target.role_ids)
                .copied()
                .collect(),
            None => BTreeSet::new(),
        };

        Ok(Some(GrantPlan {
            guild,
            target: target.user_id,
            requested,
            to_add,
            conflict,
            to_remove,
            actor: actor.username.clone(),
        }))
    }

    /// Wait for the requester's answer and carry it out.
    pub async fn resolve_conflict(&self, pending: PendingGrant) -> KeeperResult<ConflictResolution> {
        let PendingGrant { plan, decision } = pending;

        let Some(choice) = decision.resolved().await else {
            tracing::info!(guild = %plan.guild, target = %plan.target, "Grant confirmation timed out");
            return Ok(ConflictResolution::TimedOut);
        };

        let resolution = self.apply_choice(&plan, choice).await?;
        tracing::info!(
            guild = %plan.guild,
            target = %plan.target,
            role = %plan.requested.id,
            ?choice,
            "Conflicting grant resolved"
        );
        Ok(resolution)
    }

    /// Apply a settled choice to a plan. Transfer removes before it adds;
    /// a failure part-way is not rolled back.
    pub async fn apply_choice(
        &self,
        plan: &GrantPlan,
        choice: ConflictChoice,
    ) -> KeeperResult<ConflictResolution> {
        match choice {
            ConflictChoice::Transfer => {
                let removed: Vec<RoleId> = plan.to_remove.iter().copied().collect();
                self.platform
                    .remove_roles(plan.guild, plan.target, &removed, &plan.swap_reason())
                    .await?;
                self.add(plan, &plan.add_reason()).await?;
                Ok(ConflictResolution::Transferred {
                    removed: plan.to_remove.clone(),
                    added: plan.to_add.clone(),
                })
            }
            ConflictChoice::AddOnly => {
                self.add(plan, &plan.add_reason()).await?;
                Ok(ConflictResolution::AddedOnly {
                    added: plan.to_add.clone(),
                })
            }
            ConflictChoice::Cancel => Ok(ConflictResolution::Cancelled),
        }
    }

    /// Remove a delegated role from a member.
    pub async fn revoke_role(&self, request: GrantRequest<'_>) -> KeeperResult<RevokeOutcome> {
        let GrantRequest {
            guild,
            actor,
            target,
            role,
        } = request;

        delegation::authorize(&*self.store, guild, actor, role).await?;
        self.existing_role(guild, role).await?;

        if !target.has_role(role) {
            return Ok(RevokeOutcome::NotHeld { role });
        }

        let reason = format!("Role revoked by {} via delegation.", actor.username);
        self.platform
            .remove_roles(guild, target.user_id, &[role], &reason)
            .await?;
        tracing::info!(guild = %guild, target = %target.user_id, role = %role, "Role revoked");
        Ok(RevokeOutcome::Revoked { role })
    }

    async fn existing_role(&self, guild: GuildId, role: RoleId) -> KeeperResult<GuildRole> {
        self.platform
            .roles(guild)
            .await?
            .into_iter()
            .find(|r| r.id == role)
            .ok_or_else(|| KeeperError::not_found(format!("Role {role}")))
    }

    async fn add(&self, plan: &GrantPlan, reason: &str) -> KeeperResult<()> {
        let roles: Vec<RoleId> = plan.to_add.iter().copied().collect();
        self.platform
            .add_roles(plan.guild, plan.target, &roles, reason)
            .await?;
        Ok(())
    }
}
