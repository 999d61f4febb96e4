//! The chat platform seam.
//!
//! Rolekeeper never talks to a chat platform directly. An adapter built on the
//! platform's client library implements [`GuildPlatform`] and forwards member
//! updates and commands into the engine.

use async_trait::async_trait;
use rolekeeper_common::error::KeeperError;
use rolekeeper_common::models::{GuildId, GuildRole, MemberSnapshot, RoleId, UserId};
use thiserror::Error;

/// Errors reported by a platform adapter.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The bot lacks a permission or sits below the role it tried to touch.
    #[error("Missing permissions: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Platform error: {0}")]
    Other(String),
}

impl From<PlatformError> for KeeperError {
    fn from(e: PlatformError) -> Self {
        match e {
            PlatformError::NotFound(resource) => KeeperError::NotFound { resource },
            PlatformError::Forbidden(message) | PlatformError::Other(message) => {
                KeeperError::ActionFailed { message }
            }
        }
    }
}

/// What the engine needs from the chat platform.
#[async_trait]
pub trait GuildPlatform: Send + Sync {
    /// Guilds the bot is in.
    async fn guilds(&self) -> Result<Vec<GuildId>, PlatformError>;

    /// Roles that currently exist in a guild.
    async fn roles(&self, guild: GuildId) -> Result<Vec<GuildRole>, PlatformError>;

    /// Every member of a guild, bots included.
    async fn members(&self, guild: GuildId) -> Result<Vec<MemberSnapshot>, PlatformError>;

    /// Add roles to a member; `reason` lands in the guild audit log.
    async fn add_roles(
        &self,
        guild: GuildId,
        user: UserId,
        roles: &[RoleId],
        reason: &str,
    ) -> Result<(), PlatformError>;

    /// Remove roles from a member; `reason` lands in the guild audit log.
    async fn remove_roles(
        &self,
        guild: GuildId,
        user: UserId,
        roles: &[RoleId],
        reason: &str,
    ) -> Result<(), PlatformError>;

    /// Set or clear (`None`) a member's guild nickname.
    async fn set_nickname(
        &self,
        guild: GuildId,
        user: UserId,
        nickname: Option<&str>,
    ) -> Result<(), PlatformError>;
}
