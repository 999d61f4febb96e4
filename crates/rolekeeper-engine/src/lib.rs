//! # rolekeeper-engine
//!
//! Everything Rolekeeper decides lives here: nickname rules reacting to role
//! changes, delegated role grants with dependency and exclusivity resolution,
//! and the maintenance scans that keep stored state in line with the platform.
//!
//! Storage sits behind the traits in [`store`] and the chat platform behind
//! [`platform::GuildPlatform`], so a platform adapter only has to translate its
//! events into calls on this crate.

pub mod admin;
pub mod confirmation;
pub mod delegation;
pub mod dependencies;
pub mod exclusivity;
pub mod grant;
pub mod maintenance;
pub mod nickname;
pub mod platform;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use confirmation::{ConflictChoice, DecisionHandle, DecisionState};
pub use dependencies::DependencyGraph;
pub use grant::{
    ConflictResolution, GrantEngine, GrantOutcome, GrantPlan, GrantRequest, PendingGrant,
    RevokeOutcome,
};
pub use platform::{GuildPlatform, PlatformError};
pub use store::Store;
