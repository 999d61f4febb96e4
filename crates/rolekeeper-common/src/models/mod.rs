//! Core domain models shared across all Rolekeeper crates.
//!
//! These are the "truth" types: what the database stores and what the engine
//! reasons about. Every persisted entity is scoped by its guild.

pub mod delegation;
pub mod dependency;
pub mod exclusivity;
pub mod history;
pub mod ids;
pub mod member;
pub mod rule;

/// Re-export all model types for convenience.
pub use delegation::*;
pub use dependency::*;
pub use exclusivity::*;
pub use history::*;
pub use ids::*;
pub use member::*;
pub use rule::*;
