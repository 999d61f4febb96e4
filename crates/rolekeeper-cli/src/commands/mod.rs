//! Subcommand implementations, one module per command group.

pub mod delegation;
pub mod dependency;
pub mod diagnose;
pub mod exclusive;
pub mod rule;
