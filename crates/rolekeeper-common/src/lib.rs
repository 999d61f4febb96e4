//! # rolekeeper-common
//!
//! Shared types, configuration, error handling, and the nickname formatter used
//! across all Rolekeeper crates. No storage or platform access lives here.

pub mod config;
pub mod error;
pub mod models;
pub mod nickname;
pub mod validation;
