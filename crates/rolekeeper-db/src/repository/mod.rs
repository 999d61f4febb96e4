//! Repository layer: query functions organized by table.

pub mod delegations;
pub mod dependencies;
pub mod exclusivity;
pub mod history;
pub mod rules;
