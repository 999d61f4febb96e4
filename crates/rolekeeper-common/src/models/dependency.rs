//! Role dependency: a directed "requires" edge between two roles.

use serde::{Deserialize, Serialize};

use super::{GuildId, RoleId};

/// `role_id` requires `required_role_id`: granting the former grants the latter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct RoleDependency {
    pub guild_id: GuildId,
    pub role_id: RoleId,
    pub required_role_id: RoleId,
}
