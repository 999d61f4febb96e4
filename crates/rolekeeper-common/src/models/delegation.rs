//! Delegated role permission: lets holders of one role manage another.

use serde::{Deserialize, Serialize};

use super::{GuildId, RoleId};

/// Any member holding `manager_role_id` may grant or revoke `managed_role_id`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct DelegatedPermission {
    pub guild_id: GuildId,
    pub manager_role_id: RoleId,
    pub managed_role_id: RoleId,
}
