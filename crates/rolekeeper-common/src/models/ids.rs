//! Platform identifiers.
//!
//! Guilds, roles, and users are identified by the platform's 64-bit snowflakes.
//! They are stored as `BIGINT`, so each newtype is a transparent `i64`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

snowflake_id!(
    /// A guild (tenant). Every stored entity is scoped by one.
    GuildId
);
snowflake_id!(
    /// A guild role.
    RoleId
);
snowflake_id!(
    /// A platform user.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_from_command_arguments() {
        assert_eq!(" 42 ".parse::<RoleId>().unwrap(), RoleId(42));
        assert!("role".parse::<RoleId>().is_err());
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        assert_eq!(serde_json::to_string(&GuildId(9)).unwrap(), "9");
        assert_eq!(RoleId(3).to_string(), "3");
    }
}
