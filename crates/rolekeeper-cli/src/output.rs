//! Output formatting utilities

use rolekeeper_common::models::RoleId;
use serde::Serialize;

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("✓ {message}");
}

pub fn print_info(message: &str) {
    println!("ℹ {message}");
}

/// `1, 2, 3`, or `none` for an empty list.
pub fn join_ids<'a>(ids: impl IntoIterator<Item = &'a RoleId>) -> String {
    let joined = ids
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_comma_separated() {
        assert_eq!(join_ids(&[RoleId(1), RoleId(22)]), "1, 22");
        assert_eq!(join_ids(&Vec::<RoleId>::new()), "none");
    }
}
