//! Input validation utilities.
//!
//! Centralized validation helpers used by every command surface before a value
//! reaches a store.

use validator::{Validate, ValidationError};

use crate::error::KeeperError;
use crate::models::{DISPLAY_NAME_PLACEHOLDER, RoleId, USERNAME_PLACEHOLDER};

/// Validate a request, returning a KeeperError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), KeeperError> {
    body.validate().map_err(|e| KeeperError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// A nickname format must reference the member through at least one placeholder.
pub fn validate_nickname_format(format: &str) -> Result<(), ValidationError> {
    if format.contains(USERNAME_PLACEHOLDER) || format.contains(DISPLAY_NAME_PLACEHOLDER) {
        return Ok(());
    }
    let mut err = ValidationError::new("missing_placeholder");
    err.message = Some("The format string must include {username} or {display_name}".into());
    Err(err)
}

/// Validate an exclusivity group name.
pub fn validate_group_name(name: &str) -> Result<(), KeeperError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(KeeperError::validation(
            "Group name cannot be empty or whitespace only",
        ));
    }
    if name.chars().count() > 100 {
        return Err(KeeperError::validation("Group name must be 1-100 characters"));
    }
    Ok(())
}

/// A role cannot require itself.
pub fn validate_dependency(role: RoleId, requires: RoleId) -> Result<(), KeeperError> {
    if role == requires {
        return Err(KeeperError::validation("A role cannot depend on itself"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SetRuleRequest;

    #[test]
    fn format_needs_a_placeholder() {
        let ok = SetRuleRequest {
            role_id: RoleId(1),
            nickname_format: "[MOD] {display_name}".into(),
        };
        assert!(validate_request(&ok).is_ok());

        let missing = SetRuleRequest {
            role_id: RoleId(1),
            nickname_format: "Moderator".into(),
        };
        let err = validate_request(&missing).unwrap_err();
        assert!(err.to_string().contains("{username} or {display_name}"));
    }

    #[test]
    fn overlong_format_is_rejected() {
        let long = SetRuleRequest {
            role_id: RoleId(1),
            nickname_format: format!("{{username}}{}", "x".repeat(120)),
        };
        assert!(validate_request(&long).is_err());
    }

    #[test]
    fn group_names_and_dependencies() {
        assert!(validate_group_name("tier").is_ok());
        assert!(validate_group_name("   ").is_err());
        assert!(validate_dependency(RoleId(1), RoleId(2)).is_ok());
        assert!(validate_dependency(RoleId(1), RoleId(1)).is_err());
    }
}
