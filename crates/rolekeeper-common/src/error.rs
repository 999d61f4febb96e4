//! Centralized error types for Rolekeeper.
//!
//! Uses `thiserror` for the variants and provides a user-facing rendering that
//! never leaks storage or internal details to the person who ran a command.

use crate::models::RoleId;

/// Core application error type used across all Rolekeeper crates.
#[derive(Debug, thiserror::Error)]
pub enum KeeperError {
    // === Permission errors ===
    #[error("Missing permission to manage role {role}")]
    PermissionDenied { role: RoleId },

    // === Resource errors ===
    #[error("{resource} not found")]
    NotFound { resource: String },

    // === Validation errors ===
    #[error("Validation failed: {message}")]
    Validation { message: String },

    // === Platform errors ===
    /// The platform refused a role or nickname mutation, usually because the
    /// bot sits too low in the role hierarchy.
    #[error("Action failed: {message}")]
    ActionFailed { message: String },

    // === Infrastructure errors ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl KeeperError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Error code string for programmatic handling by adapters.
    pub fn error_code(&self) -> &str {
        match self {
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::ActionFailed { .. } => "ACTION_FAILED",
            Self::Database(_) => "STORE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error comes from infrastructure rather than the request.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }

    /// Short human-readable message for the user who triggered the request.
    ///
    /// Infrastructure failures are logged here with full context and replaced
    /// by a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied { .. } => {
                "You do not have permission to manage this role.".to_string()
            }
            Self::ActionFailed { .. } => {
                "Action failed! The bot's role is not high enough to manage these roles."
                    .to_string()
            }
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "An unexpected error occurred. Please try again later.".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                "An unexpected error occurred. Please try again later.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Convenience type alias for Results using KeeperError.
pub type KeeperResult<T> = Result<T, KeeperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_are_not_leaked() {
        let err = KeeperError::Database(sqlx::Error::PoolTimedOut);
        assert!(err.is_internal());
        assert_eq!(err.error_code(), "STORE_UNAVAILABLE");
        assert!(!err.user_message().contains("pool"));
    }

    #[test]
    fn request_errors_render_their_details() {
        let err = KeeperError::not_found("Nickname rule");
        assert!(!err.is_internal());
        assert_eq!(err.user_message(), "Nickname rule not found");

        let err = KeeperError::PermissionDenied { role: RoleId(7) };
        assert_eq!(err.error_code(), "PERMISSION_DENIED");
    }
}
