//! Vehicle error types
//!
//! Every failure is synchronous caller misuse. Nothing here is retryable and
//! no operation substitutes a default value for a rejected request.

use crate::identifiers::Identity;
use crate::role::Role;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from vehicle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum VehicleError {
    /// Caller lacks the standing the operation requires.
    #[error("{caller} is not authorized to {operation}: {requirement}")]
    Unauthorized {
        /// Operation that was attempted
        operation: String,
        /// Identity that attempted it
        caller: Identity,
        /// What the caller would have needed to be
        requirement: String,
    },

    /// Role outside the domain, or not the caller's own role.
    #[error("invalid role {role}: {reason}")]
    InvalidRole {
        /// Offending role
        role: Role,
        /// Why it was rejected
        reason: String,
    },

    /// Permit expiry not strictly after the current time.
    #[error("permit expiry {expiry} is not after current time {now}")]
    InvalidExpiry {
        /// Requested expiry
        expiry: Timestamp,
        /// Environment time at issuance
        now: Timestamp,
    },

    /// Index or identity lookup miss.
    #[error("not found: {message}")]
    NotFound {
        /// Description of what was looked up
        message: String,
    },

    /// Configuration failed validation.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// What was wrong with it
        message: String,
    },
}

/// Discriminant of [`VehicleError`] for callers that only care about the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`VehicleError::Unauthorized`]
    Unauthorized,
    /// See [`VehicleError::InvalidRole`]
    InvalidRole,
    /// See [`VehicleError::InvalidExpiry`]
    InvalidExpiry,
    /// See [`VehicleError::NotFound`]
    NotFound,
    /// See [`VehicleError::InvalidConfig`]
    InvalidConfig,
}

impl VehicleError {
    /// Create an unauthorized error.
    pub fn unauthorized(
        operation: impl Into<String>,
        caller: Identity,
        requirement: impl Into<String>,
    ) -> Self {
        Self::Unauthorized {
            operation: operation.into(),
            caller,
            requirement: requirement.into(),
        }
    }

    /// Create an invalid role error.
    pub fn invalid_role(role: Role, reason: impl Into<String>) -> Self {
        Self::InvalidRole {
            role,
            reason: reason.into(),
        }
    }

    /// Create an invalid expiry error.
    pub fn invalid_expiry(expiry: Timestamp, now: Timestamp) -> Self {
        Self::InvalidExpiry { expiry, now }
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidRole { .. } => ErrorKind::InvalidRole,
            Self::InvalidExpiry { .. } => ErrorKind::InvalidExpiry,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
        }
    }
}

/// Result alias for vehicle operations
pub type VehicleResult<T> = Result<T, VehicleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let caller = Identity::from_name("mallory");
        let err = VehicleError::unauthorized("transfer_owner", caller, "owner");
        assert!(err.to_string().contains("transfer_owner"));
        assert!(err.to_string().contains(&caller.to_string()));

        let err = VehicleError::invalid_expiry(Timestamp(5), Timestamp(10));
        assert!(err.to_string().contains("5s"));
        assert!(err.to_string().contains("10s"));

        let err = VehicleError::invalid_role(Role::INSURANCE, "outside domain");
        assert!(err.to_string().contains("insurance(1)"));
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(
            VehicleError::not_found("permit#9").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            VehicleError::invalid_config("empty").kind(),
            ErrorKind::InvalidConfig
        );
    }
}
