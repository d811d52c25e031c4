//! Error types for access resolution.

use thiserror::Error;

use crate::Error;

/// Errors raised while resolving or listing access rules.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AccessError {
    /// `has_access` requires an operation filter.
    #[error("No operation filter supplied")]
    FilterRequired,

    /// `has_access` requires a path to evaluate.
    #[error("No path supplied")]
    PathRequired,

    /// A non-root caller asked for another role's access rules.
    #[error("A non-root user cannot request access rules for role: {role}")]
    RoleNotPermitted {
        /// The role that was requested
        role: String,
    },
}

impl AccessError {
    /// Check if this error is a caller-side policy violation.
    pub fn is_policy_violation(&self) -> bool {
        true
    }
}

impl From<AccessError> for Error {
    fn from(err: AccessError) -> Self {
        Error::Access(err)
    }
}
