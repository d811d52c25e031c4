//! Error types for user administration.
//!
//! These are caller errors, not attacker-facing channels, so the messages may
//! be descriptive. Password plaintext never appears in any of them.

use thiserror::Error;

use crate::Error;

/// Errors raised by user, settings, role, and access-rule administration.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AdminError {
    /// The username is already taken.
    #[error("The username {username} is already taken by another user in the system")]
    UsernameTaken {
        /// The username that collided
        username: String,
    },

    /// No such user.
    #[error("User '{username}' does not exist")]
    UserNotFound {
        /// The username that was not found
        username: String,
    },

    /// The guest account cannot be created, edited, or deleted.
    #[error("The username {username} is reserved for the guest account")]
    ReservedUsername {
        /// The reserved username
        username: String,
    },

    /// The guest role cannot be assigned to a real user.
    #[error("The role {role} is reserved for the guest account")]
    ReservedRole {
        /// The reserved role
        role: String,
    },

    /// Usernames are restricted to lowercase letters, digits, `_` and `-`.
    #[error("The character '{character}' cannot be used in usernames")]
    InvalidUsernameCharacter {
        /// The offending character
        character: char,
    },

    /// A required field was empty or missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field
        field: &'static str,
    },

    /// The password does not satisfy the configured rules.
    #[error("Password did not obey the configured password rules: {pattern}")]
    PasswordPolicy {
        /// The pattern the password failed to match
        pattern: String,
    },

    /// The configured password pattern itself does not compile.
    #[error("Invalid password-rules pattern: {reason}")]
    InvalidPasswordPattern {
        /// Why the pattern was rejected
        reason: String,
    },

    /// `password` and `role` are never reachable through the settings
    /// pathway; they have dedicated operations.
    #[error("The {section} section cannot be accessed through settings")]
    ReservedSection {
        /// The reserved section name
        section: String,
    },

    /// The synthesized guest identity cannot change its own record.
    #[error("The default user cannot change settings or credentials")]
    DefaultUserReadOnly,

    /// Access-rule ids must be unique.
    #[error("There is already an access rule with id {id}")]
    DuplicateRuleId {
        /// The colliding rule id
        id: String,
    },

    /// An access rule must carry at least one filter entry.
    #[error("Access rule {id} has no filter entries")]
    EmptyAccessRule {
        /// The offending rule id
        id: String,
    },

    /// No rule matched the exact `(role, id)` pair.
    #[error("No access rule with role {role} and id {id}")]
    RuleNotFound {
        /// Role the rule was looked up under
        role: String,
        /// Id the rule was looked up under
        id: String,
    },
}

impl AdminError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AdminError::UserNotFound { .. } | AdminError::RuleNotFound { .. }
        )
    }

    /// Check if this error is a caller-side policy violation.
    pub fn is_policy_violation(&self) -> bool {
        !self.is_not_found()
    }
}

impl From<AdminError> for Error {
    fn from(err: AdminError) -> Self {
        Error::Admin(err)
    }
}
