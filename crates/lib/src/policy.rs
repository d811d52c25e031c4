//! Policy values supplied by the host configuration.
//!
//! These are the knobs the original deployment read from its config file:
//! the brute-force cooldown window, the password-acceptance pattern, the
//! persistent-token lifetime, and the reserved identifiers for the guest
//! account and the root role.

use serde::Deserialize;

/// Sentinel cooldown value meaning "no cooldown between login attempts".
pub const COOLDOWN_DISABLED: i64 = -1;

/// Username of the privileged account created at system setup.
pub const ROOT_USERNAME: &str = "root";

/// Host-configured policy for the authentication core.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorePolicy {
    /// Minimum seconds between successive login attempts for one username.
    /// [`COOLDOWN_DISABLED`] turns the check off entirely.
    pub cooldown_secs: i64,

    /// Regular expression every new password must match. `None` means any
    /// non-empty password is acceptable.
    pub password_rules: Option<String>,

    /// How long a persistent login token stays valid, in days. The core does
    /// not enforce this; it is handed to the host when a token is issued.
    pub token_valid_days: u32,

    /// Username of the synthesized guest account.
    pub guest_username: String,

    /// Role of the synthesized guest account.
    pub guest_role: String,

    /// Role that bypasses all access-rule evaluation.
    pub root_role: String,
}

impl Default for CorePolicy {
    fn default() -> Self {
        Self {
            cooldown_secs: COOLDOWN_DISABLED,
            password_rules: None,
            token_valid_days: 90,
            guest_username: "guest".to_string(),
            guest_role: "guest".to_string(),
            root_role: "root".to_string(),
        }
    }
}

impl CorePolicy {
    /// Check a candidate password against the configured rules.
    ///
    /// Returns `Ok(false)` for a password the pattern rejects and `Err` when
    /// the configured pattern itself does not compile.
    pub fn password_acceptable(&self, password: &str) -> Result<bool, regex::Error> {
        if password.is_empty() {
            return Ok(false);
        }
        match &self.password_rules {
            Some(pattern) if !pattern.is_empty() => {
                let re = regex::Regex::new(pattern)?;
                Ok(re.is_match(password))
            }
            _ => Ok(true),
        }
    }
}
