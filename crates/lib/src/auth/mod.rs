//! Authentication flow: login, logout, and persistent-token login.
//!
//! A login runs cooldown check → unconditional hash → lookup, in that order.
//! The hash is computed before the username is even looked up so the time
//! cost stays uniform across "bad username" and "bad password", and both
//! failures surface as the same [`AuthError::CredentialsNotAccepted`]. The
//! plaintext password is scrubbed out of the request the moment it is taken,
//! so no failure path can carry it to a caller or a log sink.

use std::mem;
use std::sync::Arc;

use zeroize::Zeroizing;

mod errors;
mod guard;

pub use errors::AuthError;
pub use guard::{AttemptCache, BruteForceGuard, MemoryCache};

use crate::crypto::{PASSWORD_PLACEHOLDER, PasswordHasher};
use crate::host::HookRunner;
use crate::policy::ROOT_USERNAME;
use crate::store::{CredentialStore, UserRecord};
use crate::ticket::{SessionId, Ticket, TicketManager};
use crate::Result;

/// Settings section holding the hook run after a successful login.
pub const ONLOGIN_SECTION: &str = ".onlogin";
/// Settings section holding the hook run before logout.
pub const ONLOGOUT_SECTION: &str = ".onlogout";

/// Credentials supplied by the host for a login attempt.
///
/// The password field is overwritten with a fixed placeholder as the first
/// step of [`AuthEngine::login`], on success and on every failure path alike.
#[derive(Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Whether the caller wants a persistent-login token issued.
    pub persist: bool,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>, persist: bool) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            persist,
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The freshly issued session ticket.
    pub ticket: Ticket,
    /// Persistent-login token for the host to store, when requested.
    /// Opaque to the host; the core parses it back in
    /// [`AuthEngine::login_from_token`].
    pub persistent_token: Option<String>,
}

/// Outcome of a persistent-token login attempt.
///
/// Token validation is the one place failures are deliberately swallowed
/// instead of surfaced to the end user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    /// Token matched; the session now carries this ticket.
    Accepted(Ticket),
    /// The stored hash no longer matches, which is what a salt or password
    /// rotation looks like. Not an attack signal: no brute-force bookkeeping,
    /// the session simply stays anonymous.
    Superseded,
    /// Malformed token, unknown user, or no root account (system reset).
    /// The host should discard the token and proceed anonymously.
    Rejected,
}

/// Issues and tears down session identity from credentials.
pub struct AuthEngine {
    store: Arc<CredentialStore>,
    hasher: PasswordHasher,
    guard: BruteForceGuard,
    tickets: Arc<TicketManager>,
    hooks: Arc<dyn HookRunner>,
}

impl AuthEngine {
    pub fn new(
        store: Arc<CredentialStore>,
        hasher: PasswordHasher,
        guard: BruteForceGuard,
        tickets: Arc<TicketManager>,
        hooks: Arc<dyn HookRunner>,
    ) -> Self {
        Self {
            store,
            hasher,
            guard,
            tickets,
            hooks,
        }
    }

    /// The session's current ticket (guest if nobody is logged in).
    pub fn current_ticket(&self, session: &SessionId) -> Ticket {
        self.tickets.current(session)
    }

    /// Attempt a login and attach a fresh ticket to the session.
    ///
    /// Wrong password and unknown username produce the identical error value;
    /// both record a failed attempt for the cooldown window.
    pub fn login(&self, session: &SessionId, request: &mut LoginRequest) -> Result<LoginOutcome> {
        let password = Zeroizing::new(mem::replace(
            &mut request.password,
            PASSWORD_PLACEHOLDER.to_string(),
        ));

        self.guard.check(&request.username)?;

        // One snapshot serves both the salt fetch and the later lookup; no
        // lock is held while hashing.
        let document = self.store.read();

        // Hash unconditionally, before the username is looked up, to keep
        // the time cost uniform whether or not the user exists. An
        // uninitialized salt hashes as empty and can never match a stored
        // credential.
        let salt = document.server_salt().unwrap_or_default();
        let hashed = self.hasher.hash(salt, &password);

        let user = document.users.get(&request.username);
        let Some(user) = user.filter(|u| u.password_hash.as_deref() == Some(hashed.as_str()))
        else {
            self.guard.record_failure(&request.username);
            tracing::warn!(username = %request.username, "login rejected");
            return Err(AuthError::CredentialsNotAccepted.into());
        };

        let ticket = Ticket::authenticated(&request.username, &user.role);
        self.tickets.set(session, Some(ticket.clone()));
        tracing::debug!(username = %request.username, role = %user.role, "login accepted");

        let persistent_token = request
            .persist
            .then(|| format!("{} {}", request.username, hashed));

        self.run_hook(&request.username, user, ONLOGIN_SECTION);

        Ok(LoginOutcome {
            ticket,
            persistent_token,
        })
    }

    /// Log the session out.
    ///
    /// Runs the user's `.onlogout` hook, then discards the ticket; the next
    /// access observes the guest ticket. Returns the ticket that held the
    /// session so the host can invalidate any persistent-login token it
    /// stored for that user.
    pub fn logout(&self, session: &SessionId) -> Ticket {
        let ticket = self.tickets.current(session);
        if !ticket.is_default
            && let Some(user) = self.store.read().users.get(&ticket.username)
        {
            self.run_hook(&ticket.username, user, ONLOGOUT_SECTION);
        }
        self.tickets.set(session, None);
        tracing::debug!(session = session.as_str(), "session logged out");
        ticket
    }

    /// Attempt to establish a ticket from a stored persistent-login token.
    ///
    /// Never surfaces an error and never records brute-force failures; see
    /// [`TokenOutcome`] for what the host should do with the token.
    pub fn login_from_token(&self, session: &SessionId, token: &str) -> TokenOutcome {
        // A reset system has no root account; any token predating the reset
        // is garbage.
        if !self.has_root_account() {
            return TokenOutcome::Rejected;
        }

        let Some((username, hashed)) = parse_token(token) else {
            return TokenOutcome::Rejected;
        };

        let document = self.store.read();
        let Some(user) = document.users.get(username) else {
            return TokenOutcome::Rejected;
        };

        if user.password_hash.as_deref() != Some(hashed) {
            return TokenOutcome::Superseded;
        }

        let ticket = Ticket::authenticated(username, &user.role);
        self.tickets.set(session, Some(ticket.clone()));
        tracing::debug!(username, "login from persistent token");
        TokenOutcome::Accepted(ticket)
    }

    /// Whether the root account exists, i.e. the system has been set up.
    pub fn has_root_account(&self) -> bool {
        self.store.read().users.contains_key(ROOT_USERNAME)
    }

    fn run_hook(&self, username: &str, user: &UserRecord, section: &str) {
        if let Some(hook) = user.settings.get(section) {
            self.hooks.run(username, hook);
        }
    }
}

/// Split a persistent token into its `username` and `hash` halves.
fn parse_token(token: &str) -> Option<(&str, &str)> {
    match token.split_once(' ') {
        Some((username, hashed))
            if !username.is_empty() && !hashed.is_empty() && !hashed.contains(' ') =>
        {
            Some((username, hashed))
        }
        _ => None,
    }
}
