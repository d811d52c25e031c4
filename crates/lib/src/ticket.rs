//! Session tickets.
//!
//! A ticket is the ephemeral identity attached to one session. The manager
//! never exposes "no ticket": the first time a session is observed it gets a
//! synthesized guest ticket, and logout returns the session to that state.
//! Ticket state is an injected keyed scope, not ambient global state; every
//! operation that needs an identity takes an explicit [`SessionId`].

use std::collections::HashMap;
use std::sync::Mutex;

/// Opaque handle identifying one host session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Ephemeral per-session identity record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Who the session acts as.
    pub username: String,
    /// Role driving access resolution.
    pub role: String,
    /// Whether this is the synthesized guest identity.
    pub is_default: bool,
}

impl Ticket {
    /// Ticket for a successfully authenticated user.
    pub fn authenticated(username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
            is_default: false,
        }
    }
}

/// Issues, stores, and retrieves session tickets.
#[derive(Debug)]
pub struct TicketManager {
    sessions: Mutex<HashMap<SessionId, Ticket>>,
    guest_username: String,
    guest_role: String,
}

impl TicketManager {
    /// Create a manager that synthesizes guest tickets from the given
    /// default identifiers.
    pub fn new(guest_username: impl Into<String>, guest_role: impl Into<String>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            guest_username: guest_username.into(),
            guest_role: guest_role.into(),
        }
    }

    /// The session's ticket, lazily creating the guest ticket the first time
    /// the session is observed.
    pub fn current(&self, session: &SessionId) -> Ticket {
        let mut sessions = self.sessions.lock().unwrap();
        sessions
            .entry(session.clone())
            .or_insert_with(|| {
                tracing::debug!(session = session.as_str(), "issuing default ticket");
                Ticket {
                    username: self.guest_username.clone(),
                    role: self.guest_role.clone(),
                    is_default: true,
                }
            })
            .clone()
    }

    /// Whether the session already carries a ticket (default or not).
    pub fn is_set(&self, session: &SessionId) -> bool {
        self.sessions.lock().unwrap().contains_key(session)
    }

    /// Replace the session's ticket, or clear it so the next access
    /// synthesizes a fresh guest ticket.
    pub fn set(&self, session: &SessionId, ticket: Option<Ticket>) {
        let mut sessions = self.sessions.lock().unwrap();
        match ticket {
            Some(ticket) => {
                sessions.insert(session.clone(), ticket);
            }
            None => {
                sessions.remove(session);
            }
        }
    }
}
