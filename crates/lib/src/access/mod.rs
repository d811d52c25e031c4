//! Access resolution: ordered allow/deny evaluation over path prefixes.
//!
//! Resolution is a deliberate sort-then-fold with overwrite semantics, not
//! first-match-wins. Candidates are sorted ascending by prefix so a longer
//! (more specific) prefix is applied after a shorter one, and at equal prefix
//! a concrete-role rule is applied after a wildcard rule. Each candidate
//! unconditionally overwrites the running decision, which lets an
//! administrator grant broad wildcard access and carve out role-specific
//! exceptions at the same path.

use std::cmp::Ordering;
use std::sync::Arc;

mod errors;
mod types;

pub use errors::AccessError;
pub use types::{AccessRule, RuleEntry, Verdict, WILDCARD_ROLE};

use crate::host::PathResolver;
use crate::store::CredentialStore;
use crate::ticket::Ticket;
use crate::{Result, policy::CorePolicy};

/// Outcome of a path-access query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    /// The final allow/deny decision.
    pub allowed: bool,
    /// Whether any rule actually matched, as opposed to falling back to the
    /// caller-supplied default.
    pub explicit: bool,
}

/// Evaluates allow/deny rules against a path, role, and operation filter.
pub struct AccessResolver {
    store: Arc<CredentialStore>,
    paths: Arc<dyn PathResolver>,
    root_role: String,
}

impl AccessResolver {
    pub fn new(
        store: Arc<CredentialStore>,
        paths: Arc<dyn PathResolver>,
        policy: &CorePolicy,
    ) -> Self {
        Self {
            store,
            paths,
            root_role: policy.root_role.clone(),
        }
    }

    /// Decide whether `role` may perform the `filter` operation on `path`.
    ///
    /// `default` seeds the decision when rules exist but say nothing about
    /// this query; `explicit` in the result tells the caller whether the
    /// default was overridden by at least one matching rule.
    pub fn has_access(
        &self,
        role: &str,
        path: &str,
        filter: &str,
        default: bool,
    ) -> Result<AccessDecision> {
        // Root bypasses rule evaluation entirely.
        if role == self.root_role {
            return Ok(AccessDecision {
                allowed: true,
                explicit: true,
            });
        }

        if filter.is_empty() {
            return Err(AccessError::FilterRequired.into());
        }
        if path.is_empty() {
            return Err(AccessError::PathRequired.into());
        }

        let path = self.paths.unroll(path);
        let document = self.store.read();

        // Candidate rules: right role, right filter kind, covering prefix.
        // Rule prefixes are unrolled as well, so rules may be authored with
        // virtual prefixes.
        let mut candidates: Vec<(String, &AccessRule)> = document
            .access
            .iter()
            .filter(|rule| rule.applies_to_role(role) && rule.entries.contains_key(filter))
            .map(|rule| (self.paths.unroll(&rule.path), rule))
            .filter(|(prefix, _)| path.starts_with(prefix.as_str()))
            .collect();

        // Ascending case-insensitive ordinal sort on the prefix; at equal
        // prefix the wildcard sorts first so a concrete role overrides it.
        candidates.sort_by(|(lhs_prefix, lhs), (rhs_prefix, rhs)| {
            lhs_prefix
                .to_lowercase()
                .cmp(&rhs_prefix.to_lowercase())
                .then_with(|| match (lhs.is_wildcard(), rhs.is_wildcard()) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => Ordering::Equal,
                })
        });

        let explicit = !candidates.is_empty();
        let mut allowed = default;
        for (_, rule) in &candidates {
            // Candidate selection guarantees the entry exists.
            if let Some(entry) = rule.entries.get(filter) {
                allowed = entry.apply(&path);
            }
        }

        Ok(AccessDecision { allowed, explicit })
    }

    /// List access rules visible to `ticket`.
    ///
    /// Root may list everything or narrow to one role; everyone else only
    /// sees the rules for their own role (plus wildcard rules) and may not
    /// ask for another role's.
    pub fn list_access(&self, ticket: &Ticket, role: Option<&str>) -> Result<Vec<AccessRule>> {
        let role = if ticket.role == self.root_role {
            role
        } else {
            if let Some(requested) = role
                && requested != ticket.role
            {
                return Err(AccessError::RoleNotPermitted {
                    role: requested.to_string(),
                }
                .into());
            }
            Some(ticket.role.as_str())
        };

        let document = self.store.read();
        Ok(document
            .access
            .iter()
            .filter(|rule| match role {
                Some(role) => rule.applies_to_role(role),
                None => true,
            })
            .cloned()
            .collect())
    }
}
