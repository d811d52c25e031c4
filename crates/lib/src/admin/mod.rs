//! User administration: users, settings, roles, and access-rule management.
//!
//! Every mutation here is a wrapper over [`CredentialStore::mutate`], with
//! validation applied before the write lock is taken. Password hashing also
//! happens before the lock: the salt is fetched through a short read first,
//! so the hash primitive never runs inside the store's critical section.

use std::collections::BTreeMap;
use std::mem;
use std::sync::Arc;

use serde_json::Value;
use zeroize::Zeroizing;

mod errors;

pub use errors::AdminError;

use crate::access::AccessRule;
use crate::crypto::{PASSWORD_PLACEHOLDER, PasswordHasher};
use crate::host::Workspace;
use crate::policy::{CorePolicy, ROOT_USERNAME};
use crate::store::{CredentialStore, UserRecord, is_reserved_section};
use crate::ticket::Ticket;
use crate::Result;

/// Argument bundle for [`UserAdmin::create_user`].
///
/// The password field is scrubbed to a fixed placeholder as the first step of
/// the operation, before any validation can fail.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: String,
    /// Initial free-form settings sections. Reserved section names are
    /// dropped silently.
    pub settings: BTreeMap<String, Value>,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: role.into(),
            settings: BTreeMap::new(),
        }
    }
}

/// Argument bundle for [`UserAdmin::edit_user`].
///
/// There is deliberately no username field: the identity key of a user can
/// never be changed. `None` fields keep their stored values.
#[derive(Debug, Default)]
pub struct UserEdit {
    pub password: Option<String>,
    pub role: Option<String>,
    /// Full replacement for the user's settings sections, when present.
    pub settings: Option<BTreeMap<String, Value>>,
}

/// A user as returned to callers. Never carries the password hash.
#[derive(Debug, Clone, PartialEq)]
pub struct UserInfo {
    pub username: String,
    pub role: String,
    pub settings: BTreeMap<String, Value>,
}

/// One row of [`UserAdmin::list_users`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub username: String,
    pub role: String,
}

/// One row of [`UserAdmin::get_roles`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCount {
    pub role: String,
    /// How many users currently hold the role.
    pub users: usize,
}

/// Administrative operations over the trust document.
pub struct UserAdmin {
    store: Arc<CredentialStore>,
    hasher: PasswordHasher,
    workspace: Arc<dyn Workspace>,
    policy: CorePolicy,
}

impl UserAdmin {
    pub fn new(
        store: Arc<CredentialStore>,
        hasher: PasswordHasher,
        workspace: Arc<dyn Workspace>,
        policy: CorePolicy,
    ) -> Self {
        Self {
            store,
            hasher,
            workspace,
            policy,
        }
    }

    // === Users ===

    /// Create a user and provision their workspace.
    pub fn create_user(&self, request: &mut NewUser) -> Result<()> {
        let password = take_plaintext(&mut request.password);

        if request.role == self.policy.guest_role {
            return Err(AdminError::ReservedRole {
                role: request.role.clone(),
            }
            .into());
        }
        if request.username == self.policy.guest_username {
            return Err(AdminError::ReservedUsername {
                username: request.username.clone(),
            }
            .into());
        }
        if request.username.is_empty() {
            return Err(AdminError::MissingField { field: "username" }.into());
        }
        if request.role.is_empty() {
            return Err(AdminError::MissingField { field: "role" }.into());
        }
        validate_username(&request.username)?;
        self.check_password(&password)?;

        // Salt through a short read, hash outside the write lock.
        let salt = self.store.server_salt()?;
        let hashed = self.hasher.hash(&salt, &password);

        let username = request.username.clone();
        let role = request.role.clone();
        let settings = strip_reserved(mem::take(&mut request.settings));
        self.store.mutate(move |doc| {
            if doc.users.contains_key(&username) {
                return Err(AdminError::UsernameTaken { username }.into());
            }
            let mut record = UserRecord::new(hashed, role);
            record.settings = settings;
            doc.users.insert(username, record);
            Ok(())
        })?;

        tracing::debug!(username = %request.username, role = %request.role, "user created");
        self.workspace.provision(&request.username)?;
        Ok(())
    }

    /// Fetch one user. The password hash is never part of the result.
    pub fn get_user(&self, username: &str) -> Result<UserInfo> {
        let document = self.store.read();
        let user = document
            .users
            .get(username)
            .ok_or_else(|| AdminError::UserNotFound {
                username: username.to_string(),
            })?;
        Ok(UserInfo {
            username: username.to_string(),
            role: user.role.clone(),
            settings: user.settings.clone(),
        })
    }

    /// Edit a user's password, role, or settings. `None` fields are kept.
    pub fn edit_user(&self, username: &str, edit: &mut UserEdit) -> Result<()> {
        let password = edit
            .password
            .as_mut()
            .map(|field| take_plaintext(field));

        if username == self.policy.guest_username {
            return Err(AdminError::ReservedUsername {
                username: username.to_string(),
            }
            .into());
        }
        if let Some(role) = &edit.role
            && role == &self.policy.guest_role
        {
            return Err(AdminError::ReservedRole { role: role.clone() }.into());
        }

        // Salt is only needed (and only fetched) when a new password was
        // supplied; fetching it outside the lock keeps the critical section
        // free of hashing.
        let hashed = match &password {
            Some(password) => {
                self.check_password(password)?;
                let salt = self.store.server_salt()?;
                Some(self.hasher.hash(&salt, password))
            }
            None => None,
        };

        let owner = username.to_string();
        let role = edit.role.clone();
        let settings = edit.settings.take().map(strip_reserved);
        self.store.mutate(move |doc| {
            let user = doc
                .users
                .get_mut(&owner)
                .ok_or(AdminError::UserNotFound { username: owner })?;
            if let Some(hashed) = hashed {
                user.password_hash = Some(hashed);
            }
            if let Some(role) = role {
                user.role = role;
            }
            if let Some(settings) = settings {
                user.settings = settings;
            }
            Ok(())
        })
    }

    /// Delete a user and tear down their workspace.
    pub fn delete_user(&self, username: &str) -> Result<()> {
        if username == self.policy.guest_username {
            return Err(AdminError::ReservedUsername {
                username: username.to_string(),
            }
            .into());
        }
        let owner = username.to_string();
        self.store.mutate(move |doc| {
            doc.users
                .remove(&owner)
                .map(|_| ())
                .ok_or_else(|| AdminError::UserNotFound { username: owner }.into())
        })?;
        tracing::debug!(username, "user deleted");
        self.workspace.remove(username)?;
        Ok(())
    }

    /// All real users (the guest account is not one) with their roles.
    pub fn list_users(&self) -> Vec<UserSummary> {
        self.store
            .read()
            .users
            .iter()
            .filter(|(username, _)| *username != &self.policy.guest_username)
            .map(|(username, user)| UserSummary {
                username: username.clone(),
                role: user.role.clone(),
            })
            .collect()
    }

    // === Settings ===

    /// Settings sections of the ticket's user; one section when `section`
    /// is given, all of them otherwise. The reserved sections are not
    /// retrievable here.
    pub fn get_settings(
        &self,
        ticket: &Ticket,
        section: Option<&str>,
    ) -> Result<BTreeMap<String, Value>> {
        if let Some(section) = section
            && is_reserved_section(section)
        {
            return Err(AdminError::ReservedSection {
                section: section.to_string(),
            }
            .into());
        }

        let document = self.store.read();
        let user = document
            .users
            .get(&ticket.username)
            .ok_or_else(|| AdminError::UserNotFound {
                username: ticket.username.clone(),
            })?;

        Ok(match section {
            Some(section) => user
                .settings
                .get(section)
                .map(|value| BTreeMap::from([(section.to_string(), value.clone())]))
                .unwrap_or_default(),
            None => user.settings.clone(),
        })
    }

    /// Replace all settings sections of the ticket's user.
    ///
    /// Hard-fails without touching the store when a reserved section is
    /// present; password and role have dedicated operations.
    pub fn change_settings(
        &self,
        ticket: &Ticket,
        sections: BTreeMap<String, Value>,
    ) -> Result<()> {
        self.check_settings_access(ticket, sections.keys().map(String::as_str))?;
        let owner = ticket.username.clone();
        self.store.mutate(move |doc| {
            let user = doc
                .users
                .get_mut(&owner)
                .ok_or(AdminError::UserNotFound { username: owner })?;
            user.settings = sections;
            Ok(())
        })
    }

    /// Replace a single settings section of the ticket's user.
    pub fn change_setting(&self, ticket: &Ticket, section: &str, value: Value) -> Result<()> {
        self.check_settings_access(ticket, std::iter::once(section))?;
        let owner = ticket.username.clone();
        let section = section.to_string();
        self.store.mutate(move |doc| {
            let user = doc
                .users
                .get_mut(&owner)
                .ok_or(AdminError::UserNotFound { username: owner })?;
            user.settings.insert(section, value);
            Ok(())
        })
    }

    /// Change the password of the ticket's user.
    pub fn change_password(&self, ticket: &Ticket, new_password: &mut String) -> Result<()> {
        let password = take_plaintext(new_password);
        if ticket.is_default {
            return Err(AdminError::DefaultUserReadOnly.into());
        }
        self.check_password(&password)?;

        let salt = self.store.server_salt()?;
        let hashed = self.hasher.hash(&salt, &password);

        let owner = ticket.username.clone();
        self.store.mutate(move |doc| {
            let user = doc
                .users
                .get_mut(&owner)
                .ok_or(AdminError::UserNotFound { username: owner })?;
            user.password_hash = Some(hashed);
            Ok(())
        })
    }

    // === Roles ===

    /// All roles in the system with their user counts.
    ///
    /// The guest role is always reported first, even when no user currently
    /// holds it; roles are not first-class stored entities.
    pub fn get_roles(&self) -> Vec<RoleCount> {
        let document = self.store.read();
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for user in document.users.values() {
            *counts.entry(user.role.clone()).or_insert(0) += 1;
        }

        let default_count = counts.remove(&self.policy.guest_role).unwrap_or(0);
        let mut roles = vec![RoleCount {
            role: self.policy.guest_role.clone(),
            users: default_count,
        }];
        roles.extend(
            counts
                .into_iter()
                .map(|(role, users)| RoleCount { role, users }),
        );
        roles
    }

    // === Access rules ===

    /// Append access rules, generating an id for each rule that lacks one.
    /// Returns the ids in rule order.
    pub fn add_access(&self, rules: Vec<AccessRule>) -> Result<Vec<String>> {
        self.store_rules(rules, false)
    }

    /// Replace the whole rule set. Replaying the same rules is idempotent.
    pub fn set_access(&self, rules: Vec<AccessRule>) -> Result<Vec<String>> {
        self.store_rules(rules, true)
    }

    /// Delete the rule matching the exact `(role, id)` pair.
    ///
    /// No match is an error, not a silent no-op.
    pub fn delete_access(&self, role: &str, id: &str) -> Result<()> {
        let (role, id) = (role.to_string(), id.to_string());
        self.store.mutate(move |doc| {
            let position = doc
                .access
                .iter()
                .position(|rule| rule.role == role && rule.id == id)
                .ok_or(AdminError::RuleNotFound { role, id })?;
            doc.access.remove(position);
            Ok(())
        })
    }

    // === Write-once system fields ===

    /// The server salt, if initialized.
    pub fn server_salt(&self) -> Option<String> {
        self.store.read().server_salt().map(str::to_string)
    }

    /// Initialize the server salt. A second call always fails, regardless of
    /// caller role.
    pub fn set_server_salt(&self, salt: impl Into<String>) -> Result<()> {
        let salt = salt.into();
        self.store.mutate(move |doc| Ok(doc.set_server_salt(salt)?))
    }

    /// The GnuPG keypair fingerprint, if recorded.
    pub fn gnupg_keypair(&self) -> Option<String> {
        self.store.read().gnupg_keypair().map(str::to_string)
    }

    /// Record the GnuPG keypair fingerprint. Write-once, like the salt.
    pub fn set_gnupg_keypair(&self, fingerprint: impl Into<String>) -> Result<()> {
        let fingerprint = fingerprint.into();
        self.store
            .mutate(move |doc| Ok(doc.set_gnupg_keypair(fingerprint)?))
    }

    // === System setup ===

    /// Create the root account and the guest record during system setup.
    ///
    /// Fails like any other user creation if the root account already
    /// exists.
    pub fn set_root_password(&self, password: &mut String) -> Result<()> {
        let plaintext = take_plaintext(password);
        let mut request = NewUser::new(ROOT_USERNAME, plaintext.as_str(), &self.policy.root_role);
        self.create_user(&mut request)?;

        // The guest record backs settings lookups for anonymous sessions; it
        // carries no password and can never be logged into.
        let guest_username = self.policy.guest_username.clone();
        let guest_role = self.policy.guest_role.clone();
        self.store.mutate(move |doc| {
            doc.users.entry(guest_username).or_insert(UserRecord {
                password_hash: None,
                role: guest_role,
                settings: BTreeMap::new(),
            });
            Ok(())
        })
    }

    // === Helpers ===

    fn check_password(&self, password: &str) -> Result<()> {
        if password.is_empty() {
            return Err(AdminError::MissingField { field: "password" }.into());
        }
        let acceptable = self
            .policy
            .password_acceptable(password)
            .map_err(|e| AdminError::InvalidPasswordPattern {
                reason: e.to_string(),
            })?;
        if !acceptable {
            return Err(AdminError::PasswordPolicy {
                pattern: self.policy.password_rules.clone().unwrap_or_default(),
            }
            .into());
        }
        Ok(())
    }

    fn check_settings_access<'a>(
        &self,
        ticket: &Ticket,
        sections: impl Iterator<Item = &'a str>,
    ) -> Result<()> {
        if ticket.is_default {
            return Err(AdminError::DefaultUserReadOnly.into());
        }
        for section in sections {
            if is_reserved_section(section) {
                return Err(AdminError::ReservedSection {
                    section: section.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn store_rules(&self, rules: Vec<AccessRule>, replace: bool) -> Result<Vec<String>> {
        let mut assigned_ids = Vec::with_capacity(rules.len());
        let mut prepared = Vec::with_capacity(rules.len());
        for mut rule in rules {
            if rule.id.is_empty() {
                rule.id = uuid::Uuid::new_v4().to_string();
            }
            if rule.entries.is_empty() {
                return Err(AdminError::EmptyAccessRule { id: rule.id }.into());
            }
            assigned_ids.push(rule.id.clone());
            prepared.push(rule);
        }

        self.store.mutate(move |doc| {
            if replace {
                doc.access.clear();
            }
            for rule in prepared {
                if doc.access.iter().any(|existing| existing.id == rule.id) {
                    return Err(AdminError::DuplicateRuleId { id: rule.id }.into());
                }
                doc.access.push(rule);
            }
            Ok(())
        })?;
        Ok(assigned_ids)
    }
}

/// Take a plaintext password out of an argument bundle, leaving the fixed
/// placeholder behind so the bundle can never echo the secret.
fn take_plaintext(field: &mut String) -> Zeroizing<String> {
    Zeroizing::new(mem::replace(field, PASSWORD_PLACEHOLDER.to_string()))
}

/// Usernames name workspace directories, so the charset is restricted to
/// lowercase letters, digits, `_` and `-`.
fn validate_username(username: &str) -> Result<()> {
    for character in username.chars() {
        if !character.is_ascii_lowercase() && !character.is_ascii_digit() && character != '_'
            && character != '-'
        {
            return Err(AdminError::InvalidUsernameCharacter { character }.into());
        }
    }
    Ok(())
}

/// Drop reserved section names from a free-form settings map.
fn strip_reserved(settings: BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    settings
        .into_iter()
        .filter(|(section, _)| !is_reserved_section(section))
        .collect()
}
