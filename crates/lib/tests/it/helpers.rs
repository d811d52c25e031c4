//! Shared fixtures: a fully wired engine stack over a temp-dir store.

use std::sync::Arc;

use credo::access::AccessResolver;
use credo::admin::{NewUser, UserAdmin};
use credo::auth::{AuthEngine, BruteForceGuard, MemoryCache};
use credo::clock::Clock;
use credo::crypto::{PasswordHasher, generate_salt};
use credo::host::{IdentityPaths, NoopHooks, NoopWorkspace};
use credo::{CorePolicy, CredentialStore, FixedClock, TicketManager};

/// The whole engine stack as a host would assemble it, backed by a file in a
/// temp directory that lives as long as the harness.
pub struct Harness {
    pub clock: Arc<FixedClock>,
    pub auth: AuthEngine,
    pub admin: UserAdmin,
    pub access: AccessResolver,
    policy: CorePolicy,
    dir: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_policy(CorePolicy::default())
    }

    pub fn with_policy(policy: CorePolicy) -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self::assemble(dir, policy)
    }

    /// Tear the stack down and rebuild it over the same backing file, the way
    /// a host restart would. Sessions and cooldown state do not survive;
    /// the trust document does.
    pub fn restart(self) -> Self {
        let Harness { dir, policy, .. } = self;
        Self::assemble(dir, policy)
    }

    fn assemble(dir: tempfile::TempDir, policy: CorePolicy) -> Self {
        let store = Arc::new(CredentialStore::open(dir.path().join("trust.json")).unwrap());
        let clock = Arc::new(FixedClock::new(1_000));
        let hasher = PasswordHasher::default();
        let tickets = Arc::new(TicketManager::new(
            &policy.guest_username,
            &policy.guest_role,
        ));
        let guard = BruteForceGuard::new(
            Arc::new(MemoryCache::new()),
            Arc::clone(&clock) as Arc<dyn Clock>,
            policy.cooldown_secs,
        );
        let auth = AuthEngine::new(
            Arc::clone(&store),
            hasher.clone(),
            guard,
            tickets,
            Arc::new(NoopHooks),
        );
        let admin = UserAdmin::new(
            Arc::clone(&store),
            hasher,
            Arc::new(NoopWorkspace),
            policy.clone(),
        );
        let access = AccessResolver::new(store, Arc::new(IdentityPaths), &policy);
        Self {
            clock,
            auth,
            admin,
            access,
            policy,
            dir,
        }
    }

    /// Run system setup: generate and write the salt, create root and guest.
    pub fn setup(&self) {
        self.admin.set_server_salt(generate_salt()).unwrap();
        self.admin
            .set_root_password(&mut "root-password".to_string())
            .unwrap();
    }

    /// Create a regular user with the given role.
    pub fn add_user(&self, username: &str, password: &str, role: &str) {
        self.admin
            .create_user(&mut NewUser::new(username, password, role))
            .unwrap();
    }
}
