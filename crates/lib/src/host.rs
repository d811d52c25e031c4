//! Host collaborator interfaces.
//!
//! The core never touches the filesystem layout, runs user hooks, or resolves
//! virtual path prefixes itself; those concerns belong to the embedding host
//! and are injected at the seams defined here. Each trait ships a no-op
//! default implementation so a host only wires what it cares about.

use serde_json::Value;

use crate::Result;

/// Canonicalizes paths before rule matching.
///
/// Access rules and queried paths may carry virtual prefixes (`~/`, vendor
/// roots, and so on); both sides are unrolled through this collaborator before
/// any prefix comparison.
pub trait PathResolver: Send + Sync {
    /// Return the canonical absolute form of `path`.
    fn unroll(&self, path: &str) -> String;
}

/// Resolver that treats every path as already canonical.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPaths;

impl PathResolver for IdentityPaths {
    fn unroll(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Executes user-registered settings hooks (`.onlogin` / `.onlogout`).
///
/// The hook body is an opaque structured value owned by the user's settings;
/// the core observes no return value.
pub trait HookRunner: Send + Sync {
    /// Run `hook` on behalf of `username`. Failures are the host's business.
    fn run(&self, username: &str, hook: &Value);
}

/// Hook runner that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl HookRunner for NoopHooks {
    fn run(&self, _username: &str, _hook: &Value) {}
}

/// Provisions per-user workspaces (home directories) on user lifecycle events.
pub trait Workspace: Send + Sync {
    /// Create the workspace for a freshly created user.
    fn provision(&self, username: &str) -> Result<()>;

    /// Tear down the workspace of a deleted user.
    fn remove(&self, username: &str) -> Result<()>;
}

/// Workspace provider that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWorkspace;

impl Workspace for NoopWorkspace {
    fn provision(&self, _username: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _username: &str) -> Result<()> {
        Ok(())
    }
}
