//! Access rule types.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Role name meaning "applies to every role".
pub const WILDCARD_ROLE: &str = "*";

/// Whether a rule entry grants or revokes access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Allow,
    Deny,
}

/// Constraint attached to one operation filter of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Allow or deny when the constraint is satisfied.
    pub verdict: Verdict,

    /// File extensions (without the dot) the entry is limited to.
    /// Empty means "any type".
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub file_types: BTreeSet<String>,

    /// Restricts the entry to folder paths (trailing separator).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub folder_only: bool,
}

impl RuleEntry {
    /// Unconstrained entry with the given verdict.
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            file_types: BTreeSet::new(),
            folder_only: false,
        }
    }

    /// Whether the entry's own constraint holds for `path`.
    ///
    /// A file-type set takes precedence over the folder flag, matching how
    /// rules were authored historically: a typed entry speaks about files, a
    /// folder entry about directories, and an entry with neither speaks about
    /// everything under its prefix.
    fn constraint_satisfied(&self, path: &str) -> bool {
        if !self.file_types.is_empty() {
            self.file_types
                .iter()
                .any(|ext| path.ends_with(&format!(".{ext}")))
        } else if self.folder_only {
            path.ends_with('/')
        } else {
            true
        }
    }

    /// The decision this entry writes over the running fold value.
    ///
    /// Allow grants exactly when the constraint is satisfied; deny is the
    /// mirror image.
    pub fn apply(&self, path: &str) -> bool {
        let satisfied = self.constraint_satisfied(path);
        match self.verdict {
            Verdict::Allow => satisfied,
            Verdict::Deny => !satisfied,
        }
    }
}

/// A role-and-path-scoped access directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRule {
    /// Unique rule identifier. Generated when omitted at creation time.
    pub id: String,

    /// Concrete role name, or [`WILDCARD_ROLE`].
    pub role: String,

    /// Path prefix the rule covers; unrolled before matching.
    pub path: String,

    /// Per-operation-filter entries. At most one entry (allow or deny) per
    /// filter kind; one rule may carry several filter kinds.
    #[serde(default)]
    pub entries: BTreeMap<String, RuleEntry>,
}

impl AccessRule {
    /// Whether the rule applies to `role` (directly or through the wildcard).
    pub fn applies_to_role(&self, role: &str) -> bool {
        self.role == WILDCARD_ROLE || self.role == role
    }

    /// Whether the rule's subject is the wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.role == WILDCARD_ROLE
    }
}
