//! Persistence of the trust document across restarts.

use std::collections::BTreeMap;

use credo::access::{AccessRule, RuleEntry, Verdict};
use credo::auth::LoginRequest;
use credo::SessionId;

use crate::helpers::Harness;

#[test]
fn the_whole_document_survives_a_restart() {
    let harness = Harness::new();
    harness.setup();
    harness.add_user("alice", "pw", "dev");
    harness
        .admin
        .add_access(vec![AccessRule {
            id: "r1".to_string(),
            role: "dev".to_string(),
            path: "/a/".to_string(),
            entries: BTreeMap::from([("read".to_string(), RuleEntry::new(Verdict::Allow))]),
        }])
        .unwrap();
    let salt = harness.admin.server_salt().unwrap();

    let harness = harness.restart();

    // Salt, users, and rules all came back from disk.
    assert_eq!(harness.admin.server_salt().unwrap(), salt);
    assert_eq!(harness.admin.get_user("alice").unwrap().role, "dev");
    assert!(
        harness
            .access
            .has_access("dev", "/a/x.md", "read", false)
            .unwrap()
            .allowed
    );

    // And the stored credentials still authenticate.
    let session = SessionId::from("s1");
    let mut request = LoginRequest::new("alice", "pw", false);
    assert!(harness.auth.login(&session, &mut request).is_ok());
}

#[test]
fn write_once_fields_stay_write_once_across_restarts() {
    let harness = Harness::new();
    harness.setup();
    harness.admin.set_gnupg_keypair("fp-1").unwrap();

    let harness = harness.restart();
    assert!(
        harness
            .admin
            .set_server_salt("other")
            .unwrap_err()
            .is_write_once_violation()
    );
    assert!(
        harness
            .admin
            .set_gnupg_keypair("fp-2")
            .unwrap_err()
            .is_write_once_violation()
    );
    assert_eq!(harness.admin.gnupg_keypair().as_deref(), Some("fp-1"));
}

#[test]
fn a_failed_mutation_is_invisible_after_restart() {
    let harness = Harness::new();
    harness.setup();
    harness.add_user("alice", "pw", "dev");

    // Duplicate creation fails inside the locked transform; the document on
    // disk must be untouched by the attempt.
    assert!(
        harness
            .admin
            .create_user(&mut credo::admin::NewUser::new("alice", "pw2", "ops"))
            .unwrap_err()
            .is_policy_violation()
    );

    let harness = harness.restart();
    assert_eq!(harness.admin.get_user("alice").unwrap().role, "dev");
    let session = SessionId::from("s1");
    let mut request = LoginRequest::new("alice", "pw", false);
    assert!(harness.auth.login(&session, &mut request).is_ok());
}
