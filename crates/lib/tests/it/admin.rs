//! User, settings, and role administration end to end.

use std::collections::BTreeMap;

use credo::admin::{NewUser, RoleCount, UserEdit};
use credo::auth::LoginRequest;
use credo::SessionId;
use serde_json::{Value, json};

use crate::helpers::Harness;

#[test]
fn created_users_round_trip_without_credentials() {
    let harness = Harness::new();
    harness.setup();

    let mut request = NewUser::new("alice", "pw", "dev");
    request.settings.insert("theme".to_string(), json!("dark"));
    harness.admin.create_user(&mut request).unwrap();

    let info = harness.admin.get_user("alice").unwrap();
    assert_eq!(info.username, "alice");
    assert_eq!(info.role, "dev");
    assert_eq!(info.settings["theme"], "dark");

    let users = harness.admin.list_users();
    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    // Guest is a synthesized identity, never a listed user.
    assert_eq!(names, vec!["alice", "root"]);
}

#[test]
fn edited_credentials_take_effect_immediately() {
    let harness = Harness::new();
    harness.setup();
    harness.add_user("alice", "old-pw", "dev");

    harness
        .admin
        .edit_user(
            "alice",
            &mut UserEdit {
                password: Some("new-pw".to_string()),
                role: Some("ops".to_string()),
                ..UserEdit::default()
            },
        )
        .unwrap();

    let session = SessionId::from("s1");
    let mut request = LoginRequest::new("alice", "old-pw", false);
    assert!(
        harness
            .auth
            .login(&session, &mut request)
            .unwrap_err()
            .is_credentials_rejected()
    );

    let mut request = LoginRequest::new("alice", "new-pw", false);
    let outcome = harness.auth.login(&session, &mut request).unwrap();
    assert_eq!(outcome.ticket.role, "ops");
}

#[test]
fn own_settings_flow_through_a_logged_in_ticket() {
    let harness = Harness::new();
    harness.setup();
    harness.add_user("alice", "pw", "dev");

    let session = SessionId::from("s1");
    let mut request = LoginRequest::new("alice", "pw", false);
    harness.auth.login(&session, &mut request).unwrap();
    let ticket = harness.auth.current_ticket(&session);

    harness
        .admin
        .change_setting(&ticket, "editor", json!({"tabs": false}))
        .unwrap();
    let settings = harness.admin.get_settings(&ticket, Some("editor")).unwrap();
    assert_eq!(settings["editor"]["tabs"], Value::Bool(false));

    // The reserved sections stay unreachable even for the record's owner.
    for section in ["password", "role"] {
        assert!(
            harness
                .admin
                .change_setting(&ticket, section, Value::Null)
                .unwrap_err()
                .is_policy_violation()
        );
    }
}

#[test]
fn anonymous_sessions_read_guest_settings_but_cannot_write() {
    let harness = Harness::new();
    harness.setup();

    let session = SessionId::from("s1");
    let guest = harness.auth.current_ticket(&session);
    assert!(guest.is_default);

    // Reads resolve against the guest record created at setup.
    assert!(harness.admin.get_settings(&guest, None).unwrap().is_empty());

    assert!(
        harness
            .admin
            .change_settings(&guest, BTreeMap::new())
            .unwrap_err()
            .is_policy_violation()
    );
}

#[test]
fn roles_report_counts_with_the_default_first() {
    let harness = Harness::new();
    harness.setup();
    harness.add_user("alice", "pw", "dev");
    harness.add_user("bob", "pw", "dev");
    harness.add_user("carol", "pw", "ops");

    assert_eq!(
        harness.admin.get_roles(),
        vec![
            RoleCount { role: "guest".to_string(), users: 1 },
            RoleCount { role: "dev".to_string(), users: 2 },
            RoleCount { role: "ops".to_string(), users: 1 },
            RoleCount { role: "root".to_string(), users: 1 },
        ]
    );
}

#[test]
fn deleted_users_cannot_log_back_in() {
    let harness = Harness::new();
    harness.setup();
    harness.add_user("alice", "pw", "dev");
    harness.admin.delete_user("alice").unwrap();

    let session = SessionId::from("s1");
    let mut request = LoginRequest::new("alice", "pw", false);
    assert!(
        harness
            .auth
            .login(&session, &mut request)
            .unwrap_err()
            .is_credentials_rejected()
    );
    assert!(harness.admin.get_user("alice").unwrap_err().is_not_found());
}

#[test]
fn password_rules_gate_every_credential_pathway() {
    let harness = Harness::with_policy(credo::CorePolicy {
        password_rules: Some(r"^.{10,}$".to_string()),
        ..credo::CorePolicy::default()
    });
    harness.admin.set_server_salt("salt").unwrap();

    // Setup itself is gated.
    assert!(
        harness
            .admin
            .set_root_password(&mut "short".to_string())
            .unwrap_err()
            .is_policy_violation()
    );
    harness
        .admin
        .set_root_password(&mut "long-enough-pw".to_string())
        .unwrap();

    // So are creation, edit, and self-service change.
    assert!(
        harness
            .admin
            .create_user(&mut NewUser::new("alice", "short", "dev"))
            .unwrap_err()
            .is_policy_violation()
    );
    harness.add_user("alice", "long-enough-pw", "dev");

    assert!(
        harness
            .admin
            .edit_user(
                "alice",
                &mut UserEdit {
                    password: Some("short".to_string()),
                    ..UserEdit::default()
                },
            )
            .unwrap_err()
            .is_policy_violation()
    );

    let session = SessionId::from("s1");
    let mut request = LoginRequest::new("alice", "long-enough-pw", false);
    harness.auth.login(&session, &mut request).unwrap();
    let ticket = harness.auth.current_ticket(&session);
    assert!(
        harness
            .admin
            .change_password(&ticket, &mut "short".to_string())
            .unwrap_err()
            .is_policy_violation()
    );
}
