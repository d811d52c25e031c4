//! Login, logout, cooldown, and persistent-token flows through the full
//! stack.

use credo::auth::{LoginRequest, TokenOutcome};
use credo::crypto::PASSWORD_PLACEHOLDER;
use credo::{CorePolicy, SessionId};

use crate::helpers::Harness;

#[test]
fn setup_then_login_then_logout() {
    let harness = Harness::new();
    harness.setup();
    harness.add_user("alice", "correct horse", "dev");

    let session = SessionId::from("s1");
    assert!(harness.auth.current_ticket(&session).is_default);

    let mut request = LoginRequest::new("alice", "correct horse", false);
    let outcome = harness.auth.login(&session, &mut request).unwrap();
    assert_eq!(outcome.ticket.username, "alice");
    assert_eq!(outcome.ticket.role, "dev");
    assert_eq!(request.password, PASSWORD_PLACEHOLDER);

    let cleared = harness.auth.logout(&session);
    assert_eq!(cleared.username, "alice");
    assert!(harness.auth.current_ticket(&session).is_default);
}

#[test]
fn root_login_works_after_setup() {
    let harness = Harness::new();
    harness.setup();

    let session = SessionId::from("s1");
    let mut request = LoginRequest::new("root", "root-password", false);
    let outcome = harness.auth.login(&session, &mut request).unwrap();
    assert_eq!(outcome.ticket.role, "root");
}

#[test]
fn guest_account_cannot_be_logged_into() {
    let harness = Harness::new();
    harness.setup();

    // The guest record exists but carries no credentials; any password is
    // rejected the same way a wrong password would be.
    let session = SessionId::from("s1");
    let mut request = LoginRequest::new("guest", "", false);
    let err = harness.auth.login(&session, &mut request).unwrap_err();
    assert!(err.is_credentials_rejected());
}

#[test]
fn cooldown_spans_unknown_and_known_usernames() {
    let harness = Harness::with_policy(CorePolicy {
        cooldown_secs: 30,
        ..CorePolicy::default()
    });
    harness.setup();
    harness.add_user("alice", "pw", "dev");

    let session = SessionId::from("s1");

    // A failure against a name that does not exist still arms the window
    // for that name.
    let mut probe = LoginRequest::new("mallory", "guess", false);
    assert!(
        harness
            .auth
            .login(&session, &mut probe)
            .unwrap_err()
            .is_credentials_rejected()
    );
    let mut probe = LoginRequest::new("mallory", "guess", false);
    assert!(
        harness
            .auth
            .login(&session, &mut probe)
            .unwrap_err()
            .is_cooldown()
    );

    // Other usernames are unaffected.
    let mut request = LoginRequest::new("alice", "pw", false);
    assert!(harness.auth.login(&session, &mut request).is_ok());

    // Once the window elapses the name is probeable again (and still fails
    // as a plain credential rejection).
    harness.clock.advance(30);
    let mut probe = LoginRequest::new("mallory", "guess", false);
    assert!(
        harness
            .auth
            .login(&session, &mut probe)
            .unwrap_err()
            .is_credentials_rejected()
    );
}

#[test]
fn persistent_token_survives_a_restart() {
    let harness = Harness::new();
    harness.setup();
    harness.add_user("alice", "pw", "dev");

    let session = SessionId::from("s1");
    let mut request = LoginRequest::new("alice", "pw", true);
    let outcome = harness.auth.login(&session, &mut request).unwrap();
    let token = outcome.persistent_token.unwrap();

    let harness = harness.restart();
    let session = SessionId::from("s2");
    let outcome = harness.auth.login_from_token(&session, &token);
    assert!(matches!(outcome, TokenOutcome::Accepted(t) if t.username == "alice"));
    assert_eq!(harness.auth.current_ticket(&session).username, "alice");
}

#[test]
fn password_change_supersedes_outstanding_tokens() {
    let harness = Harness::new();
    harness.setup();
    harness.add_user("alice", "pw", "dev");

    let session = SessionId::from("s1");
    let mut request = LoginRequest::new("alice", "pw", true);
    let outcome = harness.auth.login(&session, &mut request).unwrap();
    let token = outcome.persistent_token.unwrap();

    let ticket = harness.auth.current_ticket(&session);
    harness
        .admin
        .change_password(&ticket, &mut "rotated".to_string())
        .unwrap();

    // The stale token quietly falls back to anonymous.
    let other = SessionId::from("s2");
    assert_eq!(
        harness.auth.login_from_token(&other, &token),
        TokenOutcome::Superseded
    );
    assert!(harness.auth.current_ticket(&other).is_default);

    // The rotated credentials log in normally.
    let mut request = LoginRequest::new("alice", "rotated", false);
    assert!(harness.auth.login(&other, &mut request).is_ok());
}

#[test]
fn tokens_predating_a_system_reset_are_rejected() {
    let harness = Harness::new();
    harness.setup();
    harness.add_user("alice", "pw", "dev");

    let session = SessionId::from("s1");
    let mut request = LoginRequest::new("alice", "pw", true);
    let token = harness
        .auth
        .login(&session, &mut request)
        .unwrap()
        .persistent_token
        .unwrap();

    // A reset system (no root account) treats every old token as garbage,
    // even though the user record still resolves.
    harness.admin.delete_user("root").unwrap();
    assert_eq!(
        harness.auth.login_from_token(&session, &token),
        TokenOutcome::Rejected
    );
}
