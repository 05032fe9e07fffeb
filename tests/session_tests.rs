// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::RefCell;
use std::rc::Rc;

use simple_ledger::AuthError;
use simple_ledger::remote::{RemoteAuth, RemoteSession, RemoteSignUp, RemoteUser};
use simple_ledger::session::{SessionContext, SignUpOutcome, remote_email};
use simple_ledger::store::{CURRENT_USER_KEY, REMOTE_CONFIG_KEY, Store};

#[derive(Default, Clone)]
struct FakeRemote {
    sign_in_error: Option<String>,
    needs_confirmation: bool,
    sign_out_fails: bool,
    calls: Rc<RefCell<Vec<String>>>,
}

impl FakeRemote {
    fn failing_sign_in(message: &str) -> Self {
        Self {
            sign_in_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn user(email: &str) -> RemoteUser {
        RemoteUser {
            id: "6f1c-remote".to_string(),
            email: Some(email.to_string()),
            username: None,
            created_at: Some("2025-01-01T00:00:00Z".to_string()),
        }
    }
}

impl RemoteAuth for FakeRemote {
    fn sign_in(&self, email: &str, _password: &str) -> Result<RemoteSession, AuthError> {
        self.calls.borrow_mut().push(format!("sign_in {}", email));
        if let Some(msg) = &self.sign_in_error {
            return Err(AuthError::new(msg.clone()));
        }
        Ok(RemoteSession {
            user: Self::user(email),
            access_token: "token-1".to_string(),
        })
    }

    fn sign_up(
        &self,
        email: &str,
        _password: &str,
        username: &str,
    ) -> Result<RemoteSignUp, AuthError> {
        self.calls
            .borrow_mut()
            .push(format!("sign_up {} {}", email, username));
        Ok(RemoteSignUp {
            user: Self::user(email),
            access_token: (!self.needs_confirmation).then(|| "token-2".to_string()),
        })
    }

    fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.calls
            .borrow_mut()
            .push(format!("sign_out {}", access_token));
        if self.sign_out_fails {
            return Err(AuthError::new("network down"));
        }
        Ok(())
    }

    fn update_username(&self, access_token: &str, username: &str) -> Result<(), AuthError> {
        self.calls
            .borrow_mut()
            .push(format!("update {} {}", access_token, username));
        Ok(())
    }

    fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        self.calls.borrow_mut().push(format!("reset {}", email));
        Ok(())
    }
}

fn local(store: &Store) -> SessionContext {
    let mut session = SessionContext::new(store.clone()).with_hash_cost(4);
    session.init();
    session
}

fn remote(store: &Store, fake: FakeRemote) -> SessionContext {
    let mut session = SessionContext::new(store.clone())
        .with_hash_cost(4)
        .with_remote(Box::new(fake), None);
    session.init();
    session
}

#[test]
fn local_sign_up_then_sign_in() {
    let store = Store::in_memory();
    let mut session = local(&store);
    let outcome = session.sign_up("ana", "segredo1", Some("ana@example.com")).unwrap();
    let SignUpOutcome::SignedIn(user) = outcome else {
        panic!("expected a signed-in user");
    };
    assert_eq!(user.id, "user_ana");
    assert_eq!(session.current_user(), Some(&user));

    session.sign_out();
    assert!(session.current_user().is_none());
    assert!(store.get_raw(CURRENT_USER_KEY).unwrap().is_none());

    let again = session.sign_in("ana", "segredo1").unwrap();
    assert_eq!(again.id, "user_ana");
    assert_eq!(again.email.as_deref(), Some("ana@example.com"));

    session.sign_out();
    let by_email = session.sign_in("ana@example.com", "segredo1").unwrap();
    assert_eq!(by_email.id, "user_ana");
}

#[test]
fn local_sign_in_failures() {
    let store = Store::in_memory();
    let mut session = local(&store);
    session.sign_up("ana", "segredo1", None).unwrap();
    session.sign_out();

    let err = session.sign_in("ana", "errada").unwrap_err();
    assert_eq!(err.message, "Incorrect password");
    let err = session.sign_in("bruno", "segredo1").unwrap_err();
    assert_eq!(err.message, "User not found");
    assert!(session.sign_in("", "x").is_err());
    assert!(session.current_user().is_none());
}

#[test]
fn sign_up_validates_before_anything_else() {
    let store = Store::in_memory();
    let mut session = local(&store);
    assert!(session.sign_up("al", "segredo1", None).is_err());
    assert!(session.sign_up("alice", "12345", None).is_err());
    let err = session.sign_up("alice", "123456", Some("not-an-email")).unwrap_err();
    assert!(err.message.contains("not-an-email"));
    assert!(store.get_raw("ledger_users").unwrap().is_none());

    session.sign_up("alice", "123456", None).unwrap();
    let err = session.sign_up("alice", "654321", None).unwrap_err();
    assert_eq!(err.message, "Username already exists");
}

#[test]
fn legacy_directory_entries_sign_in_and_survive_sign_up() {
    let store = Store::in_memory();
    store
        .set_raw(
            "ledger_users",
            r#"{
              "alice": {"username":"alice","password":"secret1","email":"alice@example.com",
                        "created_at":"2024-06-01T12:00:00.000Z"},
              "carol": {"username":"carol","password":"secret3","created_at":"2024-06-02T12:00:00.000Z"}
            }"#,
        )
        .unwrap();
    let mut session = local(&store);

    assert_eq!(session.sign_in("alice", "wrong1").unwrap_err().message, "Incorrect password");
    let alice = session.sign_in("alice", "secret1").unwrap();
    assert_eq!(alice.id, "user_alice");
    assert_eq!(alice.email.as_deref(), Some("alice@example.com"));
    session.sign_out();

    let raw = store.get_raw("ledger_users").unwrap().unwrap();
    assert!(!raw.contains("secret1"));
    assert!(raw.contains("passwordHash"));
    assert_eq!(session.sign_in("alice@example.com", "secret1").unwrap().id, "user_alice");
    session.sign_out();

    session.sign_up("bob", "segredo1", None).unwrap();
    session.sign_out();
    let raw = store.get_raw("ledger_users").unwrap().unwrap();
    assert!(raw.contains("alice"));
    assert!(raw.contains("bob"));
    assert_eq!(session.sign_in("carol", "secret3").unwrap().id, "user_carol");
}

#[test]
fn init_restores_stored_session() {
    let store = Store::in_memory();
    local(&store).sign_up("carla", "segredo1", None).unwrap();

    let restored = local(&store);
    assert_eq!(restored.require_user().unwrap().id, "user_carla");
}

#[test]
fn username_update_and_password_reset_locally() {
    let store = Store::in_memory();
    let mut session = local(&store);
    assert!(session.update_username("dani").is_err());

    session.sign_up("dani", "segredo1", Some("dani@example.com")).unwrap();
    assert!(session.update_username("dd").is_err());
    let user = session.update_username("daniela").unwrap();
    assert_eq!(user.username, "daniela");
    assert_eq!(user.id, "user_dani");
    assert_eq!(local(&store).current_user().unwrap().username, "daniela");

    session.reset_password("dani@example.com").unwrap();
    let err = session.reset_password("who@example.com").unwrap_err();
    assert_eq!(err.message, "Email not found");
}

#[test]
fn remote_sign_in_uses_local_dev_email_for_bare_names() {
    let store = Store::in_memory();
    let fake = FakeRemote::default();
    let calls = fake.calls.clone();
    let mut session = remote(&store, fake);

    let user = session.sign_in("ana", "segredo1").unwrap();
    assert_eq!(user.id, "6f1c-remote");
    assert_eq!(user.username, "ana");
    assert_eq!(*calls.borrow(), vec!["sign_in ana@local.dev".to_string()]);

    let raw = store.get_raw(CURRENT_USER_KEY).unwrap().unwrap();
    assert!(raw.contains("\"accessToken\":\"token-1\""));

    session.sign_out();
    assert_eq!(calls.borrow().last().unwrap(), "sign_out token-1");
    assert_eq!(remote_email("x@y.com"), "x@y.com");
}

#[test]
fn unconfirmed_email_falls_back_to_local_identity() {
    let store = Store::in_memory();
    let mut session = remote(&store, FakeRemote::failing_sign_in("Email not confirmed"));

    let user = session.sign_in("eva", "segredo1").unwrap();
    assert_eq!(user.id, "user_eva");
    assert_eq!(user.email.as_deref(), Some("eva@local.dev"));
    session.sign_out();

    let err = session.sign_in("eva", "outra-senha").unwrap_err();
    assert_eq!(err.message, "Incorrect password");
    assert_eq!(session.sign_in("eva@local.dev", "segredo1").unwrap().id, "user_eva");
}

#[test]
fn disabled_email_logins_also_fall_back() {
    let store = Store::in_memory();
    let mut session = remote(&store, FakeRemote::failing_sign_in("Email logins are disabled"));
    assert_eq!(session.sign_in("fabio", "segredo1").unwrap().id, "user_fabio");
}

#[test]
fn other_remote_errors_are_returned() {
    let store = Store::in_memory();
    let mut session = remote(&store, FakeRemote::failing_sign_in("Invalid login credentials"));
    let err = session.sign_in("gil", "segredo1").unwrap_err();
    assert_eq!(err.message, "Invalid login credentials");
    assert!(session.current_user().is_none());
    assert!(store.get_raw("ledger_users").unwrap().is_none());
}

#[test]
fn remote_sign_up_waiting_for_confirmation_does_not_sign_in() {
    let store = Store::in_memory();
    let fake = FakeRemote {
        needs_confirmation: true,
        ..FakeRemote::default()
    };
    let calls = fake.calls.clone();
    let mut session = remote(&store, fake);

    let outcome = session.sign_up("hugo", "segredo1", None).unwrap();
    let SignUpOutcome::ConfirmationRequired(user) = outcome else {
        panic!("expected confirmation to be required");
    };
    assert_eq!(user.email.as_deref(), Some("hugo@local.dev"));
    assert_eq!(user.username, "hugo");
    assert!(session.current_user().is_none());
    assert_eq!(calls.borrow()[0], "sign_up hugo@local.dev hugo");
}

#[test]
fn remote_sign_up_with_session_signs_in() {
    let store = Store::in_memory();
    let mut session = remote(&store, FakeRemote::default());
    let outcome = session
        .sign_up("iris", "segredo1", Some("iris@example.com"))
        .unwrap();
    assert!(matches!(outcome, SignUpOutcome::SignedIn(_)));
    assert_eq!(session.current_user().unwrap().username, "iris");
}

#[test]
fn sign_out_clears_even_when_remote_fails() {
    let store = Store::in_memory();
    let fake = FakeRemote {
        sign_out_fails: true,
        ..FakeRemote::default()
    };
    let mut session = remote(&store, fake);
    session.sign_in("joao@example.com", "segredo1").unwrap();
    session.sign_out();
    assert!(session.current_user().is_none());
    assert!(store.get_raw(CURRENT_USER_KEY).unwrap().is_none());
}

#[test]
fn remote_username_update_and_reset_go_through_backend() {
    let store = Store::in_memory();
    let fake = FakeRemote::default();
    let calls = fake.calls.clone();
    let mut session = remote(&store, fake);
    session.sign_in("kim", "segredo1").unwrap();

    session.update_username("kimberly").unwrap();
    session.reset_password("kim@example.com").unwrap();
    let log = calls.borrow();
    assert!(log.contains(&"update token-1 kimberly".to_string()));
    assert!(log.contains(&"reset kim@example.com".to_string()));
}

#[test]
fn configure_and_clear_remote() {
    let store = Store::in_memory();
    let mut session = local(&store);
    assert!(session.configure_remote("not a url", "key").is_err());
    assert!(!session.is_remote());

    let cfg = session
        .configure_remote("https://demo.supabase.co/", "anon-public-key")
        .unwrap();
    assert_eq!(cfg.url, "https://demo.supabase.co");
    assert!(session.is_remote());
    assert_eq!(session.remote_config(), Some(&cfg));
    assert!(store.get_raw(REMOTE_CONFIG_KEY).unwrap().is_some());

    session.clear_remote().unwrap();
    assert!(!session.is_remote());
    assert!(session.remote_config().is_none());
    assert!(store.get_raw(REMOTE_CONFIG_KEY).unwrap().is_none());
}

#[test]
fn teardown_keeps_stored_session() {
    let store = Store::in_memory();
    let mut session = remote(&store, FakeRemote::default());
    session.sign_in("lia", "segredo1").unwrap();
    session.teardown();
    assert!(!session.is_remote());

    let restored = local(&store);
    assert_eq!(restored.current_user().unwrap().id, "6f1c-remote");
}
