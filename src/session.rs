// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Who is signed in.
//!
//! [`SessionContext`] is constructed explicitly, initialized with
//! [`SessionContext::init`] and released with [`SessionContext::teardown`].
//! Identity comes from a remote backend when one is configured and from the
//! local user directory otherwise. The rest of the crate only ever reads the
//! current user's id.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{RemoteConfig, save_remote};
use crate::error::{AuthError, Error, Result};
use crate::models::User;
use crate::remote::{RemoteAuth, RemoteUser, SupabaseAuth};
use crate::store::{CURRENT_USER_KEY, REMOTE_CONFIG_KEY, Store, USERS_KEY};
use crate::utils::is_valid_email;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;
/// Domain appended to bare usernames when the remote backend wants an email.
pub const LOCAL_EMAIL_DOMAIN: &str = "local.dev";

/// Remote sign-in failures that fall back to local identity.
const LOCAL_FALLBACK_ERRORS: [&str; 2] = ["Email not confirmed", "Email logins are disabled"];

/// The persisted form of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(flatten)]
    pub user: User,
    #[serde(default, rename = "accessToken", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// One entry of the local user directory, keyed by username.
///
/// Older directories hold only `{username, password, email?, created_at}`;
/// their id is derived from the username and the plain password is replaced
/// by a bcrypt hash on the first successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocalAccount {
    #[serde(default)]
    id: String,
    username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, rename = "created_at")]
    created_at: String,
}

impl LocalAccount {
    fn verify(&self, secret: &str) -> Result<bool, AuthError> {
        match (&self.password_hash, &self.password) {
            (Some(hash), _) => bcrypt::verify(secret, hash)
                .map_err(|e| AuthError::new(format!("Could not verify password: {}", e))),
            (None, Some(plain)) => Ok(plain == secret),
            (None, None) => Ok(false),
        }
    }

    fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            display_name: None,
            created_at: Some(self.created_at.clone()).filter(|c| !c.is_empty()),
        }
    }
}

type LocalDirectory = BTreeMap<String, LocalAccount>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(User),
    /// Created remotely; the user must confirm their email before signing in.
    ConfirmationRequired(User),
}

pub struct SessionContext {
    store: Store,
    remote: Option<Box<dyn RemoteAuth>>,
    remote_config: Option<RemoteConfig>,
    current: Option<SessionRecord>,
    hash_cost: u32,
}

impl SessionContext {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            remote: None,
            remote_config: None,
            current: None,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Uses `remote` for identity instead of the local directory.
    pub fn with_remote(mut self, remote: Box<dyn RemoteAuth>, config: Option<RemoteConfig>) -> Self {
        self.remote = Some(remote);
        self.remote_config = config;
        self
    }

    /// Builds a Supabase client from `config`, staying local-only if that fails.
    pub fn with_remote_config(self, config: Option<RemoteConfig>) -> Self {
        let Some(cfg) = config else {
            return self;
        };
        match SupabaseAuth::new(&cfg) {
            Ok(client) => self.with_remote(Box::new(client), Some(cfg)),
            Err(e) => {
                tracing::warn!(error = %e, "remote identity unavailable, using local accounts");
                self
            }
        }
    }

    /// bcrypt cost for new local passwords.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Restores the previously signed-in user, if any.
    pub fn init(&mut self) {
        self.current = self.store.read::<Option<SessionRecord>>(CURRENT_USER_KEY);
        match &self.current {
            Some(record) => tracing::debug!(user_id = %record.user.id, "restored session"),
            None => tracing::debug!("no stored session"),
        }
        if self.remote.is_some() {
            tracing::debug!("remote identity backend configured");
        } else {
            tracing::debug!("using local accounts");
        }
    }

    /// Drops the remote client. The stored session stays for the next run.
    pub fn teardown(&mut self) {
        self.remote = None;
        tracing::debug!("session closed");
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref().map(|r| &r.user)
    }

    pub fn require_user(&self) -> Result<&User> {
        self.current_user().ok_or(Error::NotSignedIn)
    }

    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn remote_config(&self) -> Option<&RemoteConfig> {
        self.remote_config.as_ref()
    }

    pub fn sign_in(&mut self, identifier: &str, secret: &str) -> Result<User, AuthError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || secret.is_empty() {
            return Err(AuthError::new("Username and password are required"));
        }

        if let Some(remote) = &self.remote {
            match remote.sign_in(&remote_email(identifier), secret) {
                Ok(session) => {
                    let user = user_from_remote(session.user, username_of(identifier));
                    self.set_current(user.clone(), Some(session.access_token));
                    tracing::info!(user_id = %user.id, "signed in remotely");
                    return Ok(user);
                }
                Err(e) if is_local_fallback(&e) => {
                    tracing::warn!(error = %e, "remote sign-in unavailable, falling back to local accounts");
                    return self.local_sign_in(identifier, secret, true);
                }
                Err(e) => return Err(e),
            }
        }
        self.local_sign_in(identifier, secret, false)
    }

    pub fn sign_up(
        &mut self,
        username: &str,
        secret: &str,
        email: Option<&str>,
    ) -> Result<SignUpOutcome, AuthError> {
        let username = username.trim();
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        validate_credentials(username, secret)?;
        if let Some(email) = email {
            if !is_valid_email(email) {
                return Err(AuthError::new(format!("Invalid email address '{}'", email)));
            }
        }

        if let Some(remote) = &self.remote {
            let email = email
                .map(str::to_string)
                .unwrap_or_else(|| remote_email(username));
            let created = remote.sign_up(&email, secret, username)?;
            let mut user = user_from_remote(created.user, username.to_string());
            user.username = username.to_string();
            user.email = Some(email);
            return match created.access_token {
                Some(token) => {
                    self.set_current(user.clone(), Some(token));
                    tracing::info!(user_id = %user.id, "registered and signed in remotely");
                    Ok(SignUpOutcome::SignedIn(user))
                }
                None => {
                    tracing::info!(user_id = %user.id, "registered remotely, awaiting confirmation");
                    Ok(SignUpOutcome::ConfirmationRequired(user))
                }
            };
        }

        let mut users = self.users();
        if users.contains_key(username) {
            return Err(AuthError::new("Username already exists"));
        }
        let account = self.new_local_account(username, secret, email.map(str::to_string))?;
        let user = account.to_user();
        users.insert(username.to_string(), account);
        self.save_users(&users);
        self.set_current(user.clone(), None);
        tracing::info!(user_id = %user.id, "registered local user");
        Ok(SignUpOutcome::SignedIn(user))
    }

    /// Clears the session. Remote failures are logged and never keep the user signed in.
    pub fn sign_out(&mut self) {
        if let (Some(remote), Some(token)) = (
            &self.remote,
            self.current.as_ref().and_then(|r| r.access_token.as_deref()),
        ) {
            if let Err(e) = remote.sign_out(token) {
                tracing::warn!(error = %e, "remote sign-out failed, clearing local session anyway");
            }
        }
        if let Some(record) = self.current.take() {
            tracing::info!(user_id = %record.user.id, "signed out");
        }
        if let Err(e) = self.store.remove(CURRENT_USER_KEY) {
            tracing::error!(error = %e, "failed to clear stored session");
        }
    }

    pub fn update_username(&mut self, username: &str) -> Result<User, AuthError> {
        let username = username.trim();
        let Some(record) = self.current.clone() else {
            return Err(AuthError::new("No user is signed in"));
        };
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(AuthError::new(format!(
                "Username must be at least {} characters",
                MIN_USERNAME_LEN
            )));
        }
        if let (Some(remote), Some(token)) = (&self.remote, record.access_token.as_deref()) {
            remote.update_username(token, username)?;
        }
        let mut user = record.user;
        user.username = username.to_string();
        self.set_current(user.clone(), record.access_token);
        tracing::info!(user_id = %user.id, "username updated");
        Ok(user)
    }

    pub fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if let Some(remote) = &self.remote {
            return remote.reset_password(email);
        }
        // Local accounts have no mailer; only confirm the address is known.
        if self.users().values().any(|u| u.email.as_deref() == Some(email)) {
            Ok(())
        } else {
            Err(AuthError::new("Email not found"))
        }
    }

    /// Validates and saves the remote backend, then switches to it.
    pub fn configure_remote(&mut self, url: &str, anon_key: &str) -> Result<RemoteConfig> {
        let cfg = save_remote(&self.store, RemoteConfig::new(url, anon_key)?)?;
        let client = SupabaseAuth::new(&cfg)?;
        self.remote = Some(Box::new(client));
        self.remote_config = Some(cfg.clone());
        tracing::info!(url = %cfg.url, "remote identity configured");
        Ok(cfg)
    }

    pub fn clear_remote(&mut self) -> Result<()> {
        self.store.remove(REMOTE_CONFIG_KEY)?;
        self.remote = None;
        self.remote_config = None;
        tracing::info!("remote identity removed");
        Ok(())
    }

    fn local_sign_in(
        &mut self,
        identifier: &str,
        secret: &str,
        create_missing: bool,
    ) -> Result<User, AuthError> {
        let mut users = self.users();
        let username = username_of(identifier);
        let found = users
            .get_key_value(identifier)
            .or_else(|| {
                users
                    .iter()
                    .find(|(_, u)| u.email.as_deref() == Some(identifier))
            })
            .or_else(|| {
                users
                    .get_key_value(&username)
                    .filter(|_| is_local_email(identifier))
            })
            .map(|(key, account)| (key.clone(), account.clone()));

        let (key, mut account) = match found {
            Some(found) => found,
            None if create_missing => {
                let account =
                    self.new_local_account(&username, secret, Some(remote_email(identifier)))?;
                users.insert(username.clone(), account.clone());
                self.save_users(&users);
                tracing::info!(user_id = %account.id, "created local user during fallback sign-in");
                (username, account)
            }
            None => return Err(AuthError::new("User not found")),
        };

        if !account.verify(secret)? {
            tracing::debug!(username = %account.username, "wrong password");
            return Err(AuthError::new("Incorrect password"));
        }
        if account.password_hash.is_none() {
            account.password_hash = Some(self.hash(secret)?);
            account.password = None;
            users.insert(key, account.clone());
            self.save_users(&users);
            tracing::info!(user_id = %account.id, "upgraded stored password to bcrypt");
        }

        let user = account.to_user();
        self.set_current(user.clone(), None);
        tracing::info!(user_id = %user.id, "signed in locally");
        Ok(user)
    }

    fn new_local_account(
        &self,
        username: &str,
        secret: &str,
        email: Option<String>,
    ) -> Result<LocalAccount, AuthError> {
        Ok(LocalAccount {
            id: local_user_id(username),
            username: username.to_string(),
            password_hash: Some(self.hash(secret)?),
            password: None,
            email,
            created_at: Utc::now().to_rfc3339(),
        })
    }

    fn hash(&self, secret: &str) -> Result<String, AuthError> {
        bcrypt::hash(secret, self.hash_cost)
            .map_err(|e| AuthError::new(format!("Could not hash password: {}", e)))
    }

    fn users(&self) -> LocalDirectory {
        let mut users: LocalDirectory = self.store.read(USERS_KEY);
        for (key, account) in &mut users {
            if account.id.is_empty() {
                account.id = local_user_id(key);
            }
        }
        users
    }

    fn save_users(&self, users: &LocalDirectory) {
        if let Err(e) = self.store.write(USERS_KEY, users) {
            tracing::error!(error = %e, "failed to persist local users");
        }
    }

    fn set_current(&mut self, user: User, access_token: Option<String>) {
        let record = SessionRecord { user, access_token };
        if let Err(e) = self.store.write(CURRENT_USER_KEY, &record) {
            tracing::error!(error = %e, "failed to persist session");
        }
        self.current = Some(record);
    }
}

pub fn validate_credentials(username: &str, secret: &str) -> Result<(), AuthError> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(AuthError::new(format!(
            "Username must be at least {} characters",
            MIN_USERNAME_LEN
        )));
    }
    if secret.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::new(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Bare usernames become `<name>@local.dev`; addresses pass through.
pub fn remote_email(identifier: &str) -> String {
    if identifier.contains('@') {
        identifier.to_string()
    } else {
        format!("{}@{}", identifier, LOCAL_EMAIL_DOMAIN)
    }
}

fn local_user_id(username: &str) -> String {
    format!("user_{}", username)
}

fn is_local_email(identifier: &str) -> bool {
    identifier
        .strip_suffix(LOCAL_EMAIL_DOMAIN)
        .is_some_and(|rest| rest.ends_with('@'))
}

fn username_of(identifier: &str) -> String {
    identifier
        .split('@')
        .next()
        .unwrap_or(identifier)
        .to_string()
}

fn is_local_fallback(e: &AuthError) -> bool {
    LOCAL_FALLBACK_ERRORS.iter().any(|m| e.message.contains(m))
}

fn user_from_remote(remote: RemoteUser, fallback_username: String) -> User {
    let username = remote
        .username
        .or_else(|| remote.email.as_deref().map(username_of))
        .unwrap_or(fallback_username);
    User {
        id: remote.id,
        username,
        email: remote.email,
        display_name: None,
        created_at: remote.created_at.or_else(|| Some(Utc::now().to_rfc3339())),
    }
}
