// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Remote identity backends.
//!
//! [`SupabaseAuth`] speaks the GoTrue REST API used by Supabase projects.
//! Whatever shape an error comes back in, callers only ever see an
//! [`AuthError`] carrying a message.

use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{Value, json};

use crate::config::RemoteConfig;
use crate::error::AuthError;
use crate::utils::http_client;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser {
    pub id: String,
    pub email: Option<String>,
    pub username: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSession {
    pub user: RemoteUser,
    pub access_token: String,
}

/// Result of a remote sign-up. `access_token` is `None` when the backend
/// wants the address confirmed before the first sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSignUp {
    pub user: RemoteUser,
    pub access_token: Option<String>,
}

pub trait RemoteAuth {
    fn sign_in(&self, email: &str, password: &str) -> Result<RemoteSession, AuthError>;
    fn sign_up(&self, email: &str, password: &str, username: &str)
    -> Result<RemoteSignUp, AuthError>;
    fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
    fn update_username(&self, access_token: &str, username: &str) -> Result<(), AuthError>;
    fn reset_password(&self, email: &str) -> Result<(), AuthError>;
}

pub struct SupabaseAuth {
    client: Client,
    base: Url,
    anon_key: String,
}

impl SupabaseAuth {
    pub fn new(config: &RemoteConfig) -> Result<Self, AuthError> {
        let client = http_client().map_err(|e| AuthError::new(e.to_string()))?;
        let base = Url::parse(&format!("{}/", config.url.trim_end_matches('/')))
            .map_err(|e| AuthError::new(format!("Invalid service URL: {}", e)))?;
        Ok(Self {
            client,
            base,
            anon_key: config.anon_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base
            .join(path)
            .map_err(|e| AuthError::new(format!("Invalid endpoint {}: {}", path, e)))
    }

    fn send(&self, req: RequestBuilder) -> Result<Value, AuthError> {
        let resp = req.header("apikey", &self.anon_key).send()?;
        let status = resp.status();
        // Logout and recover answer with an empty body.
        let body: Value = resp.json().unwrap_or(Value::Null);
        if status.is_success() {
            Ok(body)
        } else {
            Err(error_from_body(status.as_u16(), &body))
        }
    }
}

impl RemoteAuth for SupabaseAuth {
    fn sign_in(&self, email: &str, password: &str) -> Result<RemoteSession, AuthError> {
        let url = self.endpoint("auth/v1/token")?;
        let body = self.send(
            self.client
                .post(url)
                .query(&[("grant_type", "password")])
                .json(&json!({ "email": email, "password": password })),
        )?;
        parse_session(&body)?.ok_or_else(|| AuthError::new("The server did not return a session"))
    }

    fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<RemoteSignUp, AuthError> {
        let url = self.endpoint("auth/v1/signup")?;
        let body = self.send(self.client.post(url).json(&json!({
            "email": email,
            "password": password,
            "data": { "username": username },
        })))?;
        match parse_session(&body)? {
            Some(session) => Ok(RemoteSignUp {
                user: session.user,
                access_token: Some(session.access_token),
            }),
            None => Ok(RemoteSignUp {
                user: parse_user(&body)?,
                access_token: None,
            }),
        }
    }

    fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = self.endpoint("auth/v1/logout")?;
        self.send(self.client.post(url).bearer_auth(access_token))?;
        Ok(())
    }

    fn update_username(&self, access_token: &str, username: &str) -> Result<(), AuthError> {
        let url = self.endpoint("auth/v1/user")?;
        self.send(
            self.client
                .put(url)
                .bearer_auth(access_token)
                .json(&json!({ "data": { "username": username } })),
        )?;
        Ok(())
    }

    fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let url = self.endpoint("auth/v1/recover")?;
        self.send(self.client.post(url).json(&json!({ "email": email })))?;
        Ok(())
    }
}

/// Picks the most descriptive message out of an error body. GoTrue has used
/// `error_description`, `msg`, `message` and `error` over time.
pub fn error_from_body(status: u16, body: &Value) -> AuthError {
    if let Some(text) = body.as_str().filter(|s| !s.is_empty()) {
        return AuthError::new(text);
    }
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(|s| AuthError::new(s))
        .unwrap_or_else(|| AuthError::new(format!("Request failed with HTTP status {}", status)))
}

/// `Ok(None)` when the body has no `access_token`.
pub fn parse_session(body: &Value) -> Result<Option<RemoteSession>, AuthError> {
    let Some(token) = body.get("access_token").and_then(Value::as_str) else {
        return Ok(None);
    };
    let user = body
        .get("user")
        .ok_or_else(|| AuthError::new("The server returned a session without a user"))?;
    Ok(Some(RemoteSession {
        user: parse_user(user)?,
        access_token: token.to_string(),
    }))
}

pub fn parse_user(body: &Value) -> Result<RemoteUser, AuthError> {
    let id = body
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| AuthError::new("The server returned a user without an id"))?;
    let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);
    Ok(RemoteUser {
        id: id.to_string(),
        email: text(body.get("email")),
        username: text(body.pointer("/user_metadata/username")),
        created_at: text(body.get("created_at")),
    })
}
