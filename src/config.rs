// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runtime configuration: where the database lives and which remote identity
//! backend, if any, to talk to.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::store::{REMOTE_CONFIG_KEY, Store};

pub const DB_ENV: &str = "SIMPLE_LEDGER_DB";
pub const REMOTE_URL_ENV: &str = "SUPABASE_URL";
pub const REMOTE_KEY_ENV: &str = "SUPABASE_ANON_KEY";

/// Connection details for the remote identity backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
    #[serde(rename = "anonKey")]
    pub anon_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configured_at: Option<String>,
}

impl RemoteConfig {
    /// Validates the service URL and public key.
    pub fn new(url: &str, anon_key: &str) -> Result<Self, Error> {
        let url = url.trim();
        let anon_key = anon_key.trim();
        if url.is_empty() || anon_key.is_empty() {
            return Err(Error::validation("Both the service URL and the public key are required"));
        }
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| Error::validation(format!("Invalid service URL '{}': {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::validation(format!(
                "Invalid service URL '{}': expected an http(s) address",
                url
            )));
        }
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            configured_at: None,
        })
    }

    /// The public key with all but its first few characters hidden.
    pub fn masked_key(&self) -> String {
        let visible: String = self.anon_key.chars().take(6).collect();
        format!("{}…", visible)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Remote backend given through the environment; wins over the stored one.
    pub remote_override: Option<RemoteConfig>,
}

impl AppConfig {
    pub fn load(db_flag: Option<PathBuf>) -> Result<Self> {
        Self::from_lookup(db_flag, |k| std::env::var(k).ok())
    }

    /// Same as [`AppConfig::load`] with an explicit variable lookup.
    pub fn from_lookup(
        db_flag: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let db_path = match db_flag.or_else(|| lookup(DB_ENV).map(PathBuf::from)) {
            Some(path) => path,
            None => crate::db::default_db_path()?,
        };

        let remote_override = match (lookup(REMOTE_URL_ENV), lookup(REMOTE_KEY_ENV)) {
            (Some(url), Some(key)) => match RemoteConfig::new(&url, &key) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring remote backend from environment");
                    None
                }
            },
            _ => None,
        };

        Ok(Self {
            db_path,
            remote_override,
        })
    }
}

/// The environment override if present, else whatever was saved with
/// `remote configure`.
pub fn resolve_remote(store: &Store, env: Option<&RemoteConfig>) -> Option<RemoteConfig> {
    if let Some(cfg) = env {
        return Some(cfg.clone());
    }
    store.read::<Option<RemoteConfig>>(REMOTE_CONFIG_KEY)
}

pub fn save_remote(store: &Store, mut cfg: RemoteConfig) -> Result<RemoteConfig, Error> {
    cfg.configured_at = Some(Utc::now().to_rfc3339());
    store.write(REMOTE_CONFIG_KEY, &cfg)?;
    Ok(cfg)
}
