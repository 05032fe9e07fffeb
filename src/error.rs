// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error types shared by the ledger, registry, store and session.

/// Errors raised by the library.
///
/// There is no not-found variant: updating or deleting an unknown id is a
/// no-op.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input failed validation. The message is meant for the end user.
    #[error("{0}")]
    Validation(String),

    /// A stored payload could not be decoded.
    #[error("could not deserialize the value stored under \"{key}\": {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded before writing it to the store.
    #[error("could not serialize value: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The underlying key-value store failed.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The identity provider rejected the request.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The operation needs a signed-in user.
    #[error("no user is signed in, run `simple-ledger login` first")]
    NotSignedIn,
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}

/// The single error shape that crosses the identity provider boundary.
///
/// Remote backends report failures as strings, as objects with one of several
/// message fields, or as transport errors; all of them are normalized into a
/// human-readable `message` before reaching callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(value: reqwest::Error) -> Self {
        AuthError::new(format!("could not reach the identity provider: {value}"))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
