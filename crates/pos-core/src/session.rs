//! # Staff Session
//!
//! The backend authenticates staff and hands back an opaque token; this side
//! only stores and forwards it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque bearer token issued by `staffLogin`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a token; blank strings are not tokens
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl TryFrom<String> for AuthToken {
    type Error = String;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        AuthToken::new(token).ok_or_else(|| "auth token must not be blank".to_string())
    }
}

impl From<AuthToken> for String {
    fn from(token: AuthToken) -> Self {
        token.0
    }
}

// Tokens stay out of logs
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// `staffLogin` payload
#[derive(Clone, Serialize, Deserialize)]
pub struct StaffCredentials {
    pub username: String,
    pub password: String,
}

impl StaffCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for StaffCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaffCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
