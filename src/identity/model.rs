//! Payload schemas exchanged with the identity service.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::{PrincipalId, Roles};

/// A principal as observed from the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    /// Identifier, also accepted as `_id`
    #[serde(alias = "_id")]
    pub id: PrincipalId,
    /// Login name
    pub user_name: String,
    /// Contact address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role or roles held by the principal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Roles>,
}

/// Response of login, registration and self-update.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Human-readable status message
    pub message: String,
    /// Issued session token, when the operation mints one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// The affected principal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Principal>,
}

impl fmt::Debug for SessionPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionPayload")
            .field("message", &self.message)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .finish()
    }
}

/// Login credentials.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login name
    pub username: String,
    /// Plain password, forwarded as-is
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Registration input.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrincipal {
    /// Login name
    pub user_name: String,
    /// Contact address
    pub email: String,
    /// Plain password, forwarded as-is
    pub password: String,
}

impl fmt::Debug for NewPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewPrincipal")
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Partial principal update. Absent fields are not sent.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrincipalPatch {
    /// New login name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// New contact address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl fmt::Debug for PrincipalPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrincipalPatch")
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
