use std::fmt;

use crate::context::PrincipalId;
use crate::store::StoreError;

/// Result alias used across the gateway.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by a resolution.
///
/// Read paths report a missing document as `Ok(None)`, never as an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller input was malformed and rejected before any I/O.
    #[error("invalid input: {0}")]
    Validation(String),

    /// An authorization policy failed. No side effect took place.
    #[error("Not authorized")]
    Unauthorized(#[from] Violation),

    /// The target of a mutation does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of document that was looked up
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// A cat references an owner the identity service does not know.
    #[error("owner {owner} not found")]
    OwnerNotFound {
        /// The dangling owner reference
        owner: PrincipalId,
    },

    /// The identity service answered with a non-success status.
    #[error("{reason}")]
    Upstream {
        /// HTTP status code reported by the identity service
        status: u16,
        /// Status text reported by the identity service
        reason: String,
    },

    /// The identity service could not be reached.
    #[error("identity service unavailable: {0}")]
    IdentityUnavailable(String),

    /// A response did not match the expected payload schema.
    #[error("unexpected identity payload: {0}")]
    Decode(String),

    /// The storage collaborator rejected the call.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Configuration could not be loaded or is unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns the policy violation behind an authorization failure.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Error::Unauthorized(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` for authorization failures.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized(_))
    }
}

/// A policy violation with details about what failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The kind of violation that occurred
    pub kind: ViolationKind,
    /// Human-readable message explaining the violation
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Violation {}

/// The kind of policy violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// No bearer token was presented
    MissingToken,
    /// A token was presented but no principal id was asserted
    Anonymous,
    /// The caller does not own the resource
    NotOwner,
    /// The caller does not hold the admin role
    NotAdmin,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::MissingToken => write!(f, "missing token"),
            ViolationKind::Anonymous => write!(f, "anonymous caller"),
            ViolationKind::NotOwner => write!(f, "not owner"),
            ViolationKind::NotAdmin => write!(f, "not admin"),
        }
    }
}
