//! Remote identity service.
//!
//! [`IdentityService`] has one method per remote capability and performs no
//! authorization of its own. [`HttpIdentityClient`] talks to the service over
//! HTTP. [`IdentityGateway`] applies caller policies before delegating.

mod client;
mod gateway;
mod model;

use async_trait::async_trait;

use crate::context::{PrincipalId, Roles};
use crate::error::Result;
use crate::token::BearerToken;

pub use client::HttpIdentityClient;
pub use gateway::IdentityGateway;
pub use model::{Credentials, NewPrincipal, Principal, PrincipalPatch, SessionPayload};

/// Capabilities of the remote identity service.
///
/// Each call is a single round trip. Non-success responses surface as
/// `Error::Upstream` carrying the remote status and its reason text.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Lists every principal.
    async fn users(&self) -> Result<Vec<Principal>>;

    /// Fetches one principal.
    async fn user_by_id(&self, id: &PrincipalId) -> Result<Principal>;

    /// Returns the principal a bearer token belongs to.
    async fn check_token(&self, token: &BearerToken) -> Result<Principal>;

    /// Exchanges credentials for a session.
    async fn login(&self, credentials: &Credentials) -> Result<SessionPayload>;

    /// Registers a new principal.
    async fn register(&self, user: &NewPrincipal) -> Result<SessionPayload>;

    /// Updates the principal the token belongs to. No id is sent.
    async fn update_self(&self, token: &BearerToken, patch: &PrincipalPatch)
        -> Result<SessionPayload>;

    /// Updates any principal, forwarding the caller's roles.
    async fn update_as_admin(
        &self,
        token: &BearerToken,
        roles: &Roles,
        id: &PrincipalId,
        patch: &PrincipalPatch,
    ) -> Result<Principal>;

    /// Deletes the principal the token belongs to.
    async fn delete_self(&self, token: &BearerToken) -> Result<Principal>;

    /// Deletes any principal, forwarding the caller's roles.
    async fn delete_as_admin(
        &self,
        token: &BearerToken,
        roles: &Roles,
        id: &PrincipalId,
    ) -> Result<Principal>;
}
