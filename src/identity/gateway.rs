use std::sync::Arc;

use tracing::instrument;

use super::{Credentials, IdentityService, NewPrincipal, Principal, PrincipalPatch, SessionPayload};
use crate::audit::{AuditEvent, AuditEventKind, PolicyAudit};
use crate::context::{CallerContext, PrincipalId};
use crate::error::{Result, Violation, ViolationKind};
use crate::gate::PolicyGate;
use crate::policy::{Admin, Authenticated, PolicyReq};
use crate::token::BearerToken;

/// Caller-facing identity operations.
///
/// Token-scoped operations require a presented token. Operations on
/// arbitrary principals require the admin policy. A failed policy yields
/// `Error::Unauthorized` and no remote call is made.
#[derive(Clone)]
pub struct IdentityGateway {
    service: Arc<dyn IdentityService>,
    audit: PolicyAudit,
}

impl IdentityGateway {
    /// Wraps an identity service.
    pub fn new(service: Arc<dyn IdentityService>) -> Self {
        Self {
            service,
            audit: PolicyAudit::new(),
        }
    }

    /// Uses `audit` for guard decisions.
    #[must_use]
    pub fn with_audit(mut self, audit: PolicyAudit) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the wrapped service.
    pub fn service(&self) -> &Arc<dyn IdentityService> {
        &self.service
    }

    fn authorize<'c>(
        &self,
        caller: &'c CallerContext,
        requirement: impl Into<PolicyReq>,
        action: &str,
        resource: Option<&PrincipalId>,
    ) -> Result<&'c BearerToken> {
        let requirement = requirement.into();
        let kind = match requirement {
            PolicyReq::Admin => AuditEventKind::AdminAction,
            _ => AuditEventKind::Authorization,
        };

        let decision = PolicyGate::new(caller).require(requirement).build();
        let mut event = AuditEvent::decision(caller, kind, action, &decision);
        if let Some(id) = resource {
            event = event.with_resource_id(id.as_str());
        }
        self.audit.emit(event);
        decision?;

        // The gate has already checked for a token.
        caller
            .token()
            .ok_or_else(|| Violation::new(ViolationKind::MissingToken, "bearer token required").into())
    }

    /// Lists every principal.
    #[instrument(skip(self))]
    pub async fn users(&self) -> Result<Vec<Principal>> {
        self.service.users().await
    }

    /// Fetches one principal.
    #[instrument(skip(self))]
    pub async fn user_by_id(&self, id: &PrincipalId) -> Result<Principal> {
        self.service.user_by_id(id).await
    }

    /// Introspects the caller's token.
    #[instrument(skip_all, fields(request_id = %caller.request_id()))]
    pub async fn check_token(&self, caller: &CallerContext) -> Result<Principal> {
        let token = self.authorize(caller, Authenticated, "check_token", None)?;
        self.service.check_token(token).await
    }

    /// Exchanges credentials for a session.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionPayload> {
        self.service.login(credentials).await
    }

    /// Registers a new principal.
    #[instrument(skip_all, fields(user_name = %user.user_name))]
    pub async fn register(&self, user: &NewPrincipal) -> Result<SessionPayload> {
        self.service.register(user).await
    }

    /// Updates the caller's own principal.
    #[instrument(skip_all, fields(request_id = %caller.request_id()))]
    pub async fn update_user(
        &self,
        caller: &CallerContext,
        patch: &PrincipalPatch,
    ) -> Result<SessionPayload> {
        let token = self.authorize(caller, Authenticated, "update_user", None)?;
        self.service.update_self(token, patch).await
    }

    /// Updates any principal. Requires the admin policy.
    #[instrument(skip(self, caller, patch), fields(request_id = %caller.request_id()))]
    pub async fn update_user_as_admin(
        &self,
        caller: &CallerContext,
        id: &PrincipalId,
        patch: &PrincipalPatch,
    ) -> Result<Principal> {
        let token = self.authorize(caller, Admin, "update_user_as_admin", Some(id))?;
        self.service
            .update_as_admin(token, caller.roles(), id, patch)
            .await
    }

    /// Deletes the caller's own principal.
    #[instrument(skip_all, fields(request_id = %caller.request_id()))]
    pub async fn delete_user(&self, caller: &CallerContext) -> Result<Principal> {
        let token = self.authorize(caller, Authenticated, "delete_user", None)?;
        self.service.delete_self(token).await
    }

    /// Deletes any principal. Requires the admin policy.
    #[instrument(skip(self, caller), fields(request_id = %caller.request_id()))]
    pub async fn delete_user_as_admin(
        &self,
        caller: &CallerContext,
        id: &PrincipalId,
    ) -> Result<Principal> {
        let token = self.authorize(caller, Admin, "delete_user_as_admin", Some(id))?;
        self.service.delete_as_admin(token, caller.roles(), id).await
    }
}
