//! Building a [`CallerContext`] from an inbound request.
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework code builds RequestAdapter
//!   ↓
//! authenticate() introspects the bearer token
//!   ↓
//! CallerContext (principal, roles, token) or anonymous
//!   ↓
//! Resolvers run PolicyGate before any write
//! ```

use tracing::instrument;

use super::ExtractCredentials;
use crate::context::CallerContext;
use crate::error::{Error, Result};
use crate::identity::IdentityService;

/// Builds an anonymous context carrying only the request id.
///
/// # Examples
///
/// ```
/// use cat_gateway::web::{extract_anonymous, RequestAdapter};
///
/// let caller = extract_anonymous(&RequestAdapter::new("req-public"));
/// assert_eq!(caller.request_id(), "req-public");
/// assert!(caller.principal().is_none());
/// assert!(!caller.has_token());
/// ```
pub fn extract_anonymous<R: ExtractCredentials + ?Sized>(request: &R) -> CallerContext {
    CallerContext::anonymous(request.request_id())
}

/// Resolves the caller behind a request.
///
/// Without a bearer token the caller is anonymous. A token is introspected
/// with the identity service. On success the context carries the principal
/// id, roles and token. A token rejected with 401 or 403 degrades to an
/// anonymous context and logs a warning.
///
/// # Errors
///
/// Any other introspection failure is returned unchanged.
#[instrument(skip_all, fields(request_id = %request.request_id()))]
pub async fn authenticate<R: ExtractCredentials + ?Sized>(
    request: &R,
    identity: &dyn IdentityService,
) -> Result<CallerContext> {
    let anonymous = extract_anonymous(request);
    let Some(token) = request.bearer_token() else {
        return Ok(anonymous);
    };

    match identity.check_token(&token).await {
        Ok(principal) => {
            tracing::debug!(principal = %principal.id, "bearer token accepted");
            Ok(anonymous
                .with_principal(principal.id)
                .with_roles(principal.role.unwrap_or_default())
                .with_token(Some(token)))
        }
        Err(Error::Upstream {
            status: status @ (401 | 403),
            ..
        }) => {
            tracing::warn!(status, "bearer token rejected, continuing anonymously");
            Ok(anonymous)
        }
        Err(e) => Err(e),
    }
}
