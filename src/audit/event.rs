use std::fmt;

use crate::context::CallerContext;
use crate::error::Violation;

/// Kind of audited decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEventKind {
    /// Token or ownership check on a caller's own resources
    Authorization,
    /// Check guarding an administrative operation
    AdminAction,
}

impl fmt::Display for AuditEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEventKind::Authorization => write!(f, "authorization"),
            AuditEventKind::AdminAction => write!(f, "admin_action"),
        }
    }
}

/// Outcome of a guard decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The guard granted the operation
    Granted,
    /// The guard refused the operation
    Denied,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Granted => write!(f, "granted"),
            AuditOutcome::Denied => write!(f, "denied"),
        }
    }
}

/// A structured record of one guard decision.
///
/// Only identifiers are stored. The caller's token is never copied here.
///
/// # Example
///
/// ```
/// use cat_gateway::audit::{AuditEvent, AuditEventKind, AuditOutcome};
///
/// let event = AuditEvent::new("req-1", Some("p1"), AuditEventKind::Authorization, AuditOutcome::Granted)
///     .with_action("update_cat")
///     .with_resource_id("cat-9");
///
/// assert_eq!(event.principal(), Some("p1"));
/// assert_eq!(event.resource_id(), Some("cat-9"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    request_id: String,
    principal: Option<String>,
    kind: AuditEventKind,
    outcome: AuditOutcome,
    action: Option<String>,
    resource_id: Option<String>,
    reason: Option<String>,
}

impl AuditEvent {
    /// Creates an event with the required fields.
    pub fn new(
        request_id: impl Into<String>,
        principal: Option<impl Into<String>>,
        kind: AuditEventKind,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            principal: principal.map(Into::into),
            kind,
            outcome,
            action: None,
            resource_id: None,
            reason: None,
        }
    }

    /// Builds the event for a guard decision taken on behalf of `caller`.
    pub(crate) fn decision<T>(
        caller: &CallerContext,
        kind: AuditEventKind,
        action: &str,
        decision: &Result<T, Violation>,
    ) -> Self {
        let outcome = match decision {
            Ok(_) => AuditOutcome::Granted,
            Err(_) => AuditOutcome::Denied,
        };
        let event = Self::new(
            caller.request_id(),
            caller.principal().map(|p| p.as_str()),
            kind,
            outcome,
        )
        .with_action(action);

        match decision {
            Err(violation) => event.with_reason(violation.to_string()),
            Ok(_) => event,
        }
    }

    /// Sets the operation name.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the identifier of the resource being acted upon.
    #[must_use]
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Sets the denial reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Returns the request identifier.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the asserted principal, if any.
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    /// Returns the event kind.
    pub fn kind(&self) -> AuditEventKind {
        self.kind
    }

    /// Returns the decision outcome.
    pub fn outcome(&self) -> AuditOutcome {
        self.outcome
    }

    /// Returns the operation name, if set.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Returns the resource identifier, if set.
    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    /// Returns the denial reason, if any.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let principal = self.principal.as_deref().unwrap_or("-");
        write!(
            f,
            "{} {} req={} by={principal}",
            self.kind, self.outcome, self.request_id
        )?;
        for (key, value) in [
            ("action", &self.action),
            ("resource", &self.resource_id),
            ("reason", &self.reason),
        ] {
            if let Some(value) = value {
                write!(f, " {key}={value}")?;
            }
        }
        Ok(())
    }
}
