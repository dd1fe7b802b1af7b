//! Emission of audit events through tracing.

use super::{AuditEvent, AuditTrail};

/// Audit event emitter shared by the resolvers and the identity gateway.
///
/// Every event is logged on the `cat_gateway::audit` target. If a trail is
/// attached the event is recorded there as well.
///
/// # Example
///
/// ```
/// use cat_gateway::audit::{AuditEvent, AuditEventKind, AuditOutcome, AuditTrail, PolicyAudit};
///
/// let trail = AuditTrail::new();
/// let audit = PolicyAudit::recording(trail.clone());
///
/// audit.emit(AuditEvent::new(
///     "req-123",
///     Some("admin-1"),
///     AuditEventKind::AdminAction,
///     AuditOutcome::Granted,
/// ));
///
/// assert_eq!(trail.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolicyAudit {
    trail: Option<AuditTrail>,
}

impl PolicyAudit {
    /// Creates an emitter that only logs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an emitter that logs and records into `trail`.
    pub fn recording(trail: AuditTrail) -> Self {
        Self { trail: Some(trail) }
    }

    /// Returns the attached trail, if any.
    pub fn trail(&self) -> Option<&AuditTrail> {
        self.trail.as_ref()
    }

    /// Emits an event and records it when a trail is attached.
    pub fn emit(&self, event: AuditEvent) {
        tracing::info!(
            target: "cat_gateway::audit",
            request_id = %event.request_id(),
            principal = ?event.principal(),
            kind = %event.kind(),
            outcome = %event.outcome(),
            action = ?event.action(),
            resource_id = ?event.resource_id(),
            reason = ?event.reason(),
            "audit event"
        );

        if let Some(trail) = &self.trail {
            trail.record(event);
        }
    }
}
