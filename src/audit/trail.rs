use std::sync::Arc;

use parking_lot::Mutex;

use super::AuditEvent;

/// In-memory recorder for audit events.
///
/// Clones share the same buffer, so a trail handed to a resolver can be
/// inspected afterwards through the original handle.
///
/// # Example
///
/// ```
/// use cat_gateway::audit::{AuditEvent, AuditEventKind, AuditOutcome, AuditTrail};
///
/// let trail = AuditTrail::new();
/// let handle = trail.clone();
///
/// handle.record(AuditEvent::new(
///     "req-1",
///     Some("p1"),
///     AuditEventKind::Authorization,
///     AuditOutcome::Granted,
/// ));
///
/// assert_eq!(trail.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl AuditTrail {
    /// Creates a new empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event. Events keep their recording order.
    pub fn record(&self, event: AuditEvent) {
        self.events.lock().push(event);
    }

    /// Returns a snapshot of all recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}
