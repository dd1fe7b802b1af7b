//! Audit trail for authorization decisions.
//!
//! Every guard decision taken by the resolvers and the identity gateway is
//! turned into an [`AuditEvent`] and emitted on the `cat_gateway::audit`
//! tracing target. When an [`AuditTrail`] is attached the same events are
//! kept in memory for inspection.
//!
//! Events carry identifiers only. Bearer tokens and payload bodies never
//! reach them.

mod event;
mod policy_audit;
mod trail;

pub use event::{AuditEvent, AuditEventKind, AuditOutcome};
pub use policy_audit::PolicyAudit;
pub use trail::AuditTrail;
