//! Inbound request boundary.
//!
//! Framework code builds a [`RequestAdapter`] from its own request type and
//! hands it to [`authenticate`], which turns the presented credentials into
//! a [`CallerContext`](crate::CallerContext).
//!
//! Nothing here grants write access. The context only carries what the
//! caller asserted and what the identity service confirmed. Authorization
//! still happens in [`PolicyGate`](crate::PolicyGate).
//!
//! # Example Flow
//!
//! ```ignore
//! let adapter = RequestAdapter::from_headers(http_req.headers_as_pairs());
//! let caller = web::authenticate(&adapter, identity.as_ref()).await?;
//! let op: Operation = serde_json::from_slice(&body)?;
//! let resolved = gateway.execute(op, Selection::default(), &caller).await?;
//! ```

mod adapter;
mod extract;
mod middleware;

pub use adapter::{RequestAdapter, REQUEST_ID_HEADER};
pub use extract::ExtractCredentials;
pub use middleware::{authenticate, extract_anonymous};
