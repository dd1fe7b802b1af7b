//! Authorization-aware gateway for a geotagged cat registry.
//!
//! The crate resolves cat queries and mutations against a storage
//! collaborator and proxies identity operations to a remote identity
//! service. Writes are guarded at compile time:
//! - **Capabilities**: store write methods take a [`WriteCap`], and only
//!   [`PolicyGate::build`] creates one
//! - **Redaction**: [`BearerToken`] never prints its value
//! - **Explicit context**: every operation receives a [`CallerContext`]
//!
//! # Core Types
//!
//! - [`CallerContext`]: identity, roles and token asserted for one request
//! - [`PolicyGate`]: checks [`Authenticated`], [`OwnerOf`] and [`Admin`]
//! - [`resolver::CatResolver`]: cat queries and mutations
//! - [`identity::IdentityGateway`]: identity operations with caller policies
//! - [`graph::Gateway`]: dispatches named fields to both
//!
//! # Examples
//!
//! ```
//! use cat_gateway::{BearerToken, CallerContext, OwnerOf, PolicyGate, PrincipalId};
//!
//! // Tokens are redacted
//! let token = BearerToken::new("super-secret").unwrap();
//! assert_eq!(format!("{token:?}"), "[REDACTED]");
//!
//! // PolicyGate enforces ownership
//! let caller = CallerContext::anonymous("req-123")
//!     .with_principal("p1")
//!     .with_token(Some(token));
//!
//! let cap = PolicyGate::new(&caller)
//!     .require(OwnerOf::resource(&PrincipalId::new("p1")))
//!     .build()
//!     .expect("caller owns the resource");
//! # let _ = cap;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
mod capability;
pub mod config;
mod context;
mod error;
mod gate;
pub mod geo;
pub mod graph;
pub mod identity;
pub mod logging;
mod policy;
pub mod resolver;
pub mod stitch;
pub mod store;
mod token;
pub mod web;

pub use capability::WriteCap;
pub use context::{CallerContext, PrincipalId, Roles, ADMIN_ROLE};
pub use error::{Error, Result, Violation, ViolationKind};
pub use gate::PolicyGate;
pub use policy::{Admin, Authenticated, OwnerOf, PolicyReq};
pub use token::BearerToken;
