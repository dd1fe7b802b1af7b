//! Request flow demonstration.
//!
//! This example walks one request from raw headers to a graph result:
//! 1. Collect headers into a request adapter
//! 2. Introspect the bearer token into a caller context
//! 3. Execute a named field with owner stitching
//!
//! The identity service is an in-process directory, so nothing goes over the
//! network.
//!
//! Run with: `cargo run --example request_flow`

use std::sync::Arc;

use async_trait::async_trait;
use cat_gateway::graph::{Gateway, Operation, Selection};
use cat_gateway::identity::{
    Credentials, IdentityService, NewPrincipal, Principal, PrincipalPatch, SessionPayload,
};
use cat_gateway::store::InMemoryCatStore;
use cat_gateway::web::{authenticate, RequestAdapter};
use cat_gateway::{BearerToken, Error, PrincipalId, Result, Roles};
use serde_json::json;

/// Knows exactly one principal, reachable through one token.
struct Directory {
    alice: Principal,
}

impl Directory {
    fn new() -> Self {
        Self {
            alice: Principal {
                id: PrincipalId::new("p1"),
                user_name: "alice".to_string(),
                email: Some("alice@example.com".to_string()),
                role: Some(Roles::single("user")),
            },
        }
    }

    fn lookup(&self, id: &PrincipalId) -> Result<Principal> {
        if *id == self.alice.id {
            Ok(self.alice.clone())
        } else {
            Err(not_found())
        }
    }
}

fn not_found() -> Error {
    Error::Upstream {
        status: 404,
        reason: "Not Found".to_string(),
    }
}

fn unsupported() -> Error {
    Error::Upstream {
        status: 501,
        reason: "Not Implemented".to_string(),
    }
}

#[async_trait]
impl IdentityService for Directory {
    async fn users(&self) -> Result<Vec<Principal>> {
        Ok(vec![self.alice.clone()])
    }

    async fn user_by_id(&self, id: &PrincipalId) -> Result<Principal> {
        self.lookup(id)
    }

    async fn check_token(&self, token: &BearerToken) -> Result<Principal> {
        if token.expose() == "alice-token" {
            Ok(self.alice.clone())
        } else {
            Err(Error::Upstream {
                status: 401,
                reason: "Unauthorized".to_string(),
            })
        }
    }

    async fn login(&self, _: &Credentials) -> Result<SessionPayload> {
        Err(unsupported())
    }

    async fn register(&self, _: &NewPrincipal) -> Result<SessionPayload> {
        Err(unsupported())
    }

    async fn update_self(&self, _: &BearerToken, _: &PrincipalPatch) -> Result<SessionPayload> {
        Err(unsupported())
    }

    async fn update_as_admin(
        &self,
        _: &BearerToken,
        _: &Roles,
        _: &PrincipalId,
        _: &PrincipalPatch,
    ) -> Result<Principal> {
        Err(unsupported())
    }

    async fn delete_self(&self, _: &BearerToken) -> Result<Principal> {
        Err(unsupported())
    }

    async fn delete_as_admin(&self, _: &BearerToken, _: &Roles, _: &PrincipalId) -> Result<Principal> {
        Err(unsupported())
    }
}

/// Runs one field for a request carrying `authorization`.
async fn handle(
    gateway: &Gateway,
    identity: &Directory,
    authorization: Option<&str>,
    op: serde_json::Value,
) -> std::result::Result<serde_json::Value, Box<dyn std::error::Error>> {
    let mut headers = vec![("x-request-id", "req-demo")];
    if let Some(value) = authorization {
        headers.push(("authorization", value));
    }
    let adapter = RequestAdapter::from_headers(headers);

    let caller = authenticate(&adapter, identity).await?;
    println!(
        "   caller: {:?} (token: {})",
        caller.principal().map(PrincipalId::as_str),
        caller.has_token()
    );

    let op: Operation = serde_json::from_value(op)?;
    println!("   field: {}", op.field());

    let resolved = gateway.execute(op, Selection::with_owner(), &caller).await?;
    for error in resolved.errors() {
        println!("   sub-field error on {}: {}", error.field, error.message);
    }
    Ok(serde_json::to_value(resolved)?)
}

#[tokio::main]
async fn main() {
    println!("=== Request Flow Example ===");

    let identity = Arc::new(Directory::new());
    let gateway = Gateway::new(Arc::new(InMemoryCatStore::new()), identity.clone());

    let create = json!({
        "field": "createCat",
        "args": {
            "cat_name": "Whiskers",
            "weight": 4.2,
            "birthdate": "2020-05-01",
            "filename": "whiskers.jpg",
            "location": {"type": "Point", "coordinates": [24.9, 60.2]}
        }
    });

    println!("\n--- Scenario 1: Authenticated create ---");
    match handle(&gateway, &identity, Some("Bearer alice-token"), create.clone()).await {
        Ok(value) => println!("✓ Created: {value}"),
        Err(e) => eprintln!("✗ Error: {e}"),
    }

    println!("\n--- Scenario 2: Stale token ---");
    match handle(&gateway, &identity, Some("Bearer expired"), create).await {
        Ok(value) => println!("Unexpected success: {value}"),
        Err(e) => println!("✓ Expected error: {e}"),
    }

    println!("\n--- Scenario 3: Anonymous area query ---");
    let area = json!({
        "field": "catsByArea",
        "args": {
            "topRight": {"lat": 61.0, "lng": 25.0},
            "bottomLeft": {"lat": 60.0, "lng": 24.0}
        }
    });
    match handle(&gateway, &identity, None, area).await {
        Ok(value) => println!("✓ Found: {value}"),
        Err(e) => eprintln!("✗ Error: {e}"),
    }
}
