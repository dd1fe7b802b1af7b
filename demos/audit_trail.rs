//! Audit trail demonstration.
//!
//! Every guard decision taken by the resolver is recorded:
//! 1. Attach a recording audit to the resolver
//! 2. Run writes as the owner, a stranger and an administrator
//! 3. Inspect the recorded decisions
//!
//! Run with: `cargo run --example audit_trail`

use std::sync::Arc;

use cat_gateway::audit::{AuditOutcome, AuditTrail, PolicyAudit};
use cat_gateway::geo::GeoPoint;
use cat_gateway::resolver::CatResolver;
use cat_gateway::store::{CatPatch, InMemoryCatStore, NewCat};
use cat_gateway::{BearerToken, CallerContext, Roles};
use chrono::NaiveDate;

fn caller(id: &str, role: &str) -> CallerContext {
    CallerContext::anonymous(format!("req-{id}"))
        .with_principal(id)
        .with_roles(Roles::single(role))
        .with_token(BearerToken::new(format!("token-{id}")))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Audit Trail Example ===\n");

    let trail = AuditTrail::new();
    let resolver = CatResolver::new(Arc::new(InMemoryCatStore::new()))
        .with_audit(PolicyAudit::recording(trail.clone()));

    let owner = caller("p1", "user");
    let stranger = caller("p2", "user");
    let admin = caller("a1", "admin");

    let cat = resolver
        .create_cat(
            &owner,
            NewCat {
                cat_name: "Whiskers".to_string(),
                weight: 4.2,
                birthdate: NaiveDate::from_ymd_opt(2020, 5, 1).ok_or("bad date")?,
                filename: "whiskers.jpg".to_string(),
                location: GeoPoint::new(60.2, 24.9)?,
                owner: None,
            },
        )
        .await?;
    println!("✓ p1 created {}", cat.id);

    let heavier = CatPatch {
        weight: Some(4.5),
        ..CatPatch::default()
    };
    match resolver.update_cat(&stranger, &cat.id, heavier.clone()).await {
        Ok(_) => println!("Unexpected success for p2"),
        Err(e) => println!("✓ p2 refused: {e}"),
    }
    resolver.update_cat(&owner, &cat.id, heavier).await?;
    println!("✓ p1 updated the weight");

    resolver.delete_cat_as_admin(&admin, &cat.id).await?;
    println!("✓ a1 removed the cat");

    println!("\n--- Recorded decisions ---");
    for event in trail.events() {
        println!("  {event}");
    }

    let denied = trail
        .events()
        .iter()
        .filter(|e| e.outcome() == AuditOutcome::Denied)
        .count();
    println!("\n  Summary: {} decisions, {denied} denied", trail.len());
    Ok(())
}
