//! End-to-end resolver flows over the in-memory store.

use std::sync::Arc;

use cat_gateway::audit::{AuditOutcome, AuditTrail, PolicyAudit};
use cat_gateway::geo::{Coordinates, GeoPoint};
use cat_gateway::resolver::CatResolver;
use cat_gateway::store::{CatPatch, CatStore, InMemoryCatStore, NewCat};
use cat_gateway::{BearerToken, CallerContext, Error, PrincipalId, Roles, ViolationKind};
use chrono::NaiveDate;

fn new_cat(name: &str, lat: f64, lng: f64) -> NewCat {
    NewCat {
        cat_name: name.to_string(),
        weight: 4.2,
        birthdate: NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
        filename: format!("{}.jpg", name.to_lowercase()),
        location: GeoPoint::new(lat, lng).unwrap(),
        owner: None,
    }
}

fn user(id: &str) -> CallerContext {
    CallerContext::anonymous(format!("req-{id}"))
        .with_principal(id)
        .with_roles(Roles::single("user"))
        .with_token(BearerToken::new(format!("token-{id}")))
}

fn admin(id: &str) -> CallerContext {
    CallerContext::anonymous(format!("req-{id}"))
        .with_principal(id)
        .with_roles(Roles::single("admin"))
        .with_token(BearerToken::new(format!("token-{id}")))
}

fn setup() -> (CatResolver, Arc<InMemoryCatStore>, AuditTrail) {
    let store = Arc::new(InMemoryCatStore::new());
    let trail = AuditTrail::new();
    let resolver = CatResolver::new(store.clone()).with_audit(PolicyAudit::recording(trail.clone()));
    (resolver, store, trail)
}

#[tokio::test]
async fn whiskers_lifecycle() {
    let (resolver, store, trail) = setup();
    let p1 = user("p1");
    let p2 = user("p2");

    // P1 creates Whiskers
    let whiskers = resolver
        .create_cat(&p1, new_cat("Whiskers", 60.2, 24.9))
        .await
        .unwrap();
    assert_eq!(whiskers.owner, PrincipalId::new("p1"));

    // P2 may not touch it
    let err = resolver
        .update_cat(
            &p2,
            &whiskers.id,
            CatPatch {
                weight: Some(1.0),
                ..CatPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Not authorized");
    assert_eq!(err.violation().map(|v| v.kind), Some(ViolationKind::NotOwner));
    let unchanged = resolver.cat_by_id(&whiskers.id).await.unwrap().unwrap();
    assert_eq!(unchanged, whiskers);

    // P1 sets the weight
    let updated = resolver
        .update_cat(
            &p1,
            &whiskers.id,
            CatPatch {
                weight: Some(4.5),
                ..CatPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.weight, 4.5);
    assert_eq!(
        store.find_by_id(&whiskers.id).await.unwrap().unwrap().weight,
        4.5
    );

    // An admin removes it
    let removed = resolver
        .delete_cat_as_admin(&admin("a1"), &whiskers.id)
        .await
        .unwrap();
    assert_eq!(removed.weight, 4.5);
    assert!(resolver.cat_by_id(&whiskers.id).await.unwrap().is_none());

    let outcomes: Vec<_> = trail.events().iter().map(|e| e.outcome()).collect();
    assert_eq!(
        outcomes,
        vec![
            AuditOutcome::Granted,
            AuditOutcome::Denied,
            AuditOutcome::Granted,
            AuditOutcome::Granted,
        ]
    );
}

#[tokio::test]
async fn create_ignores_supplied_owner() {
    let (resolver, _, _) = setup();
    let mut input = new_cat("Mittens", 60.0, 24.0);
    input.owner = Some(PrincipalId::new("someone-else"));

    let cat = resolver.create_cat(&user("p1"), input).await.unwrap();

    assert_eq!(cat.owner, PrincipalId::new("p1"));
    let mine = resolver
        .cats_by_owner(&PrincipalId::new("p1"))
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert!(resolver
        .cats_by_owner(&PrincipalId::new("someone-else"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn non_owner_delete_leaves_cat_in_place() {
    let (resolver, _, _) = setup();
    let cat = resolver
        .create_cat(&user("p1"), new_cat("Tom", 60.0, 24.0))
        .await
        .unwrap();

    let err = resolver.delete_cat(&user("p2"), &cat.id).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(resolver.cat_by_id(&cat.id).await.unwrap(), Some(cat));
}

#[tokio::test]
async fn admin_role_does_not_open_owner_path() {
    let (resolver, _, _) = setup();
    let cat = resolver
        .create_cat(&user("p1"), new_cat("Tom", 60.0, 24.0))
        .await
        .unwrap();

    let err = resolver.delete_cat(&admin("a1"), &cat.id).await.unwrap_err();
    assert_eq!(err.violation().map(|v| v.kind), Some(ViolationKind::NotOwner));
}

#[tokio::test]
async fn admin_path_ignores_ownership_both_ways() {
    let (resolver, _, _) = setup();
    let cat = resolver
        .create_cat(&user("p1"), new_cat("Tom", 60.0, 24.0))
        .await
        .unwrap();

    // Owner without the admin role is refused
    let err = resolver
        .update_cat_as_admin(&user("p1"), &cat.id, CatPatch::default())
        .await
        .unwrap_err();
    assert_eq!(err.violation().map(|v| v.kind), Some(ViolationKind::NotAdmin));

    // Admin who owns nothing succeeds
    let renamed = resolver
        .update_cat_as_admin(
            &admin("a1"),
            &cat.id,
            CatPatch {
                cat_name: Some("Thomas".to_string()),
                ..CatPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.cat_name, "Thomas");
    assert_eq!(renamed.owner, PrincipalId::new("p1"));
}

#[tokio::test]
async fn admin_delete_by_plain_user_leaves_cat_in_place() {
    let (resolver, store, trail) = setup();
    let cat = resolver
        .create_cat(&user("p1"), new_cat("Tom", 60.0, 24.0))
        .await
        .unwrap();

    for caller in [user("p2"), user("p1")] {
        let err = resolver
            .delete_cat_as_admin(&caller, &cat.id)
            .await
            .unwrap_err();
        assert_eq!(err.violation().map(|v| v.kind), Some(ViolationKind::NotAdmin));
    }

    assert_eq!(store.find_by_id(&cat.id).await.unwrap(), Some(cat));
    assert_eq!(store.len(), 1);
    let denied = trail
        .events()
        .iter()
        .filter(|e| e.outcome() == AuditOutcome::Denied)
        .count();
    assert_eq!(denied, 2);
}

#[tokio::test]
async fn missing_token_blocks_every_write() {
    let (resolver, store, _) = setup();
    let cat = resolver
        .create_cat(&user("p1"), new_cat("Tom", 60.0, 24.0))
        .await
        .unwrap();

    let tokenless_owner = CallerContext::anonymous("req-x").with_principal("p1");
    let tokenless_admin = CallerContext::anonymous("req-y")
        .with_principal("a1")
        .with_roles(Roles::single("admin"));

    for err in [
        resolver
            .create_cat(&tokenless_owner, new_cat("Kit", 0.0, 0.0))
            .await
            .unwrap_err(),
        resolver
            .update_cat(&tokenless_owner, &cat.id, CatPatch::default())
            .await
            .unwrap_err(),
        resolver
            .delete_cat(&tokenless_owner, &cat.id)
            .await
            .unwrap_err(),
        resolver
            .delete_cat_as_admin(&tokenless_admin, &cat.id)
            .await
            .unwrap_err(),
    ] {
        assert_eq!(err.violation().map(|v| v.kind), Some(ViolationKind::MissingToken));
    }
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn area_query_includes_boundary_and_excludes_outside() {
    let (resolver, _, _) = setup();
    let p1 = user("p1");
    for (name, lat, lng) in [
        ("inside", 60.5, 24.5),
        ("corner", 60.0, 24.0),
        ("edge", 61.0, 24.7),
        ("just-outside-north", 61.000_1, 24.5),
        ("just-outside-west", 60.5, 23.999_9),
        ("far", -33.9, 151.2),
    ] {
        resolver
            .create_cat(&p1, new_cat(name, lat, lng))
            .await
            .unwrap();
    }

    // Corners deliberately swapped
    let found = resolver
        .cats_by_area(Coordinates::new(60.0, 24.0), Coordinates::new(61.0, 25.0))
        .await
        .unwrap();

    let mut names: Vec<_> = found.into_iter().map(|c| c.cat_name).collect();
    names.sort();
    assert_eq!(names, vec!["corner", "edge", "inside"]);
}

#[tokio::test]
async fn malformed_area_is_a_validation_error() {
    let (resolver, _, _) = setup();
    let err = resolver
        .cats_by_area(Coordinates::new(95.0, 0.0), Coordinates::new(0.0, 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn reads_preserve_store_order() {
    let (resolver, _, _) = setup();
    let p1 = user("p1");
    for name in ["a", "b", "c"] {
        resolver
            .create_cat(&p1, new_cat(name, 0.0, 0.0))
            .await
            .unwrap();
    }

    let names: Vec<_> = resolver
        .cats()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.cat_name)
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}
