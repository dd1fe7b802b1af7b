//! Cat resolvers.
//!
//! Reads go straight to the store. Every write first passes the
//! [`PolicyGate`], whose [`WriteCap`] the store's write methods demand, so a
//! denied caller never reaches storage.

use std::sync::Arc;

use tracing::instrument;

use crate::audit::{AuditEvent, AuditEventKind, PolicyAudit};
use crate::capability::WriteCap;
use crate::context::{CallerContext, PrincipalId};
use crate::error::{Error, Result, Violation, ViolationKind};
use crate::gate::PolicyGate;
use crate::geo::{translate_bounds, Coordinates};
use crate::policy::{Admin, Authenticated, OwnerOf};
use crate::store::{Cat, CatFilter, CatId, CatPatch, CatStore, NewCat, StoreError};

/// Resolves cat queries and mutations against a [`CatStore`].
#[derive(Clone)]
pub struct CatResolver {
    store: Arc<dyn CatStore>,
    audit: PolicyAudit,
}

impl CatResolver {
    /// Creates a resolver over `store`.
    pub fn new(store: Arc<dyn CatStore>) -> Self {
        Self {
            store,
            audit: PolicyAudit::new(),
        }
    }

    /// Uses `audit` for guard decisions.
    #[must_use]
    pub fn with_audit(mut self, audit: PolicyAudit) -> Self {
        self.audit = audit;
        self
    }

    fn record<T>(
        &self,
        caller: &CallerContext,
        kind: AuditEventKind,
        action: &str,
        resource: Option<&CatId>,
        decision: &std::result::Result<T, Violation>,
    ) {
        let mut event = AuditEvent::decision(caller, kind, action, decision);
        if let Some(id) = resource {
            event = event.with_resource_id(id.as_str());
        }
        self.audit.emit(event);
    }

    async fn load(&self, id: &CatId) -> Result<Cat> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Returns every cat in store order.
    #[instrument(skip(self))]
    pub async fn cats(&self) -> Result<Vec<Cat>> {
        Ok(self.store.find_all().await?)
    }

    /// Returns the cat with `id`, or `None`.
    #[instrument(skip(self))]
    pub async fn cat_by_id(&self, id: &CatId) -> Result<Option<Cat>> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Returns the cats owned by `owner`.
    #[instrument(skip(self))]
    pub async fn cats_by_owner(&self, owner: &PrincipalId) -> Result<Vec<Cat>> {
        Ok(self.store.find(&CatFilter::Owner(owner.clone())).await?)
    }

    /// Returns the cats located inside the rectangle spanned by two corners.
    ///
    /// # Errors
    ///
    /// Malformed corners give `Error::Validation` before the store is queried.
    #[instrument(skip(self))]
    pub async fn cats_by_area(
        &self,
        top_right: Coordinates,
        bottom_left: Coordinates,
    ) -> Result<Vec<Cat>> {
        let region = translate_bounds(top_right, bottom_left)?;
        Ok(self.store.find(&CatFilter::Within(region)).await?)
    }

    /// Creates a cat owned by the caller.
    ///
    /// Any owner named in `input` is ignored.
    ///
    /// # Errors
    ///
    /// `Error::Unauthorized` without a token or principal. `Error::Storage`
    /// if the store rejects the insert.
    #[instrument(skip(self, caller), fields(request_id = %caller.request_id()))]
    pub async fn create_cat(&self, caller: &CallerContext, input: NewCat) -> Result<Cat> {
        let decision = PolicyGate::new(caller)
            .require(Authenticated)
            .build()
            .and_then(|cap| match caller.principal() {
                Some(owner) => Ok((cap, owner.clone())),
                None => Err(Violation::new(
                    ViolationKind::Anonymous,
                    "creating a cat needs a principal",
                )),
            });
        self.record(caller, AuditEventKind::Authorization, "create_cat", None, &decision);
        let (cap, owner) = decision?;

        self.store
            .insert(&cap, input.into_record(owner))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "cat not created");
                match e {
                    StoreError::Rejected(reason) => {
                        Error::Storage(StoreError::Rejected(format!("Cat not created: {reason}")))
                    }
                    other => Error::Storage(other),
                }
            })
    }

    /// Updates a cat owned by the caller and returns the persisted document.
    ///
    /// An `owner` in `patch` is dropped.
    #[instrument(skip(self, caller), fields(request_id = %caller.request_id()))]
    pub async fn update_cat(
        &self,
        caller: &CallerContext,
        id: &CatId,
        patch: CatPatch,
    ) -> Result<Cat> {
        let existing = self.load(id).await?;
        let cap = self.owner_cap(caller, &existing, "update_cat")?;

        self.store
            .find_and_update(&cap, id, &patch.without_owner())
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Deletes a cat owned by the caller and returns it as it was.
    #[instrument(skip(self, caller), fields(request_id = %caller.request_id()))]
    pub async fn delete_cat(&self, caller: &CallerContext, id: &CatId) -> Result<Cat> {
        let existing = self.load(id).await?;
        let cap = self.owner_cap(caller, &existing, "delete_cat")?;

        self.store
            .find_and_delete(&cap, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Updates any cat, including its owner. Requires the admin policy.
    #[instrument(skip(self, caller), fields(request_id = %caller.request_id()))]
    pub async fn update_cat_as_admin(
        &self,
        caller: &CallerContext,
        id: &CatId,
        patch: CatPatch,
    ) -> Result<Cat> {
        let cap = self.admin_cap(caller, id, "update_cat_as_admin")?;

        self.store
            .find_and_update(&cap, id, &patch)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Deletes any cat. Requires the admin policy.
    #[instrument(skip(self, caller), fields(request_id = %caller.request_id()))]
    pub async fn delete_cat_as_admin(&self, caller: &CallerContext, id: &CatId) -> Result<Cat> {
        let cap = self.admin_cap(caller, id, "delete_cat_as_admin")?;

        self.store
            .find_and_delete(&cap, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    fn owner_cap(&self, caller: &CallerContext, cat: &Cat, action: &str) -> Result<WriteCap> {
        let decision = PolicyGate::new(caller)
            .require(OwnerOf::resource(&cat.owner))
            .build();
        self.record(
            caller,
            AuditEventKind::Authorization,
            action,
            Some(&cat.id),
            &decision,
        );
        decision.map_err(Error::from)
    }

    fn admin_cap(&self, caller: &CallerContext, id: &CatId, action: &str) -> Result<WriteCap> {
        let decision = PolicyGate::new(caller).require(Admin).build();
        self.record(caller, AuditEventKind::AdminAction, action, Some(id), &decision);
        decision.map_err(Error::from)
    }
}

fn not_found(id: &CatId) -> Error {
    Error::NotFound {
        entity: "cat",
        id: id.to_string(),
    }
}
