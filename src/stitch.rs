//! Owner stitching against the identity service.

use std::sync::Arc;

use tracing::instrument;

use crate::error::{Error, Result};
use crate::identity::{IdentityService, Principal};
use crate::store::Cat;

/// Resolves a cat's `owner` into the principal held by the identity service.
///
/// A cat only stores the owner's id. A missing owner surfaces as
/// `Error::OwnerNotFound`, and every other failure passes through as is.
#[derive(Clone)]
pub struct OwnerStitcher {
    identity: Arc<dyn IdentityService>,
}

impl OwnerStitcher {
    /// Creates a stitcher backed by `identity`.
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        Self { identity }
    }

    /// Fetches the owner of `cat`.
    #[instrument(skip_all, fields(cat = %cat.id, owner = %cat.owner))]
    pub async fn resolve_owner(&self, cat: &Cat) -> Result<Principal> {
        match self.identity.user_by_id(&cat.owner).await {
            Err(Error::Upstream { status: 404, .. }) => {
                tracing::debug!("owner missing from identity service");
                Err(Error::OwnerNotFound {
                    owner: cat.owner.clone(),
                })
            }
            other => other,
        }
    }
}
