//! Cat documents and the storage collaborator seam.
//!
//! The storage engine itself is external. `CatStore` names the primitives the
//! resolvers rely on, each assumed atomic per call. Every write takes a
//! [`WriteCap`], so an implementation can only be driven after a guard check.

mod memory;

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::capability::WriteCap;
use crate::context::PrincipalId;
use crate::geo::{BoundingRegion, GeoPoint};

pub use memory::InMemoryCatStore;

/// Opaque identifier of a stored cat, minted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatId(String);

impl CatId {
    /// Wraps an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CatId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A geotagged cat owned by one principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cat {
    /// Store-assigned identifier
    pub id: CatId,
    /// Display name
    pub cat_name: String,
    /// Weight in kilograms
    pub weight: f64,
    /// Date of birth
    pub birthdate: NaiveDate,
    /// Image reference
    pub filename: String,
    /// Where the cat lives
    pub location: GeoPoint,
    /// Owning principal in the identity service
    pub owner: PrincipalId,
}

/// Input for creating a cat.
///
/// `owner` is accepted so callers can send it, but it is always replaced by
/// the creating principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCat {
    /// Display name
    pub cat_name: String,
    /// Weight in kilograms
    pub weight: f64,
    /// Date of birth
    pub birthdate: NaiveDate,
    /// Image reference
    pub filename: String,
    /// Where the cat lives
    pub location: GeoPoint,
    /// Ignored on creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<PrincipalId>,
}

impl NewCat {
    /// Builds the document to insert, owned by `owner`.
    pub fn into_record(self, owner: PrincipalId) -> CatRecord {
        CatRecord {
            cat_name: self.cat_name,
            weight: self.weight,
            birthdate: self.birthdate,
            filename: self.filename,
            location: self.location,
            owner,
        }
    }
}

/// A cat document without an id, ready for insertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatRecord {
    /// Display name
    pub cat_name: String,
    /// Weight in kilograms
    pub weight: f64,
    /// Date of birth
    pub birthdate: NaiveDate,
    /// Image reference
    pub filename: String,
    /// Where the cat lives
    pub location: GeoPoint,
    /// Owning principal
    pub owner: PrincipalId,
}

impl CatRecord {
    /// Attaches a store-minted id.
    pub fn with_id(self, id: CatId) -> Cat {
        Cat {
            id,
            cat_name: self.cat_name,
            weight: self.weight,
            birthdate: self.birthdate,
            filename: self.filename,
            location: self.location,
            owner: self.owner,
        }
    }
}

/// A partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatPatch {
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cat_name: Option<String>,
    /// New weight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// New date of birth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
    /// New image reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// New location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    /// New owner. Only honored on the admin path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<PrincipalId>,
}

impl CatPatch {
    /// Drops any owner reassignment.
    #[must_use]
    pub fn without_owner(mut self) -> Self {
        self.owner = None;
        self
    }

    /// Applies the patch to a document in place.
    pub fn apply(&self, cat: &mut Cat) {
        if let Some(name) = &self.cat_name {
            cat.cat_name.clone_from(name);
        }
        if let Some(weight) = self.weight {
            cat.weight = weight;
        }
        if let Some(birthdate) = self.birthdate {
            cat.birthdate = birthdate;
        }
        if let Some(filename) = &self.filename {
            cat.filename.clone_from(filename);
        }
        if let Some(location) = self.location {
            cat.location = location;
        }
        if let Some(owner) = &self.owner {
            cat.owner = owner.clone();
        }
    }
}

/// Filter accepted by [`CatStore::find`].
#[derive(Debug, Clone, PartialEq)]
pub enum CatFilter {
    /// Cats whose owner equals the given principal
    Owner(PrincipalId),
    /// Cats whose location lies within the region (boundary inclusive)
    Within(BoundingRegion),
}

impl CatFilter {
    /// Evaluates the filter against a document.
    pub fn matches(&self, cat: &Cat) -> bool {
        match self {
            CatFilter::Owner(owner) => &cat.owner == owner,
            CatFilter::Within(region) => region.contains(&cat.location),
        }
    }
}

/// Failures reported by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The write was rejected.
    #[error("{0}")]
    Rejected(String),
    /// The store could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage primitives over the cat collection.
#[async_trait]
pub trait CatStore: Send + Sync {
    /// Returns every document.
    async fn find_all(&self) -> Result<Vec<Cat>, StoreError>;

    /// Returns the document with the given id, if any.
    async fn find_by_id(&self, id: &CatId) -> Result<Option<Cat>, StoreError>;

    /// Returns every document matching the filter.
    async fn find(&self, filter: &CatFilter) -> Result<Vec<Cat>, StoreError>;

    /// Inserts a new document and returns it with its minted id.
    async fn insert(&self, cap: &WriteCap, record: CatRecord) -> Result<Cat, StoreError>;

    /// Applies a patch and returns the document as persisted afterwards.
    async fn find_and_update(
        &self,
        cap: &WriteCap,
        id: &CatId,
        patch: &CatPatch,
    ) -> Result<Option<Cat>, StoreError>;

    /// Removes a document and returns it as it was before removal.
    async fn find_and_delete(&self, cap: &WriteCap, id: &CatId) -> Result<Option<Cat>, StoreError>;
}
