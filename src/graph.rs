//! Graph operation surface.
//!
//! An inbound operation names one field together with its arguments:
//!
//! ```json
//! {"field": "catsByArea", "args": {"topRight": {"lat": 61.0, "lng": 25.0},
//!                                  "bottomLeft": {"lat": 60.0, "lng": 24.0}}}
//! ```
//!
//! [`Gateway::execute`] dispatches the field to the cat resolver or the
//! identity gateway. When the selection asks for `owner`, every returned cat
//! is stitched with its owner principal.

use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::instrument;

use crate::audit::PolicyAudit;
use crate::context::{CallerContext, PrincipalId};
use crate::error::Result;
use crate::geo::Coordinates;
use crate::identity::{
    Credentials, IdentityGateway, IdentityService, NewPrincipal, Principal, PrincipalPatch,
    SessionPayload,
};
use crate::resolver::CatResolver;
use crate::stitch::OwnerStitcher;
use crate::store::{Cat, CatId, CatPatch, CatStore, NewCat};

/// A single field invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "field",
    content = "args",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Operation {
    /// All cats
    Cats,
    /// One cat by id
    CatById {
        /// Cat id
        id: CatId,
    },
    /// Cats of one owner
    CatsByOwner {
        /// Owner id
        owner_id: PrincipalId,
    },
    /// Cats inside a rectangle
    CatsByArea {
        /// One corner, usually north-east
        top_right: Coordinates,
        /// Opposite corner, usually south-west
        bottom_left: Coordinates,
    },
    /// All principals
    Users,
    /// One principal by id
    UserById {
        /// Principal id
        id: PrincipalId,
    },
    /// Principal behind the caller's token
    CheckToken,
    /// Create a cat owned by the caller
    CreateCat(NewCat),
    /// Update a cat owned by the caller
    UpdateCat {
        /// Cat id
        id: CatId,
        /// Fields to change
        #[serde(flatten)]
        patch: CatPatch,
    },
    /// Delete a cat owned by the caller
    DeleteCat {
        /// Cat id
        id: CatId,
    },
    /// Update any cat as administrator
    UpdateCatAsAdmin {
        /// Cat id
        id: CatId,
        /// Fields to change, owner included
        #[serde(flatten)]
        patch: CatPatch,
    },
    /// Delete any cat as administrator
    DeleteCatAsAdmin {
        /// Cat id
        id: CatId,
    },
    /// Log in
    Login {
        /// Username and password
        credentials: Credentials,
    },
    /// Register a principal
    Register {
        /// Registration input
        user: NewPrincipal,
    },
    /// Update the caller's own principal
    UpdateUser {
        /// Fields to change
        user: PrincipalPatch,
    },
    /// Update any principal as administrator
    UpdateUserAsAdmin {
        /// Principal id
        id: PrincipalId,
        /// Fields to change
        #[serde(flatten)]
        patch: PrincipalPatch,
    },
    /// Delete the caller's own principal
    DeleteUser,
    /// Delete any principal as administrator
    DeleteUserAsAdmin {
        /// Principal id
        id: PrincipalId,
    },
}

impl Operation {
    /// Returns the field name as it appears on the wire.
    pub fn field(&self) -> &'static str {
        match self {
            Operation::Cats => "cats",
            Operation::CatById { .. } => "catById",
            Operation::CatsByOwner { .. } => "catsByOwner",
            Operation::CatsByArea { .. } => "catsByArea",
            Operation::Users => "users",
            Operation::UserById { .. } => "userById",
            Operation::CheckToken => "checkToken",
            Operation::CreateCat(_) => "createCat",
            Operation::UpdateCat { .. } => "updateCat",
            Operation::DeleteCat { .. } => "deleteCat",
            Operation::UpdateCatAsAdmin { .. } => "updateCatAsAdmin",
            Operation::DeleteCatAsAdmin { .. } => "deleteCatAsAdmin",
            Operation::Login { .. } => "login",
            Operation::Register { .. } => "register",
            Operation::UpdateUser { .. } => "updateUser",
            Operation::UpdateUserAsAdmin { .. } => "updateUserAsAdmin",
            Operation::DeleteUser => "deleteUser",
            Operation::DeleteUserAsAdmin { .. } => "deleteUserAsAdmin",
        }
    }
}

/// Sub-fields requested on returned cats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Selection {
    /// Stitch the owner principal into each cat
    pub owner: bool,
}

impl Selection {
    /// Selection that stitches owners.
    pub fn with_owner() -> Self {
        Self { owner: true }
    }
}

/// The `owner` sub-field of a returned cat.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnerField {
    /// Not selected. Serialized as the bare owner id.
    Id,
    /// Stitched principal.
    Principal(Principal),
    /// Lookup failed after a mutation was applied. Serialized as `null`
    /// and reported through [`Resolved::errors`].
    Failed(String),
}

/// A cat as returned to callers.
///
/// Serializes like [`Cat`], except that `owner` follows [`OwnerField`].
#[derive(Debug, Clone, PartialEq)]
pub struct CatNode {
    /// Stored document
    pub cat: Cat,
    /// Owner sub-field
    pub owner: OwnerField,
}

impl CatNode {
    /// Returns the owner lookup failure, if any.
    pub fn owner_error(&self) -> Option<&str> {
        match &self.owner {
            OwnerField::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl Serialize for CatNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let cat = &self.cat;
        let mut map = serializer.serialize_map(Some(7))?;
        map.serialize_entry("id", &cat.id)?;
        map.serialize_entry("cat_name", &cat.cat_name)?;
        map.serialize_entry("weight", &cat.weight)?;
        map.serialize_entry("birthdate", &cat.birthdate)?;
        map.serialize_entry("filename", &cat.filename)?;
        map.serialize_entry("location", &cat.location)?;
        match &self.owner {
            OwnerField::Id => map.serialize_entry("owner", &cat.owner)?,
            OwnerField::Principal(principal) => map.serialize_entry("owner", principal)?,
            OwnerField::Failed(_) => map.serialize_entry("owner", &None::<Principal>)?,
        }
        map.end()
    }
}

/// A sub-field that failed while the field itself succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Cat carrying the failed sub-field
    pub cat: CatId,
    /// Name of the failed sub-field
    pub field: &'static str,
    /// Failure message
    pub message: String,
}

/// Result of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resolved {
    /// A list of cats
    Cats(Vec<CatNode>),
    /// A single cat, `null` when absent
    Cat(Option<CatNode>),
    /// A list of principals
    Users(Vec<Principal>),
    /// A single principal
    User(Principal),
    /// A session or status payload
    Session(SessionPayload),
}

impl Resolved {
    /// Returns the sub-field failures carried by the result.
    pub fn errors(&self) -> Vec<FieldError> {
        let nodes: &[CatNode] = match self {
            Resolved::Cats(nodes) => nodes,
            Resolved::Cat(Some(node)) => std::slice::from_ref(node),
            _ => &[],
        };
        nodes
            .iter()
            .filter_map(|node| {
                node.owner_error().map(|message| FieldError {
                    cat: node.cat.id.clone(),
                    field: "owner",
                    message: message.to_string(),
                })
            })
            .collect()
    }
}

/// Entry point binding resolvers, the identity gateway and the stitcher.
#[derive(Clone)]
pub struct Gateway {
    cats: CatResolver,
    identity: IdentityGateway,
    stitcher: OwnerStitcher,
}

impl Gateway {
    /// Creates a gateway over a store and an identity service.
    pub fn new(store: Arc<dyn CatStore>, identity: Arc<dyn IdentityService>) -> Self {
        Self {
            cats: CatResolver::new(store),
            identity: IdentityGateway::new(identity.clone()),
            stitcher: OwnerStitcher::new(identity),
        }
    }

    /// Routes every guard decision to `audit`.
    #[must_use]
    pub fn with_audit(self, audit: PolicyAudit) -> Self {
        Self {
            cats: self.cats.with_audit(audit.clone()),
            identity: self.identity.with_audit(audit),
            stitcher: self.stitcher,
        }
    }

    /// Returns the cat resolver.
    pub fn cats(&self) -> &CatResolver {
        &self.cats
    }

    /// Returns the identity gateway.
    pub fn identity(&self) -> &IdentityGateway {
        &self.identity
    }

    /// Executes one field on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// Whatever the resolver or identity gateway reports for the field, and
    /// owner stitching failures on read fields when `selection.owner` is set.
    /// On mutation fields an owner failure never fails the call: the result
    /// keeps the written document and lists the failure in
    /// [`Resolved::errors`].
    #[instrument(
        skip_all,
        fields(request_id = %caller.request_id(), field = op.field())
    )]
    pub async fn execute(
        &self,
        op: Operation,
        selection: Selection,
        caller: &CallerContext,
    ) -> Result<Resolved> {
        let resolved = match op {
            Operation::Cats => Resolved::Cats(self.nodes(self.cats.cats().await?, selection).await?),
            Operation::CatById { id } => match self.cats.cat_by_id(&id).await? {
                Some(cat) => Resolved::Cat(Some(self.node(cat, selection).await?)),
                None => Resolved::Cat(None),
            },
            Operation::CatsByOwner { owner_id } => {
                let cats = self.cats.cats_by_owner(&owner_id).await?;
                Resolved::Cats(self.nodes(cats, selection).await?)
            }
            Operation::CatsByArea {
                top_right,
                bottom_left,
            } => {
                let cats = self.cats.cats_by_area(top_right, bottom_left).await?;
                Resolved::Cats(self.nodes(cats, selection).await?)
            }
            Operation::Users => Resolved::Users(self.identity.users().await?),
            Operation::UserById { id } => Resolved::User(self.identity.user_by_id(&id).await?),
            Operation::CheckToken => Resolved::User(self.identity.check_token(caller).await?),
            Operation::CreateCat(input) => {
                let cat = self.cats.create_cat(caller, input).await?;
                Resolved::Cat(Some(self.mutated(cat, selection).await))
            }
            Operation::UpdateCat { id, patch } => {
                let cat = self.cats.update_cat(caller, &id, patch).await?;
                Resolved::Cat(Some(self.mutated(cat, selection).await))
            }
            Operation::DeleteCat { id } => {
                let cat = self.cats.delete_cat(caller, &id).await?;
                Resolved::Cat(Some(self.mutated(cat, selection).await))
            }
            Operation::UpdateCatAsAdmin { id, patch } => {
                let cat = self.cats.update_cat_as_admin(caller, &id, patch).await?;
                Resolved::Cat(Some(self.mutated(cat, selection).await))
            }
            Operation::DeleteCatAsAdmin { id } => {
                let cat = self.cats.delete_cat_as_admin(caller, &id).await?;
                Resolved::Cat(Some(self.mutated(cat, selection).await))
            }
            Operation::Login { credentials } => {
                Resolved::Session(self.identity.login(&credentials).await?)
            }
            Operation::Register { user } => Resolved::Session(self.identity.register(&user).await?),
            Operation::UpdateUser { user } => {
                Resolved::Session(self.identity.update_user(caller, &user).await?)
            }
            Operation::UpdateUserAsAdmin { id, patch } => Resolved::User(
                self.identity
                    .update_user_as_admin(caller, &id, &patch)
                    .await?,
            ),
            Operation::DeleteUser => Resolved::User(self.identity.delete_user(caller).await?),
            Operation::DeleteUserAsAdmin { id } => {
                Resolved::User(self.identity.delete_user_as_admin(caller, &id).await?)
            }
        };
        Ok(resolved)
    }

    async fn node(&self, cat: Cat, selection: Selection) -> Result<CatNode> {
        let owner = if selection.owner {
            OwnerField::Principal(self.stitcher.resolve_owner(&cat).await?)
        } else {
            OwnerField::Id
        };
        Ok(CatNode { cat, owner })
    }

    // The write is already applied, so an owner failure must not discard it.
    async fn mutated(&self, cat: Cat, selection: Selection) -> CatNode {
        if !selection.owner {
            return CatNode {
                cat,
                owner: OwnerField::Id,
            };
        }
        let owner = match self.stitcher.resolve_owner(&cat).await {
            Ok(principal) => OwnerField::Principal(principal),
            Err(e) => {
                tracing::warn!(cat = %cat.id, error = %e, "owner lookup failed after mutation");
                OwnerField::Failed(e.to_string())
            }
        };
        CatNode { cat, owner }
    }

    async fn nodes(&self, cats: Vec<Cat>, selection: Selection) -> Result<Vec<CatNode>> {
        let mut nodes = Vec::with_capacity(cats.len());
        for cat in cats {
            nodes.push(self.node(cat, selection).await?);
        }
        Ok(nodes)
    }
}
