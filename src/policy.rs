use crate::context::PrincipalId;

/// A policy requirement that must be satisfied.
///
/// Requirements are evaluated during `PolicyGate::build()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyReq {
    /// Requires a presented bearer token
    Authenticated,
    /// Requires a token and that the caller owns the resource
    Owner {
        /// Stored owner of the resource being mutated
        owner: PrincipalId,
    },
    /// Requires a token and the administrative role
    Admin,
}

/// Policy requiring a presented bearer token.
pub struct Authenticated;

/// Policy requiring that the caller is the resource's owner.
pub struct OwnerOf {
    owner: PrincipalId,
}

impl OwnerOf {
    /// Creates an ownership requirement against a stored owner.
    pub fn resource(owner: &PrincipalId) -> Self {
        Self {
            owner: owner.clone(),
        }
    }
}

/// Policy requiring the administrative role.
pub struct Admin;

// Conversions to PolicyReq
impl From<Authenticated> for PolicyReq {
    fn from(_: Authenticated) -> Self {
        PolicyReq::Authenticated
    }
}

impl From<OwnerOf> for PolicyReq {
    fn from(req: OwnerOf) -> Self {
        PolicyReq::Owner { owner: req.owner }
    }
}

impl From<Admin> for PolicyReq {
    fn from(_: Admin) -> Self {
        PolicyReq::Admin
    }
}
