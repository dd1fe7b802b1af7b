use crate::{
    capability::WriteCap,
    context::CallerContext,
    error::{Violation, ViolationKind},
    policy::PolicyReq,
};

/// The authorization guard.
///
/// `PolicyGate` is the only way to obtain a [`WriteCap`]. It checks the
/// caller's asserted identity, roles and token against the accumulated
/// requirements before any mutation is attempted.
///
/// # Examples
///
/// ```
/// use cat_gateway::{BearerToken, CallerContext, OwnerOf, PolicyGate, PrincipalId};
///
/// let owner = PrincipalId::new("p1");
/// let caller = CallerContext::anonymous("req-1")
///     .with_principal("p1")
///     .with_token(BearerToken::new("tok"));
///
/// let cap = PolicyGate::new(&caller)
///     .require(OwnerOf::resource(&owner))
///     .build();
/// assert!(cap.is_ok());
///
/// let stranger = CallerContext::anonymous("req-2")
///     .with_principal("p2")
///     .with_token(BearerToken::new("tok"));
/// assert!(PolicyGate::new(&stranger).require(OwnerOf::resource(&owner)).build().is_err());
/// ```
pub struct PolicyGate<'a> {
    caller: &'a CallerContext,
    requirements: Vec<PolicyReq>,
}

impl<'a> PolicyGate<'a> {
    /// Creates a new policy gate for the given caller.
    pub fn new(caller: &'a CallerContext) -> Self {
        Self {
            caller,
            requirements: Vec::new(),
        }
    }

    /// Adds a policy requirement to the gate, deduplicating identical requirements.
    #[must_use]
    pub fn require(mut self, policy: impl Into<PolicyReq>) -> Self {
        let req = policy.into();

        if !self.requirements.contains(&req) {
            self.requirements.push(req);
        }

        self
    }

    /// Validates every requirement and grants write access.
    ///
    /// A token must be present whatever the requirements. Requirements are
    /// then checked in the order they were added and the first failing one
    /// is reported.
    ///
    /// # Errors
    ///
    /// Returns a `Violation` if any policy requirement fails validation.
    pub fn build(self) -> Result<WriteCap, Violation> {
        // Every policy needs a token first, including an empty gate.
        if !self.caller.has_token() {
            return Err(Violation::new(
                ViolationKind::MissingToken,
                "bearer token required",
            ));
        }

        for req in &self.requirements {
            self.validate_one(req)?;
        }
        Ok(WriteCap::new())
    }

    fn validate_one(&self, req: &PolicyReq) -> Result<(), Violation> {
        match req {
            PolicyReq::Authenticated => Ok(()),
            PolicyReq::Owner { owner } => match self.caller.principal() {
                None => Err(Violation::new(
                    ViolationKind::Anonymous,
                    "no principal asserted for ownership check",
                )),
                Some(id) if id == owner => Ok(()),
                Some(id) => Err(Violation::new(
                    ViolationKind::NotOwner,
                    format!("principal {id} does not own resource owned by {owner}"),
                )),
            },
            PolicyReq::Admin => {
                if self.caller.roles().is_admin() {
                    Ok(())
                } else {
                    Err(Violation::new(
                        ViolationKind::NotAdmin,
                        "administrative role required",
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{PrincipalId, Roles};
    use crate::policy::{Admin, Authenticated, OwnerOf};
    use crate::token::BearerToken;

    fn caller(id: Option<&str>, roles: Roles, token: Option<&str>) -> CallerContext {
        let mut ctx = CallerContext::anonymous("req-test")
            .with_roles(roles)
            .with_token(token.and_then(BearerToken::new));
        if let Some(id) = id {
            ctx = ctx.with_principal(id);
        }
        ctx
    }

    fn kind_of(result: Result<WriteCap, Violation>) -> Option<ViolationKind> {
        result.err().map(|v| v.kind)
    }

    #[test]
    fn owner_with_token_is_granted() {
        let owner = PrincipalId::new("p1");
        let ctx = caller(Some("p1"), Roles::single("user"), Some("t"));

        assert!(PolicyGate::new(&ctx)
            .require(OwnerOf::resource(&owner))
            .build()
            .is_ok());
    }

    #[test]
    fn owner_without_token_is_denied() {
        let owner = PrincipalId::new("p1");
        let ctx = caller(Some("p1"), Roles::none(), None);

        let result = PolicyGate::new(&ctx).require(OwnerOf::resource(&owner)).build();
        assert_eq!(kind_of(result), Some(ViolationKind::MissingToken));
    }

    #[test]
    fn non_owner_is_denied_even_as_admin() {
        let owner = PrincipalId::new("p1");
        let ctx = caller(Some("p2"), Roles::single("admin"), Some("t"));

        let result = PolicyGate::new(&ctx).require(OwnerOf::resource(&owner)).build();
        assert_eq!(kind_of(result), Some(ViolationKind::NotOwner));
    }

    #[test]
    fn ownership_needs_a_principal() {
        let owner = PrincipalId::new("p1");
        let ctx = caller(None, Roles::none(), Some("t"));

        let result = PolicyGate::new(&ctx).require(OwnerOf::resource(&owner)).build();
        assert_eq!(kind_of(result), Some(ViolationKind::Anonymous));
    }

    #[test]
    fn ownership_compares_normalized_ids() {
        let owner = PrincipalId::new(" p1 ");
        let ctx = caller(Some("p1"), Roles::none(), Some("t"));

        assert!(PolicyGate::new(&ctx)
            .require(OwnerOf::resource(&owner))
            .build()
            .is_ok());
    }

    #[test]
    fn admin_policy_ignores_principal() {
        let ctx = caller(None, Roles::single("admin"), Some("t"));
        assert!(PolicyGate::new(&ctx).require(Admin).build().is_ok());
    }

    #[test]
    fn admin_policy_rejects_plain_users() {
        let ctx = caller(Some("p1"), Roles::single("user"), Some("t"));
        let result = PolicyGate::new(&ctx).require(Admin).build();
        assert_eq!(kind_of(result), Some(ViolationKind::NotAdmin));
    }

    #[test]
    fn admin_policy_requires_token() {
        let ctx = caller(Some("p1"), Roles::single("admin"), None);
        let result = PolicyGate::new(&ctx).require(Admin).build();
        assert_eq!(kind_of(result), Some(ViolationKind::MissingToken));
    }

    #[test]
    fn authenticated_only_needs_token() {
        let ctx = caller(None, Roles::none(), Some("t"));
        assert!(PolicyGate::new(&ctx).require(Authenticated).build().is_ok());

        let no_token = caller(Some("p1"), Roles::single("admin"), None);
        assert!(PolicyGate::new(&no_token).require(Authenticated).build().is_err());
    }

    #[test]
    fn requirements_are_deduplicated() {
        let ctx = caller(None, Roles::none(), Some("t"));
        let gate = PolicyGate::new(&ctx)
            .require(Authenticated)
            .require(Authenticated)
            .require(Admin)
            .require(Admin);
        assert_eq!(gate.requirements.len(), 2);
    }

    #[test]
    fn first_failing_requirement_is_reported() {
        let owner = PrincipalId::new("p1");
        let ctx = caller(Some("p2"), Roles::single("user"), Some("t"));

        let result = PolicyGate::new(&ctx)
            .require(Admin)
            .require(OwnerOf::resource(&owner))
            .build();
        assert_eq!(kind_of(result), Some(ViolationKind::NotAdmin));
    }

    #[test]
    fn empty_gate_still_requires_token() {
        let ctx = CallerContext::anonymous("req-open");
        let result = PolicyGate::new(&ctx).build();
        assert_eq!(kind_of(result), Some(ViolationKind::MissingToken));
    }
}
