use std::fmt;

use serde::{Deserialize, Serialize};

use crate::token::BearerToken;

/// Role value that grants administrative privilege.
pub const ADMIN_ROLE: &str = "admin";

/// Identifier of a principal owned by the remote identity service.
///
/// This is a weak reference: the gateway never checks that the principal
/// exists when storing it. Surrounding whitespace is trimmed so that
/// comparisons are done on the normalized string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Creates a principal id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self::from(id.into())
    }

    /// Returns the normalized string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PrincipalId {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.len() == value.len() {
            Self(value)
        } else {
            Self(trimmed.to_string())
        }
    }
}

impl From<&str> for PrincipalId {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl From<PrincipalId> for String {
    fn from(value: PrincipalId) -> Self {
        value.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Roles held by a principal.
///
/// The identity service reports either a single role (`"admin"`) or a list
/// (`["user", "admin"]`). Both shapes deserialize into `Roles`. A single
/// string is also split on commas, matching how roles are forwarded in the
/// `role` header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RoleRepr", into = "RoleRepr")]
pub struct Roles(Vec<String>);

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RoleRepr {
    One(String),
    Many(Vec<String>),
}

impl From<RoleRepr> for Roles {
    fn from(repr: RoleRepr) -> Self {
        match repr {
            RoleRepr::One(s) => Roles::parse(&s),
            RoleRepr::Many(list) => Roles::from_iter(list),
        }
    }
}

impl From<Roles> for RoleRepr {
    fn from(roles: Roles) -> Self {
        let mut roles = roles.0;
        if roles.len() == 1 {
            RoleRepr::One(roles.remove(0))
        } else {
            RoleRepr::Many(roles)
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Roles {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Roles(
            iter.into_iter()
                .map(Into::into)
                .map(|r: String| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
        )
    }
}

impl Roles {
    /// No roles at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// A single role.
    pub fn single(role: impl Into<String>) -> Self {
        let role: String = role.into();
        Self::from_iter([role])
    }

    /// Parses a comma-separated role list.
    pub fn parse(value: &str) -> Self {
        Self::from_iter(value.split(','))
    }

    /// Returns `true` if the administrative role is present.
    pub fn is_admin(&self) -> bool {
        self.0.iter().any(|r| r == ADMIN_ROLE)
    }

    /// Returns `true` if no roles are held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the held roles.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Renders the roles for the `role` request header.
    pub fn header_value(&self) -> String {
        self.0.join(",")
    }
}

/// Request-scoped view of the acting principal.
///
/// A `CallerContext` is asserted by the transport layer (see
/// [`web::authenticate`](crate::web::authenticate)) and lives only for the
/// duration of one resolution. It is never persisted.
///
/// # Examples
///
/// ```
/// use cat_gateway::{BearerToken, CallerContext, Roles};
///
/// let caller = CallerContext::anonymous("req-1")
///     .with_principal("p1")
///     .with_roles(Roles::single("admin"))
///     .with_token(BearerToken::new("tok"));
///
/// assert!(caller.has_token());
/// assert!(caller.roles().is_admin());
/// assert_eq!(caller.principal().map(|p| p.as_str()), Some("p1"));
/// ```
#[derive(Debug)]
pub struct CallerContext {
    request_id: String,
    principal: Option<PrincipalId>,
    roles: Roles,
    token: Option<BearerToken>,
}

impl CallerContext {
    /// Creates a context with no principal, no roles and no token.
    pub fn anonymous(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            principal: None,
            roles: Roles::none(),
            token: None,
        }
    }

    /// Sets the asserted principal id.
    #[must_use]
    pub fn with_principal(mut self, principal: impl Into<PrincipalId>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    /// Sets the asserted roles.
    #[must_use]
    pub fn with_roles(mut self, roles: Roles) -> Self {
        self.roles = roles;
        self
    }

    /// Sets the presented bearer token, if any.
    #[must_use]
    pub fn with_token(mut self, token: Option<BearerToken>) -> Self {
        self.token = token;
        self
    }

    /// Returns the request ID for this context.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the asserted principal id, if any.
    pub fn principal(&self) -> Option<&PrincipalId> {
        self.principal.as_ref()
    }

    /// Returns the asserted roles.
    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    /// Returns the presented bearer token, if any.
    pub fn token(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }

    /// Returns `true` when a bearer token was presented.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}
