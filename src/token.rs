use std::fmt;

/// An opaque bearer credential presented by the caller.
///
/// The gateway never inspects the token's content. It only checks that one
/// was presented and forwards it verbatim to the identity service. The raw
/// value is reachable only through [`expose`](Self::expose).
///
/// # Examples
///
/// ```
/// use cat_gateway::BearerToken;
///
/// let token = BearerToken::new("eyJhbGciOi...").expect("non-blank");
/// assert_eq!(format!("{:?}", token), "[REDACTED]");
/// assert_eq!(token.expose(), "eyJhbGciOi...");
///
/// assert!(BearerToken::new("   ").is_none());
/// ```
// Do NOT derive Clone or Default: a token must not be duplicated or conjured.
pub struct BearerToken {
    // Must remain private so redaction cannot be bypassed.
    inner: String,
}

impl BearerToken {
    /// Wraps a presented token. Blank values count as "no token".
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let inner = value.into();
        if inner.trim().is_empty() {
            None
        } else {
            Some(Self { inner })
        }
    }

    /// Parses an `Authorization` header value of the form `Bearer <token>`.
    ///
    /// The scheme is matched case-insensitively.
    pub fn from_authorization(header: &str) -> Option<Self> {
        let (scheme, rest) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        Self::new(rest.trim())
    }

    /// Explicitly exposes the raw token for forwarding.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Renders the `Authorization` header value for this token.
    pub(crate) fn authorization_value(&self) -> String {
        format!("Bearer {}", self.inner)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
