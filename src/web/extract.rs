//! Extraction boundary trait for web integration.

use crate::token::BearerToken;

/// Credentials presented by an inbound request.
///
/// This trait only maps framework types to the gateway's types. It does not
/// check tokens and does not grant anything.
///
/// # Examples
///
/// ```
/// use cat_gateway::web::ExtractCredentials;
/// use cat_gateway::BearerToken;
///
/// struct MyFrameworkRequest {
///     id: String,
///     auth: Option<String>,
/// }
///
/// impl ExtractCredentials for MyFrameworkRequest {
///     fn request_id(&self) -> &str {
///         &self.id
///     }
///
///     fn bearer_token(&self) -> Option<BearerToken> {
///         self.auth.as_deref().and_then(BearerToken::from_authorization)
///     }
/// }
///
/// let req = MyFrameworkRequest { id: "r1".into(), auth: Some("Bearer t".into()) };
/// assert!(req.bearer_token().is_some());
/// ```
pub trait ExtractCredentials {
    /// Correlation id of the request.
    fn request_id(&self) -> &str;

    /// Bearer token from the `Authorization` header, if one was presented.
    fn bearer_token(&self) -> Option<BearerToken>;
}
