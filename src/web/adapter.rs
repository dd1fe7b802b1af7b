//! Framework-neutral view of an inbound request.

use std::collections::HashMap;

use uuid::Uuid;

use super::ExtractCredentials;
use crate::token::BearerToken;

/// Header carrying a caller-supplied request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id and headers of one inbound request.
///
/// Header names are matched case-insensitively. Framework integrations
/// should implement `From<TheirRequest>` for `RequestAdapter` or call
/// [`from_headers`](Self::from_headers).
///
/// # Examples
///
/// ```
/// use cat_gateway::web::{ExtractCredentials, RequestAdapter};
///
/// let adapter = RequestAdapter::from_headers([
///     ("X-Request-Id", "req-42"),
///     ("Authorization", "Bearer abc"),
/// ]);
///
/// assert_eq!(adapter.request_id(), "req-42");
/// assert_eq!(adapter.bearer_token().unwrap().expose(), "abc");
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    request_id: String,
    headers: HashMap<String, String>,
}

impl RequestAdapter {
    /// Creates an adapter with an explicit request id and no headers.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            headers: HashMap::new(),
        }
    }

    /// Builds an adapter from header pairs.
    ///
    /// The request id is taken from `x-request-id` when present and
    /// non-blank. Otherwise a UUID v4 is minted.
    pub fn from_headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let headers: HashMap<String, String> = headers
            .into_iter()
            .map(|(k, v)| (k.into().to_ascii_lowercase(), v.into()))
            .collect();

        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            request_id,
            headers,
        }
    }

    /// Adds or replaces a header.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

impl ExtractCredentials for RequestAdapter {
    fn request_id(&self) -> &str {
        &self.request_id
    }

    fn bearer_token(&self) -> Option<BearerToken> {
        self.header("authorization")
            .and_then(BearerToken::from_authorization)
    }
}
