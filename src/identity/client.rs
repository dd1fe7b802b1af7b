//! HTTP client for the identity service.

use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use super::{Credentials, IdentityService, NewPrincipal, Principal, PrincipalPatch, SessionPayload};
use crate::config::GatewayConfig;
use crate::context::{PrincipalId, Roles};
use crate::error::{Error, Result};
use crate::token::BearerToken;

const ROLE_HEADER: &str = "role";

/// Identity service client over HTTP.
///
/// No timeout, retry or cache is applied. Each method is one round trip.
#[derive(Debug, Clone)]
pub struct HttpIdentityClient {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpIdentityClient {
    /// Creates a client for the service configured in `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the URL cannot carry path segments or the
    /// HTTP client cannot be built.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Self::with_client(config.auth_url.clone(), client)
    }

    /// Creates a client around an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `base_url` cannot carry path segments.
    pub fn with_client(base_url: Url, client: reqwest::Client) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "identity service URL {base_url} cannot be a base"
            )));
        }
        Ok(Self { base_url, client })
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::Config(format!(
                    "identity service URL {} cannot be a base",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "identity request");
        Ok(self.client.request(method, url))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "identity service unreachable");
            Error::IdentityUnavailable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "identity service refused request");
            return Err(Error::Upstream {
                status: status.as_u16(),
                reason: status_text(&response),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::IdentityUnavailable(format!("failed reading response body: {e}")))?;
        serde_json::from_slice(&body).map_err(|e| Error::Decode(e.to_string()))
    }
}

/// Reason phrase as sent by the service, or the canonical one when the
/// service sent the standard text.
fn status_text(response: &reqwest::Response) -> String {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .and_then(|phrase| std::str::from_utf8(phrase.as_bytes()).ok())
        .or_else(|| response.status().canonical_reason())
        .unwrap_or("Unknown Status")
        .to_string()
}

fn with_bearer(request: RequestBuilder, token: &BearerToken) -> RequestBuilder {
    request.header(AUTHORIZATION, token.authorization_value())
}

fn with_admin(request: RequestBuilder, token: &BearerToken, roles: &Roles) -> RequestBuilder {
    with_bearer(request, token).header(ROLE_HEADER, roles.header_value())
}

#[async_trait]
impl IdentityService for HttpIdentityClient {
    async fn users(&self) -> Result<Vec<Principal>> {
        let request = self.request(Method::GET, &["users"])?;
        self.send(request).await
    }

    async fn user_by_id(&self, id: &PrincipalId) -> Result<Principal> {
        let request = self.request(Method::GET, &["users", id.as_str()])?;
        self.send(request).await
    }

    async fn check_token(&self, token: &BearerToken) -> Result<Principal> {
        let request = self.request(Method::GET, &["users", "token"])?;
        self.send(with_bearer(request, token)).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<SessionPayload> {
        let request = self.request(Method::POST, &["auth", "login"])?;
        self.send(request.json(credentials)).await
    }

    async fn register(&self, user: &NewPrincipal) -> Result<SessionPayload> {
        let request = self.request(Method::POST, &["users"])?;
        self.send(request.json(user)).await
    }

    async fn update_self(
        &self,
        token: &BearerToken,
        patch: &PrincipalPatch,
    ) -> Result<SessionPayload> {
        let request = self.request(Method::PUT, &["users"])?;
        self.send(with_bearer(request, token).json(patch)).await
    }

    async fn update_as_admin(
        &self,
        token: &BearerToken,
        roles: &Roles,
        id: &PrincipalId,
        patch: &PrincipalPatch,
    ) -> Result<Principal> {
        let request = self.request(Method::PUT, &["users", id.as_str()])?;
        self.send(with_admin(request, token, roles).json(patch)).await
    }

    async fn delete_self(&self, token: &BearerToken) -> Result<Principal> {
        let request = self.request(Method::DELETE, &["users"])?;
        self.send(with_bearer(request, token)).await
    }

    async fn delete_as_admin(
        &self,
        token: &BearerToken,
        roles: &Roles,
        id: &PrincipalId,
    ) -> Result<Principal> {
        let request = self.request(Method::DELETE, &["users", id.as_str()])?;
        self.send(with_admin(request, token, roles)).await
    }
}
