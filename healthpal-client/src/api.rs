use async_trait::async_trait;
use reqwest::{Client, Response, cookie::Jar};
use serde::de::DeserializeOwned;
use shared::{
    config::ClientConfig,
    models::{AuthResponse, CheckResponse, ErrorResponse, LoginRequest, RegisterRequest},
};
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::error::{AuthError, AuthResult};

const USER_AGENT: &str = concat!("healthpal-client/", env!("CARGO_PKG_VERSION"));

/// The remote auth API as seen by the store.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /api/auth/login`
    async fn login(&self, request: &LoginRequest) -> AuthResult<AuthResponse>;

    /// `POST /api/auth/register`
    async fn register(&self, request: &RegisterRequest) -> AuthResult<AuthResponse>;

    /// `POST /api/auth/logout`; the response body is ignored.
    async fn logout(&self) -> AuthResult<()>;

    /// `GET /api/auth/check`
    async fn check(&self) -> AuthResult<CheckResponse>;
}

/// Resolved URLs of the auth endpoints.
#[derive(Clone, Debug)]
struct Endpoints {
    login: Url,
    register: Url,
    logout: Url,
    check: Url,
}

impl Endpoints {
    fn resolve(config: &ClientConfig) -> AuthResult<Self> {
        let endpoint = |name: &str| {
            config
                .endpoint(name)
                .map_err(|err| AuthError::Endpoint(err.to_string()))
        };
        Ok(Self {
            login: endpoint("login")?,
            register: endpoint("register")?,
            logout: endpoint("logout")?,
            check: endpoint("check")?,
        })
    }
}

/// HTTP client for the AI `HealthPal` auth API.
///
/// Every request carries the cookies in `jar`, so the server-side session
/// follows the client the way browser credentials would.
#[derive(Clone, Debug)]
pub struct HealthPalClient {
    endpoints: Endpoints,
    client: Client,
}

impl HealthPalClient {
    /// Build a client around an existing cookie jar.
    ///
    /// # Arguments
    /// * `config` - Supplies the API base URL and the request timeout.
    /// * `jar` - Cookie jar shared with the caller, which persists it.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed or an
    /// endpoint URL cannot be resolved.
    pub fn with_cookie_jar(config: &ClientConfig, jar: Arc<Jar>) -> AuthResult<Self> {
        let endpoints = Endpoints::resolve(config)?;
        let mut builder = Client::builder()
            .cookie_provider(jar)
            .user_agent(USER_AGENT);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| AuthError::transport(format!("failed to build HTTP client: {err}")))?;

        Ok(Self { endpoints, client })
    }
}

/// Turn a response into `T`, or into the error the server described.
async fn read_json<T: DeserializeOwned>(response: Response) -> AuthResult<T> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        return Err(AuthError::status(
            status,
            ErrorResponse::message_from_body(&body),
        ));
    }
    serde_json::from_slice(&body).map_err(|err| AuthError::Decode(err.to_string()))
}

#[async_trait]
impl AuthApi for HealthPalClient {
    async fn login(&self, request: &LoginRequest) -> AuthResult<AuthResponse> {
        let url = self.endpoints.login.clone();
        debug!(%url, "sending login request");
        let response = self.client.post(url).json(request).send().await?;
        read_json(response).await
    }

    async fn register(&self, request: &RegisterRequest) -> AuthResult<AuthResponse> {
        let url = self.endpoints.register.clone();
        debug!(%url, role = %request.role, "sending registration request");
        let response = self.client.post(url).json(request).send().await?;
        read_json(response).await
    }

    async fn logout(&self) -> AuthResult<()> {
        let url = self.endpoints.logout.clone();
        debug!(%url, "sending logout request");
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.unwrap_or_default();
        Err(AuthError::status(
            status,
            ErrorResponse::message_from_body(&body),
        ))
    }

    async fn check(&self) -> AuthResult<CheckResponse> {
        let url = self.endpoints.check.clone();
        debug!(%url, "checking session");
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }
}
