//! forge::http
//!
//! Authenticated JSON transport for the GitHub REST API.
//!
//! Every request carries the GitHub media type, API version and
//! user-agent headers, plus a bearer token when a [`TokenProvider`] is
//! configured. Requests are bounded by the [`RetryPolicy`] timeout. Reads
//! are repeated according to the policy; writes are sent once.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{ForgeError, RetryPolicy};
use crate::auth::TokenProvider;

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "forgehand";

/// REST API version pinned on every request.
const API_VERSION: &str = "2022-11-28";

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// A non-2xx response, before it is turned into a [`ForgeError`].
#[derive(Debug, Clone)]
pub struct HttpFailure {
    /// HTTP status
    pub status: StatusCode,
    /// `X-RateLimit-Remaining: 0` was present
    pub rate_limited: bool,
    /// Raw response body
    pub body: String,
}

impl HttpFailure {
    /// The `message` field of a GitHub error body, if there is one.
    pub fn message(&self) -> String {
        serde_json::from_str::<GitHubErrorResponse>(&self.body)
            .map(|e| e.message)
            .unwrap_or_else(|_| "Unknown error".to_string())
    }

    /// Default status mapping.
    pub fn into_forge_error(self) -> ForgeError {
        let message = self.message();
        match self.status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN if self.rate_limited => ForgeError::RateLimited,
            StatusCode::FORBIDDEN => ForgeError::AuthFailed(format!("Permission denied: {}", message)),
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            status if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            status => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// JSON client for one GitHub API base.
pub struct ApiClient {
    client: Client,
    token_provider: Option<Arc<dyn TokenProvider>>,
    api_base: String,
    retry: RetryPolicy,
}

// Custom Debug to avoid exposing the token provider
impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("has_token_provider", &self.token_provider.is_some())
            .field("api_base", &self.api_base)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ApiClient {
    /// Client for `api.github.com` with the default retry policy.
    pub fn new(token_provider: Option<Arc<dyn TokenProvider>>) -> Self {
        Self {
            client: Client::new(),
            token_provider,
            api_base: DEFAULT_API_BASE.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Use a different API base (GitHub Enterprise, test servers).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a different retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Absolute URL for an API endpoint.
    ///
    /// Each segment is percent-encoded on its own, so a `#`, `?` or `%`
    /// inside a branch name or file path stays part of the path.
    pub fn endpoint<I, S>(&self, segments: I) -> Result<Url, ForgeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| ForgeError::InvalidUrl(format!("{}: {}", self.api_base, e)))?;
        url.path_segments_mut()
            .map_err(|_| ForgeError::InvalidUrl(self.api_base.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build common headers for API requests.
    async fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut headers = HeaderMap::new();
        if let Some(provider) = &self.token_provider {
            let token = provider
                .bearer_token()
                .await
                .map_err(|e| ForgeError::AuthFailed(e.to_string()))?;
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ForgeError::AuthFailed("token contains characters not allowed in a header".into())
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    /// Send an idempotent request, repeating it as the retry policy allows.
    ///
    /// Non-2xx responses go through `on_error`; the retry policy then
    /// decides from the resulting error whether to try again.
    pub async fn execute<T, B, E>(&self, what: &str, build: B, on_error: E) -> Result<T, ForgeError>
    where
        T: DeserializeOwned,
        B: Fn(&Client) -> RequestBuilder,
        E: Fn(HttpFailure) -> ForgeError,
    {
        let build = &build;
        let on_error = &on_error;
        self.retry
            .run(what, move || self.send(what, build, on_error))
            .await
    }

    /// Send a request exactly once.
    ///
    /// Used for writes: a timed-out POST may still have been applied, and
    /// sending it again would report "already exists" for work that succeeded.
    pub async fn execute_once<T, B, E>(
        &self,
        what: &str,
        build: B,
        on_error: E,
    ) -> Result<T, ForgeError>
    where
        T: DeserializeOwned,
        B: Fn(&Client) -> RequestBuilder,
        E: Fn(HttpFailure) -> ForgeError,
    {
        self.send(what, &build, &on_error).await
    }

    async fn send<T, B, E>(&self, what: &str, build: &B, on_error: &E) -> Result<T, ForgeError>
    where
        T: DeserializeOwned,
        B: Fn(&Client) -> RequestBuilder,
        E: Fn(HttpFailure) -> ForgeError,
    {
        let request = build(&self.client)
            .headers(self.headers().await?)
            .timeout(self.retry.request_timeout);

        let response = request
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let status = response.status();
        debug!(request = what, status = status.as_u16(), "GitHub response");

        if status.is_success() {
            return response.json::<T>().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            });
        }

        let rate_limited = response
            .headers()
            .get("X-RateLimit-Remaining")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim() == "0")
            .unwrap_or(false);
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| unreadable_body(&e));

        Err(on_error(HttpFailure {
            status,
            rate_limited,
            body,
        }))
    }
}

/// Placeholder body for an error response whose body could not be read.
fn unreadable_body(err: &impl std::fmt::Display) -> String {
    format!("<failed to read response body: {}>", err)
}
