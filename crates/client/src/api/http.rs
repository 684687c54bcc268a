//! `reqwest` implementation of [`ApiClient`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::cookie::{CookieStore, Jar};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{ApiClient, ApiError, CheckoutOrder, LoginRequest, RegisterRequest, endpoints};
use crate::config::ApiConfig;
use crate::models::{ProductImage, ProfilePatch, User};

/// Longest slice of an error body kept in [`ApiError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 200;

/// JSON-over-HTTP client for the storefront backend.
///
/// Keeps a cookie jar so the session cookie set by login is sent with
/// every later call; [`ApiClient::session_cookie`] and
/// [`ApiClient::resume_session`] carry it across processes. Every request is
/// bounded by the configured timeout. Cheap to clone.
#[derive(Clone)]
pub struct HttpApiClient {
    inner: Arc<HttpApiClientInner>,
}

struct HttpApiClientInner {
    client: reqwest::Client,
    cookies: Arc<Jar>,
    base_url: Url,
}

impl HttpApiClient {
    /// Create a client for the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let cookies = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpApiClientInner {
                client,
                cookies,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// POST `body` (or nothing) and return the successful response's text.
    async fn post<B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, ApiError> {
        let url = self.endpoint(path)?;
        let mut request = self.inner.client.post(url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, &url))?;
        read_success(response, &url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let response = self
            .inner
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(e, &url))?;
        let text = read_success(response, &url).await?;
        parse_body(&text)
    }
}

/// Map a `reqwest` failure, pulling timeouts out as their own variant.
fn transport_error(error: reqwest::Error, url: &Url) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout(url.to_string())
    } else {
        ApiError::Http(error)
    }
}

/// Read the body of a response, turning non-success statuses into errors.
async fn read_success(response: reqwest::Response, url: &Url) -> Result<String, ApiError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| transport_error(e, url))?;

    if !status.is_success() {
        log_failure(status, url, &text);
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    Ok(text)
}

fn log_failure(status: StatusCode, url: &Url, body: &str) {
    if status.is_client_error() {
        debug!(status = %status, url = %url, "backend rejected request");
    } else {
        tracing::error!(
            status = %status,
            url = %url,
            body = %body.chars().take(500).collect::<String>(),
            "backend returned non-success status"
        );
    }
}

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "failed to parse backend response"
        );
        ApiError::Parse(e)
    })
}

#[async_trait]
impl ApiClient for HttpApiClient {
    #[instrument(skip(self, request), fields(username = %request.username))]
    async fn login(&self, request: &LoginRequest) -> Result<User, ApiError> {
        let text = self.post(endpoints::LOGIN, Some(request)).await?;
        parse_body(&text)
    }

    #[instrument(skip(self, request), fields(username = %request.username))]
    async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let text = self.post(endpoints::REGISTER, Some(request)).await?;
        parse_body(&text)
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<(), ApiError> {
        self.post::<()>(endpoints::LOGOUT, None).await?;
        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn edit_profile(&self, patch: &ProfilePatch) -> Result<(), ApiError> {
        self.post(endpoints::EDIT_PROFILE, Some(patch)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn product_images(&self) -> Result<Vec<ProductImage>, ApiError> {
        self.get_json(endpoints::PRODUCT_IMAGES).await
    }

    #[instrument(skip(self, order), fields(lines = order.cart.len(), total = %order.total))]
    async fn checkout(&self, order: &CheckoutOrder<'_>) -> Result<(), ApiError> {
        self.post(endpoints::CHECKOUT, Some(order)).await?;
        Ok(())
    }

    fn session_cookie(&self) -> Option<String> {
        let header = self.inner.cookies.cookies(&self.inner.base_url)?;
        header.to_str().ok().map(str::to_owned)
    }

    fn resume_session(&self, cookie: &str) {
        for pair in cookie.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.inner.cookies.add_cookie_str(pair, &self.inner.base_url);
        }
        debug!("resumed backend session");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> HttpApiClient {
        HttpApiClient::new(&ApiConfig {
            base_url: Url::parse(base).unwrap(),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoints_resolve_against_base() {
        let client = client("http://localhost:8080/");
        assert_eq!(
            client.endpoint(endpoints::LOGIN).unwrap().as_str(),
            "http://localhost:8080/api/login"
        );
    }

    #[test]
    fn test_endpoints_keep_base_path_prefix() {
        let client = client("https://shop.example.com/store/");
        assert_eq!(
            client.endpoint(endpoints::CHECKOUT).unwrap().as_str(),
            "https://shop.example.com/store/api/checkout"
        );
    }

    #[test]
    fn test_session_cookie_round_trips_through_jar() {
        let first = client("http://localhost:8080/");
        assert_eq!(first.session_cookie(), None);

        first.resume_session("sid=abc123; theme=dark");
        let header = first.session_cookie().unwrap();
        assert!(header.contains("sid=abc123"), "{header}");
        assert!(header.contains("theme=dark"), "{header}");

        let second = client("http://localhost:8080/");
        second.resume_session(&header);
        let resumed = second.session_cookie().unwrap();
        assert!(resumed.contains("sid=abc123"), "{resumed}");
        assert!(resumed.contains("theme=dark"), "{resumed}");
    }

    #[test]
    fn test_parse_body_error() {
        let result: Result<User, ApiError> = parse_body("<html>");
        assert!(matches!(result, Err(ApiError::Parse(_))));
    }
}
