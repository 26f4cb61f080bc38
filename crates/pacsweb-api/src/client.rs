//! HTTP client for the ledger REST API.
//!
//! A thin wrapper over `reqwest` holding the base URL and the headers every
//! request carries. Endpoint knowledge lives in [`crate::endpoints`] and
//! [`crate::ledger`].

use log::{debug, error};
use pacsweb_core::Secrets;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::error::{extract_error_data, ApiError, Result};

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Header listing the server side feature toggles the client wants on
pub const FEATURE_TOGGLES_HEADER: &str = "Pacs-Feature-Toggles";

/// Options used to build an [`HttpClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub token: Option<String>,
    pub feature_toggles: Vec<String>,
    pub timeout: Duration,
}

impl ClientOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            feature_toggles: vec![],
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Options for the host and token of `secrets`; both must be set
    pub fn from_secrets(secrets: &Secrets) -> Result<Self> {
        secrets.validate()?;
        let mut options = Self::new(secrets.host.clone().unwrap_or_default());
        options.token = secrets.token.clone();
        Ok(options)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_feature_toggles(mut self, toggles: Vec<String>) -> Self {
        self.feature_toggles = toggles;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Headers sent with every request. `Authorization` is only present
    /// with a token and the toggles header only with at least one toggle.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Token {}", token))
                .map_err(|_| ApiError::InvalidHeader("Authorization"))?;
            headers.insert(AUTHORIZATION, value);
        }

        if !self.feature_toggles.is_empty() {
            let value = HeaderValue::from_str(&self.feature_toggles.join(","))
                .map_err(|_| ApiError::InvalidHeader(FEATURE_TOGGLES_HEADER))?;
            headers.insert(HeaderName::from_static("pacs-feature-toggles"), value);
        }

        Ok(headers)
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .default_headers(options.headers()?)
            .build()?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_secrets(secrets: &Secrets, feature_toggles: Vec<String>) -> Result<Self> {
        Self::new(ClientOptions::from_secrets(secrets)?.with_feature_toggles(feature_toggles))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`, which starts with `/`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);
        let builder = self.client.request(method, &url);
        match body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path, None).send().await?;
        Self::parse_response(response).await
    }

    /// GET with query string parameters encoded by reqwest
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .request(Method::GET, path, None)
            .query(query)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let response = self.request(Method::POST, path, Some(body)).send().await?;
        Self::parse_response(response).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let response = self.request(Method::PATCH, path, Some(body)).send().await?;
        Self::parse_response(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request(Method::DELETE, path, None).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("API response ({}): {}", status, body);
        if !status.is_success() {
            return Err(extract_error_data(status.as_u16(), &body));
        }
        Ok(())
    }

    /// Parse a JSON response body.
    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("API response ({}): {}", status, body);

        if !status.is_success() {
            return Err(extract_error_data(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to deserialize response. Body: {}, Error: {}", body, e);
            ApiError::Json(e)
        })
    }
}
