//! Token acquisition from the server's auth endpoint.

use log::{info, warn};
use serde_json::json;

use crate::client::HttpClient;
use crate::endpoints;
use crate::error::{ApiError, Result};
use crate::wire::TokenResponse;

pub struct LoginService<'a> {
    client: &'a HttpClient,
}

impl<'a> LoginService<'a> {
    pub fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Token the server associates with the current session, if any.
    /// Failures are logged and reported as no token.
    pub async fn recover_token_from_cookies(&self) -> Option<String> {
        match self.client.get::<TokenResponse>(endpoints::AUTH_TOKEN).await {
            Ok(response) => response.token_value,
            Err(e) => {
                warn!("Could not recover token: {}", e);
                None
            }
        }
    }

    /// Exchanges an admin token for an API token
    pub async fn get_token(&self, admin_token: &str) -> Result<String> {
        let response: TokenResponse = self
            .client
            .post(endpoints::AUTH_TOKEN, &json!({"admin_token": admin_token}))
            .await?;
        info!("Received API token");
        response.token_value.ok_or_else(|| ApiError::request(None))
    }
}
