//! Broker API client.
//!
//! Provides:
//! - Login redirect URL construction (no network)
//! - A single token exchange call with a fixed timeout
//!
//! No retry layer: a timeout or non-2xx answer is surfaced to the caller as-is.

use reqwest::Client;
use url::Url;

use crate::config::Config;
use crate::error::{BrokerError, BrokerResult};
use crate::models::{TokenExchangeRequest, TokenResponse};

/// Broker API client.
///
/// Immutable after construction; clones share the connection pool.
#[derive(Clone)]
pub struct BrokerClient {
    /// HTTP client.
    client: Client,

    /// Broker API key.
    api_key: String,

    /// Broker API secret.
    api_secret: String,

    /// Login page base URL.
    login_url: Url,

    /// Token exchange endpoint.
    token_url: Url,
}

impl BrokerClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if a broker URL is invalid or HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let login_url = Url::parse(&config.login_url)?;
        let token_url = Url::parse(&config.token_url)?;

        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            api_key: config.api_key,
            api_secret: config.api_secret,
            login_url,
            token_url,
        })
    }

    /// Build the broker login URL carrying the API key and the caller's state key.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Validation`] if `state_key` is empty.
    pub fn login_url(&self, state_key: &str) -> BrokerResult<Url> {
        if state_key.is_empty() {
            return Err(BrokerError::validation("stateKey", "must not be empty"));
        }

        let mut url = self.login_url.clone();
        url.query_pairs_mut()
            .append_pair("apiKey", &self.api_key)
            .append_pair("state", state_key);

        tracing::debug!(state_key = %state_key, "Built broker login URL");

        Ok(url)
    }

    /// Exchange a request token for the broker's access tokens.
    ///
    /// # Errors
    ///
    /// - [`BrokerError::Network`] on transport failure or timeout
    /// - [`BrokerError::Broker`] on a non-2xx status
    /// - [`BrokerError::Decode`] if the body is not the expected JSON
    pub async fn exchange_token(&self, request_token: &str) -> BrokerResult<TokenResponse> {
        tracing::info!(endpoint = %self.token_url, "Exchanging request token");

        let body = TokenExchangeRequest {
            api_key: &self.api_key,
            api_secret_key: &self.api_secret,
            request_token,
        };

        let response = self.client.post(self.token_url.clone()).json(&body).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Broker rejected token exchange");
            return Err(BrokerError::broker(status.as_u16(), text));
        }

        TokenResponse::from_json(&text)
    }
}

impl std::fmt::Debug for BrokerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerClient")
            .field("login_url", &self.login_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .finish()
    }
}
