//! Token exchange request and response bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BrokerError, BrokerResult};

/// Body of the token exchange `POST`.
#[derive(Clone, Copy, Serialize)]
pub struct TokenExchangeRequest<'a> {
    pub api_key: &'a str,
    pub api_secret_key: &'a str,
    pub request_token: &'a str,
}

/// Decoded token exchange response.
///
/// Every field is optional at decode time; [`TokenResponse::into_grant`]
/// enforces the fields the broker promises. Unknown fields are ignored.
#[derive(Clone, Default, Deserialize)]
pub struct TokenResponse {
    /// Merchant the tokens were issued for.
    #[serde(default)]
    pub merchant_id: Option<String>,

    /// Full-scope access token.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Public access token, used for order and market APIs.
    #[serde(default)]
    pub public_access_token: Option<String>,

    /// Read-only access token.
    #[serde(default)]
    pub read_access_token: Option<String>,
}

impl TokenResponse {
    /// Decode a token exchange response body.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Decode`] if the body is not a JSON object or a
    /// known field has the wrong type.
    pub fn from_json(body: &str) -> BrokerResult<Self> {
        let object: Map<String, Value> = serde_json::from_str(body)?;
        Ok(serde_json::from_value(Value::Object(object))?)
    }

    /// Validate the response and project it onto what the session store keeps.
    ///
    /// The public access token is preferred; `access_token` is accepted when the
    /// broker omits it.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Protocol`] naming the first missing field.
    pub fn into_grant(self) -> BrokerResult<AccessGrant> {
        let merchant_id = non_empty(self.merchant_id).ok_or(BrokerError::Protocol {
            field: "merchant_id",
        })?;
        let access_token = non_empty(self.public_access_token)
            .or_else(|| non_empty(self.access_token))
            .ok_or(BrokerError::Protocol {
                field: "public_access_token",
            })?;

        Ok(AccessGrant {
            merchant_id,
            access_token,
        })
    }
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("merchant_id", &self.merchant_id)
            .field("has_access_token", &self.access_token.is_some())
            .field("has_public_access_token", &self.public_access_token.is_some())
            .field("has_read_access_token", &self.read_access_token.is_some())
            .finish()
    }
}

/// A validated merchant id and access token pair.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub merchant_id: String,
    pub access_token: String,
}

impl std::fmt::Debug for AccessGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGrant")
            .field("merchant_id", &self.merchant_id)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
