//! Broker login flow handlers.
//!
//! - `GET /api/v1/login`: redirect the user to the broker login page
//! - `GET /api/v1/token`: broker callback carrying the request token

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use super::transport::HttpState;
use crate::error::{ApiError, ApiResult};
use crate::models::TokenResponse;

/// `state` value the broker echoes back on the token callback.
const TOKEN_CALLBACK_STATE: &str = "token";

/// Raw query pairs in request order.
type QueryPairs = Vec<(String, String)>;

/// First value of `key`; later repeats are ignored.
fn first_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct LoginQuery {
    pub state_key: Option<String>,
}

impl From<QueryPairs> for LoginQuery {
    fn from(pairs: QueryPairs) -> Self {
        Self {
            state_key: first_value(&pairs, "stateKey"),
        }
    }
}

/// `GET /api/v1/login?stateKey=...`
///
/// Redirect (302) to the broker's login page with the caller's state key.
pub async fn handle_login(
    State(state): State<Arc<HttpState>>,
    Query(pairs): Query<QueryPairs>,
) -> ApiResult<Response> {
    let query = LoginQuery::from(pairs);
    let Some(state_key) = query.state_key.filter(|s| !s.is_empty()) else {
        tracing::warn!("Login request without stateKey");
        return Err(ApiError::bad_request("stateKey is required"));
    };

    let login_url = state.broker.login_url(&state_key).map_err(|e| {
        tracing::error!(error = %e, "Failed to build broker login URL");
        ApiError::Internal("Failed to log in")
    })?;

    tracing::info!(state_key = %state_key, "Redirecting to broker login");

    Ok((StatusCode::FOUND, [(header::LOCATION, login_url.to_string())]).into_response())
}

// ─── Token Callback ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct TokenQuery {
    pub success: Option<String>,
    pub request_token: Option<String>,
    pub state: Option<String>,
}

impl From<QueryPairs> for TokenQuery {
    fn from(pairs: QueryPairs) -> Self {
        Self {
            success: first_value(&pairs, "success"),
            request_token: first_value(&pairs, "requestToken"),
            state: first_value(&pairs, "state"),
        }
    }
}

impl TokenQuery {
    /// Request token of a successful broker callback, or `None` if any
    /// parameter is missing or wrong.
    fn into_request_token(self) -> Option<String> {
        if self.success.as_deref() != Some("true")
            || self.state.as_deref() != Some(TOKEN_CALLBACK_STATE)
        {
            return None;
        }
        self.request_token.filter(|t| !t.is_empty())
    }
}

/// `GET /api/v1/token?success=true&requestToken=...&state=token`
///
/// Exchange the request token and store the access token under the merchant id.
pub async fn handle_token(
    State(state): State<Arc<HttpState>>,
    Query(pairs): Query<QueryPairs>,
) -> ApiResult<Response> {
    let Some(request_token) = TokenQuery::from(pairs).into_request_token() else {
        tracing::warn!("Invalid request parameters for token callback");
        return Err(ApiError::bad_request("Invalid request parameters"));
    };

    let grant = state
        .broker
        .exchange_token(&request_token)
        .await
        .and_then(TokenResponse::into_grant)?;

    state.sessions.set(grant.merchant_id.clone(), grant.access_token);

    tracing::info!(merchant_id = %grant.merchant_id, "Stored broker access token");

    let mut response = Json(serde_json::json!({
        "status": "authenticated",
        "merchantId": grant.merchant_id
    }))
    .into_response();

    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(response)
}
