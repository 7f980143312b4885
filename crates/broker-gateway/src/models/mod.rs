//! Wire models for the broker's token exchange.
//!
//! The broker speaks `snake_case` JSON on both sides of the exchange.

mod token;

pub use token::{AccessGrant, TokenExchangeRequest, TokenResponse};
