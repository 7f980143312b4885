//! Broker Gateway
//!
//! A small HTTP backend that fronts a broker's OAuth-style login flow and keeps
//! the resulting access tokens in memory, keyed by merchant id.
//!
//! # Flow
//!
//! 1. `GET /api/v1/login?stateKey=..` redirects the user to the broker login page
//! 2. The broker calls back `GET /api/v1/token?success=true&requestToken=..&state=token`
//! 3. The request token is exchanged once for an access token
//! 4. The access token is stored in the [`SessionStore`] under the merchant id
//!
//! # Example
//!
//! ```no_run
//! use broker_gateway::{BrokerClient, Config, GatewayServer, SessionStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let port = config.port;
//!     let grace = config.shutdown_grace;
//!
//!     let client = BrokerClient::new(config)?;
//!     let server = GatewayServer::new(client, SessionStore::new(), grace);
//!     server.run(port).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod session;

pub use client::BrokerClient;
pub use config::Config;
pub use error::{ApiError, BrokerError, ServerError};
pub use server::GatewayServer;
pub use session::SessionStore;
