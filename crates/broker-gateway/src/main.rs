//! Broker Gateway - Entry Point
//!
//! Serves the broker login redirect and token callback over HTTP.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use broker_gateway::{
    BrokerClient, Config, GatewayServer, ServerError, SessionStore, config::defaults,
};

#[derive(Parser, Debug)]
#[command(name = "broker-gateway")]
#[command(about = "HTTP gateway for a broker's login and token exchange")]
#[command(version)]
struct Cli {
    /// HTTP server port
    #[arg(long, default_value_t = defaults::PORT, env = "PORT")]
    port: u16,

    /// Broker API key
    #[arg(long, default_value = "", env = "BROKER_API_KEY")]
    api_key: String,

    /// Broker API secret
    #[arg(
        long,
        default_value = "",
        env = "BROKER_API_SECRET",
        hide_env_values = true
    )]
    api_secret: String,

    /// Broker login page URL
    #[arg(long, default_value = defaults::LOGIN_URL, env = "BROKER_LOGIN_URL")]
    login_url: String,

    /// Broker token exchange URL
    #[arg(long, default_value = defaults::TOKEN_URL, env = "BROKER_TOKEN_URL")]
    token_url: String,

    /// Seconds to drain in-flight requests after a shutdown signal
    #[arg(
        long,
        default_value_t = defaults::SHUTDOWN_GRACE.as_secs(),
        env = "SHUTDOWN_GRACE_SECS"
    )]
    shutdown_grace_secs: u64,

    /// Exit non-zero when in-flight requests outlive the drain period
    #[arg(long, env = "FAIL_ON_FORCED_SHUTDOWN")]
    fail_on_forced_shutdown: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            login_url: self.login_url,
            token_url: self.token_url,
            port: self.port,
            shutdown_grace: Duration::from_secs(self.shutdown_grace_secs),
            fail_on_forced_shutdown: self.fail_on_forced_shutdown,
            ..Config::new(self.api_key, self.api_secret)
        }
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply.
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    if !dotenv_loaded {
        tracing::debug!("No .env file loaded; using environment and defaults");
    }

    let config = cli.into_config();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.port,
        "Starting broker gateway"
    );

    if !config.has_credentials() {
        tracing::warn!("Broker API key or secret not configured; token exchange will fail");
    }

    let port = config.port;
    let grace = config.shutdown_grace;
    let fail_on_forced_shutdown = config.fail_on_forced_shutdown;

    let client = BrokerClient::new(config)?;
    let server = GatewayServer::new(client, SessionStore::new(), grace);

    match server.run(port).await {
        Err(ServerError::ShutdownTimeout(_)) if !fail_on_forced_shutdown => Ok(()),
        result => Ok(result?),
    }
}
