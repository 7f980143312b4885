//! Configuration for the broker gateway.

use std::time::Duration;

use anyhow::Context;

/// Broker and server defaults.
pub mod defaults {
    use std::time::Duration;

    /// Broker login page the user is redirected to.
    pub const LOGIN_URL: &str = "https://login.paytmmoney.com/merchant-login";

    /// Broker endpoint exchanging a request token for an access token.
    pub const TOKEN_URL: &str = "https://developer.paytmmoney.com/accounts/v2/gettoken";

    /// HTTP listen port.
    pub const PORT: u16 = 8080;

    /// Timeout for the outbound token exchange.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// How long in-flight requests may drain after a shutdown signal.
    pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
}

/// Gateway configuration.
#[derive(Clone)]
pub struct Config {
    /// Broker API key, embedded in the login URL and the exchange body.
    pub api_key: String,

    /// Broker API secret, only sent in the exchange body.
    pub api_secret: String,

    /// Broker login page base URL.
    pub login_url: String,

    /// Broker token exchange endpoint.
    pub token_url: String,

    /// Outbound request timeout.
    pub request_timeout: Duration,

    /// HTTP listen port.
    pub port: u16,

    /// Drain deadline after a shutdown signal.
    pub shutdown_grace: Duration,

    /// Exit non-zero when the drain deadline is exceeded.
    pub fail_on_forced_shutdown: bool,
}

impl Config {
    /// Create a configuration with the given credentials and default endpoints.
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            login_url: defaults::LOGIN_URL.to_string(),
            token_url: defaults::TOKEN_URL.to_string(),
            request_timeout: defaults::REQUEST_TIMEOUT,
            port: defaults::PORT,
            shutdown_grace: defaults::SHUTDOWN_GRACE,
            fail_on_forced_shutdown: false,
        }
    }

    /// Create a test configuration pointing both broker endpoints at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            login_url: format!("{base_url}/merchant-login"),
            token_url: format!("{base_url}/accounts/v2/gettoken"),
            request_timeout: Duration::from_secs(2),
            port: 0,
            shutdown_grace: Duration::from_millis(500),
            ..Self::new("test-api-key", "test-api-secret")
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Unset variables fall back to [`defaults`]. Boolean variables accept the
    /// same spellings as the command line (`true`/`false`, `1`/`0`, `yes`/`no`,
    /// `on`/`off`, `y`/`n`, `t`/`f`, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns error if a numeric or boolean variable does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let mut config = Self::new(
            var_or("BROKER_API_KEY", ""),
            var_or("BROKER_API_SECRET", ""),
        );

        config.login_url = var_or("BROKER_LOGIN_URL", defaults::LOGIN_URL);
        config.token_url = var_or("BROKER_TOKEN_URL", defaults::TOKEN_URL);

        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("invalid PORT '{port}'"))?;
        }
        if let Some(secs) = lookup("SHUTDOWN_GRACE_SECS") {
            let secs = secs
                .parse()
                .with_context(|| format!("invalid SHUTDOWN_GRACE_SECS '{secs}'"))?;
            config.shutdown_grace = Duration::from_secs(secs);
        }
        if let Some(flag) = lookup("FAIL_ON_FORCED_SHUTDOWN") {
            config.fail_on_forced_shutdown = parse_flag(&flag)
                .with_context(|| format!("invalid FAIL_ON_FORCED_SHUTDOWN '{flag}'"))?;
        }

        Ok(config)
    }

    /// Check if broker credentials are configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key)
            .field("has_api_secret", &!self.api_secret.is_empty())
            .field("login_url", &self.login_url)
            .field("token_url", &self.token_url)
            .field("request_timeout", &self.request_timeout)
            .field("port", &self.port)
            .field("shutdown_grace", &self.shutdown_grace)
            .field("fail_on_forced_shutdown", &self.fail_on_forced_shutdown)
            .finish()
    }
}

/// Parse a boolean the way clap parses a flag's environment value.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.has_credentials());
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.shutdown_grace, Duration::from_secs(5));
        assert!(!config.fail_on_forced_shutdown);
    }

    #[test]
    fn test_config_with_credentials() {
        let config = Config::new("key", "secret");
        assert!(config.has_credentials());

        let config = Config::new("key", "");
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_for_testing_points_at_mock() {
        let config = Config::for_testing("http://127.0.0.1:9999");
        assert_eq!(config.login_url, "http://127.0.0.1:9999/merchant-login");
        assert_eq!(config.token_url, "http://127.0.0.1:9999/accounts/v2/gettoken");
        assert!(config.has_credentials());
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = Config::new("visible-key", "super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("visible-key"));
    }

    fn from_vars(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_from_env_defaults_when_unset() {
        let config = from_vars(&[]).unwrap();
        assert!(!config.has_credentials());
        assert_eq!(config.port, defaults::PORT);
        assert_eq!(config.login_url, defaults::LOGIN_URL);
        assert_eq!(config.shutdown_grace, defaults::SHUTDOWN_GRACE);
        assert!(!config.fail_on_forced_shutdown);
    }

    #[test]
    fn test_from_env_reads_variables() {
        let config = from_vars(&[
            ("BROKER_API_KEY", "k"),
            ("BROKER_API_SECRET", "s"),
            ("BROKER_TOKEN_URL", "http://broker.test/token"),
            ("PORT", "9090"),
            ("SHUTDOWN_GRACE_SECS", "2"),
            ("FAIL_ON_FORCED_SHUTDOWN", "true"),
        ])
        .unwrap();

        assert!(config.has_credentials());
        assert_eq!(config.token_url, "http://broker.test/token");
        assert_eq!(config.port, 9090);
        assert_eq!(config.shutdown_grace, Duration::from_secs(2));
        assert!(config.fail_on_forced_shutdown);
    }

    #[test]
    fn test_from_env_flag_spellings() {
        for value in ["1", "yes", "TRUE", "on", "y"] {
            let config = from_vars(&[("FAIL_ON_FORCED_SHUTDOWN", value)]).unwrap();
            assert!(config.fail_on_forced_shutdown, "value: {value}");
        }
        for value in ["0", "no", "False", "off", "n"] {
            let config = from_vars(&[("FAIL_ON_FORCED_SHUTDOWN", value)]).unwrap();
            assert!(!config.fail_on_forced_shutdown, "value: {value}");
        }
    }

    #[test]
    fn test_from_env_rejects_bad_values() {
        assert!(from_vars(&[("FAIL_ON_FORCED_SHUTDOWN", "maybe")]).is_err());
        assert!(from_vars(&[("PORT", "eighty")]).is_err());
        assert!(from_vars(&[("SHUTDOWN_GRACE_SECS", "-1")]).is_err());
    }
}
