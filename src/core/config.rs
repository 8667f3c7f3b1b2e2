use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Wire convention used by the backend's login endpoint.
///
/// Deployments disagree on how credentials travel: some accept a JSON body
/// `{email, password}`, others an OAuth2 `username=&password=` form. The
/// scheme is an explicit, validated configuration choice rather than a
/// silent default baked into the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    /// JSON body login against `/auth/login-local`.
    #[default]
    Json,
    /// OAuth2 form-encoded login against `/auth/login/access-token`.
    OAuth2Form,
}

impl FromStr for AuthScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "oauth2-form" | "oauth2_form" => Ok(Self::OAuth2Form),
            other => Err(ConfigError::InvalidConfiguration(format!(
                "unknown auth scheme '{}', expected 'json' or 'oauth2-form'",
                other
            ))),
        }
    }
}

/// Client-side configuration for one backend deployment.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub auth_scheme: AuthScheme,
    /// Enables the realtime notification channel. When false, channel
    /// construction is a no-op that yields no connection.
    pub realtime: bool,
    /// Where the persistent token cache lives. `None` means the environment
    /// has no persistent store and the cache degrades to a no-op.
    pub token_cache_path: Option<PathBuf>,
    pub timeout_seconds: u64,
}

impl BackendConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base_url(base_url.into()),
            auth_scheme: AuthScheme::default(),
            realtime: false,
            token_cache_path: None,
            timeout_seconds: 30,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Expected environment variables:
    /// - `{PREFIX}_BASE_URL` (required)
    /// - `{PREFIX}_AUTH_SCHEME` (optional, `json` or `oauth2-form`, defaults to `json`)
    /// - `{PREFIX}_REALTIME` (optional, defaults to false)
    /// - `{PREFIX}_TOKEN_FILE` (optional; absent disables the persistent token cache)
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let base_url_var = format!("{}_BASE_URL", prefix.to_uppercase());
        let auth_scheme_var = format!("{}_AUTH_SCHEME", prefix.to_uppercase());
        let realtime_var = format!("{}_REALTIME", prefix.to_uppercase());
        let token_file_var = format!("{}_TOKEN_FILE", prefix.to_uppercase());

        let base_url = env::var(&base_url_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(base_url_var))?;

        let auth_scheme = match env::var(&auth_scheme_var) {
            Ok(raw) => raw.parse()?,
            Err(_) => AuthScheme::default(),
        };

        let realtime = env::var(&realtime_var)
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let token_cache_path = env::var(&token_file_var).ok().map(PathBuf::from);

        Ok(Self {
            base_url: trim_base_url(base_url),
            auth_scheme,
            realtime,
            token_cache_path,
            timeout_seconds: 30,
        })
    }

    /// Create configuration from a .env file and environment variables.
    ///
    /// Loads the .env file first (if it exists), then reads the standard
    /// environment variable names.
    #[cfg(feature = "env-file")]
    pub fn from_env_file(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(prefix, ".env")
    }

    /// Create configuration from a specific .env file path.
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(prefix: &str, env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(_) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // Missing .env file is fine, fall through to system env vars
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env(prefix)
    }

    /// Set the login wire convention.
    #[must_use]
    pub const fn auth_scheme(mut self, scheme: AuthScheme) -> Self {
        self.auth_scheme = scheme;
        self
    }

    /// Enable or disable the realtime channel.
    #[must_use]
    pub const fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Set the persistent token cache location.
    #[must_use]
    pub fn token_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_cache_path = Some(path.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Derive the websocket endpoint base from the HTTP base URL.
    #[must_use]
    pub fn websocket_base(&self) -> String {
        if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.base_url.clone()
        }
    }
}

/// Configuration for the gateway server binary.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Backend the gateway forwards to. Never exposed to clients.
    pub backend_url: String,
    pub bind_addr: String,
}

impl GatewayConfig {
    #[must_use]
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: trim_base_url(backend_url.into()),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Expected environment variables:
    /// - `GATEWAY_BACKEND_URL` (required)
    /// - `GATEWAY_BIND` (optional, defaults to `0.0.0.0:3000`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_url = env::var("GATEWAY_BACKEND_URL").map_err(|_| {
            ConfigError::MissingEnvironmentVariable("GATEWAY_BACKEND_URL".to_string())
        })?;

        let bind_addr = env::var("GATEWAY_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            backend_url: trim_base_url(backend_url),
            bind_addr,
        })
    }

    /// Set the bind address.
    #[must_use]
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
