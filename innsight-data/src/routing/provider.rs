//! HTTP `IsochroneProvider` backed by OpenRouteService.
//!
//! The [`IsochroneProvider`] trait is synchronous so the pipeline stays
//! embeddable in synchronous contexts. This provider bridges the async HTTP
//! call to the sync interface by blocking on a Tokio runtime internally.
//!
//! # Example
//!
//! ```no_run
//! use geo::Coord;
//! use innsight_core::{IsochroneProvider, IsochroneRequest};
//! use innsight_data::routing::{OrsConfig, OrsIsochroneProvider};
//!
//! let provider = OrsIsochroneProvider::with_config(OrsConfig::from_env()?)?;
//! let request =
//!     IsochroneRequest::from_minutes("driving-car", Coord { x: 127.68, y: 26.21 }, &[15, 30, 60]);
//! let set = provider.fetch_isochrones(&request)?;
//! println!("{} polygons", set.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use innsight_core::{FetchError, IsochroneProvider, IsochroneRequest, IsochroneSet};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::ors::{IsochroneBody, parse_isochrones};

/// Default user agent for routing requests.
pub const DEFAULT_USER_AGENT: &str = "innsight-routing/0.1";

/// Default OpenRouteService API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org/v2";

/// Environment variable holding the API root.
pub const ORS_URL_VAR: &str = "ORS_URL";

/// Environment variable holding the API key.
pub const ORS_API_KEY_VAR: &str = "ORS_API_KEY";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ACCEPT_VALUE: &str = "application/json, application/geo+json, application/gpx+xml, img/png; charset=utf-8";

/// Invalid or missing routing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required environment variable is unset.
    #[error("{name} environment variable not set")]
    MissingVar {
        /// Variable name.
        name: &'static str,
    },
    /// A required setting is empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Setting name.
        field: &'static str,
    },
    /// A timeout is zero.
    #[error("{field} must be positive")]
    ZeroTimeout {
        /// Setting name.
        field: &'static str,
    },
}

/// Error type for [`OrsIsochroneProvider`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// The configuration was rejected.
    #[error("invalid routing configuration: {0}")]
    Config(#[from] ConfigError),
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`OrsIsochroneProvider`].
#[derive(Clone, PartialEq, Eq)]
pub struct OrsConfig {
    /// API root, e.g. `"https://api.openrouteservice.org/v2"`.
    pub base_url: String,
    /// Key sent in the `Authorization` header.
    pub api_key: String,
    /// Time allowed to establish a connection.
    pub connect_timeout: Duration,
    /// Time allowed for the whole request.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl std::fmt::Debug for OrsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrsConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for OrsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: String::new(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OrsConfig {
    /// Create a configuration for `base_url` authenticated with `api_key`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Read `ORS_URL` and `ORS_API_KEY` from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingVar`] when either variable is unset or
    /// empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingVar`] when either variable is absent or
    /// empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingVar { name })
        };
        Ok(Self::new(require(ORS_URL_VAR)?, require(ORS_API_KEY_VAR)?))
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Check the configuration is usable.
    ///
    /// # Errors
    /// Returns [`ConfigError::Empty`] for an empty URL or key and
    /// [`ConfigError::ZeroTimeout`] for a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Empty { field: "base_url" });
        }
        if self.api_key.is_empty() {
            return Err(ConfigError::Empty { field: "api_key" });
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout {
                field: "connect_timeout",
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout { field: "timeout" });
        }
        Ok(())
    }
}

/// Isochrone provider calling the OpenRouteService isochrones endpoint.
///
/// Each call is a single attempt; wrap the provider in
/// [`RetryingIsochroneProvider`](super::RetryingIsochroneProvider) for
/// retries.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the provider drives its own stored runtime.
/// Inside a multi-threaded runtime it uses that runtime's handle with
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime it falls
/// back to its own runtime, which may deadlock if the caller's runtime is
/// driving IO this request depends on.
pub struct OrsIsochroneProvider {
    client: Client,
    config: OrsConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OrsIsochroneProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrsIsochroneProvider")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl OrsIsochroneProvider {
    /// Create a provider for `base_url` with default timeouts.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderBuildError> {
        Self::with_config(OrsConfig::new(base_url, api_key))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn with_config(config: OrsConfig) -> Result<Self, ProviderBuildError> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &OrsConfig {
        &self.config
    }

    /// Build the isochrones URL: `{base_url}/isochrones/{profile}`.
    fn build_url(&self, profile: &str) -> String {
        format!(
            "{}/isochrones/{}",
            self.config.base_url.trim_end_matches('/'),
            profile
        )
    }

    async fn fetch_async(&self, request: &IsochroneRequest) -> Result<IsochroneSet, FetchError> {
        let url = self.build_url(&request.profile);
        let body = IsochroneBody {
            locations: request.locations.iter().map(|c| [c.x, c.y]).collect(),
            range: request.ranges.clone(),
        };

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, ACCEPT_VALUE)
            .header(AUTHORIZATION, &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        if !status.is_success() {
            return Err(FetchError::Http {
                url,
                status: status.as_u16(),
                message: if text.is_empty() {
                    status.canonical_reason().unwrap_or_default().to_owned()
                } else {
                    text
                },
            });
        }

        parse_isochrones(&text)
    }

    /// Convert a reqwest error to a `FetchError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return FetchError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        if error.is_decode() {
            return FetchError::MalformedResponse {
                message: error.to_string(),
            };
        }

        FetchError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

impl IsochroneProvider for OrsIsochroneProvider {
    /// Fetch isochrones for `request` with a single HTTP call.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded. Within a `current_thread` runtime the provider falls
    /// back to its own runtime, which may block the caller's runtime.
    fn fetch_isochrones(&self, request: &IsochroneRequest) -> Result<IsochroneSet, FetchError> {
        let future = self.fetch_async(request);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
