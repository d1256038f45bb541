//! Client configuration and deployment environments.
//!
//! A [`ClientConfig`] is built once, handed to [`crate::Client::new`] and
//! never mutated afterwards. To change the token or base URL, build a new
//! client.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Query parameter name for the page offset.
pub const OFFSET: &str = "offset";
/// Query parameter name for the page size.
pub const LIMIT: &str = "limit";

const DEFAULT_VERSION: &str = "api/v1/";
const DEFAULT_PLATFORM: &str = "ios";

/// Errors raised while loading configuration from the environment.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Neither APIHELPER_BASE_URL nor APIHELPER_ENV is set")]
    MissingBaseUrl,
    #[error("Unknown environment {0:?} (expected development, staging or production)")]
    UnknownEnvironment(String),
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Connection settings shared by every request a [`crate::Client`] makes.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    version: String,
    token: String,
    device_id: String,
    platform: String,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a configuration from the base URL, API version segment
    /// (e.g. `api/v1/`) and auth token.
    ///
    /// The device id defaults to a freshly generated UUID; persist it and pass
    /// it back through [`ClientConfig::with_device_id`] to keep it stable.
    pub fn new(base_url: &str, version: &str, token: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            version: version.to_string(),
            token: token.to_string(),
            device_id: uuid::Uuid::new_v4().to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            timeout: None,
        }
    }

    /// Creates a configuration pointing at `environment` for `region`.
    pub fn for_environment(environment: Environment, region: Region, token: &str) -> Self {
        Self::new(environment.base_url(region), DEFAULT_VERSION, token)
    }

    /// Reads configuration from `APIHELPER_*` environment variables.
    ///
    /// `APIHELPER_BASE_URL` wins over `APIHELPER_ENV`; the latter is resolved
    /// for the region of the current system locale.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = match (lookup("APIHELPER_BASE_URL"), lookup("APIHELPER_ENV")) {
            (Some(url), _) => url,
            (None, Some(env)) => {
                let environment: Environment = env.parse()?;
                environment.base_url(Region::current()).to_string()
            }
            (None, None) => return Err(ConfigError::MissingBaseUrl),
        };
        let token = lookup("APIHELPER_TOKEN").unwrap_or_default();
        let mut config = Self::new(&base_url, DEFAULT_VERSION, &token);

        if let Some(version) = lookup("APIHELPER_API_VERSION") {
            let number = version.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                name: "APIHELPER_API_VERSION",
                value: version.clone(),
            })?;
            config = config.with_api_version(number);
        }
        if let Some(device_id) = lookup("APIHELPER_DEVICE_ID") {
            config = config.with_device_id(&device_id);
        }
        if let Some(platform) = lookup("APIHELPER_PLATFORM") {
            config = config.with_platform(&platform);
        }
        if let Some(secs) = lookup("APIHELPER_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: "APIHELPER_TIMEOUT_SECS",
                value: secs.clone(),
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Sets the version segment to `api/v{number}/`.
    pub fn with_api_version(mut self, number: u32) -> Self {
        self.version = format!("api/v{}/", number);
        self
    }

    pub fn with_device_id(mut self, device_id: &str) -> Self {
        self.device_id = device_id.to_string();
        self
    }

    pub fn with_platform(mut self, platform: &str) -> Self {
        self.platform = platform.to_string();
        self
    }

    /// Caps each request at `timeout`. Without it the HTTP stack's default applies.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Deployment target the app is built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 3] = [
        Environment::Development,
        Environment::Staging,
        Environment::Production,
    ];

    /// Base URL for this environment. Production currently shares the staging hosts.
    pub fn base_url(self, region: Region) -> &'static str {
        match (region, self) {
            (_, Environment::Development) => "https://dev.myfayvit.com/",
            (Region::India, _) => "https://stgin.myfayvit.com/",
            (Region::Other, _) => "https://stg.myfayvit.com/",
        }
    }

    pub fn subdomain(self, region: Region) -> &'static str {
        match (region, self) {
            (_, Environment::Development) => "dev",
            (Region::India, _) => "stgin",
            (Region::Other, _) => "stg",
        }
    }

    /// Default page size for paginated endpoints.
    pub fn fetch_limit(self) -> u32 {
        10
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stg" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

/// Region that selects which set of hosts an environment resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    India,
    Other,
}

impl Region {
    /// Region of the current system locale, `Other` when it cannot be determined.
    pub fn current() -> Self {
        sys_locale::get_locale()
            .map(|locale| Self::from_locale(&locale))
            .unwrap_or(Region::Other)
    }

    /// Parses the region subtag of a locale such as `en-IN`, `hi_IN` or `en_IN.UTF-8`.
    pub fn from_locale(locale: &str) -> Self {
        let tag = locale.split('.').next().unwrap_or(locale);
        let is_india = tag
            .split(['-', '_'])
            .skip(1)
            .any(|part| part.eq_ignore_ascii_case("IN"));
        if is_india {
            Region::India
        } else {
            Region::Other
        }
    }
}
