//! Configuration for Incinerator.
//!
//! Settings come from three layers, highest precedence first:
//!
//! 1. [`Overrides`] collected from the command line and environment
//! 2. `~/.incinerator/config.toml` (or an explicit `--config` path)
//! 3. Built-in defaults
//!
//! String values in the file may reference environment variables as
//! `${NAME}`; unset variables expand to the empty string.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use incinerator_client::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DISPATCH_URL, DEFAULT_FETCH_URL,
    DEFAULT_REQUEST_TIMEOUT_SECS, Endpoints, HttpSettings,
};
use incinerator_types::{BearerToken, FieldPath, MatchRule};
use serde::Deserialize;
use thiserror::Error;

/// Dispatch units allowed in flight when nothing else is configured.
pub const DEFAULT_MAX_CONCURRENCY: usize = 32;

const CONFIG_DIR: &str = ".incinerator";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Default, Deserialize)]
pub struct IncineratorConfig {
    pub api: Option<ApiConfig>,
    pub dispatch: Option<DispatchConfig>,
    pub http: Option<HttpConfig>,
    pub matching: Option<MatchingConfig>,
}

#[derive(Default, Deserialize)]
pub struct ApiConfig {
    pub fetch_url: Option<String>,
    pub dispatch_url: Option<String>,
    pub bearer_token: Option<String>,
}

// Manual Debug impl to prevent leaking the token in logs.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("fetch_url", &self.fetch_url)
            .field("dispatch_url", &self.dispatch_url)
            .field(
                "bearer_token",
                &if self.bearer_token.is_some() {
                    "[REDACTED]"
                } else {
                    "None"
                },
            )
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DispatchConfig {
    /// Maximum concurrent incineration calls. `0` removes the limit.
    pub max_concurrency: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub allow_insecure_http: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct MatchingConfig {
    pub id_field: Option<FieldPath>,
    pub degradation_field: Option<FieldPath>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(
        "no bearer token: pass --bearer-token, set INCINERATOR_BEARER_TOKEN, or add api.bearer_token to the config file"
    )]
    MissingCredential,
    #[error("invalid {field} {value:?}: {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
}

impl IncineratorConfig {
    /// Load configuration.
    ///
    /// With `explicit = None` the default location is used and a missing file
    /// yields `Ok(None)`. An explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Option<Self>, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(None),
            },
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read { path, source: err });
            }
        };

        match Self::parse(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "Loaded config");
                Ok(Some(config))
            }
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse { path, source: err })
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Values supplied on the command line. `None` defers to the config file.
#[derive(Default)]
pub struct Overrides {
    pub bearer_token: Option<String>,
    pub fetch_url: Option<String>,
    pub dispatch_url: Option<String>,
    pub max_concurrency: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub allow_insecure_http: bool,
}

impl std::fmt::Debug for Overrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overrides")
            .field(
                "bearer_token",
                &if self.bearer_token.is_some() {
                    "[REDACTED]"
                } else {
                    "None"
                },
            )
            .field("fetch_url", &self.fetch_url)
            .field("dispatch_url", &self.dispatch_url)
            .field("max_concurrency", &self.max_concurrency)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("allow_insecure_http", &self.allow_insecure_http)
            .finish()
    }
}

/// Everything a run needs, fully validated.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub endpoints: Endpoints,
    pub token: BearerToken,
    pub http: HttpSettings,
    /// `0` means one slot per matched item.
    pub max_concurrency: usize,
    pub rule: MatchRule,
}

impl RunSettings {
    /// Merge overrides, file values, and defaults.
    pub fn resolve(
        config: Option<&IncineratorConfig>,
        overrides: Overrides,
    ) -> Result<Self, ConfigError> {
        let api = config.and_then(|c| c.api.as_ref());
        let dispatch = config.and_then(|c| c.dispatch.as_ref());
        let http_config = config.and_then(|c| c.http.as_ref());
        let matching = config.and_then(|c| c.matching.as_ref());

        let raw_token = overrides
            .bearer_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| {
                api.and_then(|a| a.bearer_token.as_deref())
                    .map(expand_env_vars)
            });
        let token = raw_token
            .and_then(|t| BearerToken::new(t).ok())
            .ok_or(ConfigError::MissingCredential)?;

        let fetch_url = overrides
            .fetch_url
            .or_else(|| api.and_then(|a| a.fetch_url.as_deref()).map(expand_env_vars))
            .unwrap_or_else(|| DEFAULT_FETCH_URL.to_string());
        let dispatch_url = overrides
            .dispatch_url
            .or_else(|| {
                api.and_then(|a| a.dispatch_url.as_deref())
                    .map(expand_env_vars)
            })
            .unwrap_or_else(|| DEFAULT_DISPATCH_URL.to_string());
        let endpoints = Endpoints {
            fetch: parse_url("fetch_url", fetch_url)?,
            dispatch: parse_url("dispatch_url", dispatch_url)?,
        };

        let connect_timeout_secs = http_config
            .and_then(|h| h.connect_timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        let request_timeout_secs = overrides
            .request_timeout_secs
            .or_else(|| http_config.and_then(|h| h.request_timeout_secs))
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let http = HttpSettings {
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            request_timeout: Duration::from_secs(request_timeout_secs),
            allow_insecure_http: overrides.allow_insecure_http
                || http_config.is_some_and(|h| h.allow_insecure_http),
        };

        let max_concurrency = overrides
            .max_concurrency
            .or_else(|| dispatch.and_then(|d| d.max_concurrency))
            .unwrap_or(DEFAULT_MAX_CONCURRENCY);

        let mut rule = MatchRule::default();
        if let Some(matching) = matching {
            if let Some(field) = &matching.id_field {
                rule.id_field = field.clone();
            }
            if let Some(field) = &matching.degradation_field {
                rule.degradation_field = field.clone();
            }
        }

        Ok(Self {
            endpoints,
            token,
            http,
            max_concurrency,
            rule,
        })
    }
}

fn parse_url(field: &'static str, value: String) -> Result<url::Url, ConfigError> {
    url::Url::parse(&value).map_err(|source| ConfigError::InvalidUrl {
        field,
        value,
        source,
    })
}

/// Expand `${NAME}` references from the process environment.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    expand_vars_with(value, |name| env::var(name).ok())
}

/// Expand `${NAME}` references using `lookup`. Missing names expand to "".
/// An unterminated `${` is copied through verbatim.
pub fn expand_vars_with<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let name = &after[..end];
        if !name.is_empty()
            && let Some(replacement) = lookup(name)
        {
            out.push_str(&replacement);
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
