//! Provider configuration.
//!
//! The provider block is deserialized with serde. Values it leaves unset are
//! taken from `EC_*` environment variables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DeploymentError;
use crate::schema::{provider_schema, Diagnostic};
use crate::validation::validate;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.elastic-cloud.com";

/// How long create and update wait for a pending plan.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(40 * 60);

/// How often a pending plan is polled.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The raw provider block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    endpoint: Option<String>,
    #[serde(rename = "apikey")]
    api_key: Option<String>,
    username: Option<String>,
    password: Option<String>,
    insecure: bool,
    timeout: Option<String>,
    poll_interval: Option<String>,
    verbose: bool,
}

/// Settings of the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderConfig {
    /// Base URL of the deployment API.
    pub endpoint: String,
    /// API key credential.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Username for basic auth.
    pub username: Option<String>,
    /// Password for basic auth.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Skip TLS verification.
    pub insecure: bool,
    /// Upper bound on waiting for a plan to finish.
    pub timeout: Duration,
    /// Delay between plan status polls.
    pub poll_interval: Duration,
    /// Log at debug level by default.
    pub verbose: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            username: None,
            password: None,
            insecure: false,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            verbose: false,
        }
    }
}

impl ProviderConfig {
    /// Build the configuration from a provider block and the process environment.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DeploymentError> {
        Self::from_value_with_env(value, |key| std::env::var(key).ok())
    }

    /// Build the configuration from a provider block, looking up unset values
    /// with `env`.
    pub fn from_value_with_env<F>(value: serde_json::Value, env: F) -> Result<Self, DeploymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: RawConfig = if value.is_null() {
            RawConfig::default()
        } else {
            let problems: Vec<String> = validate(&provider_schema(), &value)
                .into_iter()
                .filter(Diagnostic::is_error)
                .map(|d| match d.attribute {
                    Some(attribute) => format!("{}: {}", attribute, d.summary),
                    None => d.summary,
                })
                .collect();
            if !problems.is_empty() {
                return Err(DeploymentError::Configuration(problems.join("; ")));
            }
            serde_json::from_value(value)?
        };
        let lookup = |set: Option<String>, key: &str| {
            set.filter(|v| !v.is_empty())
                .or_else(|| env(key).filter(|v| !v.is_empty()))
        };

        let timeout = match lookup(raw.timeout, "EC_TIMEOUT") {
            Some(text) => parse_duration(&text)?,
            None => DEFAULT_TIMEOUT,
        };
        let poll_interval = match raw.poll_interval {
            Some(text) => parse_duration(&text)?,
            None => DEFAULT_POLL_INTERVAL,
        };

        Ok(Self {
            endpoint: lookup(raw.endpoint, "EC_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key: lookup(raw.api_key, "EC_API_KEY"),
            username: lookup(raw.username, "EC_USERNAME"),
            password: lookup(raw.password, "EC_PASSWORD"),
            insecure: raw.insecure,
            timeout,
            poll_interval,
            verbose: raw.verbose,
        })
    }

    /// Check the configuration for problems.
    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        let has_basic_auth = self.username.is_some() || self.password.is_some();
        if self.api_key.is_none() && !has_basic_auth {
            diagnostics.push(
                Diagnostic::error("Missing credentials")
                    .with_detail("Set apikey, or username and password (or EC_API_KEY)"),
            );
        }
        if self.api_key.is_some() && has_basic_auth {
            diagnostics.push(
                Diagnostic::error("Conflicting credentials")
                    .with_detail("apikey cannot be combined with username and password")
                    .with_attribute("apikey"),
            );
        }
        if self.api_key.is_none() && has_basic_auth
            && (self.username.is_none() || self.password.is_none())
        {
            diagnostics.push(
                Diagnostic::error("Incomplete credentials")
                    .with_detail("username and password must be set together")
                    .with_attribute(if self.username.is_none() {
                        "username"
                    } else {
                        "password"
                    }),
            );
        }
        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            diagnostics.push(
                Diagnostic::error("Invalid endpoint")
                    .with_detail(format!("\"{}\" is not an http(s) URL", self.endpoint))
                    .with_attribute("endpoint"),
            );
        }
        if self.timeout.is_zero() {
            diagnostics.push(
                Diagnostic::error("Invalid timeout")
                    .with_detail("timeout must be greater than zero")
                    .with_attribute("timeout"),
            );
        }
        if self.insecure {
            diagnostics.push(
                Diagnostic::warning("TLS verification disabled").with_attribute("insecure"),
            );
        }

        diagnostics
    }
}

/// Parse a duration such as `"90s"`, `"40m"` or `"1h"`.
///
/// ```
/// use std::time::Duration;
/// use ec_deployment_provider::config::parse_duration;
///
/// assert_eq!(parse_duration("40m").unwrap(), Duration::from_secs(2400));
/// assert!(parse_duration("forty").is_err());
/// ```
pub fn parse_duration(text: &str) -> Result<Duration, DeploymentError> {
    let invalid = || {
        DeploymentError::Configuration(format!(
            "invalid duration \"{}\": expected a number followed by s, m or h",
            text
        ))
    };

    let text = text.trim();
    let (unit_at, _) = text.char_indices().last().ok_or_else(invalid)?;
    let (amount, unit) = text.split_at(unit_at);
    let amount: u64 = amount.parse().map_err(|_| invalid())?;
    let seconds = match unit {
        "s" => amount,
        "m" => amount.checked_mul(60).ok_or_else(invalid)?,
        "h" => amount.checked_mul(3600).ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };
    Ok(Duration::from_secs(seconds))
}
