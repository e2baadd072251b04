//! Instance configuration.
//!
//! A Jira instance is addressed by a short name (e.g. `acme`) and configured
//! through three environment variables derived from it:
//!
//! - `JIRA_{INSTANCE}_URL`
//! - `JIRA_{INSTANCE}_EMAIL`
//! - `JIRA_{INSTANCE}_TOKEN`
//!
//! When no name is passed explicitly, `JIRA_INSTANCE` selects one. A `.env`
//! file in the working directory is loaded first if present.

use crate::error::{Error, Result};
use reqwest::Url;
use secrecy::SecretString;
use tracing::debug;

/// Environment variable naming the default instance.
pub const INSTANCE_ENV: &str = "JIRA_INSTANCE";

/// Connection settings for a single Jira instance.
#[derive(Debug)]
pub struct InstanceConfig {
    /// Friendly name of the instance (e.g. `acme`).
    pub instance_name: String,
    /// Base URL without a trailing slash (e.g. `https://acme.atlassian.net`).
    pub base_url: String,
    /// Account email used for basic authentication.
    pub email: String,
    /// API token paired with `email`.
    pub api_token: SecretString,
}

impl InstanceConfig {
    /// Resolve configuration from the process environment.
    ///
    /// Loads `.env` if one exists, then falls back to `JIRA_INSTANCE` when
    /// `instance` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if no instance can be determined, a variable is
    /// missing, or the URL does not parse.
    pub fn resolve(instance: Option<&str>) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env file");
        }
        Self::resolve_with(instance, |key| std::env::var(key).ok())
    }

    /// Resolve configuration using an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`InstanceConfig::resolve`].
    pub fn resolve_with<F>(instance: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = match instance {
            Some(name) => name.to_string(),
            None => non_empty(lookup(INSTANCE_ENV)).ok_or(Error::NoInstance)?,
        };
        Self::from_lookup(&name, lookup)
    }

    /// Build the configuration for a named instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEnv`] naming the first absent variable, or
    /// [`Error::InvalidUrl`] if the URL is not absolute http(s).
    pub fn from_lookup<F>(instance_name: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let upper = instance_name.to_uppercase();
        let require = |suffix: &str| {
            let key = format!("JIRA_{upper}_{suffix}");
            non_empty(lookup(&key)).ok_or(Error::MissingEnv(key))
        };

        let url = require("URL")?;
        let email = require("EMAIL")?;
        let token = require("TOKEN")?;

        Ok(Self {
            instance_name: instance_name.to_string(),
            base_url: normalize_base_url(&url)?,
            email,
            api_token: SecretString::new(token),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validate the URL and strip trailing slashes.
fn normalize_base_url(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw).map_err(|e| Error::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    Ok(raw.trim_end_matches('/').to_string())
}
