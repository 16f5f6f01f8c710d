//! Client configuration
//!
//! Connection settings are injected into the client at construction rather
//! than read from the environment at call sites. [`OmogenConfig::from_env`]
//! is the convenience loader (it honours a `.env` file).

use std::time::Duration;

use crate::constants::DEFAULT_API_PREFIX;
use crate::error::{OmogenError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct OmogenConfig {
    /// Base link of the remote store, always ending with `/`
    pub link: String,
    /// Path segment between the link and the format
    pub api_prefix: String,
    pub admin_login: Option<String>,
    pub admin_password: Option<String>,
    /// Applied by the HTTP transport to every request
    pub timeout: Option<Duration>,
}

impl OmogenConfig {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: normalize_link(link.into()),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            admin_login: None,
            admin_password: None,
            timeout: None,
        }
    }

    pub fn builder(link: impl Into<String>) -> OmogenConfigBuilder {
        OmogenConfigBuilder {
            config: Self::new(link),
        }
    }

    /// Load from `OMOGEN_*` environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let link = lookup("OMOGEN_LINK")
            .filter(|link| !link.trim().is_empty())
            .ok_or_else(|| OmogenError::Config("OMOGEN_LINK is not set".into()))?;

        let mut config = Self::new(link);
        if let Some(prefix) = lookup("OMOGEN_PREFIX") {
            config.api_prefix = normalize_prefix(prefix);
        }
        config.admin_login = lookup("OMOGEN_ADMIN_LOGIN").filter(|s| !s.is_empty());
        config.admin_password = lookup("OMOGEN_ADMIN_PASSWORD").filter(|s| !s.is_empty());
        config.timeout = match lookup("OMOGEN_TIMEOUT_SECS") {
            Some(secs) => Some(Duration::from_secs(secs.trim().parse().map_err(|_| {
                OmogenError::Config(format!("OMOGEN_TIMEOUT_SECS is not a number: {}", secs))
            })?)),
            None => None,
        };

        Ok(config)
    }

    /// Root every request target is built from: `<link><prefix>`
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.link, self.api_prefix)
    }

    /// Admin credentials, if both halves are configured
    pub fn admin_credentials(&self) -> Result<(&str, &str)> {
        match (&self.admin_login, &self.admin_password) {
            (Some(login), Some(password)) => Ok((login.as_str(), password.as_str())),
            _ => Err(OmogenError::Config(
                "OMOGEN_ADMIN_LOGIN and OMOGEN_ADMIN_PASSWORD must both be set".into(),
            )),
        }
    }
}

fn normalize_link(link: String) -> String {
    let link = link.trim().to_string();
    if link.ends_with('/') {
        link
    } else {
        format!("{}/", link)
    }
}

fn normalize_prefix(prefix: String) -> String {
    let prefix = prefix.trim().trim_matches('/');
    if prefix.is_empty() {
        String::new()
    } else {
        format!("{}/", prefix)
    }
}

/// Builder for OmogenConfig
#[derive(Debug)]
pub struct OmogenConfigBuilder {
    config: OmogenConfig,
}

impl OmogenConfigBuilder {
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.api_prefix = normalize_prefix(prefix.into());
        self
    }

    pub fn admin_credentials(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.admin_login = Some(login.into());
        self.config.admin_password = Some(password.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> OmogenConfig {
        self.config
    }
}
