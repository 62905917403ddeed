//! Connection configuration for a SonarQube instance

use anyhow::{anyhow, Context, Result};
use url::Url;

use crate::client::SonarClient;

pub const SONARQUBE_URL_ENV: &str = "SONARQUBE_URL";
pub const SONARQUBE_TOKEN_ENV: &str = "SONARQUBE_TOKEN";

/// Where and how to reach the SonarQube server.
///
/// Built explicitly and handed to the client; there is no process-wide
/// configuration singleton.
#[derive(Debug, Clone)]
pub struct SonarConfig {
    pub base_url: Url,
    pub token: Option<String>,
}

impl SonarConfig {
    pub fn new(base_url: Url, token: Option<String>) -> Self {
        Self { base_url, token }
    }

    /// Read the configuration from `SONARQUBE_URL` and `SONARQUBE_TOKEN`.
    ///
    /// The URL is required; the token is optional for anonymous instances.
    pub fn from_env() -> Result<Self> {
        let raw_url = std::env::var(SONARQUBE_URL_ENV)
            .map_err(|_| anyhow!("{} is not set", SONARQUBE_URL_ENV))?;
        let base_url = Url::parse(&raw_url)
            .with_context(|| format!("{} is not a valid URL: {}", SONARQUBE_URL_ENV, raw_url))?;
        let token = std::env::var(SONARQUBE_TOKEN_ENV).ok().filter(|t| !t.is_empty());

        Ok(Self { base_url, token })
    }

    /// Build an API client for this instance.
    pub fn client(&self) -> SonarClient {
        SonarClient::new(self.base_url.clone(), self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_holds_optional_token() {
        let url = Url::parse("https://sonar.example.com").unwrap();
        let config = SonarConfig::new(url.clone(), None);
        assert_eq!(config.base_url, url);
        assert!(config.token.is_none());
    }
}
