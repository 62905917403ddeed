//! Wire types and errors for the SonarQube portfolio API

use reqwest::{Method, StatusCode};
use serde::Deserialize;

use crate::types::PortfolioKey;

/// Errors surfaced by [`super::SonarClient`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport error calling SonarQube: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid SonarQube URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{method} {url} returned {actual}, expected {expected}")]
    UnexpectedStatus {
        method: Method,
        url: String,
        expected: StatusCode,
        actual: StatusCode,
    },

    #[error("failed to decode {context} response: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("not found: {url}")]
    NotFound { url: String },
}

/// One entry from `api/views/portfolios`.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioEntry {
    pub key: PortfolioKey,
    pub name: String,
    #[serde(default)]
    pub disabled: bool,
}

/// Response body of `api/views/portfolios`.
#[derive(Debug, Clone, Deserialize)]
pub struct PortfoliosResponse {
    pub portfolios: Vec<PortfolioEntry>,
}

/// One child entry from `api/views/show`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubView {
    pub key: PortfolioKey,
    pub name: String,
}

/// Response body of `api/views/show`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowResponse {
    pub key: PortfolioKey,
    #[serde(default)]
    pub sub_views: Vec<SubView>,
}
