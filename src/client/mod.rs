//! Typed client for the SonarQube portfolio administration API

mod types;

pub use types::{ApiError, PortfolioEntry, PortfoliosResponse, ShowResponse, SubView};

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::types::PortfolioKey;

/// Client for the portfolio endpoints of a single SonarQube instance.
///
/// Holds the HTTP client and base URL explicitly; callers pass a reference to
/// every operation instead of reaching for process-wide configuration. There
/// is no retry policy and no response caching: every call is one round trip,
/// and a status other than the expected one is a terminal error for that call.
pub struct SonarClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl SonarClient {
    /// Create a client for the SonarQube instance at `base_url`.
    ///
    /// `token` is a SonarQube user token, sent as the basic-auth username
    /// with an empty password.
    pub fn new(mut base_url: Url, token: Option<String>) -> Self {
        // Joining relative API paths requires a trailing slash on the base.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        Self {
            http: Client::new(),
            base_url,
            token,
        }
    }

    /// List the portfolios that can be referenced under `parent`.
    ///
    /// GET `api/views/portfolios?portfolio=<key>`, expects 200. The response
    /// still contains the parent itself; see
    /// [`crate::hierarchy::candidate_references`] for the exclusion.
    pub async fn list_referenceable(
        &self,
        parent: &PortfolioKey,
    ) -> Result<PortfoliosResponse, ApiError> {
        self.get_json(
            "api/views/portfolios",
            &[("portfolio", parent.as_str())],
            "portfolios",
        )
        .await
    }

    /// Show the hierarchy of the portfolio identified by `key`.
    ///
    /// GET `api/views/show?key=<key>`, expects 200. A 404 surfaces as
    /// [`ApiError::NotFound`] so the caller can treat the portfolio as
    /// externally deleted.
    pub async fn show(&self, key: &PortfolioKey) -> Result<ShowResponse, ApiError> {
        self.get_json("api/views/show", &[("key", key.as_str())], "show")
            .await
    }

    /// Add `child` as a reference under `parent`.
    ///
    /// POST `api/views/add_portfolio?portfolio=<key>&reference=<child>`.
    pub async fn add_reference(
        &self,
        parent: &PortfolioKey,
        child: &PortfolioKey,
    ) -> Result<(), ApiError> {
        debug!(parent = %parent, child = %child, "Adding portfolio reference");
        self.post_ok(
            "api/views/add_portfolio",
            &[("portfolio", parent.as_str()), ("reference", child.as_str())],
        )
        .await
    }

    /// Remove the reference to `child` under `parent`.
    ///
    /// POST `api/views/remove_portfolio?portfolio=<key>&reference=<child>`.
    /// The server answers 200 or 204 depending on version; any 2xx counts as
    /// success. A 404 surfaces as [`ApiError::NotFound`] so callers can treat
    /// an already-absent reference as a no-op.
    pub async fn remove_reference(
        &self,
        parent: &PortfolioKey,
        child: &PortfolioKey,
    ) -> Result<(), ApiError> {
        debug!(parent = %parent, child = %child, "Removing portfolio reference");
        self.post_ok(
            "api/views/remove_portfolio",
            &[("portfolio", parent.as_str()), ("reference", child.as_str())],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        context: &'static str,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!(%url, ?params, "GET");

        let response = self
            .http
            .get(url.clone())
            .query(params)
            .basic_auth_opt(self.token.as_deref())
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(ApiError::NotFound {
                    url: url.to_string(),
                })
            }
            actual => {
                warn!(%url, %actual, "Unexpected status from SonarQube");
                return Err(ApiError::UnexpectedStatus {
                    method: Method::GET,
                    url: url.to_string(),
                    expected: StatusCode::OK,
                    actual,
                });
            }
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode { context, source })
    }

    async fn post_ok(&self, path: &str, params: &[(&str, &str)]) -> Result<(), ApiError> {
        let url = self.endpoint(path)?;
        debug!(%url, ?params, "POST");

        let response = self
            .http
            .post(url.clone())
            .query(params)
            .basic_auth_opt(self.token.as_deref())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                url: url.to_string(),
            });
        }
        warn!(%url, actual = %status, "Unexpected status from SonarQube");
        Err(ApiError::UnexpectedStatus {
            method: Method::POST,
            url: url.to_string(),
            expected: StatusCode::OK,
            actual: status,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }
}

/// Attach SonarQube token auth to a request when a token is configured.
trait BasicAuthOpt {
    fn basic_auth_opt(self, token: Option<&str>) -> Self;
}

impl BasicAuthOpt for reqwest::RequestBuilder {
    fn basic_auth_opt(self, token: Option<&str>) -> Self {
        match token {
            // SonarQube tokens go in the username slot with no password.
            Some(token) => self.basic_auth(token, None::<&str>),
            None => self,
        }
    }
}
