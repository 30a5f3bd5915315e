//! OpenProject API client.
//!
//! Authenticates with an API key using HTTP Basic auth (user `apikey`,
//! password = token), which is the scheme OpenProject documents for API
//! access tokens.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::error::ApiError;
use crate::hal::{self, WORK_PACKAGE_COLLECTION_TYPE, WORK_PACKAGE_TYPE};
use crate::work_package::{WorkPackage, WorkPackageCollection, WorkPackageQuery, WorkPackageWrite};

const HAL_JSON: &str = "application/hal+json";
const API_KEY_USER: &str = "apikey";

/// Configuration for the OpenProject client.
///
/// # Examples
///
/// ```
/// use openproject_client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new("https://openproject.example.com", "token")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the OpenProject instance, without `/api/v3`
    pub base_url: String,
    /// API access token
    pub api_token: String,
    /// Request timeout duration
    pub timeout: Duration,
    /// User agent string for API requests
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a configuration with default timeout and user agent.
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: api_token.into(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("ticket-bridge/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"<REDACTED>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Client for the OpenProject API v3.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone, Debug)]
pub struct OpenProjectClient {
    http_client: reqwest::Client,
    base_url: Url,
    config: ClientConfig,
}

impl OpenProjectClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] if the base URL cannot be parsed
    /// or cannot carry a path, and [`ApiError::HttpClientError`] if the HTTP
    /// client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ApiError::Configuration {
            message: format!("invalid base URL '{}': {}", config.base_url, e),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(ApiError::Configuration {
                message: format!("base URL '{}' cannot carry a path", config.base_url),
            });
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            config,
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// List work packages of a project matching a custom field value.
    ///
    /// Only the first page is requested; callers that need "the" match take
    /// the first element, which is the one with the lowest id.
    #[instrument(skip(self, query), fields(field = %query.field))]
    pub async fn find_work_packages(
        &self,
        project: &str,
        query: &WorkPackageQuery,
    ) -> Result<Vec<WorkPackage>, ApiError> {
        let mut url = self.endpoint(&["api", "v3", "projects", project, "work_packages"])?;
        url.query_pairs_mut()
            .append_pair("offset", &query.offset.to_string())
            .append_pair("pageSize", &query.page_size.to_string())
            .append_pair("filters", &query.filters_param())
            .append_pair("sortBy", &query.sort_param());

        let collection: WorkPackageCollection = self
            .send(
                self.request(Method::GET, url),
                WORK_PACKAGE_COLLECTION_TYPE,
            )
            .await?;

        debug!(
            total = collection.total,
            count = collection.count,
            "Work package lookup completed"
        );

        Ok(collection.embedded.elements)
    }

    /// Create a work package in a project.
    #[instrument(skip(self, body))]
    pub async fn create_work_package(
        &self,
        project: &str,
        body: &WorkPackageWrite,
        notify: bool,
    ) -> Result<WorkPackage, ApiError> {
        let mut url = self.endpoint(&["api", "v3", "projects", project, "work_packages"])?;
        url.query_pairs_mut()
            .append_pair("notify", &notify.to_string());

        self.send(
            self.request(Method::POST, url)
                .header(CONTENT_TYPE, "application/json")
                .json(body),
            WORK_PACKAGE_TYPE,
        )
        .await
    }

    /// Update a work package.
    ///
    /// `body.lock_version` must carry the version read from the server,
    /// otherwise OpenProject rejects the change with an `UpdateConflict`.
    #[instrument(skip(self, body), fields(lock_version = ?body.lock_version))]
    pub async fn update_work_package(
        &self,
        id: u64,
        body: &WorkPackageWrite,
        notify: bool,
    ) -> Result<WorkPackage, ApiError> {
        let id = id.to_string();
        let mut url = self.endpoint(&["api", "v3", "work_packages", &id])?;
        url.query_pairs_mut()
            .append_pair("notify", &notify.to_string());

        self.send(
            self.request(Method::PATCH, url)
                .header(CONTENT_TYPE, "application/json")
                .json(body),
            WORK_PACKAGE_TYPE,
        )
        .await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Configuration {
                message: format!("base URL '{}' cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .basic_auth(API_KEY_USER, Some(&self.config.api_token))
            .header(ACCEPT, HAL_JSON)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        expected_type: &str,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        hal::decode(status, &body, expected_type)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
