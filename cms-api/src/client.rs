//! Content API client construction.
//!
//! Validates credentials, picks the fetch primitive, derives the retry policy
//! and origin, and wires them into a [`RequestExecutor`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderValue;
use tracing::debug;

use cms_core::config::{PaginationConfig, ServiceConfig};
use cms_core::constants;
use cms_core::error::{CmsError, CmsResult};

use crate::executor::RequestExecutor;
use crate::retry::RetryPolicy;
use crate::transport::{Fetch, ReqwestFetch, Transport};

/// Pacing of the pagination drivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationSettings {
    /// Records requested per page.
    pub page_size: u32,
    /// Page requests dispatched concurrently in one packet.
    pub requests_per_second: usize,
    /// Minimum gap between the end of one packet and the start of the next.
    pub packet_interval: Duration,
    /// Pause between pages of the sequential collector.
    pub page_delay: Duration,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self::from(&PaginationConfig::default())
    }
}

impl From<&PaginationConfig> for PaginationSettings {
    fn from(config: &PaginationConfig) -> Self {
        Self {
            page_size: config.page_size.max(1),
            requests_per_second: config.requests_per_second.max(1),
            packet_interval: Duration::from_millis(config.packet_interval_ms),
            page_delay: Duration::from_millis(config.page_delay_ms),
        }
    }
}

/// Options accepted at client construction.
#[derive(Clone, Default)]
pub struct ClientOptions {
    /// Retry 429/5xx/network failures (3 attempts, 5s minimum wait).
    pub retry: bool,
    /// Replaces the reqwest-backed fetch primitive.
    pub custom_fetch: Option<Arc<dyn Fetch>>,
    /// Replaces the policy derived from `retry`.
    pub retry_policy: Option<RetryPolicy>,
    /// Origin replacing `https://{serviceDomain}.{baseDomain}`.
    pub base_url: Option<String>,
    /// Sent as `X-GLOBAL-DRAFT-KEY` on reads. Content client only.
    pub global_draft_key: Option<String>,
    /// Request timeout for the default fetch primitive.
    pub timeout: Option<Duration>,
    /// Content client only.
    pub pagination: PaginationSettings,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_custom_fetch(mut self, fetch: Arc<dyn Fetch>) -> Self {
        self.custom_fetch = Some(fetch);
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_global_draft_key(mut self, key: impl Into<String>) -> Self {
        self.global_draft_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationSettings) -> Self {
        self.pagination = pagination;
        self
    }

    /// Options matching a service section of the configuration file.
    pub fn from_config(service: &ServiceConfig, pagination: &PaginationConfig) -> Self {
        Self {
            retry: service.retry,
            custom_fetch: None,
            retry_policy: None,
            base_url: service.base_url.clone(),
            global_draft_key: service.global_draft_key.clone(),
            timeout: Some(Duration::from_millis(service.timeout_ms)),
            pagination: PaginationSettings::from(pagination),
        }
    }
}

/// Reject missing credentials before anything else is built.
pub(crate) fn validate_credentials(service_domain: &str, api_key: &str) -> CmsResult<()> {
    if service_domain.trim().is_empty() || api_key.trim().is_empty() {
        return Err(CmsError::Config(
            "parameter is required (check serviceDomain and apiKey)".into(),
        ));
    }
    if service_domain.contains(['/', ':', '?', '#', '@']) {
        return Err(CmsError::Config(format!(
            "serviceDomain must be a bare subdomain (got {service_domain})"
        )));
    }
    Ok(())
}

pub(crate) fn require_endpoint(endpoint: &str) -> CmsResult<()> {
    if endpoint.is_empty() {
        return Err(CmsError::Validation("endpoint is required".into()));
    }
    Ok(())
}

/// Build the executor shared by the content and management clients.
pub(crate) fn build_executor(
    service_domain: &str,
    api_key: &str,
    base_domain: &str,
    options: &ClientOptions,
) -> CmsResult<RequestExecutor> {
    validate_credentials(service_domain, api_key)?;

    let fetch: Arc<dyn Fetch> = match &options.custom_fetch {
        Some(fetch) => Arc::clone(fetch),
        None => Arc::new(ReqwestFetch::new(
            options
                .timeout
                .unwrap_or(Duration::from_millis(constants::DEFAULT_TIMEOUT_MS)),
        )?),
    };
    let transport = Transport::new(fetch, api_key)?;
    let policy = options
        .retry_policy
        .clone()
        .unwrap_or_else(|| RetryPolicy::from_flag(options.retry));
    let origin = match &options.base_url {
        Some(base) => base.clone(),
        None => format!("https://{service_domain}.{base_domain}"),
    };

    debug!(
        "client for {origin} (max attempts {})",
        policy.max_attempts
    );
    Ok(RequestExecutor::new(transport, policy, origin))
}

/// Client for the content API (`https://{serviceDomain}.microcms.io/api/v1`).
///
/// Cheap to clone; clones share the underlying fetch primitive.
#[derive(Clone)]
pub struct ContentClient {
    pub(crate) executor: RequestExecutor,
    pub(crate) global_draft_key: Option<HeaderValue>,
    pub(crate) pagination: PaginationSettings,
}

impl ContentClient {
    /// Create a client. Fails with `CmsError::Config` if either credential is missing.
    pub fn new(service_domain: &str, api_key: &str, options: ClientOptions) -> CmsResult<Self> {
        let executor = build_executor(service_domain, api_key, constants::BASE_DOMAIN, &options)?;

        let global_draft_key = options
            .global_draft_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .map(|key| {
                HeaderValue::from_str(key).map_err(|_| {
                    CmsError::Config("globalDraftKey contains invalid header characters".into())
                })
            })
            .transpose()?;

        Ok(Self {
            executor,
            global_draft_key,
            pagination: options.pagination,
        })
    }

    /// Create a client from the configuration file sections.
    pub fn from_config(service: &ServiceConfig, pagination: &PaginationConfig) -> CmsResult<Self> {
        pagination.validate()?;
        Self::new(
            &service.service_domain,
            &service.api_key,
            ClientOptions::from_config(service, pagination),
        )
    }

    /// Base URL of the content API, e.g. "https://example.microcms.io/api/v1".
    pub fn api_root(&self) -> String {
        format!("{}/api/{}", self.executor.origin(), constants::API_VERSION_1)
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn pagination(&self) -> &PaginationSettings {
        &self.pagination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_credentials_build_client() {
        let client = ContentClient::new("serviceDomain", "apiKey", ClientOptions::new()).unwrap();
        assert_eq!(client.api_root(), "https://serviceDomain.microcms.io/api/v1");
        assert_eq!(client.executor().policy().max_attempts, 1);
    }

    #[test]
    fn test_missing_credentials_fail() {
        for (domain, key) in [("", "apiKey"), ("serviceDomain", ""), ("", ""), ("  ", "k")] {
            let err = ContentClient::new(domain, key, ClientOptions::new()).err().unwrap();
            assert!(matches!(err, CmsError::Config(_)), "{domain:?}/{key:?}");
        }
    }

    #[test]
    fn test_domain_must_be_bare() {
        let err = ContentClient::new("https://x.microcms.io", "k", ClientOptions::new())
            .err()
            .unwrap();
        assert!(matches!(err, CmsError::Config(_)));
    }

    #[test]
    fn test_retry_flag_selects_policy() {
        let client =
            ContentClient::new("d", "k", ClientOptions::new().with_retry(true)).unwrap();
        assert_eq!(client.executor().policy().max_attempts, 3);
        assert_eq!(
            client.executor().policy().min_timeout,
            Duration::from_millis(5_000)
        );
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let client = ContentClient::new(
            "d",
            "k",
            ClientOptions::new().with_base_url("http://127.0.0.1:9000/"),
        )
        .unwrap();
        assert_eq!(client.api_root(), "http://127.0.0.1:9000/api/v1");
    }

    #[test]
    fn test_from_config() {
        let service = ServiceConfig {
            service_domain: "blog".into(),
            api_key: "key".into(),
            retry: true,
            global_draft_key: Some("gdk".into()),
            ..ServiceConfig::default()
        };
        let pagination = PaginationConfig {
            requests_per_second: 5,
            ..PaginationConfig::default()
        };
        let client = ContentClient::from_config(&service, &pagination).unwrap();
        assert_eq!(client.pagination().requests_per_second, 5);
        assert!(client.global_draft_key.is_some());
        assert_eq!(client.executor().policy().max_attempts, 3);
    }
}
