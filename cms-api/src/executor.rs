//! Request executor: one logical API call with retry governance.
//!
//! Builds the target URL, sends through the `Transport`, classifies each
//! response into an [`Outcome`] and drives the [`RetryPolicy`].

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use cms_core::constants;
use cms_core::error::{is_client_error, CmsError, CmsResult};

use crate::query::{parse_query, QueryMap};
use crate::retry::{Outcome, RetryPolicy};
use crate::transport::{FetchError, FetchResponse, RequestBody, RequestInit, Transport};

/// Everything needed to issue one logical request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub api_version: &'static str,
    pub endpoint: String,
    pub content_id: Option<String>,
    pub queries: QueryMap,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl RequestSpec {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            api_version: constants::API_VERSION_1,
            endpoint: endpoint.into(),
            content_id: None,
            queries: QueryMap::new(),
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn api_version(mut self, version: &'static str) -> Self {
        self.api_version = version;
        self
    }

    pub fn content_id(mut self, content_id: Option<String>) -> Self {
        self.content_id = content_id.filter(|id| !id.is_empty());
        self
    }

    pub fn queries(mut self, queries: QueryMap) -> Self {
        self.queries = queries;
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// Join an error with its sources: reqwest's own message omits the cause.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Classify the result of one attempt.
///
/// Transport failures and 429/5xx (or any other non-2xx outside 4xx) are
/// retryable; 4xx other than 429 is terminal.
pub fn classify(result: Result<FetchResponse, FetchError>) -> Outcome<FetchResponse> {
    let response = match result {
        Ok(response) => response,
        Err(e) => return Outcome::Retryable(CmsError::Network(error_chain(e.as_ref()))),
    };

    if response.is_success() {
        return Outcome::Success(response);
    }

    let status = response.status.as_u16();
    let err = CmsError::Api {
        status,
        message: response.message(),
    };
    if is_client_error(status) {
        Outcome::Terminal(err)
    } else {
        Outcome::Retryable(err)
    }
}

/// Issues requests against one API origin.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Transport,
    policy: RetryPolicy,
    /// Scheme + host, e.g. "https://example.microcms.io".
    origin: String,
}

impl RequestExecutor {
    pub fn new(transport: Transport, policy: RetryPolicy, origin: impl Into<String>) -> Self {
        Self {
            transport,
            policy,
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// `{origin}/api/{version}/{endpoint}[/{contentId}][?{query}]`
    pub fn url(&self, spec: &RequestSpec) -> String {
        let mut url = format!("{}/api/{}/{}", self.origin, spec.api_version, spec.endpoint);
        if let Some(id) = &spec.content_id {
            url.push('/');
            url.push_str(id);
        }
        let query = parse_query(&spec.queries);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    /// Execute a request, retrying transient failures per the policy.
    pub async fn execute(&self, spec: RequestSpec) -> CmsResult<FetchResponse> {
        if spec.endpoint.is_empty() {
            return Err(CmsError::Validation("endpoint is required".into()));
        }

        let url = self.url(&spec);
        debug!("{} {}", spec.method, url);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let init = RequestInit {
                method: spec.method.clone(),
                headers: spec.headers.clone(),
                body: spec.body.clone(),
            };

            let err = match classify(self.transport.send(&url, init).await) {
                Outcome::Success(response) => return Ok(response),
                Outcome::Terminal(err) => return Err(err),
                Outcome::Retryable(err) => err,
            };

            let decision = self.policy.attempt(attempt);
            if !decision.should_retry {
                return Err(err);
            }

            warn!(
                "retrying {} {} (attempt {}/{}) after {:.1}s: {}",
                spec.method,
                spec.endpoint,
                attempt + 1,
                self.policy.max_attempts,
                decision.wait.as_secs_f64(),
                err
            );
            tokio::time::sleep(decision.wait).await;
        }
    }

    /// Execute and decode the JSON body.
    pub async fn execute_json<T: DeserializeOwned>(&self, spec: RequestSpec) -> CmsResult<T> {
        self.execute(spec).await?.json()
    }

    /// Execute and discard the body (DELETE).
    pub async fn execute_empty(&self, spec: RequestSpec) -> CmsResult<()> {
        self.execute(spec).await.map(|_| ())
    }
}
