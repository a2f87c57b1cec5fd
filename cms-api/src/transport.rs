//! Pluggable fetch primitive and the authenticating transport around it.
//!
//! `Fetch` is the seam where callers plug in their own HTTP stack. The
//! `Transport` decorates any `Fetch` with the API key header and does nothing
//! else: no retry, no status interpretation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use cms_core::constants;
use cms_core::error::{CmsError, CmsResult};

/// Error produced by a fetch primitive. Propagated unchanged by `Transport`.
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// A file to send as a single multipart part.
///
/// Kept as plain data so the form can be rebuilt for every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPart {
    /// Form field name.
    pub field: String,
    /// File name announced in the part's content disposition.
    pub file_name: String,
    /// MIME type of the part.
    pub mime: String,
    /// Raw file contents.
    pub data: Vec<u8>,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Pre-encoded JSON document.
    Json(Vec<u8>),
    /// One-part multipart form.
    Multipart(MediaPart),
}

/// Per-request options handed to the fetch primitive.
#[derive(Debug, Clone)]
pub struct RequestInit {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl RequestInit {
    /// Options for a bodiless request with the given method.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Options for a plain GET.
    pub fn get() -> Self {
        Self::new(Method::GET)
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

impl FetchResponse {
    /// Build a response from a status and raw body.
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Build a JSON response. Handy for custom `Fetch` implementations.
    pub fn from_json(status: StatusCode, value: &serde_json::Value) -> Self {
        let mut response = Self::new(status, value.to_string().into_bytes());
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }

    /// Whether the status is in the 200-299 range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> CmsResult<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| CmsError::Serialization(format!("failed to parse response: {e}")))
    }

    /// The `message` field of a JSON body, if there is one.
    pub fn message(&self) -> Option<String> {
        serde_json::from_slice::<MessageBody>(&self.body)
            .ok()
            .and_then(|b| b.message)
    }

    /// The `Content-Type` header value without parameters.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim())
    }
}

/// A fetch-compatible HTTP primitive: `(url, init) -> response`.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, init: RequestInit) -> Result<FetchResponse, FetchError>;
}

/// Default fetch primitive backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    inner: Client,
}

impl ReqwestFetch {
    /// Build a reqwest-backed fetch with the given request timeout.
    pub fn new(timeout: Duration) -> CmsResult<Self> {
        let inner = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(15))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .user_agent(format!(
                "{}-rust/{}",
                constants::APP_NAME,
                constants::APP_VERSION
            ))
            .build()
            .map_err(|e| CmsError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { inner })
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(inner: Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Fetch for ReqwestFetch {
    async fn fetch(&self, url: &str, init: RequestInit) -> Result<FetchResponse, FetchError> {
        let mut builder = self.inner.request(init.method, url).headers(init.headers);

        builder = match init.body {
            Some(RequestBody::Json(bytes)) => builder.body(bytes),
            Some(RequestBody::Multipart(part)) => {
                let file_part = reqwest::multipart::Part::bytes(part.data)
                    .file_name(part.file_name)
                    .mime_str(&part.mime)?;
                builder.multipart(reqwest::multipart::Form::new().part(part.field, file_part))
            }
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(FetchResponse {
            status,
            headers,
            body,
        })
    }
}

/// Decorator that guarantees the API key header is present exactly once.
#[derive(Clone)]
pub struct Transport {
    inner: Arc<dyn Fetch>,
    api_key: HeaderValue,
}

impl Transport {
    /// Wrap a fetch primitive. Fails if the key cannot be sent as a header.
    pub fn new(inner: Arc<dyn Fetch>, api_key: &str) -> CmsResult<Self> {
        let mut api_key = HeaderValue::from_str(api_key)
            .map_err(|_| CmsError::Config("apiKey contains invalid header characters".into()))?;
        api_key.set_sensitive(true);
        Ok(Self { inner, api_key })
    }

    /// Send a request, inserting the API key unless the caller already set one.
    pub async fn send(&self, url: &str, mut init: RequestInit) -> Result<FetchResponse, FetchError> {
        let key_header = HeaderName::from_static(constants::API_KEY_HEADER);
        if !init.headers.contains_key(&key_header) {
            init.headers.insert(key_header, self.api_key.clone());
        }
        self.inner.fetch(url, init).await
    }

    /// The undecorated fetch primitive, for requests that must not carry the key.
    pub fn unauthenticated(&self) -> Arc<dyn Fetch> {
        Arc::clone(&self.inner)
    }
}
