//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cms_api::client::{ClientOptions, ContentClient, PaginationSettings};
use cms_api::retry::RetryPolicy;
use cms_api::transport::{Fetch, FetchError, FetchResponse, RequestInit};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tokio::time::Instant;

/// A request seen by [`RecordingFetch`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    /// Time the request was issued (tokio clock, so it follows paused time).
    pub at: Instant,
}

/// A canned reply, optionally delayed.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub body: Value,
    pub delay: Duration,
}

impl MockReply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: json!({ "message": format!("status {status}") }),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Handler = dyn Fn(&str, usize) -> MockReply + Send + Sync;

/// In-process `Fetch` that records every request and answers from a closure.
///
/// The closure receives the URL and the zero-based call index.
pub struct RecordingFetch {
    handler: Box<Handler>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingFetch {
    pub fn new(handler: impl Fn(&str, usize) -> MockReply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetch for RecordingFetch {
    async fn fetch(&self, url: &str, init: RequestInit) -> Result<FetchResponse, FetchError> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(RecordedRequest {
                url: url.to_string(),
                method: init.method.clone(),
                headers: init.headers.clone(),
                at: Instant::now(),
            });
            requests.len() - 1
        };

        let reply = (self.handler)(url, index);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        let status = StatusCode::from_u16(reply.status)?;
        Ok(FetchResponse::from_json(status, &reply.body))
    }
}

/// Raw value of a query parameter in a URL.
pub fn query_param(url: &str, key: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
}

/// Offset of a page request, 0 when absent.
pub fn offset_of(url: &str) -> usize {
    query_param(url, "offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Retry policy with the production attempt count but millisecond waits.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::enabled().with_min_timeout(Duration::from_millis(10))
}

/// Content client pointed at a wiremock server.
pub fn client_for(server_uri: &str, options: ClientOptions) -> ContentClient {
    ContentClient::new("serviceDomain", "apiKey", options.with_base_url(server_uri))
        .expect("failed to build test client")
}

/// Content client backed by a recording fetch.
pub fn recording_client(fetch: Arc<RecordingFetch>, pagination: PaginationSettings) -> ContentClient {
    ContentClient::new(
        "serviceDomain",
        "apiKey",
        ClientOptions::new()
            .with_custom_fetch(fetch)
            .with_pagination(pagination),
    )
    .expect("failed to build test client")
}

/// Pagination pacing with the given page size and packet width.
pub fn pacing(page_size: u32, requests_per_second: usize) -> PaginationSettings {
    PaginationSettings {
        page_size,
        requests_per_second,
        ..PaginationSettings::default()
    }
}

/// Records `{ "id": "id{n}" }` for `n` in `range`.
pub fn records(range: std::ops::Range<usize>) -> Vec<Value> {
    range.map(|n| json!({ "id": format!("id{n}") })).collect()
}

/// Reply for a list endpoint holding `total` records.
///
/// A `limit=0` probe gets only `totalCount`; data pages omit it.
pub fn list_reply(url: &str, total: usize) -> MockReply {
    let limit: usize = query_param(url, "limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);
    if limit == 0 {
        return MockReply::ok(json!({ "totalCount": total }));
    }
    let offset = offset_of(url);
    let end = (offset + limit).min(total);
    MockReply::ok(json!({ "contents": records(offset.min(end)..end) }))
}
