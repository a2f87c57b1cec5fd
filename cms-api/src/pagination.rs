//! Automatic pagination over list endpoints.
//!
//! Two drivers share a `limit=0` probe for `totalCount`:
//!
//! - [`ContentClient::get_all_content_ids`] walks pages one at a time and
//!   collects a single string field per record.
//! - [`ContentClient::get_all_contents`] fetches whole records in packets of
//!   concurrent page requests, throttled between packets, and reassembles the
//!   pages in offset order.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use cms_core::error::{CmsError, CmsResult};

use crate::client::{require_endpoint, ContentClient};
use crate::endpoints::contents::GetRequest;
use crate::query::Queries;
use crate::response::ListResponse;

/// Parameters for [`ContentClient::get_all_content_ids`].
#[derive(Debug, Clone, Default)]
pub struct GetAllContentIdsRequest {
    pub endpoint: String,
    /// Field collected instead of `id`. Its values must be strings.
    pub alternate_field: Option<String>,
    pub draft_key: Option<String>,
    pub filters: Option<String>,
    pub orders: Option<String>,
}

impl GetAllContentIdsRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn alternate_field(mut self, field: impl Into<String>) -> Self {
        self.alternate_field = Some(field.into());
        self
    }

    pub fn filters(mut self, filters: impl Into<String>) -> Self {
        self.filters = Some(filters.into());
        self
    }

    pub fn orders(mut self, orders: impl Into<String>) -> Self {
        self.orders = Some(orders.into());
        self
    }

    pub fn draft_key(mut self, draft_key: impl Into<String>) -> Self {
        self.draft_key = Some(draft_key.into());
        self
    }
}

/// Parameters for [`ContentClient::get_all_contents`].
///
/// `limit` and `offset` in `queries` are ignored; the driver owns them.
#[derive(Debug, Clone, Default)]
pub struct GetAllContentsRequest {
    pub endpoint: String,
    pub queries: Queries,
}

impl GetAllContentsRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            queries: Queries::default(),
        }
    }

    pub fn queries(mut self, queries: Queries) -> Self {
        self.queries = queries;
        self
    }
}

/// Progress of the sequential collector.
#[derive(Debug)]
pub struct PaginationState<T> {
    pub offset: u32,
    pub collected: Vec<T>,
    /// Count reported by the probe.
    pub total_count: usize,
}

impl<T> PaginationState<T> {
    pub fn new(total_count: usize) -> Self {
        Self {
            offset: 0,
            collected: Vec::with_capacity(total_count),
            total_count,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.collected.len() >= self.total_count
    }
}

/// Accumulator folded across the packets of the batch collector.
struct BatchState<T> {
    /// Completion time of the previous packet; `None` before the first one.
    last_end: Option<Instant>,
    /// Page contents indexed by page number.
    pages: Vec<Option<Vec<T>>>,
}

/// Wait before dispatching the next packet.
///
/// Zero for the first packet, otherwise whatever remains of `interval`
/// measured from the end of the previous packet.
pub fn throttle_delay(last_end: Option<Instant>, interval: Duration, now: Instant) -> Duration {
    match last_end {
        None => Duration::ZERO,
        Some(end) => (end + interval).saturating_duration_since(now),
    }
}

/// Number of pages needed to cover `total` records.
pub fn page_count(total: usize, page_size: u32) -> usize {
    let size = page_size.max(1) as usize;
    total.div_ceil(size)
}

/// Split page indices into packets of at most `per_packet` pages.
pub fn plan_packets(pages: usize, per_packet: usize) -> Vec<Vec<usize>> {
    (0..pages)
        .collect::<Vec<_>>()
        .chunks(per_packet.max(1))
        .map(<[usize]>::to_vec)
        .collect()
}

/// Body of the `limit=0` count request. Unlike data pages the count is required.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TotalCount {
    total_count: usize,
}

fn extract_field(record: &Value, field: &str) -> CmsResult<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CmsError::FieldType(field.to_string()))
}

impl ContentClient {
    /// Ask the list endpoint how many records match, without fetching any.
    async fn probe_total_count(&self, endpoint: &str, queries: &Queries) -> CmsResult<usize> {
        let probe = Queries {
            limit: Some(0),
            offset: None,
            fields: None,
            ..queries.clone()
        };
        let response: TotalCount = self
            .get(GetRequest::new(endpoint).queries(probe))
            .await?;
        debug!("{endpoint}: totalCount {}", response.total_count);
        Ok(response.total_count)
    }

    /// Collect one string field (default `id`) from every record of a list endpoint.
    ///
    /// Pages are requested strictly one after another, pausing between them.
    pub async fn get_all_content_ids(
        &self,
        request: GetAllContentIdsRequest,
    ) -> CmsResult<Vec<String>> {
        require_endpoint(&request.endpoint)?;
        let field = request.alternate_field.as_deref().unwrap_or("id");
        let page_size = self.pagination.page_size;

        let base = Queries {
            draft_key: request.draft_key.clone(),
            filters: request.filters.clone(),
            orders: request.orders.clone(),
            ..Queries::default()
        };
        let total = self.probe_total_count(&request.endpoint, &base).await?;
        info!(
            "collecting `{field}` of {total} records from {} ({} pages)",
            request.endpoint,
            page_count(total, page_size)
        );

        let mut state = PaginationState::new(total);
        while !state.is_complete() {
            if state.offset > 0 {
                tokio::time::sleep(self.pagination.page_delay).await;
            }

            let queries = Queries {
                limit: Some(page_size),
                offset: Some(state.offset),
                fields: Some(vec![field.to_string()]),
                ..base.clone()
            };
            let page: ListResponse<Value> = self
                .get_list(GetRequest::new(request.endpoint.clone()).queries(queries))
                .await?;

            if page.contents.is_empty() {
                warn!(
                    "{}: empty page at offset {} with {}/{} collected; stopping",
                    request.endpoint,
                    state.offset,
                    state.collected.len(),
                    state.total_count
                );
                break;
            }

            let remaining = state.total_count - state.collected.len();
            for record in page.contents.iter().take(remaining) {
                state.collected.push(extract_field(record, field)?);
            }
            state.offset += page_size;
        }

        Ok(state.collected)
    }

    /// Collect every record of a list endpoint.
    ///
    /// Pages are fetched in packets of `requests_per_second` concurrent
    /// requests; consecutive packets are separated by at least
    /// `packet_interval`, measured from the end of the previous packet.
    /// Any page failure aborts the whole collection.
    pub async fn get_all_contents<T>(&self, request: GetAllContentsRequest) -> CmsResult<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        require_endpoint(&request.endpoint)?;
        request.queries.validate()?;

        let total = self
            .probe_total_count(&request.endpoint, &request.queries)
            .await?;
        let pages = page_count(total, self.pagination.page_size);
        let packets = plan_packets(pages, self.pagination.requests_per_second);
        info!(
            "collecting {total} records from {} ({pages} pages in {} packets)",
            request.endpoint,
            packets.len()
        );

        let mut state = BatchState {
            last_end: None,
            pages: (0..pages).map(|_| None).collect(),
        };
        for packet in packets {
            state = self.run_packet(&request, packet, state).await?;
        }

        let mut contents: Vec<T> = state.pages.into_iter().flatten().flatten().collect();
        contents.truncate(total);
        Ok(contents)
    }

    /// Throttle, fetch one packet of pages concurrently, and fold the result
    /// into the accumulator.
    async fn run_packet<T>(
        &self,
        request: &GetAllContentsRequest,
        packet: Vec<usize>,
        mut state: BatchState<T>,
    ) -> CmsResult<BatchState<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let wait = throttle_delay(
            state.last_end,
            self.pagination.packet_interval,
            Instant::now(),
        );
        if !wait.is_zero() {
            debug!("throttling next packet for {:.3}s", wait.as_secs_f64());
            tokio::time::sleep(wait).await;
        }

        let page_size = self.pagination.page_size;
        let mut tasks = JoinSet::new();
        for index in packet {
            let client = self.clone();
            let queries = Queries {
                limit: Some(page_size),
                offset: Some(index as u32 * page_size),
                ..request.queries.clone()
            };
            let get = GetRequest::new(request.endpoint.clone()).queries(queries);
            tasks.spawn(async move { (index, client.get_list::<T>(get).await) });
        }

        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined.map_err(|e| CmsError::Other(anyhow::Error::new(e)))?;
            let page = result?;
            debug!("page {index} returned {} records", page.contents.len());
            state.pages[index] = Some(page.contents);
        }

        state.last_end = Some(Instant::now());
        Ok(state)
    }
}
