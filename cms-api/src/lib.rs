//! microCMS API - HTTP client for the microCMS content and management APIs.
//!
//! This crate provides typed reads and writes against list and object
//! endpoints, automatic pagination (sequential id collection and
//! rate-limited batch collection), and media upload. Requests go through a
//! pluggable [`Fetch`] primitive, an authenticating [`Transport`], and a
//! [`RequestExecutor`] that classifies responses and retries transient
//! failures.

pub mod client;
pub mod endpoints;
pub mod executor;
pub mod management;
pub mod pagination;
pub mod query;
pub mod response;
pub mod retry;
pub mod transport;

// Re-export key types
pub use client::{ClientOptions, ContentClient, PaginationSettings};
pub use endpoints::contents::{
    CreateRequest, DeleteRequest, GetListRequest, GetObjectRequest, GetRequest, UpdateRequest,
};
pub use executor::{RequestExecutor, RequestSpec};
pub use management::{ManagementClient, MediaSource};
pub use pagination::{GetAllContentIdsRequest, GetAllContentsRequest};
pub use query::{parse_query, Queries, QueryMap, QueryValue};
pub use response::{Content, ContentDates, Image, ListResponse, MediaResponse, ObjectContent, WriteResponse};
pub use retry::{Outcome, RetryDecision, RetryPolicy};
pub use transport::{Fetch, FetchError, FetchResponse, ReqwestFetch, RequestBody, RequestInit, Transport};
