//! Content endpoints: reads, writes, and deletes against list and object APIs.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use cms_core::constants;
use cms_core::error::{CmsError, CmsResult};

use crate::client::{require_endpoint, ContentClient};
use crate::executor::RequestSpec;
use crate::query::{QueryMap, Queries};
use crate::response::{ListResponse, WriteResponse};
use crate::transport::RequestBody;

/// Parameters for a read.
#[derive(Debug, Clone)]
pub struct GetRequest {
    pub endpoint: String,
    pub content_id: Option<String>,
    pub queries: Queries,
    /// Extra headers sent with the read. A caller-supplied API key wins.
    pub custom_headers: HeaderMap,
    /// Send the client's global draft key, if it has one.
    pub use_global_draft_key: bool,
}

impl GetRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            content_id: None,
            queries: Queries::default(),
            custom_headers: HeaderMap::new(),
            use_global_draft_key: true,
        }
    }

    pub fn content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    pub fn queries(mut self, queries: Queries) -> Self {
        self.queries = queries;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.custom_headers.insert(name, value);
        self
    }

    pub fn without_global_draft_key(mut self) -> Self {
        self.use_global_draft_key = false;
        self
    }
}

/// List and object reads take the same parameters minus the content id.
pub type GetListRequest = GetRequest;
pub type GetObjectRequest = GetRequest;

/// Parameters for `create`.
#[derive(Debug, Clone)]
pub struct CreateRequest<T> {
    pub endpoint: String,
    /// When set the record is created with this id (PUT).
    pub content_id: Option<String>,
    pub content: T,
    /// Save as a draft instead of publishing.
    pub is_draft: bool,
}

impl<T> CreateRequest<T> {
    pub fn new(endpoint: impl Into<String>, content: T) -> Self {
        Self {
            endpoint: endpoint.into(),
            content_id: None,
            content,
            is_draft: false,
        }
    }

    pub fn content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    pub fn draft(mut self, is_draft: bool) -> Self {
        self.is_draft = is_draft;
        self
    }
}

/// Parameters for `update`. Object endpoints have no content id.
#[derive(Debug, Clone)]
pub struct UpdateRequest<T> {
    pub endpoint: String,
    pub content_id: Option<String>,
    pub content: T,
}

impl<T> UpdateRequest<T> {
    pub fn new(endpoint: impl Into<String>, content: T) -> Self {
        Self {
            endpoint: endpoint.into(),
            content_id: None,
            content,
        }
    }

    pub fn content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }
}

/// Parameters for `delete`.
#[derive(Debug, Clone)]
pub struct DeleteRequest {
    pub endpoint: String,
    pub content_id: String,
}

impl DeleteRequest {
    pub fn new(endpoint: impl Into<String>, content_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            content_id: content_id.into(),
        }
    }
}

fn json_body<T: Serialize>(content: &T) -> CmsResult<RequestBody> {
    Ok(RequestBody::Json(serde_json::to_vec(content)?))
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

impl ContentClient {
    /// Build the `RequestSpec` shared by every read.
    fn read_spec(&self, request: &GetRequest) -> CmsResult<RequestSpec> {
        require_endpoint(&request.endpoint)?;
        request.queries.validate()?;

        let mut headers = request.custom_headers.clone();
        if request.use_global_draft_key {
            if let Some(key) = &self.global_draft_key {
                let name = HeaderName::from_static(constants::GLOBAL_DRAFT_KEY_HEADER);
                if !headers.contains_key(&name) {
                    headers.insert(name, key.clone());
                }
            }
        }

        Ok(RequestSpec::new(Method::GET, request.endpoint.clone())
            .content_id(request.content_id.clone())
            .queries(request.queries.to_query_map())
            .headers(headers))
    }

    /// Read a list or object endpoint, optionally one record of a list.
    pub async fn get<T: DeserializeOwned>(&self, request: GetRequest) -> CmsResult<T> {
        let spec = self.read_spec(&request)?;
        self.executor.execute_json(spec).await
    }

    /// Read one page of a list endpoint.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        request: GetListRequest,
    ) -> CmsResult<ListResponse<T>> {
        let spec = self.read_spec(&request)?.content_id(None);
        self.executor.execute_json(spec).await
    }

    /// Read one record of a list endpoint.
    pub async fn get_list_detail<T: DeserializeOwned>(&self, request: GetRequest) -> CmsResult<T> {
        require_endpoint(&request.endpoint)?;
        if request.content_id.as_deref().map_or(true, str::is_empty) {
            return Err(CmsError::Validation("contentId is required".into()));
        }
        self.get(request).await
    }

    /// Read an object endpoint.
    pub async fn get_object<T: DeserializeOwned>(&self, request: GetObjectRequest) -> CmsResult<T> {
        let spec = self.read_spec(&request)?.content_id(None);
        self.executor.execute_json(spec).await
    }

    /// Create a record: POST without an id, PUT with one.
    pub async fn create<T: Serialize>(&self, request: CreateRequest<T>) -> CmsResult<WriteResponse> {
        require_endpoint(&request.endpoint)?;

        let method = match request.content_id.as_deref() {
            Some(id) if !id.is_empty() => Method::PUT,
            _ => Method::POST,
        };
        let mut queries = QueryMap::new();
        if request.is_draft {
            queries.insert("status", "draft");
        }

        let spec = RequestSpec::new(method, request.endpoint.clone())
            .content_id(request.content_id)
            .queries(queries)
            .headers(json_headers())
            .body(json_body(&request.content)?);
        let created: WriteResponse = self.executor.execute_json(spec).await?;
        info!("created {}/{}", request.endpoint, created.id);
        Ok(created)
    }

    /// Partially update a record, or the record of an object endpoint.
    pub async fn update<T: Serialize>(&self, request: UpdateRequest<T>) -> CmsResult<WriteResponse> {
        require_endpoint(&request.endpoint)?;

        let spec = RequestSpec::new(Method::PATCH, request.endpoint.clone())
            .content_id(request.content_id)
            .headers(json_headers())
            .body(json_body(&request.content)?);
        let updated: WriteResponse = self.executor.execute_json(spec).await?;
        info!("updated {}/{}", request.endpoint, updated.id);
        Ok(updated)
    }

    /// Delete a record. The service answers 202 with an empty body.
    pub async fn delete(&self, request: DeleteRequest) -> CmsResult<()> {
        require_endpoint(&request.endpoint)?;
        if request.content_id.is_empty() {
            return Err(CmsError::Validation("contentId is required".into()));
        }

        let spec = RequestSpec::new(Method::DELETE, request.endpoint.clone())
            .content_id(Some(request.content_id.clone()));
        self.executor.execute_empty(spec).await?;
        info!("deleted {}/{}", request.endpoint, request.content_id);
        Ok(())
    }
}
