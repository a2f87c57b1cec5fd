//! Management API client (`https://{serviceDomain}.microcms-management.io`).
//!
//! Shares the request pipeline with the content client, retry included.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info};

use cms_core::constants;
use cms_core::error::{CmsError, CmsResult};

use crate::client::{build_executor, ClientOptions};
use crate::executor::{classify, RequestExecutor, RequestSpec};
use crate::response::MediaResponse;
use crate::retry::Outcome;
use crate::transport::{Fetch, MediaPart, RequestBody, RequestInit};

/// A file to upload to the media library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// In-memory data. The MIME type is guessed from `name` when absent.
    Bytes {
        data: Vec<u8>,
        name: String,
        mime: Option<String>,
    },
    /// A local file, named after its file name.
    File(PathBuf),
    /// A remote file, downloaded first and named after the last path segment.
    Url(String),
}

fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Reject a MIME type the multipart encoder would refuse.
fn validate_mime(mime: &str) -> CmsResult<()> {
    mime.parse::<mime_guess::mime::Mime>()
        .map(|_| ())
        .map_err(|e| CmsError::Validation(format!("invalid MIME type `{mime}`: {e}")))
}

/// Last non-empty path segment of a URL, ignoring query and fragment.
fn file_name_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path.split_once("://").map_or(path, |(_, rest)| rest);
    let (_, path) = path.split_once('/')?;
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Client for the management API.
#[derive(Clone)]
pub struct ManagementClient {
    executor: RequestExecutor,
    /// Fetch primitive without the API key, for third-party downloads.
    download: Arc<dyn Fetch>,
}

impl ManagementClient {
    /// Create a client. Fails with `CmsError::Config` if either credential is missing.
    pub fn new(service_domain: &str, api_key: &str, options: ClientOptions) -> CmsResult<Self> {
        let executor = build_executor(
            service_domain,
            api_key,
            constants::BASE_MANAGEMENT_DOMAIN,
            &options,
        )?;
        let download = executor.transport().unauthenticated();
        Ok(Self { executor, download })
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Upload a file to the media library and return its public URL.
    pub async fn upload_media(&self, source: MediaSource) -> CmsResult<MediaResponse> {
        let part = self.media_part(source).await?;
        debug!(
            "uploading {} ({}, {} bytes)",
            part.file_name,
            part.mime,
            part.data.len()
        );

        let spec = RequestSpec::new(Method::POST, "media")
            .api_version(constants::API_VERSION_1)
            .body(RequestBody::Multipart(part));
        let uploaded: MediaResponse = self.executor.execute_json(spec).await?;
        info!("uploaded media to {}", uploaded.url);
        Ok(uploaded)
    }

    async fn media_part(&self, source: MediaSource) -> CmsResult<MediaPart> {
        let (data, file_name, mime) = match source {
            MediaSource::Bytes { data, name, mime } => {
                if name.is_empty() {
                    return Err(CmsError::Validation(
                        "name is required when data is bytes".into(),
                    ));
                }
                let mime = mime.unwrap_or_else(|| guess_mime(&name));
                (data, name, mime)
            }
            MediaSource::File(path) => {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        CmsError::Validation(format!(
                            "cannot derive a file name from {}",
                            path.display()
                        ))
                    })?;
                let data = tokio::fs::read(&path).await?;
                let mime = guess_mime(&name);
                (data, name, mime)
            }
            MediaSource::Url(url) => self.download(&url).await?,
        };

        validate_mime(&mime)?;
        Ok(MediaPart {
            field: "file".into(),
            file_name,
            mime,
            data,
        })
    }

    /// Fetch a remote file without the API key.
    async fn download(&self, url: &str) -> CmsResult<(Vec<u8>, String, String)> {
        let name = file_name_from_url(url).ok_or_else(|| {
            CmsError::Validation(format!("cannot derive a file name from {url}"))
        })?;

        debug!("downloading {url}");
        let response = match classify(self.download.fetch(url, RequestInit::get()).await) {
            Outcome::Success(response) => response,
            Outcome::Terminal(err) | Outcome::Retryable(err) => return Err(err),
        };
        let mime = response
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| guess_mime(&name));
        Ok((response.body, name, mime))
    }
}
