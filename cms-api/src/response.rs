//! Response types returned by the content and management APIs.

use serde::{Deserialize, Serialize};

/// List endpoint response.
///
/// ```json
/// { "contents": [ ... ], "totalCount": 1, "offset": 0, "limit": 10 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T = serde_json::Value> {
    #[serde(default = "Vec::new")]
    pub contents: Vec<T>,
    /// Records matching the query, across all pages.
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
}

/// Timestamps common to every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDates {
    pub created_at: String,
    pub updated_at: String,
    /// Absent on records that were never published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_at: Option<String>,
}

/// A record of a list endpoint: id, timestamps, and the schema fields `T`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content<T> {
    pub id: String,
    #[serde(flatten)]
    pub dates: ContentDates,
    #[serde(flatten)]
    pub fields: T,
}

/// The single record of an object endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectContent<T> {
    #[serde(flatten)]
    pub dates: ContentDates,
    #[serde(flatten)]
    pub fields: T,
}

/// Body returned by create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResponse {
    pub id: String,
}

/// Body returned by a media upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaResponse {
    pub url: String,
}

/// Image field as stored in a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}
