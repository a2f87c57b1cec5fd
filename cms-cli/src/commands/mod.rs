//! CLI command implementations.

pub mod bulk;
pub mod contents;
pub mod media;
pub mod write;

use clap::Args;
use serde_json::Value;

use cms_api::client::{ClientOptions, ContentClient};
use cms_api::management::ManagementClient;
use cms_api::query::Queries;
use cms_core::config::AppConfig;
use cms_core::error::CmsResult;

/// Read parameters shared by the read commands.
#[derive(Debug, Clone, Default, Args)]
pub struct QueryArgs {
    /// Draft key for previewing unpublished content.
    #[arg(long)]
    pub draft_key: Option<String>,
    /// Maximum number of records.
    #[arg(short = 'n', long)]
    pub limit: Option<u32>,
    /// Number of records to skip.
    #[arg(long)]
    pub offset: Option<u32>,
    /// Sort order, e.g. "-publishedAt".
    #[arg(long)]
    pub orders: Option<String>,
    /// Fields to return (comma separated).
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,
    /// Full-text search.
    #[arg(short, long)]
    pub q: Option<String>,
    /// Reference expansion depth (1-3).
    #[arg(long)]
    pub depth: Option<u8>,
    /// Content ids to fetch (comma separated).
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<String>,
    /// Filter expression, e.g. "category[equals]news".
    #[arg(long)]
    pub filters: Option<String>,
    /// Rich editor output format (html, object).
    #[arg(long)]
    pub rich_editor_format: Option<String>,
}

impl QueryArgs {
    pub fn to_queries(&self) -> Queries {
        Queries {
            draft_key: self.draft_key.clone(),
            limit: self.limit,
            offset: self.offset,
            orders: self.orders.clone(),
            fields: non_empty(&self.fields),
            q: self.q.clone(),
            depth: self.depth,
            ids: non_empty(&self.ids),
            filters: self.filters.clone(),
            rich_editor_format: self.rich_editor_format.clone(),
        }
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

/// Helper to create a content API client from config.
pub fn create_content_client(config: &AppConfig) -> CmsResult<ContentClient> {
    ContentClient::from_config(&config.service, &config.pagination)
}

/// Helper to create a management API client from config.
pub fn create_management_client(config: &AppConfig) -> CmsResult<ManagementClient> {
    ManagementClient::new(
        &config.service.service_domain,
        &config.service.api_key,
        ClientOptions::from_config(&config.service, &config.pagination),
    )
}

/// Print a JSON value, pretty printed.
pub fn print_json(value: &Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Best human label for a record: `title`, then `name`, then "-".
pub fn record_label(record: &Value) -> String {
    ["title", "name"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
        .unwrap_or("-")
        .to_string()
}

/// Truncate a string to a maximum number of characters, appending an
/// ellipsis if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

/// Date part of an ISO-8601 timestamp.
pub fn short_date(value: Option<&Value>) -> String {
    match value.and_then(Value::as_str) {
        Some(date) if date.len() > 10 => date[..10].to_string(),
        Some(date) => date.to_string(),
        None => "-".to_string(),
    }
}
