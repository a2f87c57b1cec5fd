//! Write commands: create, update, delete.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde_json::Value;

use cms_api::endpoints::contents::{CreateRequest, DeleteRequest, UpdateRequest};
use cms_api::response::WriteResponse;
use cms_core::config::AppConfig;
use cms_core::error::{CmsError, CmsResult};

use crate::OutputFormat;

/// Where the JSON content comes from.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct Payload {
    /// Content as an inline JSON object.
    #[arg(long)]
    pub data: Option<String>,
    /// Read the content from a JSON file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl Payload {
    fn load(&self) -> CmsResult<Value> {
        let raw = match (&self.data, &self.file) {
            (Some(data), _) => data.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => {
                return Err(CmsError::Validation("--data or --file is required".into()))
            }
        };
        let value: Value = serde_json::from_str(&raw)?;
        if !value.is_object() {
            return Err(CmsError::Validation("content must be a JSON object".into()));
        }
        Ok(value)
    }
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Endpoint name.
    pub endpoint: String,
    /// Create with this content id (PUT) instead of a generated one.
    #[arg(long)]
    pub id: Option<String>,
    /// Save as a draft.
    #[arg(long)]
    pub draft: bool,
    #[command(flatten)]
    pub payload: Payload,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Endpoint name.
    pub endpoint: String,
    /// Content id (omit for object endpoints).
    #[arg(long)]
    pub id: Option<String>,
    #[command(flatten)]
    pub payload: Payload,
}

fn print_written(action: &str, endpoint: &str, written: &WriteResponse, format: OutputFormat) {
    match format {
        OutputFormat::Json => super::print_json(&serde_json::json!({ "id": written.id })),
        OutputFormat::Text => {
            println!("{} {action} {endpoint}/{}", style("✓").green(), written.id)
        }
    }
}

pub async fn create(config: &AppConfig, args: CreateArgs, format: OutputFormat) -> CmsResult<()> {
    let client = super::create_content_client(config)?;
    let content = args.payload.load()?;

    let mut request = CreateRequest::new(args.endpoint.clone(), content).draft(args.draft);
    if let Some(id) = args.id {
        request = request.content_id(id);
    }

    let created = client.create(request).await?;
    let action = if args.draft { "Drafted" } else { "Created" };
    print_written(action, &args.endpoint, &created, format);
    Ok(())
}

pub async fn update(config: &AppConfig, args: UpdateArgs, format: OutputFormat) -> CmsResult<()> {
    let client = super::create_content_client(config)?;
    let content = args.payload.load()?;

    let mut request = UpdateRequest::new(args.endpoint.clone(), content);
    if let Some(id) = args.id {
        request = request.content_id(id);
    }

    let updated = client.update(request).await?;
    print_written("Updated", &args.endpoint, &updated, format);
    Ok(())
}

pub async fn delete(
    config: &AppConfig,
    endpoint: String,
    id: String,
    format: OutputFormat,
) -> CmsResult<()> {
    let client = super::create_content_client(config)?;
    client
        .delete(DeleteRequest::new(endpoint.clone(), id.clone()))
        .await?;

    match format {
        OutputFormat::Json => super::print_json(&serde_json::json!({ "deleted": id })),
        OutputFormat::Text => println!("{} Deleted {endpoint}/{id}", style("✓").green()),
    }
    Ok(())
}
