//! Bulk commands: collect every id, export every record.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use serde_json::Value;
use tracing::info;

use cms_api::pagination::{GetAllContentIdsRequest, GetAllContentsRequest};
use cms_core::config::AppConfig;
use cms_core::error::CmsResult;

use super::QueryArgs;
use crate::OutputFormat;

#[derive(Debug, Args)]
pub struct IdsArgs {
    /// Endpoint name.
    pub endpoint: String,
    /// Collect this string field instead of `id`.
    #[arg(long)]
    pub field: Option<String>,
    /// Filter expression.
    #[arg(long)]
    pub filters: Option<String>,
    /// Sort order.
    #[arg(long)]
    pub orders: Option<String>,
    /// Draft key for previewing unpublished content.
    #[arg(long)]
    pub draft_key: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Endpoint name.
    pub endpoint: String,
    /// Write the records to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Read parameters; `--limit` and `--offset` are managed by the exporter.
    #[command(flatten)]
    pub query: QueryArgs,
}

pub async fn ids(config: &AppConfig, args: IdsArgs, format: OutputFormat) -> CmsResult<()> {
    let client = super::create_content_client(config)?;

    let mut request = GetAllContentIdsRequest::new(args.endpoint);
    request.alternate_field = args.field;
    request.filters = args.filters;
    request.orders = args.orders;
    request.draft_key = args.draft_key;

    let ids = client.get_all_content_ids(request).await?;
    match format {
        OutputFormat::Json => super::print_json(&Value::from(ids)),
        OutputFormat::Text => {
            for id in &ids {
                println!("{id}");
            }
            eprintln!("{}", style(format!("{} ids", ids.len())).dim());
        }
    }
    Ok(())
}

pub async fn export(config: &AppConfig, args: ExportArgs, format: OutputFormat) -> CmsResult<()> {
    let client = super::create_content_client(config)?;
    let started = Instant::now();

    let request = GetAllContentsRequest::new(args.endpoint.clone()).queries(args.query.to_queries());
    let records: Vec<Value> = client.get_all_contents(request).await?;
    let count = records.len();
    let json = Value::from(records);

    match args.output {
        Some(path) => {
            std::fs::write(&path, serde_json::to_vec_pretty(&json)?)?;
            info!("exported {count} records from {} to {}", args.endpoint, path.display());
            match format {
                OutputFormat::Json => super::print_json(&serde_json::json!({
                    "endpoint": args.endpoint,
                    "count": count,
                    "output": path.display().to_string(),
                })),
                OutputFormat::Text => println!(
                    "{} Exported {} records from {} to {} in {:.1}s",
                    style("✓").green(),
                    count,
                    args.endpoint,
                    path.display(),
                    started.elapsed().as_secs_f64()
                ),
            }
        }
        None => super::print_json(&json),
    }
    Ok(())
}
