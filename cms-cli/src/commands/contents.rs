//! Read commands: get, list, object.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;
use serde_json::Value;

use cms_api::endpoints::contents::GetRequest;
use cms_api::response::ListResponse;
use cms_core::config::AppConfig;
use cms_core::error::CmsResult;

use super::QueryArgs;
use crate::OutputFormat;

fn print_record(title: &str, record: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => super::print_json(record),
        OutputFormat::Text => {
            println!("{}", style(title).bold().underlined());
            match record.as_object() {
                Some(fields) => {
                    for (key, value) in fields {
                        let rendered = match value {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        println!("  {:<14} {}", format!("{key}:"), super::truncate(&rendered, 80));
                    }
                }
                None => println!("  {record}"),
            }
        }
    }
}

pub async fn get(
    config: &AppConfig,
    endpoint: String,
    id: Option<String>,
    query: QueryArgs,
    format: OutputFormat,
) -> CmsResult<()> {
    let client = super::create_content_client(config)?;
    let mut request = GetRequest::new(endpoint.clone()).queries(query.to_queries());
    if let Some(id) = &id {
        request = request.content_id(id.clone());
    }

    let record: Value = client.get(request).await?;
    let title = match id {
        Some(id) => format!("{endpoint}/{id}"),
        None => endpoint,
    };
    print_record(&title, &record, format);
    Ok(())
}

pub async fn list(
    config: &AppConfig,
    endpoint: String,
    query: QueryArgs,
    format: OutputFormat,
) -> CmsResult<()> {
    let client = super::create_content_client(config)?;
    let page: ListResponse<Value> = client
        .get_list(GetRequest::new(endpoint.clone()).queries(query.to_queries()))
        .await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_value(&page)?;
            super::print_json(&json);
        }
        OutputFormat::Text => {
            if page.contents.is_empty() {
                println!("No contents found in {endpoint}.");
                return Ok(());
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["ID", "Title", "Published", "Updated"]);

            for record in &page.contents {
                let id = record.get("id").and_then(Value::as_str).unwrap_or("-");
                table.add_row(vec![
                    id.to_string(),
                    super::truncate(&super::record_label(record), 40),
                    super::short_date(record.get("publishedAt")),
                    super::short_date(record.get("updatedAt")),
                ]);
            }

            println!("{table}");
            println!(
                "\nShowing {}-{} of {} ({})",
                page.offset + 1,
                page.offset + page.contents.len(),
                page.total_count,
                endpoint
            );
        }
    }
    Ok(())
}

pub async fn object(
    config: &AppConfig,
    endpoint: String,
    query: QueryArgs,
    format: OutputFormat,
) -> CmsResult<()> {
    let client = super::create_content_client(config)?;
    let record: Value = client
        .get_object(GetRequest::new(endpoint.clone()).queries(query.to_queries()))
        .await?;
    print_record(&endpoint, &record, format);
    Ok(())
}
