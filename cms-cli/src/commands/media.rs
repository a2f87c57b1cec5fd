//! Media upload command.

use std::path::PathBuf;

use console::style;

use cms_api::management::MediaSource;
use cms_core::config::AppConfig;
use cms_core::error::{CmsError, CmsResult};

use crate::OutputFormat;

/// Interpret a command-line source as a URL, or a local path.
fn media_source(source: String, name: Option<String>, mime: Option<String>) -> CmsResult<MediaSource> {
    let is_url = source.starts_with("http://") || source.starts_with("https://");
    match (is_url, name) {
        (true, None) => Ok(MediaSource::Url(source)),
        (false, None) if mime.is_none() => Ok(MediaSource::File(PathBuf::from(source))),
        (false, name) => {
            let path = PathBuf::from(&source);
            let name = name
                .or_else(|| {
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .map(str::to_string)
                })
                .unwrap_or_default();
            Ok(MediaSource::Bytes {
                data: std::fs::read(&path)?,
                name,
                mime,
            })
        }
        (true, Some(_)) => Err(CmsError::Validation(
            "--name cannot be combined with a URL source".into(),
        )),
    }
}

pub async fn upload(
    config: &AppConfig,
    source: String,
    name: Option<String>,
    mime: Option<String>,
    format: OutputFormat,
) -> CmsResult<()> {
    let client = super::create_management_client(config)?;
    let media = media_source(source, name, mime)?;

    let uploaded = client.upload_media(media).await?;
    match format {
        OutputFormat::Json => super::print_json(&serde_json::json!({ "url": uploaded.url })),
        OutputFormat::Text => println!("{} Uploaded {}", style("✓").green(), uploaded.url),
    }
    Ok(())
}
