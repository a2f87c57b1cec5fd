//! microCMS CLI - Command-line interface for the microCMS APIs.
//!
//! Reads, writes, bulk exports and media uploads against a microCMS service
//! from the terminal. Useful for scripting, migrations and debugging
//! endpoint queries.

mod commands;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{debug, info};

use cms_core::config::AppConfig;
use cms_core::error::CmsResult;
use cms_core::logging;
use cms_core::platform::Platform;

/// microCMS - headless CMS client.
#[derive(Parser)]
#[command(
    name = "cms",
    version,
    about = "microCMS API client CLI",
    long_about = "A command-line interface for the microCMS content and management APIs.\n\
                   Read and write content, export whole endpoints, and upload media."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Service domain (overrides config).
    #[arg(short, long, global = true)]
    domain: Option<String>,

    /// API key (overrides config).
    #[arg(short = 'k', long, global = true, env = "MICROCMS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Retry rate-limited, 5xx and network failures.
    #[arg(long, global = true)]
    retry: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a list endpoint record or an object endpoint.
    Get {
        /// Endpoint name.
        endpoint: String,
        /// Content id (list endpoints).
        id: Option<String>,
        #[command(flatten)]
        query: commands::QueryArgs,
    },
    /// Read one page of a list endpoint.
    List {
        /// Endpoint name.
        endpoint: String,
        #[command(flatten)]
        query: commands::QueryArgs,
    },
    /// Read an object endpoint.
    Object {
        /// Endpoint name.
        endpoint: String,
        #[command(flatten)]
        query: commands::QueryArgs,
    },
    /// Collect every content id (or another string field) of a list endpoint.
    Ids {
        #[command(flatten)]
        args: commands::bulk::IdsArgs,
    },
    /// Export every record of a list endpoint.
    Export {
        #[command(flatten)]
        args: commands::bulk::ExportArgs,
    },
    /// Create a record.
    Create {
        #[command(flatten)]
        args: commands::write::CreateArgs,
    },
    /// Update a record or an object endpoint.
    Update {
        #[command(flatten)]
        args: commands::write::UpdateArgs,
    },
    /// Delete a record.
    Delete {
        /// Endpoint name.
        endpoint: String,
        /// Content id.
        id: String,
    },
    /// Upload a local file or a remote URL to the media library.
    Upload {
        /// File path or http(s) URL.
        source: String,
        /// File name override for the uploaded media.
        #[arg(long)]
        name: Option<String>,
        /// MIME type override.
        #[arg(long)]
        mime: Option<String>,
    },
}

/// Load the configuration file, then apply command-line overrides.
fn load_config(cli: &Cli) -> CmsResult<AppConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from_file(Path::new(path))?,
        None => AppConfig::load_default()?,
    };

    if let Some(domain) = &cli.domain {
        config.service.service_domain = domain.clone();
    }
    if let Some(key) = &cli.api_key {
        config.service.api_key = key.clone();
    }
    if cli.retry {
        config.service.retry = true;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> CmsResult<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Initialize logging; fall back to stderr only if the log dir is unusable
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let log_dir = config
        .effective_log_dir()
        .unwrap_or_else(|_| PathBuf::from("logs"));
    let _guard = match logging::init_logging(&log_level, &log_dir, config.logging.json_output) {
        Ok(guard) => Some(guard),
        Err(_) => {
            logging::init_console_logging(&log_level);
            None
        }
    };

    info!("microCMS CLI v{}", cms_core::constants::APP_VERSION);
    debug!(
        "platform: {}, service domain: {}",
        Platform::current().name(),
        config.service.service_domain
    );

    // Dispatch to command handlers
    match cli.command {
        Commands::Get { endpoint, id, query } => {
            commands::contents::get(&config, endpoint, id, query, cli.format).await
        }
        Commands::List { endpoint, query } => {
            commands::contents::list(&config, endpoint, query, cli.format).await
        }
        Commands::Object { endpoint, query } => {
            commands::contents::object(&config, endpoint, query, cli.format).await
        }
        Commands::Ids { args } => commands::bulk::ids(&config, args, cli.format).await,
        Commands::Export { args } => commands::bulk::export(&config, args, cli.format).await,
        Commands::Create { args } => commands::write::create(&config, args, cli.format).await,
        Commands::Update { args } => commands::write::update(&config, args, cli.format).await,
        Commands::Delete { endpoint, id } => {
            commands::write::delete(&config, endpoint, id, cli.format).await
        }
        Commands::Upload { source, name, mime } => {
            commands::media::upload(&config, source, name, mime, cli.format).await
        }
    }
}
