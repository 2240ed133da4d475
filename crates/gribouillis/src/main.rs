use anyhow::{Context, Result};
use bounded_file_store::{BoundedStore, QuotaPolicy};
use bytesize::ByteSize;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gribouillis::{config::Config, web::WebServer};

#[derive(Parser)]
#[command(name = "gribouillis")]
#[command(version)]
#[command(about = "Collect drawings as padded PNGs in a size-capped directory")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "gribouillis.toml")]
    config: PathBuf,

    /// Listen address
    #[arg(long, value_name = "HOST:PORT")]
    http: Option<String>,

    /// Path prefix for every route
    #[arg(long, value_name = "PATH")]
    base_url: Option<String>,

    /// Largest accepted upload, e.g. 10MB
    #[arg(long, value_name = "SIZE")]
    max_image_size: Option<ByteSize>,

    /// Minimum delay between two accepted uploads, e.g. 5s
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    min_delay: Option<Duration>,

    /// Maximum combined size of stored images, e.g. 50MB
    #[arg(long, value_name = "SIZE")]
    max_size: Option<ByteSize>,

    /// Maximum number of stored images
    #[arg(long, value_name = "COUNT")]
    max_count: Option<usize>,

    /// Directory holding stored images
    #[arg(long, value_name = "DIR")]
    image_dir: Option<PathBuf>,

    /// Directory holding the drawing client (empty to disable)
    #[arg(long, value_name = "DIR")]
    static_dir: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn apply_overrides(self, config: &mut Config) -> Result<()> {
        if let Some(addr) = self.http {
            config.set_listen_addr(&addr)?;
        }
        if let Some(base_url) = self.base_url {
            config.web.base_url = base_url;
        }
        if let Some(static_dir) = self.static_dir {
            config.web.static_dir = static_dir;
        }
        if let Some(image_dir) = self.image_dir {
            config.storage.image_path = image_dir;
        }
        if let Some(max_size) = self.max_size {
            config.storage.max_size = max_size;
        }
        if let Some(max_count) = self.max_count {
            config.storage.max_count = max_count;
        }
        if let Some(max_image_size) = self.max_image_size {
            config.ingestion.max_image_size = max_image_size;
        }
        if let Some(min_delay) = self.min_delay {
            config.ingestion.min_delay = min_delay;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!(
        "gribouillis={level},bounded_file_store={level}",
        level = cli.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gribouillis v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config.display());
    cli.apply_overrides(&mut config)?;

    let quota = QuotaPolicy::new()
        .max_size_bytes(config.storage.max_size.as_u64())
        .max_count(config.storage.max_count);
    let store = BoundedStore::builder()
        .base_directory(&config.storage.image_path)
        .quota(quota)
        .build()
        .await
        .with_context(|| {
            format!(
                "opening image directory {}",
                config.storage.image_path.display()
            )
        })?;

    let stats = store.stats().await;
    info!(
        "Image store ready: {} files, {} of {} used, at most {} files",
        stats.total_files,
        ByteSize::b(stats.total_size_bytes),
        config.storage.max_size,
        stats.max_count
    );
    info!(
        "Uploads: at most {} each, one every {}",
        config.ingestion.max_image_size,
        humantime::format_duration(config.ingestion.min_delay)
    );

    let server = WebServer::new(&config, store);
    info!(
        "Serving on http://{}{}/",
        server.addr(),
        config.web.base_path()
    );
    server.serve().await?;

    info!("Shut down cleanly");
    Ok(())
}
