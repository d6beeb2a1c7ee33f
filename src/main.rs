use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tumblr_post_archiver::archive::Archiver;
use tumblr_post_archiver::config::Config;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    info!("Starting tumblr-post-archiver");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        blog = %config.blog_identifier,
        output_dir = %config.output_dir.display(),
        tags = ?config.tags_to_archive,
        "Configuration loaded"
    );
    if config.tags_to_archive.is_empty() {
        info!(
            limit = config.latest_posts_limit,
            "No tags configured, archiving tagged posts among the latest"
        );
    }

    let archiver = Archiver::new(config)?;
    let summary = archiver.run().await?;

    if summary.failed > 0 {
        warn!(failed = summary.failed, "Some posts or queries failed");
    }
    info!(
        archived = summary.archived,
        skipped = summary.skipped,
        "Done"
    );

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tumblr_post_archiver=debug"));

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
