use anyhow::Result;

use voicedesk::config;
use voicedesk::initialization::{initialize_services, populate_index};

/// Re-crawls the seed URL (or the URL given as the first argument) and
/// re-indexes every page. Point ids are derived from page URLs, so running
/// this repeatedly refreshes the index without duplicating points.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let mut config = config::load_config()?;
    if let Some(seed) = std::env::args().nth(1) {
        config.crawler.seed_url = seed;
    }

    let ctx = initialize_services(&config).await?;
    let count = populate_index(&ctx, &config).await?;
    println!("Indexed {} pages from {}", count, config.crawler.seed_url);
    Ok(())
}
