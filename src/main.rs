use anyhow::{Context, Result};

use voicedesk::config;
use voicedesk::initialization::{initialize_services, populate_index};
use voicedesk::server::http::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();
    log::info!("voicedesk starting.");

    let config = config::load_config()?;
    let ctx = initialize_services(&config).await?;

    let indexed = populate_index(&ctx, &config).await?;
    log::info!("Startup indexing complete ({} pages).", indexed);

    let state = AppState {
        answer: ctx.answer.clone(),
        speech: ctx.speech.clone(),
    };
    let app = router(state, &config.server.allowed_origin)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    log::info!("Listening on http://{}.", config.server.bind);
    axum::serve(listener, app).await.context("server shutdown")?;

    Ok(())
}
