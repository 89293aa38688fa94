//! Run one generation batch against the configured service.
//!
//! Configuration comes from the environment (and an optional `.env` file);
//! see [`videogen_dl::Config::from_env`].

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use videogen_dl::{Config, HttpVideoService, Orchestrator, VideoService, prompts};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "videogen_dl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Top-level failures end the process after logging; there is nothing to retry
    if let Err(e) = run().await {
        tracing::error!(error = %e, "video generation run failed");
    }
}

async fn run() -> videogen_dl::Result<()> {
    let config = Config::from_env()?;

    let prompt_list = match &config.output.prompts_file {
        Some(path) => prompts::load_prompts(path).await?,
        None => prompts::default_prompts(),
    };

    let service = Arc::new(HttpVideoService::from_config(&config)?);
    tracing::info!(
        base_url = %service.base_url(),
        model = %config.service.model,
        "Starting video generation process"
    );

    if !service.health().await {
        tracing::warn!(
            base_url = %service.base_url(),
            use_mock_data_on_error = config.service.use_mock_data_on_error,
            "generation service did not answer its health check; continuing with the real service"
        );
    }

    let orchestrator = Orchestrator::new(service, config);
    let summary = orchestrator.run(&prompt_list).await?;

    tracing::info!(
        succeeded = summary.succeeded,
        total = summary.total,
        manifest = %summary.manifest_path.display(),
        elapsed_secs = (summary.finished_at - summary.started_at).num_seconds(),
        "run complete"
    );
    Ok(())
}
