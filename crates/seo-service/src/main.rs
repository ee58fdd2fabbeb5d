mod config;
mod digits;
mod error;
mod generation;
mod markdown;
mod prompts;
mod score;
mod server;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use llm_common::completion::CompletionClient;
use llm_common::openai::OpenAiClient;

use config::Config;
use generation::Generator;
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting seo-service");

    let config = Config::from_env()?;
    info!(
        base_url = %config.llm.base_url,
        model = %config.llm.model,
        timeout_ms = config.llm.default_timeout.as_millis(),
        cors = config.cors_enabled,
        "configuration loaded"
    );
    // Not fatal: the service still starts and each generation request fails with a 500.
    if !config.llm.has_api_key() {
        warn!("GEMINI_API_KEY (or LLM_API_KEY) is not set, generation requests will fail");
    }

    let client: Arc<dyn CompletionClient> = Arc::new(OpenAiClient::new(config.llm.clone())?);
    let app = server::router(AppState::new(Generator::new(client)), config.cors_enabled);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, addr = %config.listen_addr, "failed to bind")
        })?;
    info!(addr = %config.listen_addr, "HTTP server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
}
