//! Main Entrypoint for the Tutor API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Building the model client, artifact store and lesson pipeline.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.

use anyhow::Context;
use async_openai::config::OpenAIConfig;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tutor_api::{config::Config, router::create_router, state::AppState};
use tutor_core::{
    TutorPipeline, llm_client::OpenAICompatibleClient, prompts::PromptTemplates,
    store::FsArtifactStore,
};

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing lesson pipeline...");

    // --- 3. Initialize Shared Services ---
    let prompts = match &config.prompts_path {
        Some(path) => PromptTemplates::from_dir(path)?,
        None => PromptTemplates::default(),
    };

    let openai_config = OpenAIConfig::new()
        .with_api_key(&config.api_key)
        .with_api_base(&config.api_base);
    let llm_client = Arc::new(OpenAICompatibleClient::new(openai_config));

    let store = Arc::new(
        FsArtifactStore::new(&config.pipeline.output_location).with_context(|| {
            format!(
                "Failed to create output directory {}",
                config.pipeline.output_location.display()
            )
        })?,
    );

    let pipeline = TutorPipeline::new(llm_client, store, config.pipeline.clone(), prompts);
    let app_state = Arc::new(AppState {
        pipeline: Arc::new(pipeline),
    });

    // --- 4. Create Router and Apply Middleware ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    // --- 5. Start Server ---
    info!(
        api_base = %config.api_base,
        model = %config.pipeline.model_name,
        max_steps = config.pipeline.max_steps,
        visualization_mode = %config.pipeline.visualization_mode,
        output_dir = %config.pipeline.output_location.display(),
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server has shut down.");
    Ok(())
}
