pub mod api;
pub mod catalog;
pub mod config;
pub mod pipeline;
pub mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Initialize tracing from RUST_LOG, defaulting to the app filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Start the service and block until shutdown (Ctrl-C).
pub async fn run() -> Result<(), String> {
    // A local .env is a convenience for development; absence is fine.
    let _ = dotenvy::dotenv();

    init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let app_config = config::AppConfig::from_env();
    let state = Arc::new(state::AppState::from_config(&app_config));

    tracing::info!(
        catalog_products = state.catalog.len(),
        cloud_ocr = state.arbiter.has_cloud(),
        vector_search = state.recommender.is_some(),
        classifier = state.classifier.is_some(),
        "Services initialized"
    );

    let mut handle = api::serve(state, app_config.bind_addr).await?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for shutdown signal: {e}"))?;

    tracing::info!("Shutdown requested");
    handle.shutdown();
    handle.join().await;

    Ok(())
}
