use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use gcn_core::inference::InferenceService;
use gcn_extraction::{ExtractionPipeline, GeminiClient};

mod handlers;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("gcn=info".parse().unwrap()))
        .init();

    // Without a credential nothing can be processed, so stop before serving.
    let config = match gcn_core::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Startup aborted");
            std::process::exit(1);
        }
    };

    let client: Arc<dyn InferenceService> = match GeminiClient::new(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build Gemini client");
            std::process::exit(1);
        }
    };

    let state = AppState {
        pipeline: Arc::new(ExtractionPipeline::new(client)),
    };

    let app = routes::create_router(config.max_upload_bytes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!(model = %config.gemini_model, "GCN extraction server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
