//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{OfflineSuggestionAdapter, OpenAiSuggestionAdapter},
    config::Config,
    error::ApiError,
    web::{api_router, rest::ApiDoc, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use chrono::Utc;
use digital_library_core::{Library, SuggestionService};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Suggestion Adapter ---
    let suggestion_adapter: Arc<dyn SuggestionService> = match config.openai_api_key.as_ref() {
        Some(api_key) => {
            let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
            info!(model = %config.suggestion_model, "Using OpenAI for suggestions");
            Arc::new(OpenAiSuggestionAdapter::new(
                openai_client,
                config.suggestion_model.clone(),
            )?)
        }
        None => {
            warn!("OPENAI_API_KEY not set. Suggestions will use the fallback list.");
            Arc::new(OfflineSuggestionAdapter)
        }
    };

    // --- 3. Build the Shared AppState ---
    let library = Library::seeded(Utc::now());
    info!(
        users = library.store().users().len(),
        resources = library.store().resources().len(),
        "Library seeded"
    );
    let app_state = Arc::new(AppState::new(library, config.clone(), suggestion_adapter));

    let allowed_origin = config
        .allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid ALLOWED_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let app = Router::new()
        .merge(api_router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
