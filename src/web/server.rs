use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::source::{DocumentLoader, EphemerisStore};

use super::api::epochs as epoch_handlers;
use super::api::metadata as metadata_handlers;
use super::api::status as status_handlers;
use super::api_doc::ApiDoc;
use super::config::Config;
use super::state::AppState;

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let loader = DocumentLoader::from_config(&config.source).map_err(std::io::Error::other)?;
    let store = Arc::new(EphemerisStore::new());

    if let Err(e) = loader.refresh(&store).await {
        log::error!(
            "Initial ephemeris load from {} failed: {}; serving 503 until a refresh succeeds",
            loader.source(),
            e
        );
    }

    let state = AppState {
        frames: config.frames,
        store,
        loader: Arc::new(loader),
    };

    if let Some(interval) = config.source.refresh_interval {
        tokio::spawn(refresh_periodically(state.clone(), interval));
    }

    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // State vector endpoints
        .route("/api/epochs", get(epoch_handlers::list_epochs))
        .route("/api/epochs/{epoch}", get(epoch_handlers::get_epoch))
        .route("/api/epochs/{epoch}/speed", get(epoch_handlers::get_speed))
        .route(
            "/api/epochs/{epoch}/location",
            get(epoch_handlers::get_location),
        )
        .route("/api/now", get(status_handlers::now))
        // Document metadata
        .route("/api/comment", get(metadata_handlers::comments))
        .route("/api/header", get(metadata_handlers::header))
        .route("/api/metadata", get(metadata_handlers::segment_metadata))
        .route(
            "/api/metadata/{key}",
            get(metadata_handlers::segment_metadata_value),
        )
        // Service
        .route("/api/status", get(status_handlers::status))
        .route("/api/refresh", post(status_handlers::refresh))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn refresh_periodically(state: AppState, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    // the first tick completes immediately and the initial load already ran
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if let Err(e) = state.loader.refresh(&state.store).await {
            log::warn!(
                "Scheduled refresh from {} failed, keeping previous ephemeris: {}",
                state.loader.source(),
                e
            );
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}
