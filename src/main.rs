mod handlers;
mod models;
mod services;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    body::Body,
    extract::Request,
    http::Method,
    middleware,
    response::Response,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use models::catalog;
use models::config::AppConfig;
use services::classifier::{Classifier, OnnxClassifier};
use services::loader::ImageLoader;
use services::store::PredictionStore;

pub struct AppState {
    pub config: Arc<AppConfig>,
    pub loader: ImageLoader,
    pub classifier: Arc<dyn Classifier>,
    pub store: PredictionStore,
}

async fn request_id_middleware(
    request: Request<Body>,
    next: axum::middleware::Next,
) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert("X-Request-Id", request_id.parse().unwrap());
    response
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    handlers::health::init_start_time();

    catalog::validate_catalog().map_err(|e| anyhow::anyhow!("catalog validation failed: {}", e))?;

    // The model is loaded exactly once, before the listener binds. A missing
    // or corrupt artifact refuses to start rather than failing per request.
    let classifier = OnnxClassifier::load(&config.model_path)
        .context("cannot start without a loadable model artifact")?;
    tracing::info!(
        "model loaded from '{}' ({} classes)",
        config.model_path,
        catalog::CLASS_COUNT
    );

    let config = Arc::new(config);
    let state = Arc::new(AppState {
        config: config.clone(),
        loader: ImageLoader::new(&config),
        classifier: Arc::new(classifier),
        store: PredictionStore::new(&config),
    });

    let cors_origins: Vec<_> = config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(cors_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(["Content-Type".parse().unwrap()]);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
            )
        })
        .on_response(|response: &Response, latency: std::time::Duration, _span: &Span| {
            tracing::info!(
                status = response.status().as_u16(),
                latency_ms = latency.as_millis() as u64,
                "response",
            );
        });

    let app = Router::new()
        .route("/api/v1/predict", axum::routing::post(handlers::predict::predict))
        .route("/api/health", axum::routing::get(handlers::health::health_check))
        .route("/api/version", axum::routing::get(handlers::health::version))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(axum::extract::DefaultBodyLimit::max(config.max_upload_bytes as usize))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state);

    let addr = config.listen_addr.clone();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    tracing::info!("Shutdown signal received, draining connections...");
}
