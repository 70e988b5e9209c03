mod models;
mod handlers;
mod client;
mod config;
mod error;
mod logger;
mod normalize;
mod prompt;
mod storage;

use axum::{middleware, routing::{get, post, Router}};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};
use client::{GeminiClient, LineGenerator};
use config::Config;
use storage::PoemStore;
use reqwest::Client;

// shared by every handler, built once at startup and never mutated.
// the generator sits behind a trait object so tests can swap in a stub.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn LineGenerator>,
    pub store: PoemStore,
    pub frontend_dir: PathBuf
}

pub fn app(state: AppState) -> Router {

    let index = ServeFile::new(state.frontend_dir.join("templates").join("index.html"));
    let assets = ServeDir::new(state.frontend_dir.join("static"));

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/generate-poem", post(handlers::generate_poem))
        .route("/api/save-poem", post(handlers::save_poem))
        .route("/download/:filename", get(handlers::download_poem))
        .route_service("/", index)
        .nest_service("/static", assets)
        .layer(middleware::from_fn(logger::trace_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)

}

#[tokio::main]
async fn main() {

    dotenvy::dotenv().ok();
    logger::init();

    let config = Config::from_env()
        .expect("Invalid configuration");

    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY not found in environment variables, poem generation will fail until it is set");
    }

    // one http client for the whole process so connections get reused
    let http_client = Client::new();
    let generator = GeminiClient::new(http_client, &config);

    let state = AppState {
        generator: Arc::new(generator),
        store: PoemStore::new(config.upload_dir.clone()),
        frontend_dir: config.frontend_dir.clone()
    };

    let listener = TcpListener::bind(config.bind_addr).await
        .expect("Failed to bind server address");
    info!(
        provider = state.generator.provider_name(),
        upload_dir = %state.store.dir().display(),
        "listening on {}", listener.local_addr().expect("Failed to get local address")
    );
    axum::serve(listener, app(state)).await
        .expect("Server failed");

}
