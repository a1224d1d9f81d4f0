//! KTravel Backend
//!
//! REST backend for the tour catalog and admin back-office, persisting to
//! SQLite when a database is configured and to JSON files otherwise.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod files;
mod models;
mod store;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Database;
use store::Stores;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    init_tracing(&config);

    tracing::info!("Starting KTravel Backend");
    tracing::info!("Data directory: {:?}", config.data_dir);
    tracing::info!("Upload directory: {:?}", config.upload_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.database_url.is_none() {
        tracing::warn!("No database configured (KTRAVEL_DATABASE_URL), using flat files");
    }

    // Probe the database once and bind the stores
    let database = Database::new(config.database_url.clone());
    let stores = Stores::select(&database, &config.data_dir).await;
    tracing::info!(backend = %stores.backend, "Persistence ready");

    if stores.credentials.load().await?.is_none() {
        tracing::warn!("No admin credential stored, the ADMIN_PASSWORD fallback is active");
    }

    let state = AppState {
        stores,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // JSON API
    let api_routes = Router::new()
        // Tours
        .route("/tours", get(api::list_tours).post(api::create_tour))
        .route(
            "/tours/{id}",
            get(api::get_tour)
                .patch(api::update_tour)
                .delete(api::delete_tour),
        )
        // Carousel
        .route(
            "/carousel",
            get(api::list_carousel).put(api::replace_carousel),
        )
        // Page content
        .route("/content/about", get(api::get_about).put(api::put_about))
        .route(
            "/content/contact",
            get(api::get_contact).put(api::put_contact),
        )
        // Admin session
        .route("/admin/login", post(api::login))
        .route("/admin/logout", post(api::logout))
        .route("/admin/change-password", post(api::change_password))
        // Uploads
        .route(
            "/upload",
            post(api::upload_image).layer(DefaultBodyLimit::max(api::UPLOAD_BODY_LIMIT)),
        );

    // Back-office pages, gated by the session cookie
    let admin_routes = Router::new()
        .route("/admin", get(api::overview))
        .route("/dashboard", get(api::overview))
        .route("/admin/login", get(api::login_page));

    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .nest("/api", api_routes)
        .merge(admin_routes)
        .route("/health", get(health_check))
        .nest_service("/uploads", uploads)
        .layer(middleware::from_fn(auth::access_gate_layer))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
