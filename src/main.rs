use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use linktally::{api, cache::AppCache, config::Settings, db, ingress, state::AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // Determine database URL
    let db_url = settings
        .database_url
        .clone()
        .or_else(|| {
            settings
                .database_path
                .as_ref()
                .map(|p| format!("sqlite:{}", p))
        })
        .unwrap_or_else(|| {
            #[cfg(feature = "postgres")]
            {
                "postgres://localhost/linktally".to_string()
            }
            #[cfg(all(feature = "sqlite", not(feature = "postgres")))]
            {
                "sqlite:linktally.db?mode=rwc".to_string()
            }
        });

    info!("Connecting to database...");
    let pool = db::create_pool(&db_url).await?;
    info!("Database connected");

    // Run migrations
    info!("Running migrations...");
    db::run_migrations(&pool).await?;
    info!("Migrations complete");

    // Initialize cache
    let cache = AppCache::new(&settings);
    info!("Cache initialized");

    // Create app state
    let state = AppState::new(pool, cache, settings.clone());

    // CORS layer
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any);

    // Build router
    let app = Router::new()
        // Ingress routes hit from profile pages and QR scans
        .route("/t/qr/{public_id}", post(ingress::qr_scan_handler))
        .route(
            "/t/social/{public_id}/{platform}",
            post(ingress::social_click_handler),
        )
        .route(
            "/t/link/{public_id}/{index}",
            post(ingress::link_click_handler),
        )
        // API routes
        .route("/api/profiles", get(api::list_profiles))
        .route("/api/profiles", post(api::create_profile))
        .route("/api/profiles/{id}", get(api::get_profile))
        .route("/api/profiles/{id}/archive", post(api::archive_profile))
        .route("/api/profiles/{id}/activate", post(api::activate_profile))
        .route("/api/profiles/{id}/buckets", get(api::get_buckets))
        .route("/api/profiles/{id}/summary", get(api::get_summary))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::new(
        settings.host.parse().unwrap_or([0, 0, 0, 0].into()),
        settings.port,
    );
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
