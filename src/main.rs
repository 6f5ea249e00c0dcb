//! Participa DF Ouvidoria Portal
//!
//! Backend for the citizen ouvidoria: a guided wizard that turns a free-text
//! narrative into a structured manifestation and registers it under a
//! tracking code.
//!
//! ## Features
//!
//! - **Wizard**: narrative, subject, extra fields, location, identity,
//!   attachments and consent, with per-step validation
//! - **Classifier**: keyword heuristics suggesting category type and department
//! - **Records**: locally persisted manifestations, looked up by tracking code
//! - **Accessibility**: persisted display preferences

mod capture;
mod catalog;
mod classifier;
mod config;
mod db;
mod geocoding;
mod handlers;
mod models;
mod notifications;
mod preferences;
mod store;
mod tracking;
mod validation;
mod wizard;

use axum::{extract::DefaultBodyLimit, Router};
use config::StorageConfig;
use geocoding::NominatimGeocoder;
use handlers::AppState;
use notifications::NotificationCenter;
use preferences::PreferencesStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use store::backend::StorageBackend;
use store::{FileStorage, MemoryStorage, RecordStore};
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wizard::{WizardRegistry, WizardSettings};

/// How often idle wizard sessions are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Room for multipart framing on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ouvidoria_portal=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Starting Participa DF Ouvidoria Portal");
    tracing::info!("Environment: {:?}", config.environment);

    tracing::info!("Storage backend: {}", config.storage.name());
    let backend = open_backend(&config.storage).await?;

    // Ensure upload directory exists
    fs::create_dir_all(&config.upload_dir).await?;
    tracing::info!("Upload directory: {:?}", config.upload_dir);

    let notifications = NotificationCenter::new();
    let store = Arc::new(RecordStore::open(backend.clone(), notifications.clone()).await);
    let preferences = Arc::new(PreferencesStore::open(backend.clone(), notifications.clone()).await);
    let registry = Arc::new(WizardRegistry::new(
        WizardSettings {
            tracking_prefix: config.tracking_prefix.clone(),
            analysis_delay: config.analysis_delay,
            submission_delay: config.submission_delay,
        },
        notifications.clone(),
    ));
    let geocoder = NominatimGeocoder::new(&config.geocoder_url, config.geocoder_timeout)?;

    // Create application state
    let state = AppState {
        store: store.clone(),
        registry: registry.clone(),
        preferences,
        notifications,
        geocoder: Arc::new(geocoder),
        upload_dir: config.upload_dir.clone(),
        max_upload_size: config.max_upload_size,
        is_production: config.is_production(),
        tracking_prefix: config.tracking_prefix.clone(),
    };

    let shutdown = CancellationToken::new();
    let notification_log = tokio::spawn(notifications::forward_to_log(
        state.notifications.clone(),
        shutdown.clone(),
    ));
    let sweeper = tokio::spawn(sweep_idle_sessions(
        registry,
        config.upload_dir.clone(),
        config.session_idle,
        shutdown.clone(),
    ));

    // Build CORS layer
    let cors = if config.is_production() {
        CorsLayer::new()
            .allow_origin(
                config
                    .cors_origins
                    .iter()
                    .filter_map(|o| o.parse().ok())
                    .collect::<Vec<_>>(),
            )
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    let body_limit = config.max_upload_size + MULTIPART_OVERHEAD;

    // Build main router
    let app = Router::new()
        .nest("/api", handlers::api_routes())
        .fallback_service(ServeDir::new(&config.frontend_dir))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            handlers::middleware::security_headers,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Frontend served from: {}", config.frontend_dir);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!("Session sweeper ended abnormally: {}", e);
    }

    if let Some(last) = store.current().await {
        tracing::info!("Last submission this run: {}", last.tracking_code);
    }

    match store.flush().await {
        Ok(()) => tracing::info!("Records flushed ({} stored)", store.len().await),
        Err(e) => tracing::error!("Failed to flush records on shutdown: {}", e),
    }

    match notification_log.await {
        Ok(count) => tracing::debug!("Notification log stopped after {} message(s)", count),
        Err(e) => tracing::warn!("Notification log ended abnormally: {}", e),
    }

    Ok(())
}

async fn open_backend(
    storage: &StorageConfig,
) -> Result<Arc<dyn StorageBackend>, Box<dyn std::error::Error>> {
    let backend: Arc<dyn StorageBackend> = match storage {
        StorageConfig::File { data_path } => {
            fs::create_dir_all(data_path).await?;
            Arc::new(FileStorage::new(data_path.clone()))
        }
        StorageConfig::Postgres { database_url } => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url).await?;
            tracing::info!("Database connected");

            tracing::info!("Running database migrations...");
            db::run_migrations(&pool).await?;
            Arc::new(db::PgStorage::new(pool))
        }
        StorageConfig::Memory => {
            tracing::warn!("In-memory storage: records are lost on restart");
            Arc::new(MemoryStorage::new())
        }
    };
    Ok(backend)
}

/// Expire idle wizard sessions until shutdown
async fn sweep_idle_sessions(
    registry: Arc<WizardRegistry>,
    upload_dir: PathBuf,
    max_idle: Duration,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                for id in registry.expire_idle(max_idle) {
                    capture::remove_session_uploads(&upload_dir, id).await;
                }
            }
        }
    }
    tracing::debug!("Session sweeper stopped");
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown requested");
        }
        _ = shutdown.cancelled() => {}
    }
}
