//! Pinboard API Server
//!
//! Main entry point for the Pinboard backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pinboard_api::{AppState, create_router};
use pinboard_core::storage::{MediaStore, StorageConfig, StorageProvider};
use pinboard_db::{SessionRepository, connect};
use pinboard_shared::config::StorageSettings;
use pinboard_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    // Prune sessions that expired while the server was down
    match SessionRepository::new(db.clone()).cleanup_expired().await {
        Ok(0) => {}
        Ok(pruned) => info!(pruned, "removed expired sessions"),
        Err(e) => warn!(error = %e, "failed to prune expired sessions"),
    }

    // Create session token service
    let jwt = JwtService::new(JwtConfig {
        secret: config.session.secret.clone(),
        session_expires_hours: config.session.ttl_hours,
    });

    // Wire the storage backend; absence or bad credentials degrade to
    // disabled uploads instead of refusing to start.
    let storage = build_storage(config.storage.as_ref());
    match &storage {
        Some(store) => info!(provider = store.provider_name(), "storage backend configured"),
        None => warn!("storage backend not configured, file uploads are disabled"),
    }

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        jwt: Arc::new(jwt),
        storage,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the media store from the optional storage section.
fn build_storage(settings: Option<&StorageSettings>) -> Option<Arc<MediaStore>> {
    let settings = settings?;

    let provider = match settings.provider.as_str() {
        "local" => {
            let root = settings
                .root
                .clone()
                .unwrap_or_else(|| "./static/uploads".to_string());
            let prefix = settings
                .public_prefix
                .clone()
                .unwrap_or_else(|| StorageConfig::DEFAULT_PUBLIC_PREFIX.to_string());
            StorageProvider::local_fs(root, prefix)
        }
        "s3" => {
            let (Some(endpoint), Some(bucket), Some(access_key), Some(secret_key)) = (
                settings.endpoint.clone(),
                settings.bucket.clone(),
                settings.access_key_id.clone(),
                settings.secret_access_key.clone(),
            ) else {
                warn!("incomplete s3 credentials, file uploads are disabled");
                return None;
            };
            let region = settings.region.clone().unwrap_or_else(|| "auto".to_string());
            StorageProvider::s3(endpoint, bucket, access_key, secret_key, region)
        }
        other => {
            warn!(provider = other, "unknown storage provider, file uploads are disabled");
            return None;
        }
    };

    let mut storage_config = StorageConfig::new(provider);
    if let Some(max) = settings.max_file_size {
        storage_config = storage_config.with_max_file_size(max);
    }
    if let Some(base) = settings.public_url_base.clone() {
        storage_config = storage_config.with_public_url_base(base);
    }

    match MediaStore::from_config(storage_config) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            warn!(error = %e, "failed to initialize storage backend, file uploads are disabled");
            None
        }
    }
}
