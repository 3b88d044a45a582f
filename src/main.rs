//! tuition-manager server entry point.
//!
//! Loads configuration, connects the store, and starts the Axum HTTP
//! server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use tuition_manager::api;
use tuition_manager::app_state::AppState;
use tuition_manager::config::{LogFormat, ServerConfig};
use tuition_manager::payments::StripeClient;
use tuition_manager::persistence::Store;
use tuition_manager::service::CheckoutSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
    tracing::info!(?config, "starting tuition-manager");

    // Build persistence layer
    let store = if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .context("failed to connect to PostgreSQL")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run database migrations")?;
        tracing::info!("connected to PostgreSQL, migrations applied");
        Store::postgres(&pool)
    } else {
        tracing::warn!("persistence disabled, data is kept in memory only");
        Store::in_memory()
    };

    // Build payment provider
    if config.stripe_secret_key.is_empty() {
        tracing::warn!("STRIPE_SECRET_KEY is not set, provider calls will fail");
    }
    let provider = StripeClient::new(
        config.stripe_api_base.clone(),
        config.stripe_secret_key.clone(),
        Duration::from_secs(config.payment_provider_timeout_secs),
    )
    .context("failed to build payment provider client")?;

    // Build application state
    let state = AppState::new(
        store,
        Arc::new(provider),
        CheckoutSettings {
            client_url: config.client_url.clone(),
            currency: config.payment_currency.clone(),
        },
        chrono::Duration::hours(config.session_ttl_hours),
    );

    if let Some(admin) = &config.bootstrap_admin {
        state
            .accounts
            .ensure_admin(&admin.email, &admin.password)
            .await
            .context("failed to bootstrap admin account")?;
    }

    // Build router
    let app = api::build_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
