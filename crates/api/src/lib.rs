//! # LocumDesk API
//!
//! The API crate provides the web server implementation for the LocumDesk
//! clinic-staffing service. It defines RESTful endpoints for availability
//! publishing and booking, shift management, attendance scoring, and payroll
//! close.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Provide cross-cutting concerns like authentication and error handling
//! - **Config**: Handle environment and application configuration
//! - **Tax**: HTTP client for the external tax-calculation service
//!
//! The API uses Axum as the web framework and SQLx for database interactions.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for authentication and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;
/// Client for the external tax-calculation service
pub mod tax;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Server configuration loaded at startup
    pub config: config::ApiConfig,
    /// Outbound client for the tax calculation service
    pub tax_client: tax::TaxClient,
}

/// Starts the API server with the provided configuration and database connection
///
/// This function initializes logging, builds the shared state, configures
/// routes, and serves HTTP until shutdown.
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let tax_client = tax::TaxClient::new(
        &config.tax_service_url,
        &config.internal_service_key,
        config.tax_timeout_secs,
    )
    .map_err(|e| eyre::eyre!("{e}"))?;

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        config: config.clone(),
        tax_client,
    });

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Availability ledger endpoints
        .merge(routes::availability::routes())
        // Shift registry endpoints
        .merge(routes::shift::routes())
        // Clinic profile endpoints
        .merge(routes::clinic::routes())
        // Trust score endpoints
        .merge(routes::trust::routes())
        // Payroll close endpoints
        .merge(routes::payroll::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PATCH,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok())
                    .collect::<Vec<_>>(),
            )
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(axum::error_handling::HandleErrorLayer::new(
                |_: tower::BoxError| async { axum::http::StatusCode::REQUEST_TIMEOUT },
            ))
            .timeout(std::time::Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
