//! Application startup and lifecycle management.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::SalesConfig;
use crate::handlers::{health, invoices, performance};
use crate::services::{
    init_metrics, AggregationSettings, Database, InvoiceLifecycleManager, InvoiceStore,
    PaymentLedger, PerformanceAggregator, RepDirectory,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<InvoiceLifecycleManager>,
    pub aggregator: Arc<PerformanceAggregator>,
    pub store: Arc<dyn InvoiceStore>,
}

impl AppState {
    /// Wire both components over the given storage providers.
    pub fn new(
        invoices: Arc<dyn InvoiceStore>,
        payments: Arc<dyn PaymentLedger>,
        reps: Arc<dyn RepDirectory>,
        settings: AggregationSettings,
    ) -> Self {
        Self {
            lifecycle: Arc::new(InvoiceLifecycleManager::new(invoices.clone())),
            aggregator: Arc::new(PerformanceAggregator::new(
                invoices.clone(),
                payments,
                reps,
                settings,
            )),
            store: invoices,
        }
    }
}

/// HTTP routes of the service.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics_handler))
        .route("/invoices/waiting", get(invoices::list_waiting))
        .route(
            "/invoices/:invoice_id/convert-to-active",
            post(invoices::convert_to_active),
        )
        .route("/reps/:rep_id/dashboard", get(performance::get_snapshot))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: SalesConfig) -> Result<Self, AppError> {
        Self::build_internal(config, true).await
    }

    /// Build the application without running migrations.
    pub async fn build_without_migrations(config: SalesConfig) -> Result<Self, AppError> {
        Self::build_internal(config, false).await
    }

    async fn build_internal(config: SalesConfig, run_migrations: bool) -> Result<Self, AppError> {
        init_metrics();

        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            AppError::from(e)
        })?;

        if run_migrations {
            db.run_migrations().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to run migrations");
                AppError::from(e)
            })?;
        }

        let db = Arc::new(db);
        let state = AppState::new(db.clone(), db.clone(), db, config.aggregation);

        let http_addr = config.common.bind_address();
        let http_listener = TcpListener::bind(http_addr.as_str()).await.map_err(|e| {
            tracing::error!(error = %e, addr = %http_addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!(
            http_port = http_port,
            timezone = %config.aggregation.timezone,
            month_window = ?config.aggregation.month_window,
            "Sales service listener bound"
        );

        Ok(Self {
            http_port,
            http_listener,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!(
            service = "sales-service",
            version = env!("CARGO_PKG_VERSION"),
            http_port = self.http_port,
            "Service ready to accept connections"
        );

        axum::serve(self.http_listener, router(self.state))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "HTTP server error");
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}
