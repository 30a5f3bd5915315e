//! # Ticket-Bridge HTTP Service
//!
//! HTTP server that receives helpdesk ticket webhooks and mirrors each ticket
//! into an OpenProject work package.
//!
//! The only route is `/{secret}`. The shared secret is part of the path, so a
//! request for any other path, including a segment that does not decode, is
//! answered with an empty `404` before the body is read. The request URI is
//! never written to the logs.

pub mod config;
pub mod errors;

pub use config::{
    LoggingConfig, MappingConfig, ServerConfig, ServiceConfig, TrackerConfig, WebhookConfig,
};
pub use errors::{ConfigError, ServiceError, WebhookHandlerError};

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::PathRejection, DefaultBodyLimit, Path, State},
    http::{Request, StatusCode},
    middleware,
    response::Response,
    routing::any,
    Router,
};
use subtle::ConstantTimeEq;
use ticket_bridge_core::{SyncHandler, SyncOutcome, TicketEvent};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

// ============================================================================
// Application State
// ============================================================================

/// Shared webhook secret.
#[derive(Clone)]
pub struct WebhookSecret(String);

impl WebhookSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Constant-time comparison against a candidate from the request path.
    pub fn matches(&self, candidate: &str) -> bool {
        bool::from(self.0.as_bytes().ct_eq(candidate.as_bytes()))
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(<REDACTED>)")
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Ticket synchronization logic
    pub sync_handler: Arc<SyncHandler>,

    /// Secret expected as the request path
    pub secret: Arc<WebhookSecret>,
}

impl AppState {
    pub fn new(sync_handler: Arc<SyncHandler>, secret: WebhookSecret) -> Self {
        Self {
            sync_handler,
            secret: Arc::new(secret),
        }
    }
}

// ============================================================================
// Router
// ============================================================================

/// Create HTTP router
pub fn create_router(state: AppState) -> Router {
    // Spans carry the method only; the path holds the secret.
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        tracing::info_span!("http_request", method = %request.method())
    });

    Router::new()
        .route("/{secret}", any(handle_webhook))
        // Deliveries are read only after authentication, in full.
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(middleware::from_fn(request_logging_middleware))
                .into_inner(),
        )
        .with_state(state)
}

/// Start HTTP server
pub async fn start_server(
    config: ServiceConfig,
    sync_handler: Arc<SyncHandler>,
) -> Result<(), ServiceError> {
    let state = AppState::new(sync_handler, WebhookSecret::new(config.webhook.secret.clone()));
    let app = create_router(state);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let addr: SocketAddr = address.parse().map_err(|e: std::net::AddrParseError| {
        ServiceError::BindFailed {
            address: address.clone(),
            message: e.to_string(),
        }
    })?;

    let listener =
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServiceError::BindFailed {
                address: addr.to_string(),
                message: e.to_string(),
            })?;

    info!("Starting HTTP server on {}", addr);

    // In-flight requests finish before the server returns.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServiceError::ServerFailed {
            message: e.to_string(),
        })?;

    info!("HTTP server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C), initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

// ============================================================================
// Webhook Handler
// ============================================================================

/// Handle a helpdesk ticket webhook
///
/// 1. Compare the path segment with the configured secret (404 on mismatch
///    or when the segment cannot be decoded)
/// 2. Read and decode the body as a ticket event (500 when unreadable or malformed)
/// 3. Run the synchronization and answer 200 with an empty body
#[instrument(skip_all)]
pub async fn handle_webhook(
    State(state): State<AppState>,
    secret: Result<Path<String>, PathRejection>,
    request: axum::extract::Request,
) -> Result<StatusCode, WebhookHandlerError> {
    let authenticated = match &secret {
        Ok(Path(secret)) => state.secret.matches(secret),
        Err(_) => false,
    };
    if !authenticated {
        return Err(WebhookHandlerError::NotFound);
    }

    let body = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .map_err(WebhookHandlerError::UnreadableBody)?;
    let event = TicketEvent::from_slice(&body)?;

    match state.sync_handler.handle(&event).await? {
        SyncOutcome::Created { id } => info!(work_package_id = id, "Webhook processed: created"),
        SyncOutcome::Updated { id } => info!(work_package_id = id, "Webhook processed: updated"),
        SyncOutcome::Skipped(reason) => info!(reason = %reason, "Webhook processed: skipped"),
    }

    Ok(StatusCode::OK)
}

// ============================================================================
// Middleware
// ============================================================================

/// Request logging middleware with correlation ID tracking
///
/// The request path is intentionally absent from every log line.
#[instrument(skip(request, next), fields(
    method = %request.method(),
    correlation_id
))]
async fn request_logging_middleware(
    mut request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    let method = request.method().clone();
    let start = std::time::Instant::now();

    let correlation_id = request
        .headers()
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    tracing::Span::current().record("correlation_id", correlation_id.as_str());
    request.extensions_mut().insert(correlation_id.clone());

    info!(correlation_id = %correlation_id, method = %method, "Request started");

    let mut response = next.run(request).await;
    let duration = start.elapsed();

    if let Ok(header_value) = correlation_id.parse() {
        response
            .headers_mut()
            .insert("x-correlation-id", header_value);
    }

    let status = response.status();

    if status.is_server_error() {
        error!(
            correlation_id = %correlation_id,
            method = %method,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        warn!(
            correlation_id = %correlation_id,
            method = %method,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        info!(
            correlation_id = %correlation_id,
            method = %method,
            status = %status,
            duration_ms = %duration.as_millis(),
            "Request completed successfully"
        );
    }

    response
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
