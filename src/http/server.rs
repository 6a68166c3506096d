//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Own the contact endpoint's rate limiter and its sweeper task
//! - Bind server to listener and shut down on signal

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::contact::{
    CallbackNotifier, ContactService, ContactStore, HttpCallbackNotifier, MemoryContactStore,
    WebhookError,
};
use crate::http::handlers;
use crate::security::{spawn_sweeper, FixedWindowLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub contacts: ContactService,
    pub limiter: Arc<FixedWindowLimiter>,
    pub environment: Environment,
    pub max_body_size: usize,
}

impl AppState {
    /// Assemble state from explicit parts.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn ContactStore>,
        notifier: Option<Arc<dyn CallbackNotifier>>,
        limiter: Arc<FixedWindowLimiter>,
    ) -> Self {
        let contacts = ContactService::new(
            store,
            notifier,
            config.retries.clone(),
            config.environment,
        );

        Self {
            contacts,
            limiter,
            environment: config.environment,
            max_body_size: config.security.max_body_size,
        }
    }

    /// Default wiring: in-memory store, HTTP webhook when configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, WebhookError> {
        let notifier = HttpCallbackNotifier::from_config(&config.webhook)?
            .map(|n| Arc::new(n) as Arc<dyn CallbackNotifier>);
        if notifier.is_none() {
            tracing::info!("No callback webhook configured; callback requests will be logged only");
        }

        Ok(Self::new(
            config,
            Arc::new(MemoryContactStore::new()),
            notifier,
            Arc::new(FixedWindowLimiter::from_config(&config.rate_limit)),
        ))
    }
}

/// HTTP server for the contact service.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    limiter: Arc<FixedWindowLimiter>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Result<Self, WebhookError> {
        let state = AppState::from_config(&config)?;
        Ok(Self::with_state(config, state))
    }

    /// Create a server around pre-built state.
    pub fn with_state(config: AppConfig, state: AppState) -> Self {
        let limiter = state.limiter.clone();
        let router = build_router(&config, state);
        Self {
            router,
            config,
            limiter,
        }
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let sweeper = spawn_sweeper(
            self.limiter.clone(),
            Duration::from_secs(self.config.rate_limit.sweep_interval_secs),
            shutdown.resubscribe(),
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        let _ = sweeper.await;
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &AppConfig, state: AppState) -> Router {
    Router::new()
        .route("/api/contact", post(handlers::submit_contact))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
