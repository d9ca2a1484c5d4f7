//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the page handler and static roots
//! - Wire up middleware (tracing, request ID, timeout, cache headers)
//! - Bind server to listener
//! - Stop gracefully when a termination signal is broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::context::BotDetector;
use crate::http::handler::page_handler;
use crate::http::request::{MakeRequestUuid, RequestIdExt};
use crate::http::statics::with_static_roots;
use crate::lifecycle::TerminationSignal;
use crate::locale::LocaleStore;
use crate::render::{RenderCache, Renderer};
use crate::routing::RouteTable;

/// Request headers a rendered page depends on.
const PAGE_VARY: &str = "accept-language, cookie, user-agent";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub locales: Arc<LocaleStore>,
    pub renderer: Arc<Renderer>,
    pub cache: Arc<RenderCache>,
    pub bots: Arc<BotDetector>,
}

/// HTTP server for the rendered application.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server over fully initialized state.
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let pages = Router::new()
            .route("/", get(page_handler))
            .route("/{*path}", get(page_handler))
            .with_state(state)
            .layer(SetResponseHeaderLayer::overriding(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-cache"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::VARY,
                HeaderValue::from_static(PAGE_VARY),
            ));

        Router::new()
            .fallback_service(with_static_roots(pages, &config.statics))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = request.request_id(),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` delivers a signal (or its sender is dropped).
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<TerminationSignal>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = ?self.config.environment,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                match shutdown.recv().await {
                    Ok(signal) => tracing::info!(signal = signal.name(), "Shutdown signal received"),
                    Err(_) => tracing::info!("Shutdown requested"),
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
