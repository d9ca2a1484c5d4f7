//! Startup orchestration.
//!
//! # Responsibilities
//! - Apply environment overrides and validate configuration
//! - Initialize render state in dependency order
//! - Bind the listener once everything is ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Locales load concurrently; every other step is sequential
//! - Listeners start last (traffic only when ready)

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::assets::{AssetError, AssetManifest};
use crate::config::env::{apply_env, EnvError};
use crate::config::{validate_config, ConfigError, ServerConfig};
use crate::http::{AppState, BotDetector, HttpServer};
use crate::locale::{LocaleError, LocaleStore};
use crate::render::{PageData, RenderCache, Renderer, Template, TemplateError, ViewRegistry};
use crate::routing::{RouteError, RouteTable};

/// Fatal errors raised before the server accepts traffic.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Assets(#[from] AssetError),

    #[error("page template: {0}")]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Routes(#[from] RouteError),

    #[error("route table references unknown view `{0}`")]
    UnknownView(String),

    #[error(transparent)]
    Locale(#[from] LocaleError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Apply environment overrides to a loaded config and validate the result.
pub fn prepare_config(mut config: ServerConfig) -> Result<ServerConfig, StartupError> {
    apply_env(&mut config)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::info!(
        environment = ?config.environment,
        bind_address = %config.listener.bind_address(),
        routes = config.routes.len(),
        locales = config.locales.available.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );
    Ok(config)
}

/// Build the shared application state: assets, template, routes, locales.
pub async fn bootstrap(config: &ServerConfig) -> Result<AppState, StartupError> {
    let assets = AssetManifest::from_config(&config.assets, config.environment).await?;

    let template = Template::load(Path::new(&config.template.path)).await?;
    template.check_keys(&PageData::sample().to_value())?;

    let routes = RouteTable::compile(&config.routes)?;
    let views = ViewRegistry::builtin();
    if let Some(missing) = routes.views().find(|view| !views.contains(view)) {
        return Err(StartupError::UnknownView(missing.to_string()));
    }

    let locales = Arc::new(LocaleStore::load_required(&config.locales).await?);

    let renderer = Renderer::new(
        views,
        Arc::clone(&locales),
        template,
        assets,
        &config.client,
        config.render.description_key.clone(),
        config.render.title_key.clone(),
    );

    tracing::info!(
        routes = routes.len(),
        locales = locales.len(),
        cache_max_entries = config.render.cache_max_entries,
        "Render state initialized"
    );

    Ok(AppState {
        routes: Arc::new(routes),
        locales,
        renderer: Arc::new(renderer),
        cache: Arc::new(RenderCache::new(config.render.cache_max_entries)),
        bots: Arc::new(BotDetector::new(&config.render.bot_user_agents)),
    })
}

/// Bootstrap, then bind. Nothing is bound if any earlier step fails.
pub async fn launch(config: ServerConfig) -> Result<(HttpServer, TcpListener), StartupError> {
    let state = bootstrap(&config).await?;

    let address = config.listener.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    match listener.local_addr() {
        Ok(local) => tracing::info!(address = %local, "Server started on {}", local),
        Err(_) => tracing::info!(address = %address, "Server started on {}", address),
    }

    Ok((HttpServer::new(config, state), listener))
}
