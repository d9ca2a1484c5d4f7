//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (default locale is one of the available ones)
//! - Validate value ranges (timeouts > 0, cache bound > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Route patterns are checked in depth by `routing::RouteTable::compile`

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.ip `{0}` is not an IP address or hostname")]
    InvalidListenerIp(String),

    #[error("locales.available is empty")]
    NoLocales,

    #[error("locales.available[{0}] has an empty id")]
    EmptyLocaleId(usize),

    #[error("locale `{0}` has an empty iso code")]
    EmptyLocaleIso(String),

    #[error("locale `{0}` is listed more than once")]
    DuplicateLocale(String),

    #[error("default locale `{0}` is not in locales.available")]
    UnknownDefaultLocale(String),

    #[error("render.description_key is empty")]
    EmptyDescriptionKey,

    #[error("render.cache_max_entries must be greater than zero")]
    ZeroCacheBound,

    #[error("render.bot_user_agents contains an empty pattern")]
    EmptyBotPattern,

    #[error("routes is empty")]
    NoRoutes,

    #[error("route `{0}` must set exactly one of `view` or `redirect`")]
    AmbiguousRoute(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !is_listen_host(&config.listener.ip) {
        errors.push(ValidationError::InvalidListenerIp(config.listener.ip.clone()));
    }

    validate_locales(config, &mut errors);

    if config.render.description_key.is_empty() {
        errors.push(ValidationError::EmptyDescriptionKey);
    }
    if config.render.cache_max_entries == 0 {
        errors.push(ValidationError::ZeroCacheBound);
    }
    if config.render.bot_user_agents.iter().any(|p| p.is_empty()) {
        errors.push(ValidationError::EmptyBotPattern);
    }

    if config.routes.is_empty() {
        errors.push(ValidationError::NoRoutes);
    }
    for route in &config.routes {
        if route.view.is_some() == route.redirect.is_some() {
            errors.push(ValidationError::AmbiguousRoute(route.path.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// An IP address, or a hostname the resolver can look up (`localhost`).
fn is_listen_host(host: &str) -> bool {
    if host.parse::<IpAddr>().is_ok() {
        return true;
    }
    let name = host.strip_suffix('.').unwrap_or(host);
    !name.is_empty()
        && name.len() <= 253
        && name.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
}

fn validate_locales(config: &ServerConfig, errors: &mut Vec<ValidationError>) {
    let locales = &config.locales;
    if locales.available.is_empty() {
        errors.push(ValidationError::NoLocales);
        return;
    }

    let mut seen = HashSet::new();
    for (i, entry) in locales.available.iter().enumerate() {
        if entry.id.is_empty() {
            errors.push(ValidationError::EmptyLocaleId(i));
            continue;
        }
        if entry.iso.is_empty() {
            errors.push(ValidationError::EmptyLocaleIso(entry.id.clone()));
        }
        if !seen.insert(entry.id.as_str()) {
            errors.push(ValidationError::DuplicateLocale(entry.id.clone()));
        }
    }

    if !seen.contains(locales.default.as_str()) {
        errors.push(ValidationError::UnknownDefaultLocale(locales.default.clone()));
    }
}
