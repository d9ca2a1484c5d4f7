//! Environment variable overrides.
//!
//! # Variables
//! - `NODE_ENV`: `production` selects the built asset manifest
//! - `OPENSHIFT_NODEJS_IP`: bind interface, an IP address or a hostname such as
//!   `localhost` (falls back to the configured one, with a warning)
//! - `OPENSHIFT_NODEJS_PORT`: bind port (falls back to the configured one)

use thiserror::Error;

use crate::config::schema::{Environment, ServerConfig};

pub const NODE_ENV: &str = "NODE_ENV";
pub const IP_VAR: &str = "OPENSHIFT_NODEJS_IP";
pub const PORT_VAR: &str = "OPENSHIFT_NODEJS_PORT";

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("{PORT_VAR} `{0}` is not a valid port")]
    InvalidPort(String),
}

/// Apply overrides from the process environment.
pub fn apply_env(config: &mut ServerConfig) -> Result<(), EnvError> {
    apply_env_from(config, |name| std::env::var(name).ok())
}

/// Apply overrides using `lookup` to read variables.
pub fn apply_env_from<F>(config: &mut ServerConfig, lookup: F) -> Result<(), EnvError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(NODE_ENV) {
        config.environment = Environment::from_node_env(&value);
    }

    match lookup(IP_VAR) {
        Some(ip) => config.listener.ip = ip,
        None => tracing::warn!(
            ip = %config.listener.ip,
            "No {} var, using configured interface",
            IP_VAR
        ),
    }

    if let Some(port) = lookup(PORT_VAR) {
        config.listener.port = port
            .trim()
            .parse()
            .map_err(|_| EnvError::InvalidPort(port.clone()))?;
    }

    Ok(())
}
