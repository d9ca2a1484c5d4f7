//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → env.rs (NODE_ENV / OPENSHIFT_NODEJS_* overrides)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → consumed once by lifecycle::startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow minimal (or absent) config files
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AssetsConfig, Environment, ListenerConfig, LocaleConfig, LocaleEntry, ObservabilityConfig,
    RenderConfig, RouteConfig, ServerConfig, StaticConfig, TemplateConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
