//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Root configuration for the SSR server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Runtime environment (selects asset resolution).
    pub environment: Environment,

    /// Listener configuration (bind interface and port).
    pub listener: ListenerConfig,

    /// Bundle asset resolution.
    pub assets: AssetsConfig,

    /// Static file roots served ahead of the page handler.
    pub statics: StaticConfig,

    /// Page template.
    pub template: TemplateConfig,

    /// Supported locales and where their tables live.
    pub locales: LocaleConfig,

    /// Render pipeline settings.
    pub render: RenderConfig,

    /// Routing table, checked in order.
    pub routes: Vec<RouteConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Client configuration embedded into every page as JSON.
    pub client: Map<String, Value>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            listener: ListenerConfig::default(),
            assets: AssetsConfig::default(),
            statics: StaticConfig::default(),
            template: TemplateConfig::default(),
            locales: LocaleConfig::default(),
            render: RenderConfig::default(),
            routes: default_routes(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            client: Map::new(),
        }
    }
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    /// Interpret a `NODE_ENV`-style value. Anything but `production` is development.
    pub fn from_node_env(value: &str) -> Self {
        if value == "production" {
            Environment::Production
        } else {
            Environment::Development
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind: an IP address or a hostname (e.g., "127.0.0.1", "localhost").
    pub ip: String,

    /// Port to bind.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` form accepted by `TcpListener::bind`. IPv6 literals are bracketed.
    pub fn bind_address(&self) -> String {
        if self.ip.parse::<std::net::Ipv6Addr>().is_ok() {
            format!("[{}]:{}", self.ip, self.port)
        } else {
            format!("{}:{}", self.ip, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            ip: DEFAULT_IP.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Fallback interface when none is configured.
pub const DEFAULT_IP: &str = "127.0.0.1";

/// Fallback development port.
pub const DEFAULT_PORT: u16 = 8080;

/// Asset manifest configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Built manifest file, read in production only.
    pub manifest_path: String,

    /// Bundle name looked up in the manifest.
    pub bundle: String,

    /// Entry script used in development.
    pub dev_server_url: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            manifest_path: "./server/static/assets.json".to_string(),
            bundle: "main".to_string(),
            dev_server_url: "http://localhost:8000/browser.js".to_string(),
        }
    }
}

/// Static file roots.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Always-revalidate root (`Cache-Control: no-cache`).
    pub public_dir: String,

    /// Long-lived root without directory index.
    pub static_dir: String,

    /// `max-age` for the long-lived root, in seconds.
    pub max_age_secs: u64,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            public_dir: "./server/public".to_string(),
            static_dir: "./server/static".to_string(),
            max_age_secs: 365 * 24 * 60 * 60,
        }
    }
}

/// Page template configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Path to the HTML page template.
    pub path: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: "./templates/index.html".to_string(),
        }
    }
}

/// Locale configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Directory containing `<id>.json` translation files.
    pub dir: String,

    /// Locale used when nothing in the request matches.
    pub default: String,

    /// Supported locales, all loaded before the listener binds.
    pub available: Vec<LocaleEntry>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            dir: "./locales".to_string(),
            default: "en".to_string(),
            available: vec![
                LocaleEntry::new("en", "en_US"),
                LocaleEntry::new("fr", "fr_FR"),
            ],
        }
    }
}

/// A supported locale.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocaleEntry {
    /// Locale identifier ("en").
    pub id: String,

    /// ISO code used in page metadata ("en_US").
    pub iso: String,
}

impl LocaleEntry {
    pub fn new(id: impl Into<String>, iso: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            iso: iso.into(),
        }
    }
}

/// Render pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Translation key used for the page description.
    pub description_key: String,

    /// Translation key used for the outermost page title.
    pub title_key: String,

    /// Maximum number of cached pages; new keys past this are rendered uncached.
    pub cache_max_entries: usize,

    /// User-Agent substrings that mark a request as coming from a crawler.
    pub bot_user_agents: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            description_key: "product.description.long".to_string(),
            title_key: "app.name".to_string(),
            cache_max_entries: 1024,
            bot_user_agents: vec!["facebookexternalhit".to_string()],
        }
    }
}

/// Route configuration mapping a path pattern to a view or a redirect.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path pattern (`/accounts/:id`, `/docs/*`).
    pub path: String,

    /// View rendered when the pattern matches.
    #[serde(default)]
    pub view: Option<String>,

    /// Redirect target; may reference the pattern's parameters.
    #[serde(default)]
    pub redirect: Option<String>,
}

impl RouteConfig {
    pub fn view(path: impl Into<String>, view: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            view: Some(view.into()),
            redirect: None,
        }
    }

    pub fn redirect(path: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            view: None,
            redirect: Some(to.into()),
        }
    }
}

/// Default routing table, used when a config file has no `routes`.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::view("/", "home"),
        RouteConfig::view("/accounts/:id", "account_detail"),
        RouteConfig::redirect("/account/:id", "/accounts/:id"),
        RouteConfig::view("/settings", "settings"),
    ]
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
