//! Server-side rendering web server library.

pub mod assets;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod locale;
pub mod observability;
pub mod render;
pub mod routing;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
