//! Server-side rendering subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     index.html → minify.rs → template.rs (parse placeholders, check keys)
//!
//! Per request (Render outcome):
//!     CacheKey::derive(context, props)
//!     → cache.rs (hit: stored page)
//!     → renderer.rs (miss: views.rs → markup.rs → template.rs)
//!     → HTML
//! ```
//!
//! # Design Decisions
//! - Views are plain functions over an explicit props struct
//! - The template is compiled once; rendering never touches the filesystem
//! - The cache is the only mutable shared state in the request path

pub mod cache;
pub mod markup;
pub mod minify;
pub mod renderer;
pub mod template;
pub mod views;

pub use cache::{CacheKey, RenderCache};
pub use renderer::{BotMetadata, PageData, RenderError, Renderer};
pub use template::{Template, TemplateError};
pub use views::{ViewFn, ViewProps, ViewRegistry};
