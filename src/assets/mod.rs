//! Client bundle assets.
//!
//! # Data Flow
//! ```text
//! Environment::Production
//!     → manifest.rs (read assets.json, pick the configured bundle)
//! Environment::Development
//!     → manifest.rs (point at the dev server bundle, no stylesheet)
//!     → AssetManifest (immutable, read by the renderer)
//! ```

pub mod manifest;

pub use manifest::{AssetError, AssetManifest};
