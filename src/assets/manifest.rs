//! Asset manifest resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::config::{AssetsConfig, Environment};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse asset manifest {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("asset manifest has no bundle named `{0}`")]
    MissingBundle(String),
}

/// One entry of the build manifest: `{"main": {"js": "...", "css": "..."}}`.
#[derive(Debug, Deserialize)]
struct BundleEntry {
    js: String,
    #[serde(default)]
    css: Option<String>,
}

/// URLs of the client bundle referenced from the page template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetManifest {
    pub js: String,
    pub css: Option<String>,
}

impl AssetManifest {
    /// Select the manifest for the running environment.
    pub async fn from_config(config: &AssetsConfig, env: Environment) -> Result<Self, AssetError> {
        let manifest = match env {
            Environment::Production => {
                Self::read(Path::new(&config.manifest_path), &config.bundle).await?
            }
            Environment::Development => Self::dev_server(&config.dev_server_url),
        };

        tracing::info!(
            environment = ?env,
            js = %manifest.js,
            css = manifest.css.as_deref().unwrap_or("-"),
            "Asset manifest resolved"
        );
        Ok(manifest)
    }

    /// Bundle served by the development server; styles are injected by the bundle.
    pub fn dev_server(url: &str) -> Self {
        Self {
            js: url.to_string(),
            css: None,
        }
    }

    /// Read a build manifest file and pick `bundle` from it.
    pub async fn read(path: &Path, bundle: &str) -> Result<Self, AssetError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| AssetError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let mut entries: HashMap<String, BundleEntry> =
            serde_json::from_str(&raw).map_err(|source| AssetError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let entry = entries
            .remove(bundle)
            .ok_or_else(|| AssetError::MissingBundle(bundle.to_string()))?;

        Ok(Self {
            js: entry.js,
            css: entry.css,
        })
    }
}
