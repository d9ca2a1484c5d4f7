//! Locale loading and translation lookup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use futures_util::future::try_join_all;
use serde_json::Value;
use thiserror::Error;

use crate::config::{LocaleConfig, LocaleEntry};

/// Errors raised while loading locales. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("locale `{0}` is not configured")]
    Unknown(String),

    #[error("failed to read locale `{id}` from {}: {source}", path.display())]
    Io {
        id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse locale `{id}`: {source}")]
    Parse {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("locale `{id}` has an unsupported value at `{key}`")]
    InvalidEntry { id: String, key: String },
}

/// A loaded locale: identifier, metadata ISO code and flattened messages.
#[derive(Debug, Clone)]
pub struct Locale {
    id: String,
    iso: String,
    messages: HashMap<String, String>,
}

impl Locale {
    /// Read and parse `<dir>/<id>.json`.
    pub async fn load(dir: &Path, entry: &LocaleEntry) -> Result<Self, LocaleError> {
        let path = dir.join(format!("{}.json", entry.id));
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LocaleError::Io {
                id: entry.id.clone(),
                path: path.clone(),
                source,
            })?;

        let value: Value = serde_json::from_str(&raw).map_err(|source| LocaleError::Parse {
            id: entry.id.clone(),
            source,
        })?;

        let locale = Self::from_json(entry, &value)?;
        tracing::info!(
            locale = %locale.id,
            messages = locale.messages.len(),
            path = %path.display(),
            "Locale loaded"
        );
        Ok(locale)
    }

    /// Build a locale from an already-parsed translation table.
    ///
    /// Nested objects are flattened into dotted keys
    /// (`{"product": {"name": "x"}}` → `product.name`).
    pub fn from_json(entry: &LocaleEntry, value: &Value) -> Result<Self, LocaleError> {
        let mut messages = HashMap::new();
        match value {
            Value::Object(_) => flatten(&entry.id, "", value, &mut messages)?,
            _ => {
                return Err(LocaleError::InvalidEntry {
                    id: entry.id.clone(),
                    key: String::new(),
                })
            }
        }

        Ok(Self {
            id: entry.id.clone(),
            iso: entry.iso.clone(),
            messages,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn iso(&self) -> &str {
        &self.iso
    }

    /// Translate `key`. Unknown keys come back unchanged.
    pub fn t(&self, key: &str) -> String {
        self.t_with(key, &[])
    }

    /// Translate `key`, substituting `%{name}` placeholders from `args`.
    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        let Some(text) = self.messages.get(key) else {
            tracing::warn!(locale = %self.id, key, "Missing translation");
            return key.to_string();
        };

        let mut result = text.clone();
        for (name, value) in args {
            result = result.replace(&format!("%{{{}}}", name), value);
        }
        result
    }
}

fn flatten(
    id: &str,
    prefix: &str,
    value: &Value,
    out: &mut HashMap<String, String>,
) -> Result<(), LocaleError> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(id, &path, child, out)?;
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Number(n) => {
            out.insert(prefix.to_string(), n.to_string());
        }
        Value::Bool(b) => {
            out.insert(prefix.to_string(), b.to_string());
        }
        Value::Null | Value::Array(_) => {
            return Err(LocaleError::InvalidEntry {
                id: id.to_string(),
                key: prefix.to_string(),
            })
        }
    }
    Ok(())
}

/// Holds every loaded locale. Immutable once startup completes.
#[derive(Debug)]
pub struct LocaleStore {
    dir: PathBuf,
    entries: Vec<LocaleEntry>,
    default: String,
    loaded: HashMap<String, Locale>,
}

impl LocaleStore {
    /// Create an empty store for the configured locales.
    pub fn new(config: &LocaleConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            entries: config.available.clone(),
            default: config.default.clone(),
            loaded: HashMap::new(),
        }
    }

    /// Load every configured locale concurrently.
    ///
    /// Fails as soon as any locale fails; the caller must not start serving.
    pub async fn load_required(config: &LocaleConfig) -> Result<Self, LocaleError> {
        let mut store = Self::new(config);
        let dir = store.dir.clone();
        let locales = try_join_all(store.entries.iter().map(|entry| Locale::load(&dir, entry))).await?;

        for locale in locales {
            store.insert(locale);
        }
        Ok(store)
    }

    /// Load (or reload) a single configured locale.
    pub async fn load(&mut self, id: &str) -> Result<(), LocaleError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| LocaleError::Unknown(id.to_string()))?
            .clone();

        let locale = Locale::load(&self.dir, &entry).await?;
        self.insert(locale);
        Ok(())
    }

    /// Register an already-built locale. It must be one of the configured ones.
    pub fn insert(&mut self, locale: Locale) {
        self.loaded.insert(locale.id.clone(), locale);
    }

    pub fn get(&self, id: &str) -> Option<&Locale> {
        self.loaded.get(id)
    }

    pub fn is_supported(&self, id: &str) -> bool {
        self.loaded.contains_key(id)
    }

    /// Configured default locale id.
    pub fn default_id(&self) -> &str {
        &self.default
    }

    /// ISO code for `id`, if loaded.
    pub fn iso(&self, id: &str) -> Option<&str> {
        self.get(id).map(Locale::iso)
    }

    /// Loaded locales in configuration order.
    pub fn available(&self) -> impl Iterator<Item = &Locale> {
        self.entries.iter().filter_map(|e| self.loaded.get(&e.id))
    }

    /// Number of loaded locales.
    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}
