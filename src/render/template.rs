//! Page template: compiled once at startup, interpolated per render.
//!
//! Placeholders:
//! - `{%= path %}` inserts the value HTML-escaped
//! - `{%# path %}` inserts the value as-is
//!
//! `path` is a dotted lookup into a JSON object (`assets.js`). There is no
//! control flow; anything else between `{%` and `%}` is rejected.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::render::markup::escape_html;
use crate::render::minify::minify_html;

const OPEN: &str = "{%";
const CLOSE: &str = "%}";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unterminated placeholder at byte {0}")]
    Unterminated(usize),

    #[error("unsupported template tag `{{%{0}%}}`")]
    Unsupported(String),

    #[error("template references missing data key `{0}`")]
    MissingKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Escaped(String),
    Raw(String),
}

/// A parsed, minified page template.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Read, minify and parse a template file.
    pub async fn load(path: &Path) -> Result<Self, TemplateError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TemplateError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let template = Self::compile(&source)?;
        tracing::info!(
            path = %path.display(),
            placeholders = template.placeholders().count(),
            "Template compiled"
        );
        Ok(template)
    }

    /// Minify then parse.
    pub fn compile(source: &str) -> Result<Self, TemplateError> {
        Self::parse(&minify_html(source))
    }

    /// Parse without minifying.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find(OPEN) {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let body_start = start + OPEN.len();
            let len = rest[body_start..]
                .find(CLOSE)
                .ok_or(TemplateError::Unterminated(offset + start))?;
            let body = &rest[body_start..body_start + len];
            segments.push(parse_tag(body)?);

            let consumed = body_start + len + CLOSE.len();
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Data paths referenced by the template, in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Escaped(path) | Segment::Raw(path) => Some(path.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Verify every placeholder resolves against `sample`.
    pub fn check_keys(&self, sample: &Value) -> Result<(), TemplateError> {
        match self.placeholders().find(|path| resolve(path, sample).is_none()) {
            Some(path) => Err(TemplateError::MissingKey(path.to_string())),
            None => Ok(()),
        }
    }

    /// Substitute every placeholder from `data`. Inserted values are not re-scanned.
    pub fn interpolate(&self, data: &Value) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Escaped(path) => out.push_str(&escape_html(&stringify(lookup(path, data)?))),
                Segment::Raw(path) => out.push_str(&stringify(lookup(path, data)?)),
            }
        }
        Ok(out)
    }
}

fn parse_tag(body: &str) -> Result<Segment, TemplateError> {
    let unsupported = || TemplateError::Unsupported(body.to_string());

    let (kind, path) = match body.chars().next() {
        Some(c @ ('=' | '#')) => (c, body[1..].trim()),
        _ => return Err(unsupported()),
    };

    let valid = !path.is_empty()
        && path
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    if !valid {
        return Err(unsupported());
    }

    Ok(match kind {
        '=' => Segment::Escaped(path.to_string()),
        _ => Segment::Raw(path.to_string()),
    })
}

fn resolve<'a>(path: &str, data: &'a Value) -> Option<&'a Value> {
    let mut current = data;
    for key in path.split('.') {
        current = current.get(key)?;
    }
    Some(current)
}

fn lookup<'a>(path: &str, data: &'a Value) -> Result<&'a Value, TemplateError> {
    resolve(path, data).ok_or_else(|| TemplateError::MissingKey(path.to_string()))
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
