//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile path patterns (`/accounts/:id`, `/docs/*`) into segments
//! - Match decoded request segments, capturing parameters
//! - Fill redirect targets with captured parameters
//!
//! # Design Decisions
//! - Matching is case-sensitive
//! - `*` is only allowed as the last segment and captures the rest (`splat`)
//! - No regex to guarantee O(n) matching

use std::collections::{BTreeMap, HashSet};

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::routing::RouteError;

/// Captured path parameters, ordered by name.
pub type Params = BTreeMap<String, String>;

/// Name under which a trailing `*` is captured.
pub const SPLAT: &str = "splat";

/// Characters escaped when a captured value is written back into a path.
const SPLAT_ENCODE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const PARAM_ENCODE: &AsciiSet = &SPLAT_ENCODE.add(b'/');

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    Splat,
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compile a pattern, rejecting malformed ones.
    pub fn compile(source: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: source.to_string(),
            reason: reason.to_string(),
        };

        if !source.starts_with('/') {
            return Err(invalid("must start with `/`"));
        }

        let raw = split_path(source);
        let mut segments = Vec::with_capacity(raw.len());
        let mut names = HashSet::new();

        for (i, part) in raw.iter().enumerate() {
            let segment = if *part == "*" {
                if i + 1 != raw.len() {
                    return Err(invalid("`*` must be the last segment"));
                }
                Segment::Splat
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(invalid("parameter names must be non-empty [A-Za-z0-9_]"));
                }
                if !names.insert(name) {
                    return Err(invalid("duplicate parameter name"));
                }
                Segment::Param(name.to_string())
            } else {
                if part.is_empty() {
                    return Err(invalid("empty segment"));
                }
                if part.contains([':', '*']) {
                    return Err(invalid("`:` and `*` are only allowed at the start of a segment"));
                }
                Segment::Static(part.to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names this pattern captures (`splat` for a trailing `*`).
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Splat => Some(SPLAT),
            Segment::Static(_) => None,
        })
    }

    /// Match already-decoded path segments.
    pub fn matches(&self, path: &[String]) -> Option<Params> {
        let mut params = Params::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Splat => {
                    let rest = path.get(i..).unwrap_or_default();
                    params.insert(SPLAT.to_string(), rest.join("/"));
                    return Some(params);
                }
                Segment::Static(expected) => {
                    if path.get(i) != Some(expected) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = path.get(i)?;
                    if value.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), value.clone());
                }
            }
        }

        (path.len() == self.segments.len()).then_some(params)
    }

    /// Build a concrete path from this pattern, encoding captured values.
    ///
    /// Every parameter must be present in `params`; callers check this at
    /// compile time with [`Pattern::param_names`].
    pub fn fill(&self, params: &Params) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }

        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                Segment::Static(s) => out.push_str(s),
                Segment::Param(name) => {
                    let value = params.get(name).map(String::as_str).unwrap_or_default();
                    out.extend(utf8_percent_encode(value, PARAM_ENCODE));
                }
                Segment::Splat => {
                    let value = params.get(SPLAT).map(String::as_str).unwrap_or_default();
                    out.extend(utf8_percent_encode(value, SPLAT_ENCODE));
                }
            }
        }
        out
    }
}

/// Split a path into raw segments, ignoring one trailing slash.
///
/// `/` yields no segments.
pub fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(path: &str) -> Vec<String> {
        split_path(path).into_iter().map(String::from).collect()
    }

    #[test]
    fn test_static_pattern() {
        let p = Pattern::compile("/settings").unwrap();
        assert_eq!(p.matches(&segs("/settings")), Some(Params::new()));
        assert_eq!(p.matches(&segs("/settings/")), Some(Params::new()));
        assert_eq!(p.matches(&segs("/Settings")), None);
        assert_eq!(p.matches(&segs("/settings/more")), None);
    }

    #[test]
    fn test_root_pattern() {
        let p = Pattern::compile("/").unwrap();
        assert!(p.matches(&segs("/")).is_some());
        assert!(p.matches(&segs("/a")).is_none());
    }

    #[test]
    fn test_param_capture() {
        let p = Pattern::compile("/accounts/:id").unwrap();
        let params = p.matches(&segs("/accounts/42")).unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
        assert!(p.matches(&segs("/accounts")).is_none());
    }

    #[test]
    fn test_splat_capture() {
        let p = Pattern::compile("/docs/*").unwrap();
        let params = p.matches(&segs("/docs/guide/intro")).unwrap();
        assert_eq!(params.get(SPLAT).map(String::as_str), Some("guide/intro"));

        let params = p.matches(&segs("/docs")).unwrap();
        assert_eq!(params.get(SPLAT).map(String::as_str), Some(""));
    }

    #[test]
    fn test_invalid_patterns() {
        for bad in ["settings", "/a/*/b", "/:", "/a/:id/:id", "/a//b", "/a*b"] {
            assert!(Pattern::compile(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_fill_encodes_values() {
        let p = Pattern::compile("/accounts/:id").unwrap();
        let mut params = Params::new();
        params.insert("id".into(), "a b/c".into());
        assert_eq!(p.fill(&params), "/accounts/a%20b%2Fc");

        let p = Pattern::compile("/docs/*").unwrap();
        let mut params = Params::new();
        params.insert(SPLAT.into(), "x/y z".into());
        assert_eq!(p.fill(&params), "/docs/x/y%20z");
    }
}
