//! Route table lookup.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Match a request URL to a view, a redirect, an error or nothing
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) ordered scan, first match wins (acceptable for typical route counts)
//! - Explicit NotFound rather than silent default

use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::config::RouteConfig;
use crate::routing::matcher::{split_path, Params, Pattern};
use crate::routing::RouteError;

/// Message reported for URLs whose segments do not decode to UTF-8.
pub const MALFORMED_URI: &str = "URI malformed";

/// Router state handed to the view: which view, with which params, at which URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderProps {
    pub view: String,
    pub params: Params,
    pub location: Location,
}

/// The matched URL, split like a browser location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub pathname: String,
    /// Query string including the leading `?`, or empty.
    pub search: String,
}

/// Result of matching a URL against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Matching failed (malformed URL).
    Error(String),
    /// Redirect to `path` + `query`.
    Redirect { path: String, query: String },
    /// A view matched.
    Render(RenderProps),
    /// No route matched.
    NotFound,
}

#[derive(Debug, Clone)]
enum Target {
    View(String),
    Redirect(Pattern, Option<String>),
}

#[derive(Debug, Clone)]
struct RouteEntry {
    pattern: Pattern,
    target: Target,
}

/// An ordered, compiled routing table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Compile route definitions. Any malformed route fails the whole table.
    pub fn compile(routes: &[RouteConfig]) -> Result<Self, RouteError> {
        let mut entries = Vec::with_capacity(routes.len());

        for route in routes {
            let pattern = Pattern::compile(&route.path)?;
            let target = match (&route.view, &route.redirect) {
                (Some(view), None) => Target::View(view.clone()),
                (None, Some(to)) => compile_redirect(&pattern, to)?,
                _ => return Err(RouteError::AmbiguousTarget(route.path.clone())),
            };
            entries.push(RouteEntry { pattern, target });
        }

        tracing::debug!(routes = entries.len(), "Route table compiled");
        Ok(Self { entries })
    }

    /// Views referenced by the table, in order.
    pub fn views(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match &e.target {
            Target::View(view) => Some(view.as_str()),
            Target::Redirect(..) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Match a request target (`/path?query`). Pure and synchronous.
    pub fn match_url(&self, url: &str) -> MatchOutcome {
        let (pathname, search) = match url.find('?') {
            Some(idx) => (&url[..idx], &url[idx..]),
            None => (url, ""),
        };

        if !pathname.starts_with('/') {
            return MatchOutcome::Error(format!("Invalid URL: {url}"));
        }

        let mut segments = Vec::new();
        for raw in split_path(pathname) {
            match percent_decode_str(raw).decode_utf8() {
                Ok(decoded) => segments.push(decoded.into_owned()),
                Err(_) => return MatchOutcome::Error(MALFORMED_URI.to_string()),
            }
        }

        for entry in &self.entries {
            let Some(params) = entry.pattern.matches(&segments) else {
                continue;
            };

            return match &entry.target {
                Target::View(view) => MatchOutcome::Render(RenderProps {
                    view: view.clone(),
                    params,
                    location: Location {
                        pathname: pathname.to_string(),
                        search: search.to_string(),
                    },
                }),
                Target::Redirect(to, query) => MatchOutcome::Redirect {
                    path: to.fill(&params),
                    query: query.clone().unwrap_or_else(|| search.to_string()),
                },
            };
        }

        MatchOutcome::NotFound
    }
}

/// A redirect target may carry its own query, which then replaces the request's.
fn compile_redirect(source: &Pattern, to: &str) -> Result<Target, RouteError> {
    let (path, query) = match to.find('?') {
        Some(idx) => (&to[..idx], Some(to[idx..].to_string())),
        None => (to, None),
    };

    let target = Pattern::compile(path)?;
    let available: Vec<&str> = source.param_names().collect();
    if let Some(missing) = target.param_names().find(|name| !available.contains(name)) {
        return Err(RouteError::UnknownRedirectParam {
            pattern: source.source().to_string(),
            param: missing.to_string(),
        });
    }

    Ok(Target::Redirect(target, query))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::compile(&[
            RouteConfig::view("/", "home"),
            RouteConfig::redirect("/a", "/b"),
            RouteConfig::view("/b", "settings"),
            RouteConfig::view("/accounts/:id", "account_detail"),
            RouteConfig::redirect("/account/:id", "/accounts/:id"),
            RouteConfig::redirect("/legacy", "/b?from=legacy"),
        ])
        .unwrap()
    }

    #[test]
    fn test_render_outcome() {
        let MatchOutcome::Render(props) = table().match_url("/accounts/7?tab=expenses") else {
            panic!("expected render");
        };
        assert_eq!(props.view, "account_detail");
        assert_eq!(props.params.get("id").map(String::as_str), Some("7"));
        assert_eq!(props.location.pathname, "/accounts/7");
        assert_eq!(props.location.search, "?tab=expenses");
    }

    #[test]
    fn test_redirect_outcome() {
        assert_eq!(
            table().match_url("/a"),
            MatchOutcome::Redirect {
                path: "/b".into(),
                query: String::new()
            }
        );
    }

    #[test]
    fn test_redirect_keeps_query_and_params() {
        assert_eq!(
            table().match_url("/account/12?x=1"),
            MatchOutcome::Redirect {
                path: "/accounts/12".into(),
                query: "?x=1".into()
            }
        );
    }

    #[test]
    fn test_redirect_with_own_query() {
        assert_eq!(
            table().match_url("/legacy?x=1"),
            MatchOutcome::Redirect {
                path: "/b".into(),
                query: "?from=legacy".into()
            }
        );
    }

    #[test]
    fn test_not_found() {
        assert_eq!(table().match_url("/nope"), MatchOutcome::NotFound);
        assert_eq!(table().match_url("/accounts/1/extra"), MatchOutcome::NotFound);
    }

    #[test]
    fn test_malformed_url_is_error() {
        assert_eq!(
            table().match_url("/accounts/%E0%A4%A"),
            MatchOutcome::Error(MALFORMED_URI.into())
        );
        assert!(matches!(table().match_url("*"), MatchOutcome::Error(_)));
    }

    #[test]
    fn test_first_match_wins() {
        let table = RouteTable::compile(&[
            RouteConfig::view("/x/:any", "first"),
            RouteConfig::view("/x/fixed", "second"),
        ])
        .unwrap();
        let MatchOutcome::Render(props) = table.match_url("/x/fixed") else {
            panic!("expected render");
        };
        assert_eq!(props.view, "first");
    }

    #[test]
    fn test_redirect_with_unknown_param_rejected() {
        let err = RouteTable::compile(&[RouteConfig::redirect("/a", "/b/:id")]).unwrap_err();
        assert!(matches!(err, RouteError::UnknownRedirectParam { ref param, .. } if param == "id"));
    }

    #[test]
    fn test_views_listed_in_order() {
        let table = table();
        let views: Vec<&str> = table.views().collect();
        assert_eq!(views, vec!["home", "settings", "account_detail"]);
    }
}
