//! Per-request render context.

use axum::http::{header, HeaderMap, Uri};

use crate::locale::LocaleStore;

/// What the renderer needs to know about the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Resolved, supported locale id.
    pub locale: String,
    /// Whether the user agent is a link-preview crawler.
    pub is_bot: bool,
    /// Raw request target, for logging.
    pub url: String,
}

impl RequestContext {
    pub fn from_parts(headers: &HeaderMap, uri: &Uri, locales: &LocaleStore, bots: &BotDetector) -> Self {
        Self {
            locale: locales.resolve_best_locale(headers, uri).to_string(),
            is_bot: bots.is_bot(user_agent(headers)),
            url: uri.path_and_query().map_or_else(|| uri.path().to_string(), |pq| pq.to_string()),
        }
    }
}

pub(crate) fn user_agent(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok())
}

/// Substring match of the user agent against known crawler names.
#[derive(Debug, Clone, Default)]
pub struct BotDetector {
    patterns: Vec<String>,
}

impl BotDetector {
    pub fn new(patterns: &[String]) -> Self {
        Self {
            patterns: patterns.to_vec(),
        }
    }

    pub fn is_bot(&self, user_agent: Option<&str>) -> bool {
        user_agent.is_some_and(|ua| self.patterns.iter().any(|p| ua.contains(p.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LocaleConfig, LocaleEntry};
    use crate::locale::Locale;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn detector() -> BotDetector {
        BotDetector::new(&["facebookexternalhit".to_string()])
    }

    #[test]
    fn test_bot_detection() {
        let bots = detector();
        assert!(bots.is_bot(Some("facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)")));
        assert!(!bots.is_bot(Some("Mozilla/5.0 (X11; Linux x86_64)")));
        assert!(!bots.is_bot(None));
    }

    #[test]
    fn test_context_from_request() {
        let mut locales = LocaleStore::new(&LocaleConfig::default());
        for (id, iso) in [("en", "en_US"), ("fr", "fr_FR")] {
            locales.insert(Locale::from_json(&LocaleEntry::new(id, iso), &json!({})).unwrap());
        }

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("fr-CA,fr;q=0.8"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("facebookexternalhit/1.1"));
        let uri: Uri = "/settings?tab=1".parse().unwrap();

        let ctx = RequestContext::from_parts(&headers, &uri, &locales, &detector());
        assert_eq!(ctx.locale, "fr");
        assert!(ctx.is_bot);
        assert_eq!(ctx.url, "/settings?tab=1");
    }
}
