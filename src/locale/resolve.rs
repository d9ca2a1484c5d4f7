//! Best-locale resolution for a request.
//!
//! Resolution chain, first hit wins:
//! 1. `?locale=<id>` query parameter
//! 2. `locale=<id>` cookie
//! 3. `Accept-Language`, by descending q-value (header order breaks ties),
//!    exact tag first, then primary subtag (`fr-CA` → `fr`)
//! 4. the configured default

use axum::http::{header, HeaderMap, Uri};

use crate::locale::LocaleStore;

/// Query parameter and cookie name carrying an explicit locale choice.
pub const LOCALE_PARAM: &str = "locale";

impl LocaleStore {
    /// Pick the best supported locale for a request.
    ///
    /// Deterministic: identical headers and URL always give the same id.
    pub fn resolve_best_locale(&self, headers: &HeaderMap, uri: &Uri) -> &str {
        if let Some(id) = uri.query().and_then(|q| self.query_locale(q)) {
            return id;
        }

        let cookie = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| self.cookie_locale(v));
        if let Some(id) = cookie {
            return id;
        }

        let accept = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| self.accept_language_locale(v));
        if let Some(id) = accept {
            return id;
        }

        self.default_id()
    }

    /// Locale tags are case-insensitive (`pt-br` selects `pt-BR`).
    fn supported(&self, candidate: &str) -> Option<&str> {
        self.get(candidate)
            .or_else(|| {
                self.available()
                    .find(|l| l.id().eq_ignore_ascii_case(candidate))
            })
            .map(|l| l.id())
    }

    fn query_locale(&self, query: &str) -> Option<&str> {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == LOCALE_PARAM)
            .and_then(|(_, v)| self.supported(v))
    }

    fn cookie_locale(&self, header: &str) -> Option<&str> {
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| k.trim() == LOCALE_PARAM)
            .and_then(|(_, v)| self.supported(v.trim()))
    }

    fn accept_language_locale(&self, header: &str) -> Option<&str> {
        let mut entries: Vec<(&str, f64)> = Vec::new();
        for part in header.split(',') {
            let mut segments = part.split(';');
            let tag = segments.next().unwrap_or("").trim();
            if tag.is_empty() || tag == "*" {
                continue;
            }
            let mut q = 1.0_f64;
            for s in segments {
                if let Some(val) = s.trim().strip_prefix("q=") {
                    if let Ok(v) = val.trim().parse::<f64>() {
                        q = v;
                    }
                }
            }
            if q > 0.0 {
                entries.push((tag, q));
            }
        }

        // Stable sort keeps header order among equal weights.
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        entries.iter().find_map(|(tag, _)| {
            self.supported(tag).or_else(|| {
                tag.split(['-', '_'])
                    .next()
                    .and_then(|primary| self.supported(primary))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LocaleConfig, LocaleEntry};
    use crate::locale::Locale;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn store() -> LocaleStore {
        store_with(vec![LocaleEntry::new("en", "en_US"), LocaleEntry::new("fr", "fr_FR")])
    }

    fn store_with(available: Vec<LocaleEntry>) -> LocaleStore {
        let config = LocaleConfig {
            dir: String::new(),
            default: "en".into(),
            available,
        };
        let mut store = LocaleStore::new(&config);
        for entry in &config.available {
            store.insert(Locale::from_json(entry, &json!({})).unwrap());
        }
        store
    }

    fn headers(pairs: &[(header::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_static(value));
        }
        map
    }

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn test_falls_back_to_default() {
        let store = store();
        assert_eq!(store.resolve_best_locale(&HeaderMap::new(), &uri("/")), "en");
    }

    #[test]
    fn test_accept_language_q_priority() {
        let store = store();
        let h = headers(&[(header::ACCEPT_LANGUAGE, "en;q=0.4, fr;q=0.9")]);
        assert_eq!(store.resolve_best_locale(&h, &uri("/")), "fr");
    }

    #[test]
    fn test_accept_language_primary_subtag() {
        let store = store();
        let h = headers(&[(header::ACCEPT_LANGUAGE, "fr-CA,en;q=0.5")]);
        assert_eq!(store.resolve_best_locale(&h, &uri("/")), "fr");
    }

    #[test]
    fn test_accept_language_skips_unsupported() {
        let store = store();
        let h = headers(&[(header::ACCEPT_LANGUAGE, "de-DE,de;q=0.9,fr;q=0.1")]);
        assert_eq!(store.resolve_best_locale(&h, &uri("/")), "fr");
    }

    #[test]
    fn test_cookie_beats_accept_language() {
        let store = store();
        let h = headers(&[
            (header::COOKIE, "theme=dark; locale=fr"),
            (header::ACCEPT_LANGUAGE, "en"),
        ]);
        assert_eq!(store.resolve_best_locale(&h, &uri("/")), "fr");
    }

    #[test]
    fn test_query_beats_cookie() {
        let store = store();
        let h = headers(&[(header::COOKIE, "locale=fr")]);
        assert_eq!(store.resolve_best_locale(&h, &uri("/?x=1&locale=en")), "en");
    }

    #[test]
    fn test_unsupported_query_falls_through() {
        let store = store();
        let h = headers(&[(header::ACCEPT_LANGUAGE, "fr")]);
        assert_eq!(store.resolve_best_locale(&h, &uri("/?locale=de")), "fr");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let store = store();
        let h = headers(&[(header::ACCEPT_LANGUAGE, "fr;q=0.8, en;q=0.8")]);
        let first = store.resolve_best_locale(&h, &uri("/")).to_string();
        for _ in 0..10 {
            assert_eq!(store.resolve_best_locale(&h, &uri("/")), first);
        }
        assert_eq!(first, "fr");
    }

    #[test]
    fn test_mixed_case_locale_ids() {
        let store = store_with(vec![
            LocaleEntry::new("en", "en_US"),
            LocaleEntry::new("pt-BR", "pt_BR"),
        ]);

        let h = headers(&[(header::ACCEPT_LANGUAGE, "pt-BR")]);
        assert_eq!(store.resolve_best_locale(&h, &uri("/")), "pt-BR");

        let h = headers(&[(header::ACCEPT_LANGUAGE, "pt-br,en;q=0.5")]);
        assert_eq!(store.resolve_best_locale(&h, &uri("/")), "pt-BR");

        assert_eq!(store.resolve_best_locale(&HeaderMap::new(), &uri("/?locale=PT-br")), "pt-BR");
    }
}
