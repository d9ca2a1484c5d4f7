//! Static file roots mounted ahead of the page handler.
//!
//! Lookup order: `public_dir`, then `static_dir`, then the pages. A file
//! missing from one root falls through to the next.
//!
//! - `public_dir`: `Cache-Control: no-cache` (always revalidate)
//! - `static_dir`: `Cache-Control: public, max-age=<max_age_secs>`, no directory index

use axum::http::{header, HeaderValue};
use axum::Router;
use tower::Layer;
use tower_http::services::ServeDir;
use tower_http::set_header::{SetResponseHeader, SetResponseHeaderLayer};

use crate::config::StaticConfig;

pub type StaticService = SetResponseHeader<ServeDir<SetResponseHeader<ServeDir<Router>, HeaderValue>>, HeaderValue>;

/// Wrap the page router with both static roots.
///
/// Headers are only added when absent, so page responses keep their own
/// `Cache-Control`.
pub fn with_static_roots(pages: Router, config: &StaticConfig) -> StaticService {
    let immutable = ServeDir::new(&config.static_dir)
        .append_index_html_on_directories(false)
        .call_fallback_on_method_not_allowed(true)
        .fallback(pages);
    let immutable = SetResponseHeaderLayer::if_not_present(header::CACHE_CONTROL, long_lived(config.max_age_secs))
        .layer(immutable);

    let public = ServeDir::new(&config.public_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(immutable);
    SetResponseHeaderLayer::if_not_present(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"))
        .layer(public)
}

fn long_lived(max_age_secs: u64) -> HeaderValue {
    HeaderValue::from_str(&format!("public, max-age={max_age_secs}"))
        .unwrap_or_else(|_| HeaderValue::from_static("public"))
}
