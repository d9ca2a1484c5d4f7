//! Catch-all page handler.
//!
//! Per request: `Received → Matched{Error|Redirect|Render|NotFound} → Responded`.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::http::context::{user_agent, RequestContext};
use crate::http::request::RequestIdExt;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::render::CacheKey;
use crate::routing::MatchOutcome;

/// Response body for unmatched URLs.
pub const NOT_FOUND_BODY: &str = "Not found";

pub async fn page_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let uri = request.uri();
    let url = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.to_string());

    match state.routes.match_url(&url) {
        MatchOutcome::Error(message) => {
            tracing::warn!(request_id = request.request_id(), url = %url, error = %message, "Route matching failed");
            metrics::record_request("error", 500, start);
            (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
        }
        MatchOutcome::Redirect { path, query } => {
            let location = format!("{path}{query}");
            match HeaderValue::try_from(location.as_str()) {
                Ok(value) => {
                    tracing::debug!(url = %url, location = %location, "Redirecting");
                    metrics::record_request("redirect", 302, start);
                    (StatusCode::FOUND, [(header::LOCATION, value)]).into_response()
                }
                Err(e) => {
                    tracing::error!(url = %url, location = %location, error = %e, "Invalid redirect target");
                    metrics::record_request("error", 500, start);
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
                }
            }
        }
        MatchOutcome::Render(props) => {
            let ctx = RequestContext::from_parts(request.headers(), uri, &state.locales, &state.bots);
            let key = CacheKey::derive(&ctx, &props);

            let page = state
                .cache
                .get_or_compute(key, || state.renderer.render(&ctx, &props));

            match page {
                Ok(html) => {
                    tracing::info!(
                        url = %ctx.url,
                        locale = %ctx.locale,
                        user_agent = user_agent(request.headers()).unwrap_or("-"),
                        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "Page rendered"
                    );
                    metrics::record_request("render", 200, start);
                    Html(html.to_string()).into_response()
                }
                Err(e) => {
                    tracing::error!(
                        request_id = request.request_id(),
                        url = %ctx.url,
                        view = %props.view,
                        error = %e,
                        "Render failed"
                    );
                    metrics::record_request("error", 500, start);
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
                }
            }
        }
        MatchOutcome::NotFound => {
            tracing::debug!(url = %url, "No route matched");
            metrics::record_request("not_found", 404, start);
            (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
        }
    }
}
