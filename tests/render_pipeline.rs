//! End-to-end tests for the page pipeline over a real listener.

use std::time::Duration;

use reqwest::header;
use reqwest::StatusCode;
use ssr_server::lifecycle::TerminationSignal;

mod common;

#[tokio::test]
async fn test_home_page_renders() {
    let server = common::start_server().await;

    let resp = common::client().get(server.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let headers = resp.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    assert_eq!(headers[header::VARY], "accept-language, cookie, user-agent");
    assert!(headers.contains_key("x-request-id"));

    let body = resp.text().await.unwrap();
    assert!(body.starts_with("<!doctype html><html lang=\"en\">"));
    assert!(body.contains("<title>Splitme</title>"));
    assert!(body.contains("<h1>Your accounts</h1>"));
    assert!(body.contains(r#"<script src="http://localhost:8000/browser.js"></script>"#));
    assert!(!body.contains("test template"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = common::start_server().await;

    let resp = common::client().get(server.url("/nope")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.text().await.unwrap(), "Not found");
}

#[tokio::test]
async fn test_redirects() {
    let server = common::start_server().await;
    let client = common::client();

    let resp = client.get(server.url("/a")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()[header::LOCATION], "/b");

    let resp = client.get(server.url("/account/12?tab=2")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers()[header::LOCATION], "/accounts/12?tab=2");
}

#[tokio::test]
async fn test_malformed_url_is_server_error() {
    let server = common::start_server().await;

    let resp = common::client()
        .get(server.url("/accounts/%FF"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.text().await.unwrap(), "URI malformed");
}

#[tokio::test]
async fn test_bot_gets_locale_metadata() {
    let server = common::start_server().await;
    let client = common::client();

    let bot = client
        .get(server.url("/settings"))
        .header(header::USER_AGENT, "facebookexternalhit/1.1")
        .header(header::ACCEPT_LANGUAGE, "fr-FR,fr;q=0.9")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(bot.contains(r#"<html lang="fr">"#));
    assert!(bot.contains(r#"<meta property="og:locale" content="fr_FR">"#));
    assert!(bot.contains(r#"<meta property="og:locale:alternate" content="en_US">"#));
    assert!(bot.contains("<title>Paramètres · Splitme</title>"));

    let browser = client
        .get(server.url("/settings"))
        .header(header::USER_AGENT, "Mozilla/5.0")
        .header(header::ACCEPT_LANGUAGE, "fr-FR,fr;q=0.9")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(browser.contains(r#"<html lang="fr">"#));
    assert!(!browser.contains("og:locale"));
}

#[tokio::test]
async fn test_locale_query_overrides_header() {
    let server = common::start_server().await;

    let body = common::client()
        .get(server.url("/?locale=fr"))
        .header(header::ACCEPT_LANGUAGE, "en")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains(r#"<html lang="fr">"#));
    assert!(body.contains("<h1>Vos comptes</h1>"));
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let server = common::start_server().await;
    let client = common::client();

    let first = client.get(server.url("/accounts/7")).send().await.unwrap().text().await.unwrap();
    let second = client.get(server.url("/accounts/7?x=1")).send().await.unwrap().text().await.unwrap();
    assert_eq!(first, second);
    assert!(first.contains("<title>Account 7 · Splitme</title>"));
}

#[tokio::test]
async fn test_static_roots_cache_headers() {
    let server = common::start_server().await;
    let client = common::client();

    let resp = client.get(server.url("/robots.txt")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-cache");

    let resp = client.get(server.url("/js/app.js")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "public, max-age=31536000");
    assert_eq!(resp.text().await.unwrap(), "console.log('app');\n");

    // No directory index on the long-lived root: falls through to the pages.
    let resp = client.get(server.url("/js")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.text().await.unwrap(), "Not found");
}

#[tokio::test]
async fn test_shutdown_stops_server() {
    let server = common::start_server().await;
    server.shutdown.trigger(TerminationSignal::Terminate);

    tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .unwrap()
        .unwrap();
}
