//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use ssr_server::config::{Environment, RouteConfig, ServerConfig};
use ssr_server::lifecycle::{launch, Shutdown};
use tempfile::TempDir;
use tokio::task::JoinHandle;

pub const TEMPLATE: &str = r#"<!doctype html>
<html lang="{%= locale %}">
  <head>
    <!-- test template -->
    <title>{%= title %}</title>
    <meta name="description" content="{%= description %}">
    {%# bot_meta %}
    {%# stylesheet %}
  </head>
  <body>
    <div id="root">{%# markup %}</div>
    <script>window.APP_CONFIG = {%# client_config %};</script>
    <script src="{%= script %}"></script>
  </body>
</html>
"#;

const EN: &str = r#"{
  "app": { "name": "Splitme" },
  "product": { "description": { "long": "Split expenses" } },
  "home": { "title": "Your accounts", "welcome": "Welcome back." },
  "account": { "title": "Account %{id}" },
  "settings": { "title": "Settings" }
}"#;

const FR: &str = r#"{
  "app": { "name": "Splitme" },
  "product": { "description": { "long": "Partagez vos dépenses" } },
  "home": { "title": "Vos comptes", "welcome": "Bon retour." },
  "account": { "title": "Compte %{id}" },
  "settings": { "title": "Paramètres" }
}"#;

/// A temp directory laid out like a deployment, plus a config pointing at it.
pub fn fixture() -> (TempDir, ServerConfig) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(root, "templates/index.html", TEMPLATE);
    write(root, "locales/en.json", EN);
    write(root, "locales/fr.json", FR);
    write(root, "public/robots.txt", "User-agent: *\n");
    write(root, "static/js/app.js", "console.log('app');\n");

    let mut config = ServerConfig::default();
    config.environment = Environment::Development;
    config.listener.ip = "127.0.0.1".into();
    config.listener.port = 0;
    config.template.path = path(root, "templates/index.html");
    config.locales.dir = path(root, "locales");
    config.statics.public_dir = path(root, "public");
    config.statics.static_dir = path(root, "static");
    config.routes.push(RouteConfig::redirect("/a", "/b"));
    config.routes.push(RouteConfig::view("/b", "settings"));

    (dir, config)
}

pub fn write(root: &Path, relative: &str, content: &str) {
    let file = root.join(relative);
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(file, content).unwrap();
}

fn path(root: &Path, relative: &str) -> String {
    root.join(relative).display().to_string()
}

/// A running server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<()>,
    _dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn start_server() -> TestServer {
    let (dir, config) = fixture();
    start_with(dir, config).await
}

pub async fn start_with(dir: TempDir, config: ServerConfig) -> TestServer {
    let (server, listener) = launch(config).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let stop = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        server.run(listener, stop).await.unwrap();
    });

    TestServer {
        addr,
        shutdown,
        handle,
        _dir: dir,
    }
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
