//! Full page rendering.
//!
//! # Responsibilities
//! - Run the matched view inside the root layout for the resolved locale
//! - Collect title, description and bot metadata
//! - Interpolate the page template
//!
//! # Design Decisions
//! - Synchronous and pure given its inputs; memoization is the caller's job
//! - Every failure is returned, never retried

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::assets::AssetManifest;
use crate::http::RequestContext;
use crate::locale::LocaleStore;
use crate::observability::metrics;
use crate::render::markup::{el, escape_html, render_to_string, Node};
use crate::render::template::{Template, TemplateError};
use crate::render::views::{root, ViewProps, ViewRegistry};
use crate::routing::RenderProps;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("locale `{0}` is not loaded")]
    UnknownLocale(String),

    #[error("no view registered as `{0}`")]
    UnknownView(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Data object handed to the page template.
///
/// Field names are the template's placeholder paths.
#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub locale: String,
    /// View markup, inserted raw.
    pub markup: String,
    pub title: String,
    pub description: String,
    pub is_bot: bool,
    /// `og:locale` meta tags for crawlers, empty for browsers.
    pub bot_meta: String,
    /// Stylesheet `<link>` tag, empty when the bundle has no CSS.
    pub stylesheet: String,
    /// Script bundle URL.
    pub script: String,
    /// Client configuration as a JSON literal, safe inside `<script>`.
    pub client_config: String,
}

impl PageData {
    /// A fully populated data object used to check the template at startup.
    pub fn sample() -> Self {
        Self {
            locale: "en".into(),
            markup: String::new(),
            title: String::new(),
            description: String::new(),
            is_bot: false,
            bot_meta: String::new(),
            stylesheet: String::new(),
            script: String::new(),
            client_config: "{}".into(),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// ISO codes advertised to crawlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotMetadata {
    pub locale_iso: String,
    pub alternates: Vec<String>,
}

impl BotMetadata {
    /// The resolved locale's ISO code plus every other available locale's.
    pub fn for_locale(locales: &LocaleStore, locale: &str) -> Self {
        Self {
            locale_iso: locales.iso(locale).unwrap_or_default().to_string(),
            alternates: locales
                .available()
                .filter(|other| other.id() != locale)
                .map(|other| other.iso().to_string())
                .collect(),
        }
    }

    /// Open Graph meta tags.
    pub fn to_html(&self) -> String {
        let mut tags = vec![meta_property("og:locale", &self.locale_iso)];
        tags.extend(
            self.alternates
                .iter()
                .map(|iso| meta_property("og:locale:alternate", iso)),
        );
        tags.iter().map(|tag| render_to_string(tag).html).collect()
    }
}

fn meta_property(property: &'static str, content: &str) -> Node {
    el("meta")
        .attr("property", property)
        .attr("content", content)
        .into()
}

/// Renders pages from matched routes.
#[derive(Debug)]
pub struct Renderer {
    views: ViewRegistry,
    locales: Arc<LocaleStore>,
    template: Template,
    assets: AssetManifest,
    client_config: String,
    description_key: String,
    title_key: String,
}

impl Renderer {
    pub fn new(
        views: ViewRegistry,
        locales: Arc<LocaleStore>,
        template: Template,
        assets: AssetManifest,
        client_config: &serde_json::Map<String, Value>,
        description_key: impl Into<String>,
        title_key: impl Into<String>,
    ) -> Self {
        Self {
            views,
            locales,
            template,
            assets,
            client_config: script_safe_json(client_config),
            description_key: description_key.into(),
            title_key: title_key.into(),
        }
    }

    /// Render the full HTML document for one matched route.
    pub fn render(&self, ctx: &RequestContext, props: &RenderProps) -> Result<String, RenderError> {
        let start = Instant::now();

        let locale = self
            .locales
            .get(&ctx.locale)
            .ok_or_else(|| RenderError::UnknownLocale(ctx.locale.clone()))?;
        let view = self
            .views
            .get(&props.view)
            .ok_or_else(|| RenderError::UnknownView(props.view.clone()))?;

        let view_props = ViewProps {
            locale,
            params: &props.params,
            location: &props.location,
            title_key: &self.title_key,
        };
        let rendered = render_to_string(&root(&view_props, view(&view_props)));

        let bot_meta = if ctx.is_bot {
            BotMetadata::for_locale(&self.locales, locale.id()).to_html()
        } else {
            String::new()
        };

        let data = PageData {
            locale: locale.id().to_string(),
            markup: rendered.html,
            title: rendered.title.unwrap_or_default(),
            description: locale.t(&self.description_key),
            is_bot: ctx.is_bot,
            bot_meta,
            stylesheet: self
                .assets
                .css
                .as_deref()
                .map(stylesheet_link)
                .unwrap_or_default(),
            script: self.assets.js.clone(),
            client_config: self.client_config.clone(),
        };

        let html = self.template.interpolate(&data.to_value())?;
        metrics::record_render(start.elapsed());
        Ok(html)
    }
}

fn stylesheet_link(href: &str) -> String {
    format!(r#"<link rel="stylesheet" href="{}">"#, escape_html(href))
}

/// JSON that cannot close the surrounding `<script>` element.
fn script_safe_json(value: &serde_json::Map<String, Value>) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "{}".to_string())
        .replace('<', "\\u003c")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocaleEntry;
    use crate::locale::Locale;
    use crate::routing::{Location, Params};
    use serde_json::json;

    const TEMPLATE: &str = r#"<!doctype html>
<html lang="{%= locale %}">
  <head>
    <title>{%= title %}</title>
    <meta name="description" content="{%= description %}">
    {%# bot_meta %}
    {%# stylesheet %}
  </head>
  <body>
    <div id="root">{%# markup %}</div>
    <script>window.CONFIG = {%# client_config %};</script>
    <script src="{%= script %}"></script>
  </body>
</html>"#;

    fn store() -> LocaleStore {
        let mut store = LocaleStore::new(&crate::config::LocaleConfig::default());
        for (id, iso, name, description) in [
            ("en", "en_US", "Splitme", "Split & share"),
            ("fr", "fr_FR", "Splitme FR", "Partager"),
        ] {
            store.insert(
                Locale::from_json(
                    &LocaleEntry::new(id, iso),
                    &json!({
                        "app": { "name": name },
                        "product": { "description": { "long": description } },
                        "home": { "title": "Home", "welcome": "Welcome" },
                        "account": { "title": "Account %{id}" },
                        "settings": { "title": "Settings" }
                    }),
                )
                .unwrap(),
            );
        }
        store
    }

    fn renderer(css: Option<&str>) -> Renderer {
        let mut client = serde_json::Map::new();
        client.insert("api".into(), json!("</script><b>"));
        Renderer::new(
            ViewRegistry::builtin(),
            Arc::new(store()),
            Template::compile(TEMPLATE).unwrap(),
            AssetManifest {
                js: "/main.js".into(),
                css: css.map(String::from),
            },
            &client,
            "product.description.long",
            "app.name",
        )
    }

    fn props(view: &str, params: Params) -> RenderProps {
        RenderProps {
            view: view.into(),
            params,
            location: Location {
                pathname: "/".into(),
                search: String::new(),
            },
        }
    }

    fn ctx(locale: &str, is_bot: bool) -> RequestContext {
        RequestContext {
            locale: locale.into(),
            is_bot,
            url: "/".into(),
        }
    }

    #[test]
    fn test_template_accepts_sample_data() {
        let template = Template::compile(TEMPLATE).unwrap();
        assert!(template.check_keys(&PageData::sample().to_value()).is_ok());
    }

    #[test]
    fn test_renders_page_for_browser() {
        let html = renderer(None)
            .render(&ctx("en", false), &props("home", Params::new()))
            .unwrap();

        assert!(html.contains(r#"<html lang="en">"#));
        assert!(html.contains("<title>Splitme</title>"));
        assert!(html.contains(r#"content="Split &amp; share""#));
        assert!(html.contains(r#"<div id="root"><div id="main"><section class="home">"#));
        assert!(html.contains(r#"<script src="/main.js"></script>"#));
        assert!(!html.contains("og:locale"));
        assert!(!html.contains("stylesheet"));
    }

    #[test]
    fn test_bot_gets_locale_alternates() {
        let html = renderer(None)
            .render(&ctx("fr", true), &props("home", Params::new()))
            .unwrap();

        assert!(html.contains(r#"<meta property="og:locale" content="fr_FR">"#));
        assert!(html.contains(r#"<meta property="og:locale:alternate" content="en_US">"#));
        assert!(!html.contains(r#"og:locale:alternate" content="fr_FR""#));
    }

    #[test]
    fn test_view_title_and_stylesheet() {
        let mut params = Params::new();
        params.insert("id".into(), "9".into());
        let html = renderer(Some("/main.css"))
            .render(&ctx("en", false), &props("account_detail", params))
            .unwrap();

        assert!(html.contains("<title>Account 9 · Splitme</title>"));
        assert!(html.contains(r#"<link rel="stylesheet" href="/main.css">"#));
    }

    #[test]
    fn test_client_config_cannot_close_script() {
        let html = renderer(None)
            .render(&ctx("en", false), &props("home", Params::new()))
            .unwrap();
        assert!(html.contains(r#"window.CONFIG = {"api":"\u003c/script>\u003cb>"};"#));
    }

    #[test]
    fn test_unknown_view_is_error() {
        let err = renderer(None)
            .render(&ctx("en", false), &props("missing", Params::new()))
            .unwrap_err();
        assert!(matches!(err, RenderError::UnknownView(ref v) if v == "missing"));
    }

    #[test]
    fn test_bot_metadata_lists_other_locales() {
        let meta = BotMetadata::for_locale(&store(), "en");
        assert_eq!(meta.locale_iso, "en_US");
        assert_eq!(meta.alternates, vec!["fr_FR".to_string()]);
    }
}
