//! Views and the root layout.
//!
//! A view is a plain function from [`ViewProps`] to a [`Node`]. The page is
//! composed as `root(props, view(props))`: the root declares the application
//! title and mounts the view inside the main layout next to the modal and
//! snackbar mount points the client hydrates.

use std::collections::HashMap;

use crate::locale::Locale;
use crate::render::markup::{el, titled, Node};
use crate::routing::{Location, Params};

/// Everything a view may read.
#[derive(Debug, Clone, Copy)]
pub struct ViewProps<'a> {
    pub locale: &'a Locale,
    pub params: &'a Params,
    pub location: &'a Location,
    /// Translation key for the application title.
    pub title_key: &'a str,
}

impl ViewProps<'_> {
    fn param(&self, name: &str) -> &str {
        self.params.get(name).map(String::as_str).unwrap_or_default()
    }
}

pub type ViewFn = fn(&ViewProps<'_>) -> Node;

/// Views addressable from the routing table by name.
#[derive(Clone, Default)]
pub struct ViewRegistry {
    views: HashMap<String, ViewFn>,
}

impl std::fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.views.keys()).finish()
    }
}

impl ViewRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The views shipped with the server.
    pub fn builtin() -> Self {
        Self::new()
            .with("home", home)
            .with("account_detail", account_detail)
            .with("settings", settings)
    }

    pub fn with(mut self, name: impl Into<String>, view: ViewFn) -> Self {
        self.register(name, view);
        self
    }

    pub fn register(&mut self, name: impl Into<String>, view: ViewFn) {
        self.views.insert(name.into(), view);
    }

    pub fn get(&self, name: &str) -> Option<ViewFn> {
        self.views.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.views.contains_key(name)
    }
}

/// Compose the page: application title, main layout, view.
pub fn root(props: &ViewProps<'_>, view: Node) -> Node {
    titled(props.locale.t(props.title_key), main_layout(view))
}

/// The main layout: view content plus client-side mount points.
pub fn main_layout(children: Node) -> Node {
    el("div")
        .attr("id", "main")
        .child(children)
        .child(el("div").attr("data-mount", "modal"))
        .child(el("div").attr("data-mount", "snackbar"))
        .into()
}

fn page_title(props: &ViewProps<'_>, key: &str, args: &[(&str, &str)]) -> String {
    format!(
        "{} · {}",
        props.locale.t_with(key, args),
        props.locale.t(props.title_key)
    )
}

fn home(props: &ViewProps<'_>) -> Node {
    el("section")
        .attr("class", "home")
        .child(el("h1").text(props.locale.t("home.title")))
        .child(el("p").text(props.locale.t("home.welcome")))
        .into()
}

fn account_detail(props: &ViewProps<'_>) -> Node {
    let id = props.param("id");
    let body = el("section")
        .attr("class", "account")
        .attr("data-account-id", id)
        .child(el("h1").text(props.locale.t_with("account.title", &[("id", id)])));

    titled(page_title(props, "account.title", &[("id", id)]), body)
}

fn settings(props: &ViewProps<'_>) -> Node {
    let body = el("section")
        .attr("class", "settings")
        .child(el("h1").text(props.locale.t("settings.title")));

    titled(page_title(props, "settings.title", &[]), body)
}
