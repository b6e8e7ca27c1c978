//! Router construction and URL composition.
//!
//! # Responsibilities
//! - Collect routes, redirects and handlers during the registration phase
//! - Freeze them into an immutable `Router`
//! - Compose URLs from templates, following redirects to a fixed point
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Registration goes through `RouterBuilder`; a `Router` has no mutators
//! - Any registration error is fatal; `from_config` stops at the first one

use std::fmt;
use std::sync::Arc;

use crate::action::{Action, ActionInvoker, ActionRegistry};
use crate::config::schema::{RouterConfig, RoutingConfig};
use crate::error::RouterResult;
use crate::routing::handler::HandlerTable;
use crate::routing::redirect::{RedirectKind, RedirectTable};
use crate::routing::table::RouteTable;
use crate::routing::token::decompile;
use crate::routing::Params;

/// Registration phase of a [`Router`].
pub struct RouterBuilder {
    settings: RouterConfig,
    routes: RouteTable,
    redirects: RedirectTable,
    handlers: HandlerTable,
    invoker: Option<Arc<dyn ActionInvoker>>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            settings: RouterConfig::default(),
            routes: RouteTable::new(),
            redirects: RedirectTable::new(),
            handlers: HandlerTable::new(),
            invoker: None,
        }
    }

    /// Replace the router settings.
    pub fn settings(&mut self, settings: RouterConfig) -> &mut Self {
        self.settings = settings;
        self
    }

    /// Enable or disable restless mode.
    pub fn restless(&mut self, restless: bool) -> &mut Self {
        self.settings.restless = restless;
        self
    }

    pub fn word_separator(&mut self, separator: impl Into<String>) -> &mut Self {
        self.settings.word_separator = separator.into();
        self
    }

    /// Set the invoker used to resolve actions. Defaults to an empty
    /// [`ActionRegistry`], which only runs closures.
    pub fn invoker(&mut self, invoker: Arc<dyn ActionInvoker>) -> &mut Self {
        self.invoker = Some(invoker);
        self
    }

    /// Link `route` under `base_url` to `action`.
    pub fn link(
        &mut self,
        base_url: &str,
        route: &str,
        action: impl Into<Action>,
    ) -> RouterResult<&mut Self> {
        self.routes.link(base_url, route, action.into())?;
        Ok(self)
    }

    /// Redirect `route` to `translation`.
    pub fn redirect(
        &mut self,
        route: &str,
        translation: &str,
        kind: RedirectKind,
    ) -> RouterResult<&mut Self> {
        self.redirects.redirect(route, translation, kind)?;
        Ok(self)
    }

    /// Handle `error` responses under `base_url` with `action`.
    pub fn handle(
        &mut self,
        base_url: &str,
        error: &str,
        action: impl Into<Action>,
    ) -> RouterResult<&mut Self> {
        self.handlers.handle(base_url, error, action.into())?;
        Ok(self)
    }

    pub fn build(self) -> Router {
        tracing::debug!(
            routes = self.routes.len(),
            redirects = self.redirects.len(),
            handlers = self.handlers.len(),
            restless = self.settings.restless,
            "Router built"
        );

        Router {
            settings: self.settings,
            routes: self.routes,
            redirects: self.redirects,
            handlers: self.handlers,
            invoker: self
                .invoker
                .unwrap_or_else(|| Arc::new(ActionRegistry::default())),
        }
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable routing tables plus the invoker that runs their actions.
///
/// Shared by reference (or `Arc`) across concurrent dispatches.
pub struct Router {
    pub(crate) settings: RouterConfig,
    pub(crate) routes: RouteTable,
    pub(crate) redirects: RedirectTable,
    pub(crate) handlers: HandlerTable,
    pub(crate) invoker: Arc<dyn ActionInvoker>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Build a router from configuration, registering entries in file order.
    pub fn from_config(
        config: &RoutingConfig,
        invoker: Arc<dyn ActionInvoker>,
    ) -> RouterResult<Self> {
        let mut builder = Self::builder();
        builder.settings(config.router.clone()).invoker(invoker);

        for route in &config.routes {
            builder.link(&route.base_url, &route.route, Action::from(&route.action))?;
        }
        for redirect in &config.redirects {
            let kind = RedirectKind::try_from(redirect.kind)?;
            builder.redirect(&redirect.route, &redirect.translation, kind)?;
        }
        for handler in &config.handlers {
            builder.handle(&handler.base_url, &handler.error, Action::from(&handler.action))?;
        }

        Ok(builder.build())
    }

    /// Build a concrete URL from `route` and `params`.
    ///
    /// The decompiled URL is passed through the redirect table until no
    /// redirect matches. With `as_query`, parameters no token consumed are
    /// appended as a query string.
    pub fn compose(&self, route: &str, params: &Params, as_query: bool) -> RouterResult<String> {
        let separator = &self.settings.word_separator;
        let (mut url, leftover) = decompile(route, params, separator)?;

        self.redirects
            .resolve(&mut url, None, separator, self.settings.max_redirect_hops)?;

        if as_query && !leftover.is_empty() {
            let query = leftover
                .iter()
                .map(|(key, value)| {
                    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
                })
                .collect::<Vec<_>>()
                .join("&");

            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }

        Ok(url)
    }

    pub fn settings(&self) -> &RouterConfig {
        &self.settings
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn redirects(&self) -> &RedirectTable {
        &self.redirects
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("settings", &self.settings)
            .field("routes", &self.routes.len())
            .field("redirects", &self.redirects.len())
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ActionConfig, RedirectConfig, RouteConfig};
    use crate::error::RouterError;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_compose_with_query() {
        let router = Router::builder().build();
        let url = router
            .compose(
                "/articles/[slug]",
                &params(&[("slug", "hello"), ("page", "2"), ("q", "a b")]),
                true,
            )
            .unwrap();
        assert_eq!(url, "/articles/hello?page=2&q=a%20b");
    }

    #[test]
    fn test_compose_without_query() {
        let router = Router::builder().build();
        let url = router
            .compose("/articles/[slug]", &params(&[("slug", "hello"), ("page", "2")]), false)
            .unwrap();
        assert_eq!(url, "/articles/hello");
    }

    #[test]
    fn test_compose_follows_redirects() {
        let mut builder = Router::builder();
        builder
            .redirect("/old", "/mid", RedirectKind::MovedPermanently)
            .unwrap()
            .redirect("/mid", "/new", RedirectKind::Found)
            .unwrap();
        let router = builder.build();

        assert_eq!(router.compose("/old", &Params::new(), true).unwrap(), "/new");
    }

    #[test]
    fn test_compose_reports_redirect_loop() {
        let mut builder = Router::builder();
        builder
            .redirect("/a", "/b", RedirectKind::MovedPermanently)
            .unwrap()
            .redirect("/b", "/a", RedirectKind::MovedPermanently)
            .unwrap();
        let router = builder.build();

        let err = router.compose("/a", &Params::new(), true).unwrap_err();
        assert!(matches!(err, RouterError::RedirectLoop { .. }));
    }

    #[test]
    fn test_compose_missing_parameter() {
        let router = Router::builder().build();
        let err = router.compose("/users/[id]", &Params::new(), true).unwrap_err();
        assert!(matches!(err, RouterError::MissingParameter { ref name } if name == "id"));
    }

    #[test]
    fn test_from_config_rejects_bad_kind() {
        let config = RoutingConfig {
            redirects: vec![RedirectConfig {
                route: "/a".into(),
                translation: "/b".into(),
                kind: 308,
            }],
            ..Default::default()
        };
        let err = Router::from_config(&config, Arc::new(ActionRegistry::new())).unwrap_err();
        assert!(matches!(err, RouterError::InvalidRedirectKind(308)));
    }

    #[test]
    fn test_from_config_registers_in_order() {
        let config = RoutingConfig {
            routes: vec![
                RouteConfig {
                    base_url: String::new(),
                    route: "/b".into(),
                    action: ActionConfig::Callback("B::main".into()),
                },
                RouteConfig {
                    base_url: "/admin".into(),
                    route: "/a".into(),
                    action: ActionConfig::Method {
                        class: "A".into(),
                        method: "main".into(),
                    },
                },
            ],
            ..Default::default()
        };
        let router = Router::from_config(&config, Arc::new(ActionRegistry::new())).unwrap();
        let templates: Vec<String> = router.routes().iter().map(|r| r.template()).collect();
        assert_eq!(templates, vec!["/b", "/admin/a"]);
    }
}
