//! Configuration schema definitions.
//!
//! This module defines the complete routing configuration.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Root configuration: router settings plus the routing tables.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutingConfig {
    /// Router behavior.
    pub router: RouterConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Routes in registration order.
    pub routes: Vec<RouteConfig>,

    /// Redirects in registration order.
    pub redirects: Vec<RedirectConfig>,

    /// Error handlers.
    pub handlers: Vec<HandlerConfig>,
}

/// Router behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Treat a path and its trailing-slash variant as the same resource,
    /// redirecting to whichever form is routed.
    pub restless: bool,

    /// Separator written by the `ws` transform and read by `uc`/`lc`.
    pub word_separator: String,

    /// Maximum number of redirects followed when resolving a chain.
    pub max_redirect_hops: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            restless: false,
            word_separator: "_".to_string(),
            max_redirect_hops: 16,
        }
    }
}

/// A route linked to an action.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Prefix prepended to the route.
    #[serde(default)]
    pub base_url: String,

    /// Route template, e.g. `/articles/[!:slug]`.
    pub route: String,

    /// Action to dispatch to.
    pub action: ActionConfig,
}

/// A redirect from one route to a translation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedirectConfig {
    /// Route template to match.
    pub route: String,

    /// Target template, e.g. `/blog/articles/[slug]`.
    pub translation: String,

    /// HTTP redirect code (301, 302, 303 or 307).
    #[serde(default = "default_redirect_kind")]
    pub kind: u16,
}

fn default_redirect_kind() -> u16 {
    301
}

/// An error handler.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HandlerConfig {
    /// Base URL the handler applies under; empty for the root handler.
    #[serde(default)]
    pub base_url: String,

    /// Response state name, e.g. `not_found`.
    pub error: String,

    /// Action to run.
    pub action: ActionConfig,
}

/// Action as written in a config file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ActionConfig {
    /// `"function"` or `"Class::method"`.
    Callback(String),
    /// `{ class = "...", method = "..." }`.
    Method { class: String, method: String },
}

impl From<&ActionConfig> for Action {
    fn from(config: &ActionConfig) -> Self {
        match config {
            ActionConfig::Callback(callback) => Action::callback(callback.clone()),
            ActionConfig::Method { class, method } => Action::method(class.clone(), method.clone()),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes
    /// precedence when set.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: RoutingConfig = toml::from_str(
            r#"
            [router]
            restless = true
            word_separator = "-"

            [[routes]]
            route = "/articles/[!:slug]"
            action = "Articles::show"

            [[routes]]
            base_url = "/admin"
            route = "/users"
            action = { class = "Admin", method = "users" }

            [[redirects]]
            route = "/blog/[!:slug]"
            translation = "/articles/[slug]"

            [[handlers]]
            error = "not_found"
            action = "Errors::missing"
            "#,
        )
        .unwrap();

        assert!(config.router.restless);
        assert_eq!(config.router.word_separator, "-");
        assert_eq!(config.router.max_redirect_hops, 16);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].base_url, "");
        assert_eq!(
            config.routes[1].action,
            ActionConfig::Method {
                class: "Admin".into(),
                method: "users".into()
            }
        );
        assert_eq!(config.redirects[0].kind, 301);
        assert_eq!(config.handlers[0].base_url, "");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: RoutingConfig = toml::from_str("").unwrap();
        assert!(!config.router.restless);
        assert_eq!(config.router.word_separator, "_");
        assert_eq!(config.observability.log_level, "info");
        assert!(config.routes.is_empty());
    }
}
