//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (hop limit > 0, known redirect codes)
//! - Check that handler errors name a response state or a stateless
//!   4xx/5xx code
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RoutingConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Route conflicts and pattern errors are left to router registration,
//!   which reports them with the compiled pattern at hand

use std::fmt;

use crate::config::schema::{ActionConfig, RoutingConfig};
use crate::http::response::is_error_name;
use crate::routing::RedirectKind;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `redirects[2].kind`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RoutingConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.router.word_separator.is_empty() {
        errors.push(ValidationError::new("router.word_separator", "must not be empty"));
    }
    if config.router.max_redirect_hops == 0 {
        errors.push(ValidationError::new("router.max_redirect_hops", "must be at least 1"));
    }

    for (i, route) in config.routes.iter().enumerate() {
        if route.route.trim().is_empty() {
            errors.push(ValidationError::new(format!("routes[{}].route", i), "must not be empty"));
        }
        check_action(&mut errors, format!("routes[{}].action", i), &route.action);
    }

    for (i, redirect) in config.redirects.iter().enumerate() {
        if redirect.route.trim().is_empty() {
            errors.push(ValidationError::new(format!("redirects[{}].route", i), "must not be empty"));
        }
        if redirect.translation.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("redirects[{}].translation", i),
                "must not be empty",
            ));
        }
        if RedirectKind::try_from(redirect.kind).is_err() {
            errors.push(ValidationError::new(
                format!("redirects[{}].kind", i),
                format!("{} is not one of 301, 302, 303, 307", redirect.kind),
            ));
        }
    }

    for (i, handler) in config.handlers.iter().enumerate() {
        if !is_error_name(&handler.error) {
            errors.push(ValidationError::new(
                format!("handlers[{}].error", i),
                format!("unknown response state or error code \"{}\"", handler.error),
            ));
        }
        check_action(&mut errors, format!("handlers[{}].action", i), &handler.action);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_action(errors: &mut Vec<ValidationError>, field: String, action: &ActionConfig) {
    let empty = match action {
        ActionConfig::Callback(callback) => callback.trim().is_empty(),
        ActionConfig::Method { class, method } => class.is_empty() || method.is_empty(),
    };
    if empty {
        errors.push(ValidationError::new(field, "must name a function or class method"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> RoutingConfig {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let config = parse(
            r#"
            [[routes]]
            route = "/"
            action = "Home::main"

            [[redirects]]
            route = "/old"
            translation = "/"
            kind = 307

            [[handlers]]
            error = "not_found"
            action = "Errors::missing"
            "#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_numeric_handler_errors() {
        let config = parse(
            r#"
            [[handlers]]
            error = "418"
            action = "Errors::teapot"

            [[handlers]]
            error = "404"
            action = "Errors::missing"

            [[handlers]]
            error = "302"
            action = "Errors::moved"
            "#,
        );
        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["handlers[1].error", "handlers[2].error"]);
    }

    #[test]
    fn test_collects_all_errors() {
        let config = parse(
            r#"
            [router]
            word_separator = ""
            max_redirect_hops = 0

            [[routes]]
            route = ""
            action = ""

            [[redirects]]
            route = "/old"
            translation = "/new"
            kind = 308

            [[handlers]]
            error = "teapot"
            action = { class = "Errors", method = "" }
            "#,
        );
        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "router.word_separator",
                "router.max_redirect_hops",
                "routes[0].route",
                "routes[0].action",
                "redirects[0].kind",
                "handlers[0].error",
                "handlers[0].action",
            ]
        );
    }
}
