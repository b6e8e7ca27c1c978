//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::action::ActionInvoker;
use crate::config::schema::RoutingConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::error::RouterError;
use crate::routing::Router;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("Router error: {0}")]
    Router(#[from] RouterError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RoutingConfig, ConfigError> {
    let config: RoutingConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RoutingConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load a configuration file and build a router from it.
pub fn load_router(path: &Path, invoker: Arc<dyn ActionInvoker>) -> Result<Router, ConfigError> {
    let config = load_config(path)?;
    Ok(Router::from_config(&config, invoker)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionRegistry;

    #[test]
    fn test_parse_error() {
        let err = parse_config("[[routes]\nroute = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let err = parse_config("[router]\nmax_redirect_hops = 0\n").unwrap_err();
        assert!(err.to_string().contains("router.max_redirect_hops"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/routes.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_router_error_surfaces() {
        let path = std::env::temp_dir().join(format!("routes-{}.toml", uuid::Uuid::new_v4()));
        fs::write(
            &path,
            r#"
            [[routes]]
            route = "/x"
            action = "A::b"

            [[routes]]
            route = "/x"
            action = "A::c"
            "#,
        )
        .unwrap();

        let err = load_router(&path, Arc::new(ActionRegistry::new())).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, ConfigError::Router(RouterError::ConflictingRoute { .. })));
    }
}
