//! Error handler table.
//!
//! # Responsibilities
//! - Register actions for `(base_url, error)` pairs
//! - Pick the most specific handler for a failed request
//!
//! # Resolution
//! ```text
//! handlers for this error
//!     → keep those whose base URL prefixes the request path
//!     → longest base URL wins (earliest registration on ties)
//!     → otherwise the root handler (empty base URL)
//!     → otherwise none: the error response is returned as is
//! ```

use std::collections::HashSet;

use crate::action::Action;
use crate::error::{RouterError, RouterResult};
use crate::routing::token::template_tokens;

/// An action that handles one error under one base URL.
#[derive(Debug, Clone)]
pub struct HandlerEntry {
    base_url: String,
    error: String,
    action: Action,
}

impl HandlerEntry {
    /// Base URL without trailing slash; empty for the root handler.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn action(&self) -> &Action {
        &self.action
    }
}

/// Error handlers keyed by base URL and error name.
#[derive(Debug, Clone, Default)]
pub struct HandlerTable {
    entries: Vec<HandlerEntry>,
    keys: HashSet<(String, String)>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` for `error` under `base_url`.
    ///
    /// Handler callbacks receive no route parameters, so they cannot
    /// contain tokens.
    pub fn handle(&mut self, base_url: &str, error: &str, action: Action) -> RouterResult<()> {
        let base_url = base_url.trim_end_matches('/');

        if let Action::Callback(callback) = &action {
            if let Some((name, _)) = template_tokens(callback)?.into_iter().next() {
                return Err(RouterError::MissingParameter { name });
            }
        }

        let key = (base_url.to_string(), error.to_string());
        if !self.keys.insert(key) {
            return Err(RouterError::DuplicateHandler {
                base_url: base_url.to_string(),
                error: error.to_string(),
            });
        }

        tracing::debug!(base_url = %base_url, error = %error, action = %action, "Registered error handler");
        self.entries.push(HandlerEntry {
            base_url: base_url.to_string(),
            error: error.to_string(),
            action,
        });
        Ok(())
    }

    /// Find the handler for `error` on a request to `path`.
    pub fn find(&self, path: &str, error: &str) -> Option<&HandlerEntry> {
        let candidates = self.entries.iter().filter(|entry| entry.error == error);

        let best = candidates
            .clone()
            .filter(|entry| !entry.base_url.is_empty() && path.starts_with(&entry.base_url))
            .fold(None::<&HandlerEntry>, |best, entry| match best {
                Some(current) if current.base_url.len() >= entry.base_url.len() => Some(current),
                _ => Some(entry),
            });

        best.or_else(|| candidates.clone().find(|entry| entry.base_url.is_empty()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &HandlerEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
