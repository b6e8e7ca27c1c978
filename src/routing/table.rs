//! Route table.
//!
//! # Responsibilities
//! - Compile `base_url + route` and store it with its action
//! - Reject conflicting registrations of the same compiled pattern
//! - Iterate entries in registration order for first-match-wins lookup
//!
//! # Design Decisions
//! - No specificity scoring: the first registered match wins
//! - Re-linking an identical string or pair action is a no-op, keeping the
//!   original position; anything involving a closure is a conflict

use std::collections::HashMap;

use crate::action::Action;
use crate::error::{RouterError, RouterResult};
use crate::routing::pattern::CompiledPattern;
use crate::routing::token::template_tokens;

/// A compiled route and the action it dispatches to.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pattern: CompiledPattern,
    action: Action,
    base_url: String,
    route: String,
}

impl RouteEntry {
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Base URL with its trailing slash removed.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Route as linked, without its leading slash.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// The full template that was compiled.
    pub fn template(&self) -> String {
        join(&self.base_url, &self.route)
    }
}

/// Ordered collection of routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    index: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link a route under `base_url` to an action.
    ///
    /// Returns `false` when an equivalent action was already linked to the
    /// same pattern and nothing changed.
    pub fn link(&mut self, base_url: &str, route: &str, action: Action) -> RouterResult<bool> {
        let base_url = base_url.trim_end_matches('/');
        let route = route.trim_start_matches('/');
        let template = join(base_url, route);
        let pattern = CompiledPattern::compile(&template)?;

        if let Action::Callback(callback) = &action {
            for (name, _) in template_tokens(callback)? {
                if !pattern.params().contains(&name) {
                    return Err(RouterError::MissingParameter { name });
                }
            }
        }

        if let Some(&position) = self.index.get(pattern.key()) {
            let existing = &self.entries[position].action;
            check_conflict(&template, existing, &action)?;
            tracing::debug!(route = %template, action = %action, "Route already linked, keeping existing entry");
            return Ok(false);
        }

        tracing::debug!(route = %template, action = %action, "Linked route");
        self.index.insert(pattern.key().to_string(), self.entries.len());
        self.entries.push(RouteEntry {
            pattern,
            action,
            base_url: base_url.to_string(),
            route: route.to_string(),
        });
        Ok(true)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn join(base_url: &str, route: &str) -> String {
    format!("{}/{}", base_url, route)
}

fn check_conflict(route: &str, existing: &Action, action: &Action) -> RouterResult<()> {
    if existing.is_equivalent(action) {
        return Ok(());
    }

    let reason = match existing {
        Action::Callback(_) => format!("conflicting action {}", action),
        Action::Method { .. } => "incompatible object callback".to_string(),
        Action::Closure(_) => "action is a closure".to_string(),
    };
    Err(RouterError::ConflictingRoute {
        route: route.to_string(),
        reason,
    })
}
