//! Configuration-time errors.
//!
//! Everything in here is fatal: a router that failed to register a route,
//! redirect or handler must not serve requests. Request-time problems never
//! show up as a `RouterError`; the dispatcher degrades them to skipped
//! candidates and records them in the dispatch log instead.

use thiserror::Error;

/// Errors raised while building routing tables or composing URLs.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A token pattern is neither a built-in symbol nor a parenthesized regex.
    #[error("Invalid compilation pattern \"{pattern}\" in route {route}")]
    InvalidPattern { route: String, pattern: String },

    /// The same parameter name appears in more than one token of a template.
    #[error("Parameter \"{name}\" appears more than once in route {route}")]
    DuplicateParameter { route: String, name: String },

    /// A custom pattern introduced capture groups of its own.
    #[error("Route {route} compiles to {groups} capture groups for {tokens} tokens, use non-capturing groups in custom patterns")]
    CaptureMismatch {
        route: String,
        tokens: usize,
        groups: usize,
    },

    /// The compiled expression was rejected by the regex engine.
    #[error("Route {route} does not compile: {source}")]
    Regex {
        route: String,
        #[source]
        source: regex::Error,
    },

    /// A decompilation token names a transform that does not exist.
    #[error("Invalid decompilation transformation type \"{transform}\"")]
    UnknownTransform { transform: String },

    /// A decompilation token has no value in the supplied parameters.
    #[error("Missing parameter \"{name}\" in supplied parameters")]
    MissingParameter { name: String },

    /// A route was linked twice to actions that are not equivalent.
    #[error("Cannot add conflicting route {route}, {reason}")]
    ConflictingRoute { route: String, reason: String },

    /// A redirect was registered twice with different kinds or translations.
    #[error("Cannot add conflicting redirect {route}, {reason}")]
    ConflictingRedirect { route: String, reason: String },

    /// A handler already exists for this base URL and error.
    #[error("There is already a \"{error}\" handler set for base URL \"{base_url}\"")]
    DuplicateHandler { base_url: String, error: String },

    /// Redirect kinds are limited to 301, 302, 303 and 307.
    #[error("Invalid redirect type {0}")]
    InvalidRedirectKind(u16),

    /// Response state name that is not in the state table.
    #[error("Cannot create response with undefined state \"{0}\"")]
    UnknownState(String),

    /// Following redirects did not reach a fixed point.
    #[error("Redirect chain starting at {start} did not settle after {hops} hops")]
    RedirectLoop { start: String, hops: usize },
}

/// Result type for routing table operations.
pub type RouterResult<T> = Result<T, RouterError>;
