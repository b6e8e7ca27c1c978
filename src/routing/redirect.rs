//! Redirect table.
//!
//! # Responsibilities
//! - Compile redirect routes and store their translations
//! - Translate a URI through the first matching redirect
//! - Follow chained redirects to a fixed point, with a hop limit
//!
//! # Design Decisions
//! - Same conflict key as routes (the compiled pattern)
//! - The restless form of a URI is only consulted when the URI itself
//!   matches nothing, and always yields a permanent redirect
//! - A chain that revisits a URI or exceeds the hop limit is an error

use std::collections::{HashMap, HashSet};
use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::{RouterError, RouterResult};
use crate::routing::pattern::CompiledPattern;
use crate::routing::token::{decompile, template_tokens};
use crate::routing::Params;

/// The kinds of redirect the router issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum RedirectKind {
    #[default]
    MovedPermanently,
    Found,
    SeeOther,
    TemporaryRedirect,
}

impl RedirectKind {
    pub fn code(self) -> u16 {
        match self {
            Self::MovedPermanently => 301,
            Self::Found => 302,
            Self::SeeOther => 303,
            Self::TemporaryRedirect => 307,
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            Self::MovedPermanently => StatusCode::MOVED_PERMANENTLY,
            Self::Found => StatusCode::FOUND,
            Self::SeeOther => StatusCode::SEE_OTHER,
            Self::TemporaryRedirect => StatusCode::TEMPORARY_REDIRECT,
        }
    }
}

impl TryFrom<u16> for RedirectKind {
    type Error = RouterError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            301 => Ok(Self::MovedPermanently),
            302 => Ok(Self::Found),
            303 => Ok(Self::SeeOther),
            307 => Ok(Self::TemporaryRedirect),
            other => Err(RouterError::InvalidRedirectKind(other)),
        }
    }
}

impl From<RedirectKind> for u16 {
    fn from(kind: RedirectKind) -> Self {
        kind.code()
    }
}

impl fmt::Display for RedirectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A compiled redirect.
#[derive(Debug, Clone)]
pub struct RedirectEntry {
    pattern: CompiledPattern,
    route: String,
    translation: String,
    kind: RedirectKind,
}

impl RedirectEntry {
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn translation(&self) -> &str {
        &self.translation
    }

    pub fn kind(&self) -> RedirectKind {
        self.kind
    }
}

/// Ordered collection of redirects.
#[derive(Debug, Clone, Default)]
pub struct RedirectTable {
    entries: Vec<RedirectEntry>,
    index: HashMap<String, usize>,
}

impl RedirectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a redirect from `route` to `translation`.
    ///
    /// Returns `false` when the identical redirect already exists.
    pub fn redirect(
        &mut self,
        route: &str,
        translation: &str,
        kind: RedirectKind,
    ) -> RouterResult<bool> {
        let pattern = CompiledPattern::compile(route)?;

        for (name, _) in template_tokens(translation)? {
            if !pattern.params().contains(&name) {
                return Err(RouterError::MissingParameter { name });
            }
        }

        if let Some(&position) = self.index.get(pattern.key()) {
            let existing = &self.entries[position];
            if existing.kind != kind {
                return Err(RouterError::ConflictingRedirect {
                    route: route.to_string(),
                    reason: format!("incompatible type {}", kind),
                });
            }
            if existing.translation != translation {
                return Err(RouterError::ConflictingRedirect {
                    route: route.to_string(),
                    reason: format!("incompatible translation {}", translation),
                });
            }
            return Ok(false);
        }

        tracing::debug!(route = %route, translation = %translation, kind = kind.code(), "Registered redirect");
        self.index.insert(pattern.key().to_string(), self.entries.len());
        self.entries.push(RedirectEntry {
            pattern,
            route: route.to_string(),
            translation: translation.to_string(),
            kind,
        });
        Ok(true)
    }

    /// Translate `uri` in place through the first matching redirect.
    ///
    /// When nothing matches `uri` but something matches `restless_alt`,
    /// `uri` becomes `restless_alt` and the redirect is permanent.
    pub fn translate(
        &self,
        uri: &mut String,
        restless_alt: Option<&str>,
        word_separator: &str,
    ) -> RouterResult<Option<RedirectKind>> {
        for entry in &self.entries {
            if let Some(captures) = entry.pattern.captures(uri) {
                let params: Params = captures.into_iter().collect();
                let (translated, _) = decompile(&entry.translation, &params, word_separator)?;
                *uri = translated;
                return Ok(Some(entry.kind));
            }
        }

        if let Some(alt) = restless_alt {
            if self.entries.iter().any(|entry| entry.pattern.is_match(alt)) {
                *uri = alt.to_string();
                return Ok(Some(RedirectKind::MovedPermanently));
            }
        }

        Ok(None)
    }

    /// Translate `uri` repeatedly until no redirect matches.
    ///
    /// Only the first hop considers `restless_alt`. Returns the kind of the
    /// first hop, or `None` if `uri` was not redirected at all.
    pub fn resolve(
        &self,
        uri: &mut String,
        restless_alt: Option<&str>,
        word_separator: &str,
        max_hops: usize,
    ) -> RouterResult<Option<RedirectKind>> {
        let start = uri.clone();
        let Some(kind) = self.translate(uri, restless_alt, word_separator)? else {
            return Ok(None);
        };

        let mut seen = HashSet::from([start.clone()]);
        let mut hops = 1;
        loop {
            if hops > max_hops || !seen.insert(uri.clone()) {
                return Err(RouterError::RedirectLoop { start, hops });
            }
            if self.translate(uri, None, word_separator)?.is_none() {
                return Ok(Some(kind));
            }
            hops += 1;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RedirectEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(redirects: &[(&str, &str, RedirectKind)]) -> RedirectTable {
        let mut table = RedirectTable::new();
        for (route, translation, kind) in redirects {
            table.redirect(route, translation, *kind).unwrap();
        }
        table
    }

    #[test]
    fn test_translate_with_params() {
        let table = table(&[("/articles/[!:slug]", "/blog/articles/[slug]", RedirectKind::MovedPermanently)]);
        let mut uri = "/articles/my_awesome_article".to_string();
        let kind = table.translate(&mut uri, None, "_").unwrap();
        assert_eq!(kind, Some(RedirectKind::MovedPermanently));
        assert_eq!(uri, "/blog/articles/my_awesome_article");
    }

    #[test]
    fn test_no_match_leaves_uri() {
        let table = table(&[("/old", "/new", RedirectKind::Found)]);
        let mut uri = "/other".to_string();
        assert_eq!(table.translate(&mut uri, Some("/other/"), "_").unwrap(), None);
        assert_eq!(uri, "/other");
    }

    #[test]
    fn test_restless_alternative_is_permanent() {
        let table = table(&[("/old/", "/new", RedirectKind::TemporaryRedirect)]);
        let mut uri = "/old".to_string();
        let kind = table.translate(&mut uri, Some("/old/"), "_").unwrap();
        assert_eq!(kind, Some(RedirectKind::MovedPermanently));
        assert_eq!(uri, "/old/");
    }

    #[test]
    fn test_resolve_follows_chain() {
        let table = table(&[
            ("/old", "/mid", RedirectKind::TemporaryRedirect),
            ("/mid", "/new", RedirectKind::MovedPermanently),
        ]);
        let mut uri = "/old".to_string();
        let kind = table.resolve(&mut uri, None, "_", 16).unwrap();
        assert_eq!(kind, Some(RedirectKind::TemporaryRedirect));
        assert_eq!(uri, "/new");
    }

    #[test]
    fn test_resolve_detects_cycle() {
        let table = table(&[
            ("/a", "/b", RedirectKind::MovedPermanently),
            ("/b", "/a", RedirectKind::MovedPermanently),
        ]);
        let mut uri = "/a".to_string();
        let err = table.resolve(&mut uri, None, "_", 16).unwrap_err();
        assert!(matches!(err, RouterError::RedirectLoop { ref start, .. } if start == "/a"));
    }

    #[test]
    fn test_resolve_respects_hop_limit() {
        let table = table(&[
            ("/1", "/2", RedirectKind::MovedPermanently),
            ("/2", "/3", RedirectKind::MovedPermanently),
            ("/3", "/4", RedirectKind::MovedPermanently),
        ]);
        let mut uri = "/1".to_string();
        assert!(table.resolve(&mut uri, None, "_", 2).is_err());

        let mut uri = "/1".to_string();
        assert_eq!(table.resolve(&mut uri, None, "_", 3).unwrap(), Some(RedirectKind::MovedPermanently));
        assert_eq!(uri, "/4");
    }

    #[test]
    fn test_conflicting_redirects() {
        let mut table = table(&[("/old", "/new", RedirectKind::MovedPermanently)]);
        assert!(!table.redirect("/old", "/new", RedirectKind::MovedPermanently).unwrap());

        let err = table.redirect("/old", "/new", RedirectKind::Found).unwrap_err();
        assert!(err.to_string().contains("incompatible type 302"));

        let err = table.redirect("/old", "/newer", RedirectKind::MovedPermanently).unwrap_err();
        assert!(err.to_string().contains("incompatible translation /newer"));
    }

    #[test]
    fn test_unnamed_token_conflicts_with_named() {
        let mut table = table(&[("/post/[!:id]", "/articles/[id]", RedirectKind::MovedPermanently)]);
        let err = table.redirect("/post/[!]", "/articles", RedirectKind::MovedPermanently).unwrap_err();
        assert!(matches!(err, RouterError::ConflictingRedirect { .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_kind_from_code() {
        assert_eq!(RedirectKind::try_from(303).unwrap(), RedirectKind::SeeOther);
        assert!(matches!(RedirectKind::try_from(308), Err(RouterError::InvalidRedirectKind(308))));
    }
}
