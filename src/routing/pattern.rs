//! Route template compilation.
//!
//! # Responsibilities
//! - Find `[pattern:name]` tokens in a route template
//! - Quote literal text, substitute token patterns
//! - Collect parameter names in template order
//!
//! # Design Decisions
//! - The stored source is unanchored; anchors are added when the matcher is
//!   built
//! - The conflict key emits every token as a non-capturing group, so named
//!   and unnamed tokens of the same pattern collide
//! - Capture group `k` always binds `params[k]`; custom patterns that add
//!   their own groups are rejected
//! - Repeated parameter names are rejected rather than silently overwritten

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RouterError, RouterResult};

/// Matches a single bracketed token.
pub(crate) static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

/// Built-in pattern symbols.
const SYMBOLS: &[(&str, &str)] = &[
    ("+", r"([1-9]|[1-9][0-9]+)"),
    ("#", r"(-?(?:[0-9]+))"),
    ("%", r"(-?[0-9]+\.[0-9]+)"),
    ("!", r"([^/]+)"),
    ("$", r"([a-zA-Z_\x{7f}-\x{10FFFF}][a-zA-Z0-9_\x{7f}-\x{10FFFF}]*)"),
    ("*", r"(.*)"),
];

/// Look up the regex fragment for a built-in pattern symbol.
pub fn symbol_fragment(symbol: &str) -> Option<&'static str> {
    SYMBOLS
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, fragment)| *fragment)
}

/// Returns true for a pattern written as `(...)`.
pub fn is_custom_pattern(pattern: &str) -> bool {
    pattern.len() >= 2 && pattern.starts_with('(') && pattern.ends_with(')')
}

/// A token split into its pattern (or transform) and parameter name.
///
/// The split happens at the last `:`, so custom patterns may contain colons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    /// Full token text including brackets.
    pub text: &'a str,
    /// Text before the last colon, `None` for `[name]` tokens.
    pub head: Option<&'a str>,
    /// Parameter name after the last colon (or the whole body).
    pub name: &'a str,
}

impl<'a> Token<'a> {
    pub(crate) fn parse(text: &'a str) -> Self {
        let body = &text[1..text.len() - 1];
        match body.rfind(':') {
            Some(pos) => Self {
                text,
                head: Some(body[..pos].trim()),
                name: body[pos + 1..].trim(),
            },
            None => Self {
                text,
                head: None,
                name: body.trim(),
            },
        }
    }
}

/// A compiled route template.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    key: String,
    params: Vec<String>,
    matcher: Regex,
}

impl CompiledPattern {
    /// Compile a route template.
    ///
    /// Tokens without a name (`[!]`) still match but bind nothing; their
    /// capture group is made non-capturing so group numbering stays aligned
    /// with `params`.
    pub fn compile(route: &str) -> RouterResult<Self> {
        let mut source = String::with_capacity(route.len() * 2);
        let mut key = String::with_capacity(route.len() * 2);
        let mut params: Vec<String> = Vec::new();
        let mut tokens = 0;
        let mut last = 0;

        for found in TOKEN.find_iter(route) {
            let literal = regex::escape(&route[last..found.start()]);
            source.push_str(&literal);
            key.push_str(&literal);
            last = found.end();

            let token = Token::parse(found.as_str());
            let (pattern, name) = match token.head {
                Some(pattern) => (pattern, Some(token.name)),
                None => (token.name, None),
            };

            let fragment = if let Some(fragment) = symbol_fragment(pattern) {
                fragment
            } else if is_custom_pattern(pattern) {
                pattern
            } else {
                return Err(RouterError::InvalidPattern {
                    route: route.to_string(),
                    pattern: pattern.to_string(),
                });
            };

            match name.filter(|n| !n.is_empty()) {
                Some(name) => {
                    if params.iter().any(|p| p == name) {
                        return Err(RouterError::DuplicateParameter {
                            route: route.to_string(),
                            name: name.to_string(),
                        });
                    }
                    params.push(name.to_string());
                    tokens += 1;
                    source.push_str(fragment);
                }
                None => {
                    source.push_str("(?:");
                    source.push_str(&fragment[1..]);
                }
            }
            key.push_str("(?:");
            key.push_str(&fragment[1..]);
        }
        let literal = regex::escape(&route[last..]);
        source.push_str(&literal);
        key.push_str(&literal);

        let matcher = Regex::new(&format!("^(?:{})$", source)).map_err(|e| RouterError::Regex {
            route: route.to_string(),
            source: e,
        })?;

        let groups = matcher.captures_len() - 1;
        if groups != tokens {
            return Err(RouterError::CaptureMismatch {
                route: route.to_string(),
                tokens,
                groups,
            });
        }

        Ok(Self {
            source,
            key,
            params,
            matcher,
        })
    }

    /// The unanchored expression.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Conflict key: the source with parameter names and capture groups
    /// erased. Two patterns with the same key match the same paths.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Parameter names in capture group order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Returns true if the whole path matches.
    pub fn is_match(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    /// Match the whole path and bind raw captures to parameter names.
    pub fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let caps = self.matcher.captures(path)?;
        Some(
            self.params
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let value = caps.get(i + 1).map(|m| m.as_str()).unwrap_or_default();
                    (name.clone(), value.to_string())
                })
                .collect(),
        )
    }
}
