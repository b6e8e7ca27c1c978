//! Token substitution (decompilation).
//!
//! # Responsibilities
//! - Replace `[transform:name]` / `[name]` tokens with parameter values
//! - Apply the optional case transform to each value
//! - Report which parameters were not consumed
//!
//! # Transforms
//! ```text
//! uc   foo_bar  → FooBar     (separator normalized to '_' first)
//! lc   foo_bar  → fooBar     (separator normalized to '_' first)
//! us   FooBar   → foo_bar
//! ws   FooBar   → foo<sep>bar
//! ```
//! Pattern symbols (`!`, `#`, ...) and parenthesized patterns in the
//! transform position are identity transforms, so a route template can be
//! decompiled back into a concrete path.

use crate::error::{RouterError, RouterResult};
use crate::routing::pattern::{is_custom_pattern, symbol_fragment, Token, TOKEN};
use crate::routing::Params;

/// A value transform requested by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Identity,
    UpperCamel,
    LowerCamel,
    Underscore,
    WordSeparator,
}

impl Transform {
    /// Resolve the text before a token's colon.
    pub fn parse(head: Option<&str>) -> RouterResult<Self> {
        match head {
            None => Ok(Self::Identity),
            Some("uc") => Ok(Self::UpperCamel),
            Some("lc") => Ok(Self::LowerCamel),
            Some("us") => Ok(Self::Underscore),
            Some("ws") => Ok(Self::WordSeparator),
            Some(other) if symbol_fragment(other).is_some() || is_custom_pattern(other) => {
                Ok(Self::Identity)
            }
            Some(other) => Err(RouterError::UnknownTransform {
                transform: other.to_string(),
            }),
        }
    }

    /// Apply the transform to a single value.
    pub fn apply(self, value: &str, word_separator: &str) -> String {
        match self {
            Self::Identity => value.to_string(),
            Self::UpperCamel => camelize(&separator_to_underscore(value, word_separator), true),
            Self::LowerCamel => camelize(&separator_to_underscore(value, word_separator), false),
            Self::Underscore => underscorize(value),
            Self::WordSeparator => underscorize(value).replace('_', word_separator),
        }
    }
}

/// Names referenced by a template, with their transforms, in order.
///
/// Used at registration time to reject templates that could never be
/// decompiled.
pub fn template_tokens(template: &str) -> RouterResult<Vec<(String, Transform)>> {
    TOKEN
        .find_iter(template)
        .map(|found| {
            let token = Token::parse(found.as_str());
            Ok((token.name.to_string(), Transform::parse(token.head)?))
        })
        .collect()
}

/// Substitute every token of `template` with its value from `values`.
///
/// Returns the concrete string and the parameters no token consumed.
pub fn decompile(
    template: &str,
    values: &Params,
    word_separator: &str,
) -> RouterResult<(String, Params)> {
    let mut leftover = values.clone();
    let mut output = String::with_capacity(template.len());
    let mut last = 0;

    for found in TOKEN.find_iter(template) {
        output.push_str(&template[last..found.start()]);
        last = found.end();

        let token = Token::parse(found.as_str());
        let transform = Transform::parse(token.head)?;
        let value = values
            .get(token.name)
            .ok_or_else(|| RouterError::MissingParameter {
                name: token.name.to_string(),
            })?;

        output.push_str(&transform.apply(value, word_separator));
        leftover.shift_remove(token.name);
    }
    output.push_str(&template[last..]);

    Ok((output, leftover))
}

fn separator_to_underscore(value: &str, word_separator: &str) -> String {
    if word_separator == "_" || word_separator.is_empty() {
        value.to_string()
    } else {
        value.replace(word_separator, "_")
    }
}

/// `foo_bar` → `FooBar` (upper) or `fooBar` (lower).
pub fn camelize(value: &str, upper: bool) -> String {
    let mut out = String::with_capacity(value.len());
    let mut capitalize = upper;

    for (i, c) in value.chars().enumerate() {
        if c == '_' {
            capitalize = i > 0 || upper;
            continue;
        }
        if capitalize {
            out.extend(c.to_uppercase());
            capitalize = false;
        } else if out.is_empty() && !upper {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `FooBar` / `fooBar` / `foo-bar` → `foo_bar`.
pub fn underscorize(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' || c == '_' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_decompile_plain_tokens() {
        let (url, leftover) = decompile(
            "/blog/articles/[slug]",
            &params(&[("slug", "hello"), ("page", "2")]),
            "_",
        )
        .unwrap();
        assert_eq!(url, "/blog/articles/hello");
        assert_eq!(leftover, params(&[("page", "2")]));
    }

    #[test]
    fn test_decompile_route_template() {
        let (url, leftover) = decompile(
            "/articles/[#:year]-[#:month]/[!:slug]",
            &params(&[("year", "2009"), ("month", "08"), ("slug", "x")]),
            "_",
        )
        .unwrap();
        assert_eq!(url, "/articles/2009-08/x");
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_decompile_controller_action() {
        let (action, leftover) = decompile(
            "[uc:controller]Controller::[lc:action]",
            &params(&[("controller", "blog_post"), ("action", "show_all")]),
            "_",
        )
        .unwrap();
        assert_eq!(action, "BlogPostController::showAll");
        assert!(leftover.is_empty());
    }

    #[test]
    fn test_missing_parameter() {
        let err = decompile("/x/[id]", &Params::new(), "_").unwrap_err();
        assert!(matches!(err, RouterError::MissingParameter { ref name } if name == "id"));
    }

    #[test]
    fn test_unknown_transform() {
        let err = decompile("/x/[zz:id]", &params(&[("id", "1")]), "_").unwrap_err();
        assert!(matches!(err, RouterError::UnknownTransform { ref transform } if transform == "zz"));
    }

    #[test]
    fn test_repeated_token_is_replaced_everywhere() {
        let (url, _) = decompile("/[a]/[a]", &params(&[("a", "v")]), "_").unwrap();
        assert_eq!(url, "/v/v");
    }

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("foo_bar", true), "FooBar");
        assert_eq!(camelize("foo_bar", false), "fooBar");
        assert_eq!(camelize("Main", false), "main");
        assert_eq!(camelize("main", true), "Main");
    }

    #[test]
    fn test_underscorize() {
        assert_eq!(underscorize("FooBar"), "foo_bar");
        assert_eq!(underscorize("fooBar"), "foo_bar");
        assert_eq!(underscorize("HTMLParser"), "html_parser");
        assert_eq!(underscorize("foo-bar baz"), "foo_bar_baz");
        assert_eq!(underscorize("already_done"), "already_done");
    }

    #[test]
    fn test_word_separator_transforms() {
        assert_eq!(Transform::WordSeparator.apply("BlogPost", "-"), "blog-post");
        assert_eq!(Transform::UpperCamel.apply("blog-post", "-"), "BlogPost");
        assert_eq!(Transform::LowerCamel.apply("blog-post", "-"), "blogPost");
    }
}
