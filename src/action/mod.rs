//! Actions: what a route dispatches to.
//!
//! # Data Flow
//! ```text
//! Route matched → Action (closure | callback string | class/method pair)
//!     → Target (callback strings split into function or Class::method)
//!     → ActionInvoker::resolve (registry lookup, controller instantiation)
//!     → Callable::call(&mut ActionContext)
//!     → Outcome: Done(reply) | Skip(reason) | Stop(response)
//! ```
//!
//! # Design Decisions
//! - Resolution goes through an explicit registry, never reflection
//! - Skip and Stop are ordinary return values consumed by the dispatch loop
//! - Closures are never equivalent to another action, not even themselves

pub mod context;
pub mod registry;

use std::fmt;
use std::sync::Arc;

use crate::http::Response;

pub use context::ActionContext;
pub use registry::{ActionRegistry, Controller};

/// A callable action body.
pub type Handler = Arc<dyn Fn(&mut ActionContext<'_>) -> Outcome + Send + Sync>;

/// An action as registered against a route or error handler.
#[derive(Clone)]
pub enum Action {
    /// Inline logic.
    Closure(Handler),
    /// A function name or `Class::method` string. May contain tokens
    /// (`[uc:controller]Controller::[lc:action]`) filled from route params.
    Callback(String),
    /// A class/method pair.
    Method { class: String, method: String },
}

impl Action {
    /// Wrap a closure.
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        Self::Closure(Arc::new(f))
    }

    /// A callback string.
    pub fn callback(callback: impl Into<String>) -> Self {
        Self::Callback(callback.into())
    }

    /// A class/method pair.
    pub fn method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::Method {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Whether re-registering `other` over `self` is benign.
    ///
    /// Strings must be identical, pairs must match element-wise, closures
    /// never match.
    pub fn is_equivalent(&self, other: &Action) -> bool {
        match (self, other) {
            (Self::Callback(a), Self::Callback(b)) => a == b,
            (
                Self::Method { class, method },
                Self::Method {
                    class: other_class,
                    method: other_method,
                },
            ) => class == other_class && method == other_method,
            _ => false,
        }
    }

    /// Split the action into what the invoker has to resolve.
    pub fn target(&self) -> Target<'_> {
        match self {
            Self::Closure(handler) => Target::Closure(handler),
            Self::Method { class, method } => Target::Method { class, method },
            Self::Callback(callback) => {
                let callback = callback.trim();
                match callback.split_once("::") {
                    Some((class, method)) if !class.is_empty() && !method.is_empty() => {
                        Target::Method { class, method }
                    }
                    Some(_) => Target::Invalid(callback),
                    None if callback.is_empty() => Target::Invalid(callback),
                    None => Target::Function(callback),
                }
            }
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closure(_) => f.write_str("Closure"),
            Self::Callback(callback) => f.debug_tuple("Callback").field(callback).finish(),
            Self::Method { class, method } => f
                .debug_struct("Method")
                .field("class", class)
                .field("method", method)
                .finish(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closure(_) => f.write_str("{closure}"),
            Self::Callback(callback) => f.write_str(callback),
            Self::Method { class, method } => write!(f, "[{}, {}]", class, method),
        }
    }
}

impl From<&str> for Action {
    fn from(callback: &str) -> Self {
        Self::Callback(callback.to_string())
    }
}

impl From<String> for Action {
    fn from(callback: String) -> Self {
        Self::Callback(callback)
    }
}

impl From<(&str, &str)> for Action {
    fn from((class, method): (&str, &str)) -> Self {
        Self::method(class, method)
    }
}

/// A resolved view of an action.
#[derive(Clone, Copy)]
pub enum Target<'a> {
    Closure(&'a Handler),
    Function(&'a str),
    Method { class: &'a str, method: &'a str },
    Invalid(&'a str),
}

/// What an action hands back when it completes normally.
#[derive(Debug, Clone, Default)]
pub enum Reply {
    /// Nothing; resolves to an empty `ok` response.
    #[default]
    Empty,
    /// Content; resolves to an `ok` response with this body.
    Body(String),
    /// A complete response, used as is.
    Response(Response),
}

impl From<&str> for Reply {
    fn from(body: &str) -> Self {
        Self::Body(body.to_string())
    }
}

impl From<String> for Reply {
    fn from(body: String) -> Self {
        Self::Body(body)
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

/// Result of invoking an action.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The action ran to completion.
    Done(Reply),
    /// The candidate was not usable; dispatch moves on to the next route.
    Skip(String),
    /// The action ended processing; dispatch stops here. A response, if
    /// given, replaces the current one.
    Stop(Option<Response>),
}

impl Outcome {
    pub fn done(reply: impl Into<Reply>) -> Self {
        Self::Done(reply.into())
    }

    pub fn skip(reason: impl Into<String>) -> Self {
        Self::Skip(reason.into())
    }

    /// Stop dispatching and keep the current response.
    pub fn stop() -> Self {
        Self::Stop(None)
    }

    /// Stop dispatching with the given response.
    pub fn stop_with(response: Response) -> Self {
        Self::Stop(Some(response))
    }
}

/// Resolves action targets to something that can be called.
///
/// Implementations decide which function names and controller classes
/// exist. Returning `Err` makes the dispatcher skip the candidate; the
/// message ends up in the dispatch log.
pub trait ActionInvoker: Send + Sync {
    fn resolve(&self, target: &Target<'_>) -> Result<Callable, String>;
}

/// A resolved action, ready to run.
pub enum Callable {
    /// A closure or named function.
    Handler(Handler),
    /// A freshly instantiated controller and the method to call on it.
    Method {
        class: String,
        method: String,
        controller: Box<dyn Controller>,
    },
}

impl Callable {
    /// Class and method when this is a controller call.
    pub fn entry(&self) -> Option<(&str, &str)> {
        match self {
            Self::Handler(_) => None,
            Self::Method { class, method, .. } => Some((class, method)),
        }
    }

    pub fn call(self, cx: &mut ActionContext<'_>) -> Outcome {
        match self {
            Self::Handler(handler) => handler(cx),
            Self::Method {
                method,
                mut controller,
                ..
            } => controller.call(&method, cx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_equivalence() {
        let a = Action::from("A::b");
        assert!(a.is_equivalent(&Action::from("A::b")));
        assert!(!a.is_equivalent(&Action::from("A::c")));
        assert!(!a.is_equivalent(&Action::method("A", "b")));
    }

    #[test]
    fn test_pair_equivalence() {
        let a = Action::method("A", "b");
        assert!(a.is_equivalent(&Action::from(("A", "b"))));
        assert!(!a.is_equivalent(&Action::method("A", "c")));
    }

    #[test]
    fn test_closure_never_equivalent() {
        let closure = Action::closure(|_| Outcome::done(()));
        assert!(!closure.is_equivalent(&closure.clone()));
        assert!(!Action::from("A::b").is_equivalent(&closure));
    }

    #[test]
    fn test_target_split() {
        assert!(matches!(
            Action::from("Blog::show").target(),
            Target::Method { class: "Blog", method: "show" }
        ));
        assert!(matches!(Action::from("healthcheck").target(), Target::Function("healthcheck")));
        assert!(matches!(Action::from("::show").target(), Target::Invalid(_)));
        assert!(matches!(Action::from("").target(), Target::Invalid(_)));
    }
}
