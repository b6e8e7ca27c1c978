//! Action registry.
//!
//! # Responsibilities
//! - Map function names to handlers
//! - Map controller class names to factories (one instance per call)
//! - Explain, in dispatch log wording, why a target cannot be resolved
//!
//! # Design Decisions
//! - Registered once at startup, shared immutably like the routing tables
//! - Controllers are instantiated per invocation, never reused across requests

use std::collections::HashMap;
use std::sync::Arc;

use crate::action::{ActionContext, ActionInvoker, Callable, Handler, Outcome, Target};

/// A controller-like object that actions are executed against.
pub trait Controller: Send {
    /// Whether `method` can be dispatched to.
    fn has_method(&self, method: &str) -> bool;

    /// Run `method`. Only called after `has_method` returned true.
    fn call(&mut self, method: &str, cx: &mut ActionContext<'_>) -> Outcome;
}

type ControllerFactory = Arc<dyn Fn() -> Box<dyn Controller> + Send + Sync>;

#[derive(Clone)]
enum ControllerSource {
    Factory(ControllerFactory),
    Methods(Arc<HashMap<String, Handler>>),
}

/// Controller assembled from per-method closures.
struct MethodTable {
    methods: Arc<HashMap<String, Handler>>,
}

impl Controller for MethodTable {
    fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    fn call(&mut self, method: &str, cx: &mut ActionContext<'_>) -> Outcome {
        match self.methods.get(method) {
            Some(handler) => handler(cx),
            None => Outcome::skip(format!("Action method \"{}\" is not callable", method)),
        }
    }
}

/// The default [`ActionInvoker`]: explicit registries of functions and
/// controllers.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    functions: HashMap<String, Handler>,
    controllers: HashMap<String, ControllerSource>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named function.
    pub fn function<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut ActionContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(f));
        self
    }

    /// Register a controller class with a factory producing one instance
    /// per invocation.
    pub fn controller<F>(&mut self, class: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Controller> + Send + Sync + 'static,
    {
        self.controllers
            .insert(class.into(), ControllerSource::Factory(Arc::new(factory)));
        self
    }

    /// Register a single method of a closure-backed controller class.
    ///
    /// Replaces a factory previously registered under the same class.
    pub fn method<F>(
        &mut self,
        class: impl Into<String>,
        method: impl Into<String>,
        f: F,
    ) -> &mut Self
    where
        F: Fn(&mut ActionContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        let source = self
            .controllers
            .entry(class.into())
            .or_insert_with(|| ControllerSource::Methods(Arc::default()));

        if let ControllerSource::Factory(_) = source {
            *source = ControllerSource::Methods(Arc::default());
        }
        if let ControllerSource::Methods(methods) = source {
            Arc::make_mut(methods).insert(method.into(), Arc::new(f));
        }
        self
    }

    /// Whether a function or class of this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name) || self.controllers.contains_key(name)
    }

    fn instantiate(&self, class: &str) -> Option<Box<dyn Controller>> {
        match self.controllers.get(class)? {
            ControllerSource::Factory(factory) => Some(factory()),
            ControllerSource::Methods(methods) => Some(Box::new(MethodTable {
                methods: methods.clone(),
            })),
        }
    }
}

impl ActionInvoker for ActionRegistry {
    fn resolve(&self, target: &Target<'_>) -> Result<Callable, String> {
        match *target {
            Target::Closure(handler) => Ok(Callable::Handler(handler.clone())),
            Target::Function(name) => self
                .functions
                .get(name)
                .map(|handler| Callable::Handler(handler.clone()))
                .ok_or_else(|| format!("Action \"{}\" is not callable: Skipping", name)),
            Target::Method { class, method } => {
                let controller = self
                    .instantiate(class)
                    .ok_or_else(|| format!("Action class \"{}\" does not exist: Skipping", class))?;

                if !controller.has_method(method) {
                    return Err(format!(
                        "Action method \"{}\" does not exist for class {}",
                        method, class
                    ));
                }

                Ok(Callable::Method {
                    class: class.to_string(),
                    method: method.to_string(),
                    controller,
                })
            }
            Target::Invalid(action) => Err(format!("Invalid action \"{}\"", action)),
        }
    }
}
