//! Per-invocation context handed to actions.

use std::fmt;

use uuid::Uuid;

use crate::action::{Action, Outcome};
use crate::error::RouterResult;
use crate::http::{Request, Response};
use crate::routing::dispatch::DispatchState;
use crate::routing::{Params, Router};

/// Everything an action can see and touch while it runs.
///
/// Output written through [`ActionContext::write`] (or `fmt::Write`) is
/// captured; when non-empty it becomes the body of an `ok` response and
/// takes precedence over whatever the action returns.
pub struct ActionContext<'a> {
    request: &'a mut dyn Request,
    response: &'a Response,
    router: &'a Router,
    state: &'a mut DispatchState,
    output: String,
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(
        request: &'a mut dyn Request,
        response: &'a Response,
        router: &'a Router,
        state: &'a mut DispatchState,
    ) -> Self {
        Self {
            request,
            response,
            router,
            state,
            output: String::new(),
        }
    }

    pub fn request(&self) -> &dyn Request {
        &*self.request
    }

    pub fn request_mut(&mut self) -> &mut dyn Request {
        &mut *self.request
    }

    /// The response as it stood before this action ran (for error
    /// handlers, the error response being handled).
    pub fn response(&self) -> &Response {
        self.response
    }

    pub fn router(&self) -> &Router {
        self.router
    }

    /// Identifier of the dispatch this action runs in.
    pub fn dispatch_id(&self) -> Uuid {
        self.state.id()
    }

    /// Append to the captured output.
    pub fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Whether `class` (and `method`, when given) is the entry action of
    /// this dispatch.
    pub fn is_entry(&self, class: &str, method: Option<&str>) -> bool {
        self.state.is_entry(class, method)
    }

    /// Shorthand for [`Router::compose`].
    pub fn compose(&self, route: &str, params: &Params, as_query: bool) -> RouterResult<String> {
        self.router.compose(route, params, as_query)
    }

    /// Invoke another action inside this dispatch.
    ///
    /// The entry action, once recorded, is not overwritten. Output written
    /// by the forwarded action lands in the same buffer.
    pub fn forward(&mut self, action: &Action) -> Outcome {
        let router = self.router;
        router.call_action(action, self)
    }

    pub(crate) fn state_mut(&mut self) -> &mut DispatchState {
        &mut *self.state
    }

    pub(crate) fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl fmt::Write for ActionContext<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}
