//! Request dispatch.
//!
//! # Data Flow
//! ```text
//! run(request, response)
//!     → restless form of the path (if enabled)
//!     → redirect phase: redirect chain resolved → request.redirect() → done
//!     → match phase: routes in order
//!         → captures decoded, callback templates decompiled, params set
//!         → action invoked: Done → response, Skip → next route, Stop → halt
//!     → nothing matched but the restless form does → 301 → done
//!     → error phase: 4xx/5xx → most specific handler (no recursion)
//!     → response
//! ```
//!
//! # Design Decisions
//! - Dispatch state lives for one `run` and is never shared
//! - Skipped candidates are logged, never raised
//! - Output written by an action wins over its return value

use std::borrow::Cow;
use std::ops::ControlFlow;

use serde::Serialize;
use uuid::Uuid;

use crate::action::{Action, ActionContext, Outcome, Target};
use crate::http::{Request, Response};
use crate::observability::metrics;
use crate::routing::redirect::RedirectKind;
use crate::routing::token::decompile;
use crate::routing::{Params, Router};

/// Per-dispatch bookkeeping.
#[derive(Debug, Clone)]
pub struct DispatchState {
    id: Uuid,
    entry: Option<(String, String)>,
    log: Vec<String>,
}

impl DispatchState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            entry: None,
            log: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Class and method of the first controller action that ran.
    pub fn entry(&self) -> Option<(&str, &str)> {
        self.entry
            .as_ref()
            .map(|(class, method)| (class.as_str(), method.as_str()))
    }

    /// Diagnostics collected during dispatch, in order.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn is_entry(&self, class: &str, method: Option<&str>) -> bool {
        match &self.entry {
            Some((entry_class, entry_method)) => {
                entry_class == class && method.map_or(true, |method| entry_method == method)
            }
            None => false,
        }
    }

    pub(crate) fn record_entry(&mut self, class: &str, method: &str) -> bool {
        if self.entry.is_some() {
            return false;
        }
        self.entry = Some((class.to_string(), method.to_string()));
        true
    }

    pub(crate) fn clear_entry(&mut self) {
        self.entry = None;
    }

    pub(crate) fn push_log(&mut self, message: String) {
        self.log.push(message);
    }
}

impl Default for DispatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// What a dispatch of a path would select, without running any action.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Probe {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_kind: Option<RedirectKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Params::is_empty")]
    pub params: Params,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Router {
    /// Dispatch `request`, starting from `response`.
    pub fn run(&self, request: &mut dyn Request, response: Response) -> Response {
        self.run_logged(request, response).0
    }

    /// Like [`Router::run`], also returning the dispatch state.
    pub fn run_logged(
        &self,
        request: &mut dyn Request,
        response: Response,
    ) -> (Response, DispatchState) {
        let mut state = DispatchState::new();
        let span = tracing::debug_span!("dispatch", id = %state.id(), path = %request.path());
        let _enter = span.enter();

        let response = self.dispatch(request, response, &mut state);

        let outcome = if response.status().is_redirection() {
            "redirect"
        } else if response.check_code(400, 599) {
            "error"
        } else {
            "ok"
        };
        metrics::record_dispatch(outcome);
        tracing::debug!(status = response.status().as_u16(), skipped = state.log().len(), "Dispatch complete");

        (response, state)
    }

    /// Report which redirect or route a request for `path` would select.
    ///
    /// The first route whose pattern matches is reported, even though its
    /// action might skip at dispatch time.
    pub fn probe(&self, path: &str) -> Probe {
        let mut probe = Probe {
            path: path.to_string(),
            ..Default::default()
        };
        let separator = self.settings.word_separator.as_str();
        let restless_alt = self.restless_alt(path);

        let mut target = path.to_string();
        match self.redirects.resolve(
            &mut target,
            restless_alt.as_deref(),
            separator,
            self.settings.max_redirect_hops,
        ) {
            Ok(Some(kind)) => {
                probe.redirect = Some(target);
                probe.redirect_kind = Some(kind);
                return probe;
            }
            Ok(None) => {}
            Err(err) => {
                probe.error = Some(err.to_string());
                return probe;
            }
        }

        for entry in self.routes.iter() {
            let Some(captures) = entry.pattern().captures(path) else {
                continue;
            };
            let params = decode_params(captures);
            probe.route = Some(entry.template());

            match entry.action() {
                Action::Callback(template) => match decompile(template, &params, separator) {
                    Ok((callback, _)) => probe.action = Some(callback),
                    Err(err) => probe.error = Some(err.to_string()),
                },
                action => probe.action = Some(action.to_string()),
            }
            probe.params = params;
            return probe;
        }

        if let Some(alt) = restless_alt.filter(|alt| self.routes_match(alt)) {
            probe.redirect = Some(alt);
            probe.redirect_kind = Some(RedirectKind::MovedPermanently);
        }
        probe
    }

    fn dispatch(
        &self,
        request: &mut dyn Request,
        response: Response,
        state: &mut DispatchState,
    ) -> Response {
        let path = request.path().to_string();
        let restless_alt = self.restless_alt(&path);

        let mut target = path.clone();
        let response = match self.redirects.resolve(
            &mut target,
            restless_alt.as_deref(),
            &self.settings.word_separator,
            self.settings.max_redirect_hops,
        ) {
            Ok(Some(kind)) => {
                tracing::info!(from = %path, to = %target, kind = kind.code(), "Redirect matched");
                metrics::record_redirect(kind);
                return request.redirect(&target, kind);
            }
            Ok(None) => {
                match self.match_routes(request, &path, restless_alt.as_deref(), response, state) {
                    ControlFlow::Continue(response) => response,
                    ControlFlow::Break(redirect) => return redirect,
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "Redirect resolution failed");
                state.push_log(err.to_string());
                Response::internal_server_error()
            }
        };

        if response.check_code(400, 599) {
            self.handle_error(request, response, state)
        } else {
            response
        }
    }

    /// Match phase. `Break` carries a terminal restless redirect.
    fn match_routes(
        &self,
        request: &mut dyn Request,
        path: &str,
        restless_alt: Option<&str>,
        mut response: Response,
        state: &mut DispatchState,
    ) -> ControlFlow<Response, Response> {
        let separator = self.settings.word_separator.as_str();
        let mut matched = false;

        for entry in self.routes.iter() {
            let Some(captures) = entry.pattern().captures(path) else {
                continue;
            };
            matched = true;
            let params = decode_params(captures);

            let (action, params) = match entry.action() {
                Action::Callback(template) => match decompile(template, &params, separator) {
                    Ok((callback, unused)) => (Cow::Owned(Action::Callback(callback)), unused),
                    Err(err) => {
                        skipped(state, err.to_string());
                        continue;
                    }
                },
                action => (Cow::Borrowed(action), params),
            };

            for (key, value) in params {
                request.set(&key, value);
            }

            tracing::debug!(route = %entry.template(), action = %action, "Route matched");
            match self.capture(&action, request, &response, state) {
                Outcome::Done(reply) => {
                    response = Response::resolve(reply);
                    break;
                }
                Outcome::Skip(_) => continue,
                Outcome::Stop(replacement) => {
                    tracing::debug!(route = %entry.template(), "Dispatch stopped by action");
                    if let Some(replacement) = replacement {
                        response = replacement;
                    }
                    break;
                }
            }
        }

        if !matched {
            if let Some(alt) = restless_alt.filter(|alt| self.routes_match(alt)) {
                tracing::info!(from = %path, to = %alt, "Redirecting to restless form");
                metrics::record_redirect(RedirectKind::MovedPermanently);
                return ControlFlow::Break(request.redirect(alt, RedirectKind::MovedPermanently));
            }
        }

        ControlFlow::Continue(response)
    }

    fn handle_error(
        &self,
        request: &mut dyn Request,
        response: Response,
        state: &mut DispatchState,
    ) -> Response {
        let error = response.error_name();
        let Some(handler) = self.handlers.find(request.path(), &error) else {
            tracing::debug!(error = %error, "No error handler, keeping response");
            return response;
        };

        tracing::debug!(
            base_url = %handler.base_url(),
            error = %error,
            action = %handler.action(),
            "Selected error handler"
        );
        metrics::record_error_handler(&error);

        match self.capture(handler.action(), request, &response, state) {
            Outcome::Done(reply) => Response::resolve(reply),
            Outcome::Stop(Some(replacement)) => replacement,
            Outcome::Stop(None) | Outcome::Skip(_) => response,
        }
    }

    /// Invoke `action` with output capture. A completed action always comes
    /// back as `Done` carrying the final response.
    fn capture(
        &self,
        action: &Action,
        request: &mut dyn Request,
        response: &Response,
        state: &mut DispatchState,
    ) -> Outcome {
        let mut cx = ActionContext::new(request, response, self, state);
        tracing::trace!(action = %action, "beginAction");

        let outcome = match self.call_action(action, &mut cx) {
            Outcome::Done(reply) => {
                let output = cx.take_output();
                let resolved = if output.is_empty() {
                    Response::resolve(reply)
                } else {
                    Response::ok().with_body(output)
                };
                Outcome::done(resolved)
            }
            other => other,
        };

        tracing::trace!(action = %action, "endAction");
        outcome
    }

    /// Resolve and invoke `action` within an existing context.
    pub(crate) fn call_action(&self, action: &Action, cx: &mut ActionContext<'_>) -> Outcome {
        let target = action.target();

        if let Target::Method { method, .. } = target {
            if method.starts_with("__") {
                return skipped(
                    cx.state_mut(),
                    format!("Action method \"{}\" cannot be a magic method", method),
                );
            }
        }

        let callable = match self.invoker.resolve(&target) {
            Ok(callable) => callable,
            Err(reason) => return skipped(cx.state_mut(), reason),
        };

        let recorded = match callable.entry() {
            Some((class, method)) => cx.state_mut().record_entry(class, method),
            None => false,
        };

        let outcome = callable.call(cx);
        if let Outcome::Skip(reason) = &outcome {
            if recorded {
                cx.state_mut().clear_entry();
            }
            return skipped(cx.state_mut(), reason.clone());
        }
        outcome
    }

    fn restless_alt(&self, path: &str) -> Option<String> {
        if !self.settings.restless || path.is_empty() || path == "/" {
            return None;
        }
        Some(match path.strip_suffix('/') {
            Some(trimmed) => trimmed.to_string(),
            None => format!("{}/", path),
        })
    }

    fn routes_match(&self, path: &str) -> bool {
        self.routes.iter().any(|entry| entry.pattern().is_match(path))
    }
}

/// Form-style decoding: `+` is a space, then percent escapes are decoded.
fn decode_params(captures: Vec<(String, String)>) -> Params {
    captures
        .into_iter()
        .map(|(name, value)| {
            let spaced = value.replace('+', " ");
            let decoded = urlencoding::decode(&spaced).map(Cow::into_owned).ok();
            (name, decoded.unwrap_or(value))
        })
        .collect()
}

fn skipped(state: &mut DispatchState, reason: String) -> Outcome {
    tracing::warn!(reason = %reason, "Continue");
    metrics::record_skipped();
    state.push_log(format!("Continue: {}", reason));
    Outcome::Skip(reason)
}
