//! Shared fixtures for integration tests.

use std::sync::Arc;

use http::StatusCode;

use route_dispatch::{
    ActionContext, ActionRegistry, Controller, DispatchState, Outcome, Params, Request, Response,
    Router, ServerRequest,
};

/// Controller that echoes the method it was called with and a request
/// parameter named `slug`.
pub struct ArticleController;

impl Controller for ArticleController {
    fn has_method(&self, method: &str) -> bool {
        matches!(method, "show" | "list")
    }

    fn call(&mut self, method: &str, cx: &mut ActionContext<'_>) -> Outcome {
        let slug = cx.request().get("slug").unwrap_or("-").to_string();
        Outcome::done(format!("articles.{} {}", method, slug))
    }
}

/// Registry with the controllers and functions used across tests.
pub fn registry() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry
        .controller("ArticleController", || Box::new(ArticleController))
        .method("ErrorController", "root", |cx| {
            let body = format!("root handler {}", cx.request().path());
            Outcome::done(Response::not_found().with_body(body))
        })
        .method("ErrorController", "api", |cx| {
            let body = format!("api handler {}", cx.request().path());
            Outcome::done(Response::not_found().with_body(body))
        })
        .method("PageController", "show", |cx| {
            cx.write("page");
            Outcome::done(())
        })
        .function("status", |_| Outcome::done("up"))
        .function("teapot", |_| Outcome::done(Response::new(StatusCode::IM_A_TEAPOT)));
    registry
}

pub fn invoker() -> Arc<ActionRegistry> {
    Arc::new(registry())
}

#[allow(dead_code)]
pub fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Run `uri` through `router`, returning the response, the dispatch state and
/// the request as the router left it.
#[allow(dead_code)]
pub fn dispatch(router: &Router, uri: &str) -> (Response, DispatchState, ServerRequest) {
    let mut request = ServerRequest::parse(uri).unwrap();
    let (response, state) = router.run_logged(&mut request, Response::default());
    (response, state, request)
}
