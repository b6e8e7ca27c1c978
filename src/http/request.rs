//! Request handling.
//!
//! # Responsibilities
//! - Define what the router needs from a request (path, parameters, redirect)
//! - Provide a concrete request built from a method and a URI
//!
//! # Design Decisions
//! - The path is kept exactly as received (still percent-encoded); route
//!   parameters are decoded after matching
//! - Route parameters shadow query parameters of the same name
//! - Redirecting records the target on the request and hands back the
//!   redirect response; sending it belongs to the transport

use http::Method;
use url::Url;

use crate::http::Response;
use crate::routing::redirect::RedirectKind;
use crate::routing::Params;

/// What the dispatcher needs from a request.
pub trait Request {
    /// Path component of the request URL.
    fn path(&self) -> &str;

    /// Look up a parameter.
    fn get(&self, key: &str) -> Option<&str>;

    /// Set a parameter.
    fn set(&mut self, key: &str, value: String);

    /// Redirect the request to `location`, returning the response to send.
    fn redirect(&mut self, location: &str, kind: RedirectKind) -> Response;
}

/// A request parsed from a method and URI.
#[derive(Debug, Clone)]
pub struct ServerRequest {
    method: Method,
    path: String,
    query: Params,
    params: Params,
    redirected: Option<(String, RedirectKind)>,
}

impl ServerRequest {
    /// Build a request from a method and an absolute path or full URL.
    pub fn new(method: Method, uri: &str) -> Result<Self, url::ParseError> {
        let base = Url::parse("http://localhost")?;
        let url = base.join(uri)?;

        Ok(Self {
            method,
            path: url.path().to_string(),
            query: url.query_pairs().into_owned().collect(),
            params: Params::new(),
            redirected: None,
        })
    }

    /// Shorthand for a `GET` request.
    pub fn parse(uri: &str) -> Result<Self, url::ParseError> {
        Self::new(Method::GET, uri)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Parameters set during dispatch.
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn query(&self) -> &Params {
        &self.query
    }

    /// Location and kind of the redirect issued for this request, if any.
    pub fn redirected(&self) -> Option<(&str, RedirectKind)> {
        self.redirected
            .as_ref()
            .map(|(location, kind)| (location.as_str(), *kind))
    }
}

impl Request for ServerRequest {
    fn path(&self) -> &str {
        &self.path
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .or_else(|| self.query.get(key))
            .map(String::as_str)
    }

    fn set(&mut self, key: &str, value: String) {
        self.params.insert(key.to_string(), value);
    }

    fn redirect(&mut self, location: &str, kind: RedirectKind) -> Response {
        tracing::debug!(method = %self.method, from = %self.path, to = %location, kind = kind.code(), "Redirecting request");
        self.redirected = Some((location.to_string(), kind));
        Response::redirect(location, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_and_query() {
        let request = ServerRequest::parse("/articles/hello%20world?page=2&sort=new").unwrap();
        assert_eq!(request.path(), "/articles/hello%20world");
        assert_eq!(request.get("page"), Some("2"));
        assert_eq!(request.get("sort"), Some("new"));
        assert_eq!(request.method(), &Method::GET);
    }

    #[test]
    fn test_full_url() {
        let request = ServerRequest::new(Method::POST, "https://example.com/api/users").unwrap();
        assert_eq!(request.path(), "/api/users");
    }

    #[test]
    fn test_params_shadow_query() {
        let mut request = ServerRequest::parse("/x?id=query").unwrap();
        request.set("id", "route".to_string());
        assert_eq!(request.get("id"), Some("route"));
    }

    #[test]
    fn test_redirect_is_recorded() {
        let mut request = ServerRequest::parse("/old").unwrap();
        let response = request.redirect("/new", RedirectKind::MovedPermanently);
        assert_eq!(response.location(), Some("/new"));
        assert_eq!(request.redirected(), Some(("/new", RedirectKind::MovedPermanently)));
    }
}
