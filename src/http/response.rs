//! Response model.
//!
//! # Responsibilities
//! - Hold status, headers and body produced by actions
//! - Map short state names (`ok`, `not_found`, ...) to codes and default bodies
//! - Resolve whatever an action returned into a response
//!
//! # Design Decisions
//! - State names double as error names for handler lookup
//! - Codes without a state name fall back to their numeric form
//! - Redirect codes have no state; redirects are issued by the request

use std::borrow::Cow;

use http::header::{HeaderName, HeaderValue, LOCATION};
use http::{HeaderMap, StatusCode};

use crate::action::Reply;
use crate::error::{RouterError, RouterResult};
use crate::routing::redirect::RedirectKind;

/// Known response states: name, code, default body.
const STATES: &[(&str, u16, Option<&str>)] = &[
    ("ok", 200, None),
    ("created", 201, None),
    ("accepted", 202, None),
    ("no_content", 204, None),
    ("bad_request", 400, Some("The requested could not be understood")),
    ("not_authorized", 401, Some("The requested resource requires authorization")),
    ("forbidden", 403, Some("You do not have permission to view the requested resource")),
    ("not_found", 404, Some("The requested resource could not be found")),
    ("not_allowed", 405, Some("The requested resource does not support this method")),
    ("not_acceptable", 406, Some("The requested resource is not available in the accepted parameters")),
    ("internal_server_error", 500, Some("The requested resource is not available due to an internal error")),
    ("service_unavailable", 503, Some("The requested resource is temporarily unavailable")),
];

/// Returns true if `name` is a known response state.
pub fn is_known_state(name: &str) -> bool {
    STATES.iter().any(|(state, _, _)| *state == name)
}

/// Returns true if `name` can be produced by [`Response::error_name`] for
/// a 4xx/5xx response: a known state, or a stateless numeric code.
pub fn is_error_name(name: &str) -> bool {
    if is_known_state(name) {
        return true;
    }
    match name.parse::<u16>() {
        Ok(code) if (400..=599).contains(&code) && name.len() == 3 => {
            !STATES.iter().any(|(_, state_code, _)| *state_code == code)
        }
        _ => false,
    }
}

/// An outgoing response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<String>,
}

impl Response {
    /// A response with the given status, no headers and no body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// A response for a named state, carrying the state's default body.
    pub fn from_state(name: &str) -> RouterResult<Self> {
        let name = name.to_lowercase();
        let (_, code, body) = STATES
            .iter()
            .find(|(state, _, _)| *state == name)
            .ok_or_else(|| RouterError::UnknownState(name.clone()))?;

        let status = StatusCode::from_u16(*code).map_err(|_| RouterError::UnknownState(name.clone()))?;
        Ok(Self {
            status,
            headers: HeaderMap::new(),
            body: body.map(str::to_string),
        })
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND).with_body("The requested resource could not be found")
    }

    pub fn internal_server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
            .with_body("The requested resource is not available due to an internal error")
    }

    /// A redirect to `location`.
    pub fn redirect(location: &str, kind: RedirectKind) -> Self {
        let mut response = Self::new(kind.status());
        match HeaderValue::from_str(location) {
            Ok(value) => {
                response.headers.insert(LOCATION, value);
            }
            Err(_) => tracing::warn!(location = %location, "Redirect location is not a valid header value"),
        }
        response
    }

    /// Turn an action's reply into a response.
    pub fn resolve(reply: Reply) -> Self {
        match reply {
            Reply::Empty => Self::ok(),
            Reply::Body(body) => Self::ok().with_body(body),
            Reply::Response(response) => response,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The state name for this response's code, if it has one.
    pub fn state(&self) -> Option<&'static str> {
        let code = self.status.as_u16();
        STATES
            .iter()
            .find(|(_, state_code, _)| *state_code == code)
            .map(|(name, _, _)| *name)
    }

    /// Name used to look up error handlers: the state name, or the numeric
    /// code when the code has no state.
    pub fn error_name(&self) -> Cow<'static, str> {
        match self.state() {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(self.status.as_u16().to_string()),
        }
    }

    /// Whether the status code lies within `[low, high]`.
    pub fn check_code(&self, low: u16, high: u16) -> bool {
        (low..=high).contains(&self.status.as_u16())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// The `Location` header, for redirects.
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }
}

impl Default for Response {
    /// Requests that nothing handles end up here.
    fn default() -> Self {
        Self::not_found()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_state() {
        let response = Response::from_state("not_found").unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), Some("The requested resource could not be found"));
        assert_eq!(response.state(), Some("not_found"));

        let created = Response::from_state("CREATED").unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        assert_eq!(created.body(), None);
    }

    #[test]
    fn test_unknown_state() {
        let err = Response::from_state("teapot").unwrap_err();
        assert!(matches!(err, RouterError::UnknownState(ref name) if name == "teapot"));
    }

    #[test]
    fn test_error_name_falls_back_to_code() {
        assert_eq!(Response::not_found().error_name(), "not_found");
        assert_eq!(Response::new(StatusCode::IM_A_TEAPOT).error_name(), "418");
    }

    #[test]
    fn test_check_code() {
        assert!(Response::not_found().check_code(400, 599));
        assert!(!Response::ok().check_code(400, 599));
        assert!(Response::new(StatusCode::from_u16(599).unwrap()).check_code(400, 599));
    }

    #[test]
    fn test_resolve_reply() {
        assert_eq!(Response::resolve(Reply::Empty), Response::ok());
        assert_eq!(Response::resolve(Reply::from("hi")).body(), Some("hi"));

        let explicit = Response::from_state("forbidden").unwrap();
        assert_eq!(Response::resolve(Reply::from(explicit.clone())), explicit);
    }

    #[test]
    fn test_redirect_sets_location() {
        let response = Response::redirect("/new", RedirectKind::SeeOther);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.location(), Some("/new"));
    }
}
