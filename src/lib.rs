//! Request routing and dispatch.
//!
//! Maps request paths to actions through compiled route templates, composes
//! URLs back from the same templates, follows redirect tables and resolves
//! error responses to the most specific handler.
//!
//! # Example
//!
//! ```
//! use route_dispatch::{Action, Outcome, Request, Response, Router, ServerRequest};
//!
//! let mut builder = Router::builder();
//! builder
//!     .link("", "/articles/[!:slug]", Action::closure(|cx| {
//!         let slug = cx.request().get("slug").unwrap_or_default().to_string();
//!         Outcome::done(format!("article {}", slug))
//!     }))
//!     .unwrap();
//! let router = builder.build();
//!
//! let mut request = ServerRequest::parse("/articles/hello").unwrap();
//! let response = router.run(&mut request, Response::default());
//! assert_eq!(response.body(), Some("article hello"));
//! ```

pub mod action;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod routing;

pub use action::{Action, ActionContext, ActionInvoker, ActionRegistry, Controller, Outcome, Reply};
pub use config::{RouterHandle, RoutingConfig};
pub use error::{RouterError, RouterResult};
pub use http::{Request, Response, ServerRequest};
pub use routing::{DispatchState, Params, RedirectKind, Router, RouterBuilder};
