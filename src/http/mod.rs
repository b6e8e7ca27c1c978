//! HTTP collaborators of the dispatcher.
//!
//! # Data Flow
//! ```text
//! transport (out of scope)
//!     → request.rs (path, parameters, redirect capability)
//!     → [routing::dispatch runs the request]
//!     → response.rs (status/state, headers, body)
//!     → transport sends it
//! ```

pub mod request;
pub mod response;

pub use request::{Request, ServerRequest};
pub use response::Response;
