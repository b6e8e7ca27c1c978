//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     link / redirect / handle (or RoutingConfig)
//!     → pattern.rs (template → anchored regex + parameter names)
//!     → table.rs / redirect.rs / handler.rs (conflict checks)
//!     → Freeze as immutable Router
//!
//! Incoming Request:
//!     → dispatch.rs: redirect phase (redirect.rs, token.rs)
//!     → match phase (table.rs, first match wins)
//!     → action invocation (crate::action)
//!     → error phase (handler.rs, longest base URL wins)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Tables are built once and never mutated; hot reload swaps whole routers
//! - Deterministic: registration order decides, no specificity scoring
//! - Registration errors are fatal, request-time problems only skip candidates

pub mod dispatch;
pub mod handler;
pub mod pattern;
pub mod redirect;
pub mod router;
pub mod table;
pub mod token;

use indexmap::IndexMap;

/// Named parameters in insertion order.
pub type Params = IndexMap<String, String>;

pub use dispatch::{DispatchState, Probe};
pub use pattern::CompiledPattern;
pub use redirect::RedirectKind;
pub use router::{Router, RouterBuilder};
