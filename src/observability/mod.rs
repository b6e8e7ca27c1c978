//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routing produces:
//!     → logging.rs (structured log events, one `dispatch` span per run)
//!     → metrics.rs (dispatch, redirect, skip and handler counters)
//!
//! Consumers:
//!     → Log output (stdout via tracing-subscriber)
//!     → Whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Every dispatch carries a UUID v4 id on its span
//! - Metrics go through the `metrics` facade; no exporter is installed here
//! - Metrics are cheap (no-ops without a recorder)

pub mod logging;
pub mod metrics;
