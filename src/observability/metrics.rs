//! Dispatch metrics.
//!
//! # Metrics
//! - `router_dispatch_total` (counter): completed dispatches by outcome
//!   (`ok`, `redirect`, `error`)
//! - `router_redirects_total` (counter): redirects issued by kind
//! - `router_skipped_candidates_total` (counter): actions skipped
//! - `router_error_handlers_total` (counter): handler invocations by error
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels are bounded: outcomes, redirect codes and state names

use crate::routing::RedirectKind;

pub fn record_dispatch(outcome: &'static str) {
    ::metrics::counter!("router_dispatch_total", "outcome" => outcome).increment(1);
}

pub fn record_redirect(kind: RedirectKind) {
    ::metrics::counter!("router_redirects_total", "kind" => kind.code().to_string()).increment(1);
}

pub fn record_skipped() {
    ::metrics::counter!("router_skipped_candidates_total").increment(1);
}

pub fn record_error_handler(error: &str) {
    ::metrics::counter!("router_error_handlers_total", "error" => error.to_string()).increment(1);
}
