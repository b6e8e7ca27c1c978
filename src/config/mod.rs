//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Router::from_config (registration, conflict checks)
//!     → immutable Router, shared via Arc
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads and builds a new Router
//!     → RouterHandle swaps it in atomically
//!     → in-flight dispatches finish on the old snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A reload that fails to load or register keeps the current router

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_router, ConfigError};
pub use schema::{ObservabilityConfig, RouterConfig, RoutingConfig};
pub use watcher::{ConfigWatcher, RouterHandle};
