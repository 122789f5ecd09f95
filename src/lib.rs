// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod analytics;
pub mod app_dirs;
pub mod comparator;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod passage;
pub mod runtime;
pub mod session;

pub use error::{KeystrideError, Result};
