// Re-export all types so callers can use `domain::types::*`.

pub use core::*;
pub use trust::*;
pub use config::*;

// Module declarations
mod core;
mod trust;
mod config;
