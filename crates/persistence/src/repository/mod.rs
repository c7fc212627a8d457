//! Repository implementations for database operations

pub mod analytics;
pub mod dataset;

pub use analytics::*;
pub use dataset::*;
