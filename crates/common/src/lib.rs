//! VisaHub Common Library
//!
//! Shared types, error taxonomy, and document-store access for the VisaHub
//! backend.

pub mod db;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use db::Database;
pub use error::{Error, Result};
pub use types::*;

/// VisaHub version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
