//! VisaHub HTTP service
//!
//! REST backend for visa listings and user visa applications. A subset
//! of the surface is gated behind a signed token carried in a cookie.

pub mod auth;
pub mod config;
pub mod server;

pub use auth::CurrentUser;
pub use config::ServerConfig;
pub use server::AppServer;
