//! Service layer
//!
//! Business logic shared by every entry point (CLI, future handlers).

mod link_service;

pub use link_service::*;
