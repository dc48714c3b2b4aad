//! System-level modules
//!
//! - Logging initialization
//! - Graceful shutdown (signal handling, pipeline drain, storage close)

pub mod logging;
pub mod shutdown;

pub use logging::init_logging;
pub use shutdown::{listen_for_shutdown, shutdown};
