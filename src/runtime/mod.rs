//! Application lifecycle
//!
//! - `startup`: storage + deletion pipeline + service wiring
//! - `commands`: execution of parsed CLI commands

pub mod commands;
pub mod startup;

pub use commands::run_command;
pub use startup::{StartupContext, prepare_startup};
