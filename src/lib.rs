//! linkvault - storage and durability core of a URL shortener
//!
//! Short IDs are derived from the original URL, records live either in an
//! in-memory store backed by an append-only event log or in a relational
//! database, and deletions are applied asynchronously by a background
//! pipeline.
//!
//! # Architecture
//! - `storage`: `Repository` trait, in-memory store + event log, SeaORM store, factory
//! - `deletion`: asynchronous deletion pipeline
//! - `services`: shorten / resolve / list / delete glue
//! - `config`: layered static configuration
//! - `runtime`: startup wiring and CLI command execution
//! - `system`: logging and graceful shutdown

pub mod cli;
pub mod config;
pub mod deletion;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
