use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;
use crate::errors::Result;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .load_full()
}

/// Like [`get_config`], but returns `None` before initialization
pub fn try_get_config() -> Option<Arc<StaticConfig>> {
    CONFIG.get().map(|c| c.load_full())
}

/// Initialize the global configuration
///
/// Loads configuration from "config.toml" in the current directory.
/// If the file doesn't exist, uses in-memory defaults.
///
/// # Examples
/// ```no_run
/// use linkvault::config::init_config;
/// init_config().expect("invalid configuration");
/// ```
pub fn init_config() -> Result<()> {
    if CONFIG.get().is_none() {
        let loaded = StaticConfig::load(None)?;
        CONFIG.get_or_init(|| ArcSwap::from_pointee(loaded));
    }
    Ok(())
}

/// Initialize the global configuration from an explicit file path
///
/// A later call replaces the stored configuration; on error the
/// previous configuration stays in place.
pub fn init_config_from(path: Option<&str>) -> Result<()> {
    let loaded = StaticConfig::load(path)?;
    match CONFIG.get() {
        Some(current) => current.store(Arc::new(loaded)),
        None => {
            CONFIG.get_or_init(|| ArcSwap::from_pointee(loaded));
        }
    }
    Ok(())
}
