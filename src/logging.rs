//! Logger setup.
//!
//! Everything else in the crate only talks to the `log` facade. The backend
//! is the browser console on wasm32 and `env_logger` on native builds.

use std::sync::Once;

use log::LevelFilter;

static INIT: Once = Once::new();

/// Installs the global logger once; later calls are ignored.
pub fn init_logging(level: LevelFilter) {
    INIT.call_once(|| {
        install(level);
        log::debug!("logging initialized at {}", level);
    });
}

#[cfg(target_arch = "wasm32")]
fn install(level: LevelFilter) {
    console_error_panic_hook::set_once();
    if let Some(level) = level.to_level() {
        // Only fails if another logger got there first.
        let _ = console_log::init_with_level(level);
    }
}

#[cfg(all(not(target_arch = "wasm32"), feature = "cli"))]
fn install(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    } else {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}

#[cfg(all(not(target_arch = "wasm32"), not(feature = "cli")))]
fn install(_level: LevelFilter) {}
