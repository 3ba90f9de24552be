//! Draws a single reddish-purple triangle into a `<canvas>` through WebGL 1.
//!
//! The drawing logic lives once in [`renderer`], generic over the
//! [`backend::Backend`] trait. On wasm32 there are four implementations of
//! that trait, one per cargo feature, differing only in how they reach the
//! WebGL API:
//!
//! - `dynamic`: method calls by name, enum values hard-coded
//! - `cached`: method calls by name, enum values read off the context once
//! - `typed`: `web-sys` bindings
//! - `glow`: `glow` bindings
//!
//! [`backend::soft`] renders the same calls on the CPU so the whole program
//! can run (and be tested) without a browser.

pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod renderer;

pub use config::{Config, Variant};
pub use error::Error;
pub use renderer::{run, Extent, Renderer, Sources};

#[cfg(target_arch = "wasm32")]
mod entry {
    use log::{error, info, LevelFilter};
    use wasm_bindgen::prelude::*;

    use crate::backend::web;
    use crate::config::{Config, Variant};
    use crate::error::Error;
    use crate::logging::init_logging;
    use crate::renderer::Extent;

    /// A missing WebGL is a clean exit; it has been logged already.
    fn finish(result: Result<Extent, Error>) -> Result<(), JsValue> {
        match result {
            Ok(_) | Err(Error::Unsupported) => Ok(()),
            Err(err) => {
                error!("{}", err);
                Err(err.into())
            }
        }
    }

    /// Runs on module instantiation against `#mycanvas`.
    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        let config = match web::page_config(Config::default()) {
            Ok(config) => config,
            Err(err) if err.skips_start() => {
                init_logging(LevelFilter::Info);
                info!("{}; nothing to draw on start", err);
                return Ok(());
            }
            Err(err) => {
                init_logging(LevelFilter::Info);
                error!("{}", err);
                return Err(err.into());
            }
        };
        init_logging(config.log_level);

        let variant = config
            .variant
            .ok_or_else(|| Error::Host("built without any variant feature".to_owned()))?;
        finish(web::draw(&config.canvas_id, variant))
    }

    /// Draws into `canvas_id` through the named variant. Lets a page put
    /// the variants side by side.
    #[wasm_bindgen]
    pub fn draw(canvas_id: &str, variant: &str) -> Result<(), JsValue> {
        init_logging(LevelFilter::Info);
        let variant: Variant = variant.parse()?;
        finish(web::draw(canvas_id, variant))
    }
}
