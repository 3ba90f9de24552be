//! Browser host. The canvas is always found through `web-sys`; the variants
//! only differ in how they drive the WebGL context.

use std::marker::PhantomData;

use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

use crate::backend::{Backend, Surface};
use crate::config::{Config, Variant};
use crate::error::Error;
use crate::renderer::{self, Extent, Sources};

#[cfg(feature = "cached")]
pub mod cached;
#[cfg(feature = "dynamic")]
pub mod dynamic;
#[cfg(feature = "glow")]
pub mod glow_context;
#[cfg(any(feature = "dynamic", feature = "cached"))]
mod reflect;
#[cfg(feature = "typed")]
pub mod typed;

/// A WebGL access path that can be built from a canvas.
pub trait WebContext: Backend + Sized {
    /// `Ok(None)` when the browser has no WebGL.
    fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Option<Self>, Error>;
}

/// The page's `<canvas>`, paired with the access path to use on it.
pub struct CanvasSurface<C> {
    canvas: HtmlCanvasElement,
    _context: PhantomData<C>,
}

impl<C: WebContext> CanvasSurface<C> {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        CanvasSurface {
            canvas,
            _context: PhantomData,
        }
    }
}

impl<C: WebContext> Surface for CanvasSurface<C> {
    type Context = C;

    fn client_size(&self) -> Result<(u32, u32), Error> {
        Ok((
            self.canvas.client_width().max(0) as u32,
            self.canvas.client_height().max(0) as u32,
        ))
    }

    fn set_size(&self, width: u32, height: u32) -> Result<(), Error> {
        self.canvas.set_attribute("width", &width.to_string())?;
        self.canvas.set_attribute("height", &height.to_string())?;
        Ok(())
    }

    fn context(&self) -> Result<Option<C>, Error> {
        C::from_canvas(&self.canvas)
    }
}

/// Looks up the canvas element by id.
pub fn find_canvas(id: &str) -> Result<HtmlCanvasElement, Error> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or(Error::NoWindow)?;
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        .ok_or_else(|| Error::NoCanvas(id.to_owned()))
}

/// Reads `data-variant` and `data-log` off the canvas into `config`.
pub fn page_config(config: Config) -> Result<Config, Error> {
    let canvas = find_canvas(&config.canvas_id)?;
    let variant = canvas.get_attribute("data-variant");
    let level = canvas.get_attribute("data-log");
    config.with_overrides(variant.as_deref(), level.as_deref())
}

fn draw_with<C: WebContext>(canvas: HtmlCanvasElement) -> Result<Extent, Error> {
    renderer::run(&CanvasSurface::<C>::new(canvas), &Sources::default())
}

/// Draws the triangle into `canvas_id` through `variant`.
pub fn draw(canvas_id: &str, variant: Variant) -> Result<Extent, Error> {
    let canvas = find_canvas(canvas_id)?;
    log::info!("drawing into #{} with the {} variant", canvas_id, variant);
    match variant {
        #[cfg(feature = "dynamic")]
        Variant::Dynamic => draw_with::<dynamic::DynamicContext>(canvas),
        #[cfg(feature = "cached")]
        Variant::Cached => draw_with::<cached::CachedContext>(canvas),
        #[cfg(feature = "typed")]
        Variant::Typed => draw_with::<typed::TypedContext>(canvas),
        #[cfg(feature = "glow")]
        Variant::Glow => draw_with::<glow_context::GlowContext>(canvas),
        #[allow(unreachable_patterns)]
        disabled => Err(Error::VariantDisabled(disabled)),
    }
}
