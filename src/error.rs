use std::fmt;

use crate::backend::ShaderStage;
use crate::config::Variant;

/// Everything that can stop the triangle from reaching the screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// No global `window` object (not running inside a page).
    NoWindow,
    /// No element with the given id, or it is not a canvas.
    NoCanvas(String),
    /// The host cannot hand out a WebGL context.
    Unsupported,
    /// Shader compilation failed; `log` is the driver's info log.
    Compile { stage: ShaderStage, log: String },
    /// Program linking failed; `log` is the driver's info log.
    Link { log: String },
    /// `create*` returned null.
    Allocation(&'static str),
    /// The host threw while we were calling into it.
    Host(String),
    UnknownVariant(String),
    VariantDisabled(Variant),
    UnknownLevel(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoWindow => write!(f, "no global window"),
            Error::NoCanvas(id) => write!(f, "no canvas element with id `{}`", id),
            Error::Unsupported => write!(f, "Could not create WebGL context.  Seems unsupported."),
            Error::Compile { stage, log } => {
                write!(f, "failed to compile {} shader: {}", stage, log.trim_end())
            }
            Error::Link { log } => write!(f, "failed to link program: {}", log.trim_end()),
            Error::Allocation(kind) => write!(f, "could not create {}", kind),
            Error::Host(msg) => write!(f, "host error: {}", msg),
            Error::UnknownVariant(name) => write!(
                f,
                "unknown variant `{}` (expected dynamic, cached, typed or glow)",
                name
            ),
            Error::VariantDisabled(variant) => {
                write!(f, "variant `{}` was not compiled in", variant)
            }
            Error::UnknownLevel(name) => write!(f, "unknown log level `{}`", name),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// A page without the default canvas is not an error for `start`;
    /// it may only call `draw` with its own ids.
    pub fn skips_start(&self) -> bool {
        matches!(self, Error::NoCanvas(_))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for Error {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Error::Host(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<Error> for wasm_bindgen::JsValue {
    fn from(err: Error) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_a_missing_canvas_skips_start() {
        assert!(Error::NoCanvas("mycanvas".to_owned()).skips_start());
        assert!(!Error::NoWindow.skips_start());
        assert!(!Error::Unsupported.skips_start());
        assert!(!Error::UnknownVariant("webgpu".to_owned()).skips_start());
        assert!(!Error::Link { log: String::new() }.skips_start());
    }
}
