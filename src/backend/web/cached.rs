use wasm_bindgen::JsValue;
use web_sys::HtmlCanvasElement;

use super::reflect::{call, create, float32_array, get, webgl_context};
use super::WebContext;
use crate::backend::{Backend, ShaderStage};
use crate::error::Error;

/// Enum values read once off the context object.
#[derive(Debug, Clone, Copy)]
struct Constants {
    array_buffer: u32,
    color_buffer_bit: u32,
    compile_status: u32,
    float: u32,
    fragment_shader: u32,
    link_status: u32,
    static_draw: u32,
    triangles: u32,
    vertex_shader: u32,
}

impl Constants {
    fn lookup(gl: &JsValue) -> Result<Self, Error> {
        let constant = |name: &str| -> Result<u32, Error> {
            get(gl, name)?
                .as_f64()
                .map(|v| v as u32)
                .ok_or_else(|| Error::Host(format!("context has no `{}` constant", name)))
        };
        Ok(Constants {
            array_buffer: constant("ARRAY_BUFFER")?,
            color_buffer_bit: constant("COLOR_BUFFER_BIT")?,
            compile_status: constant("COMPILE_STATUS")?,
            float: constant("FLOAT")?,
            fragment_shader: constant("FRAGMENT_SHADER")?,
            link_status: constant("LINK_STATUS")?,
            static_draw: constant("STATIC_DRAW")?,
            triangles: constant("TRIANGLES")?,
            vertex_shader: constant("VERTEX_SHADER")?,
        })
    }
}

/// Calls by name like `DynamicContext`, but with enum values taken from the
/// context instead of baked in.
pub struct CachedContext {
    gl: JsValue,
    consts: Constants,
}

impl CachedContext {
    fn call(&self, method: &str, args: &[JsValue]) -> Result<JsValue, Error> {
        call(&self.gl, method, args)
    }

    fn run(&self, method: &str, args: &[JsValue]) -> Result<(), Error> {
        self.call(method, args).map(|_| ())
    }
}

fn num(value: impl Into<f64>) -> JsValue {
    JsValue::from_f64(value.into())
}

impl WebContext for CachedContext {
    fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Option<Self>, Error> {
        let canvas: &JsValue = canvas.as_ref();
        let gl = match webgl_context(canvas)? {
            Some(gl) => gl,
            None => return Ok(None),
        };
        let consts = Constants::lookup(&gl)?;
        log::debug!("cached WebGL constants: {:?}", consts);
        Ok(Some(CachedContext { gl, consts }))
    }
}

impl Backend for CachedContext {
    type Shader = JsValue;
    type Program = JsValue;
    type Buffer = JsValue;

    fn create_shader(&self, stage: ShaderStage) -> Result<JsValue, Error> {
        let kind = match stage {
            ShaderStage::Vertex => self.consts.vertex_shader,
            ShaderStage::Fragment => self.consts.fragment_shader,
        };
        create(&self.gl, "createShader", &[num(kind)], "shader")
    }

    fn shader_source(&self, shader: &JsValue, source: &str) -> Result<(), Error> {
        self.run("shaderSource", &[shader.clone(), JsValue::from_str(source)])
    }

    fn compile_shader(&self, shader: &JsValue) -> Result<(), Error> {
        self.run("compileShader", &[shader.clone()])
    }

    fn compile_status(&self, shader: &JsValue) -> Result<bool, Error> {
        let status = self.call(
            "getShaderParameter",
            &[shader.clone(), num(self.consts.compile_status)],
        )?;
        Ok(status.is_truthy())
    }

    fn shader_info_log(&self, shader: &JsValue) -> Result<String, Error> {
        Ok(self
            .call("getShaderInfoLog", &[shader.clone()])?
            .as_string()
            .unwrap_or_default())
    }

    fn delete_shader(&self, shader: JsValue) -> Result<(), Error> {
        self.run("deleteShader", &[shader])
    }

    fn create_program(&self) -> Result<JsValue, Error> {
        create(&self.gl, "createProgram", &[], "program")
    }

    fn attach_shader(&self, program: &JsValue, shader: &JsValue) -> Result<(), Error> {
        self.run("attachShader", &[program.clone(), shader.clone()])
    }

    fn link_program(&self, program: &JsValue) -> Result<(), Error> {
        self.run("linkProgram", &[program.clone()])
    }

    fn link_status(&self, program: &JsValue) -> Result<bool, Error> {
        let status = self.call(
            "getProgramParameter",
            &[program.clone(), num(self.consts.link_status)],
        )?;
        Ok(status.is_truthy())
    }

    fn program_info_log(&self, program: &JsValue) -> Result<String, Error> {
        Ok(self
            .call("getProgramInfoLog", &[program.clone()])?
            .as_string()
            .unwrap_or_default())
    }

    fn delete_program(&self, program: JsValue) -> Result<(), Error> {
        self.run("deleteProgram", &[program])
    }

    fn use_program(&self, program: &JsValue) -> Result<(), Error> {
        self.run("useProgram", &[program.clone()])
    }

    fn attrib_location(&self, program: &JsValue, name: &str) -> Result<Option<u32>, Error> {
        let loc = self
            .call("getAttribLocation", &[program.clone(), JsValue::from_str(name)])?
            .as_f64()
            .unwrap_or(-1.0);
        Ok(if loc < 0.0 { None } else { Some(loc as u32) })
    }

    fn create_buffer(&self) -> Result<JsValue, Error> {
        create(&self.gl, "createBuffer", &[], "buffer")
    }

    fn bind_array_buffer(&self, buffer: &JsValue) -> Result<(), Error> {
        self.run("bindBuffer", &[num(self.consts.array_buffer), buffer.clone()])
    }

    fn array_buffer_data(&self, data: &[f32]) -> Result<(), Error> {
        self.run(
            "bufferData",
            &[num(self.consts.array_buffer), float32_array(data), num(self.consts.static_draw)],
        )
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) -> Result<(), Error> {
        self.run("viewport", &[num(x), num(y), num(width), num(height)])
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) -> Result<(), Error> {
        self.run("clearColor", &[num(r), num(g), num(b), num(a)])
    }

    fn clear_color_buffer(&self) -> Result<(), Error> {
        self.run("clear", &[num(self.consts.color_buffer_bit)])
    }

    fn enable_vertex_attrib_array(&self, index: u32) -> Result<(), Error> {
        self.run("enableVertexAttribArray", &[num(index)])
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) -> Result<(), Error> {
        self.run(
            "vertexAttribPointer",
            &[
                num(index),
                num(size),
                num(self.consts.float),
                JsValue::from_bool(normalized),
                num(stride),
                num(offset),
            ],
        )
    }

    fn draw_triangles(&self, first: i32, count: i32) -> Result<(), Error> {
        self.run("drawArrays", &[num(self.consts.triangles), num(first), num(count)])
    }
}
