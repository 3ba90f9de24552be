use wasm_bindgen::JsValue;
use web_sys::HtmlCanvasElement;

use super::reflect::{call, create, float32_array, webgl_context};
use super::WebContext;
use crate::backend::{gl, Backend, ShaderStage};
use crate::error::Error;

/// Every call is looked up by name on the context; enum values are the
/// hard-coded numbers from `backend::gl`.
pub struct DynamicContext {
    gl: JsValue,
}

impl DynamicContext {
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

impl WebContext for DynamicContext {
    fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Option<Self>, Error> {
        let canvas: &JsValue = canvas.as_ref();
        Ok(webgl_context(canvas)?.map(|gl| DynamicContext { gl }))
    }
}

impl Backend for DynamicContext {
    type Shader = JsValue;
    type Program = JsValue;
    type Buffer = JsValue;

    fn create_shader(&self, stage: ShaderStage) -> Result<JsValue, Error> {
        create(&self.gl, "createShader", &[num(stage.gl_enum())], "shader")
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
            &[shader.clone(), num(gl::COMPILE_STATUS)],
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
            &[program.clone(), num(gl::LINK_STATUS)],
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
        self.run("bindBuffer", &[num(gl::ARRAY_BUFFER), buffer.clone()])
    }

    fn array_buffer_data(&self, data: &[f32]) -> Result<(), Error> {
        self.run(
            "bufferData",
            &[num(gl::ARRAY_BUFFER), float32_array(data), num(gl::STATIC_DRAW)],
        )
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) -> Result<(), Error> {
        self.run("viewport", &[num(x), num(y), num(width), num(height)])
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) -> Result<(), Error> {
        self.run("clearColor", &[num(r), num(g), num(b), num(a)])
    }

    fn clear_color_buffer(&self) -> Result<(), Error> {
        self.run("clear", &[num(gl::COLOR_BUFFER_BIT)])
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
                num(gl::FLOAT),
                JsValue::from_bool(normalized),
                num(stride),
                num(offset),
            ],
        )
    }

    fn draw_triangles(&self, first: i32, count: i32) -> Result<(), Error> {
        self.run("drawArrays", &[num(gl::TRIANGLES), num(first), num(count)])
    }
}
