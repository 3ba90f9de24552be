use js_sys::Float32Array;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGlBuffer, WebGlProgram, WebGlRenderingContext as Gl, WebGlShader,
};

use super::WebContext;
use crate::backend::{Backend, ShaderStage};
use crate::error::Error;

/// `web-sys` bindings: every call is a typed method on the context.
pub struct TypedContext {
    gl: Gl,
}

impl WebContext for TypedContext {
    fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Option<Self>, Error> {
        let gl = match canvas.get_context("webgl")? {
            Some(ctx) => ctx.dyn_into::<Gl>().map_err(|_| {
                Error::Host("`webgl` context is not a WebGLRenderingContext".to_owned())
            })?,
            None => return Ok(None),
        };
        Ok(Some(TypedContext { gl }))
    }
}

impl Backend for TypedContext {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;

    fn create_shader(&self, stage: ShaderStage) -> Result<WebGlShader, Error> {
        self.gl
            .create_shader(stage.gl_enum())
            .ok_or(Error::Allocation("shader"))
    }

    fn shader_source(&self, shader: &WebGlShader, source: &str) -> Result<(), Error> {
        self.gl.shader_source(shader, source);
        Ok(())
    }

    fn compile_shader(&self, shader: &WebGlShader) -> Result<(), Error> {
        self.gl.compile_shader(shader);
        Ok(())
    }

    fn compile_status(&self, shader: &WebGlShader) -> Result<bool, Error> {
        Ok(self
            .gl
            .get_shader_parameter(shader, Gl::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false))
    }

    fn shader_info_log(&self, shader: &WebGlShader) -> Result<String, Error> {
        Ok(self.gl.get_shader_info_log(shader).unwrap_or_default())
    }

    fn delete_shader(&self, shader: WebGlShader) -> Result<(), Error> {
        self.gl.delete_shader(Some(&shader));
        Ok(())
    }

    fn create_program(&self) -> Result<WebGlProgram, Error> {
        self.gl.create_program().ok_or(Error::Allocation("program"))
    }

    fn attach_shader(&self, program: &WebGlProgram, shader: &WebGlShader) -> Result<(), Error> {
        self.gl.attach_shader(program, shader);
        Ok(())
    }

    fn link_program(&self, program: &WebGlProgram) -> Result<(), Error> {
        self.gl.link_program(program);
        Ok(())
    }

    fn link_status(&self, program: &WebGlProgram) -> Result<bool, Error> {
        Ok(self
            .gl
            .get_program_parameter(program, Gl::LINK_STATUS)
            .as_bool()
            .unwrap_or(false))
    }

    fn program_info_log(&self, program: &WebGlProgram) -> Result<String, Error> {
        Ok(self.gl.get_program_info_log(program).unwrap_or_default())
    }

    fn delete_program(&self, program: WebGlProgram) -> Result<(), Error> {
        self.gl.delete_program(Some(&program));
        Ok(())
    }

    fn use_program(&self, program: &WebGlProgram) -> Result<(), Error> {
        self.gl.use_program(Some(program));
        Ok(())
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> Result<Option<u32>, Error> {
        let loc = self.gl.get_attrib_location(program, name);
        Ok(if loc < 0 { None } else { Some(loc as u32) })
    }

    fn create_buffer(&self) -> Result<WebGlBuffer, Error> {
        self.gl.create_buffer().ok_or(Error::Allocation("buffer"))
    }

    fn bind_array_buffer(&self, buffer: &WebGlBuffer) -> Result<(), Error> {
        self.gl.bind_buffer(Gl::ARRAY_BUFFER, Some(buffer));
        Ok(())
    }

    fn array_buffer_data(&self, data: &[f32]) -> Result<(), Error> {
        let array = Float32Array::from(data);
        self.gl
            .buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &array, Gl::STATIC_DRAW);
        Ok(())
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) -> Result<(), Error> {
        self.gl.viewport(x, y, width, height);
        Ok(())
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) -> Result<(), Error> {
        self.gl.clear_color(r, g, b, a);
        Ok(())
    }

    fn clear_color_buffer(&self) -> Result<(), Error> {
        self.gl.clear(Gl::COLOR_BUFFER_BIT);
        Ok(())
    }

    fn enable_vertex_attrib_array(&self, index: u32) -> Result<(), Error> {
        self.gl.enable_vertex_attrib_array(index);
        Ok(())
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) -> Result<(), Error> {
        self.gl
            .vertex_attrib_pointer_with_i32(index, size, Gl::FLOAT, normalized, stride, offset);
        Ok(())
    }

    fn draw_triangles(&self, first: i32, count: i32) -> Result<(), Error> {
        self.gl.draw_arrays(Gl::TRIANGLES, first, count);
        Ok(())
    }
}
