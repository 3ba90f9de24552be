use ::glow::HasContext;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, WebGlRenderingContext};

use super::WebContext;
use crate::backend::{Backend, ShaderStage};
use crate::error::Error;

type Gl = ::glow::Context;

/// `glow` bindings over the WebGL 1 context.
///
/// glow marks every call `unsafe` since on native targets they need a current
/// context. On the web the context is owned by this value, so the calls are
/// sound as long as `gl` is alive.
pub struct GlowContext {
    gl: Gl,
}

impl WebContext for GlowContext {
    fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Option<Self>, Error> {
        let webgl = match canvas.get_context("webgl")? {
            Some(ctx) => ctx.dyn_into::<WebGlRenderingContext>().map_err(|_| {
                Error::Host("`webgl` context is not a WebGLRenderingContext".to_owned())
            })?,
            None => return Ok(None),
        };
        Ok(Some(GlowContext {
            gl: Gl::from_webgl1_context(webgl),
        }))
    }
}

impl Backend for GlowContext {
    type Shader = <Gl as HasContext>::Shader;
    type Program = <Gl as HasContext>::Program;
    type Buffer = <Gl as HasContext>::Buffer;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, Error> {
        unsafe { self.gl.create_shader(stage.gl_enum()) }.map_err(|_| Error::Allocation("shader"))
    }

    fn shader_source(&self, shader: &Self::Shader, source: &str) -> Result<(), Error> {
        unsafe { self.gl.shader_source(*shader, source) };
        Ok(())
    }

    fn compile_shader(&self, shader: &Self::Shader) -> Result<(), Error> {
        unsafe { self.gl.compile_shader(*shader) };
        Ok(())
    }

    fn compile_status(&self, shader: &Self::Shader) -> Result<bool, Error> {
        Ok(unsafe { self.gl.get_shader_compile_status(*shader) })
    }

    fn shader_info_log(&self, shader: &Self::Shader) -> Result<String, Error> {
        Ok(unsafe { self.gl.get_shader_info_log(*shader) })
    }

    fn delete_shader(&self, shader: Self::Shader) -> Result<(), Error> {
        unsafe { self.gl.delete_shader(shader) };
        Ok(())
    }

    fn create_program(&self) -> Result<Self::Program, Error> {
        unsafe { self.gl.create_program() }.map_err(|_| Error::Allocation("program"))
    }

    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader) -> Result<(), Error> {
        unsafe { self.gl.attach_shader(*program, *shader) };
        Ok(())
    }

    fn link_program(&self, program: &Self::Program) -> Result<(), Error> {
        unsafe { self.gl.link_program(*program) };
        Ok(())
    }

    fn link_status(&self, program: &Self::Program) -> Result<bool, Error> {
        Ok(unsafe { self.gl.get_program_link_status(*program) })
    }

    fn program_info_log(&self, program: &Self::Program) -> Result<String, Error> {
        Ok(unsafe { self.gl.get_program_info_log(*program) })
    }

    fn delete_program(&self, program: Self::Program) -> Result<(), Error> {
        unsafe { self.gl.delete_program(program) };
        Ok(())
    }

    fn use_program(&self, program: &Self::Program) -> Result<(), Error> {
        unsafe { self.gl.use_program(Some(*program)) };
        Ok(())
    }

    fn attrib_location(&self, program: &Self::Program, name: &str) -> Result<Option<u32>, Error> {
        Ok(unsafe { self.gl.get_attrib_location(*program, name) })
    }

    fn create_buffer(&self) -> Result<Self::Buffer, Error> {
        unsafe { self.gl.create_buffer() }.map_err(|_| Error::Allocation("buffer"))
    }

    fn bind_array_buffer(&self, buffer: &Self::Buffer) -> Result<(), Error> {
        unsafe { self.gl.bind_buffer(::glow::ARRAY_BUFFER, Some(*buffer)) };
        Ok(())
    }

    fn array_buffer_data(&self, data: &[f32]) -> Result<(), Error> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        unsafe {
            self.gl
                .buffer_data_u8_slice(::glow::ARRAY_BUFFER, bytes, ::glow::STATIC_DRAW)
        };
        Ok(())
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) -> Result<(), Error> {
        unsafe { self.gl.viewport(x, y, width, height) };
        Ok(())
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) -> Result<(), Error> {
        unsafe { self.gl.clear_color(r, g, b, a) };
        Ok(())
    }

    fn clear_color_buffer(&self) -> Result<(), Error> {
        unsafe { self.gl.clear(::glow::COLOR_BUFFER_BIT) };
        Ok(())
    }

    fn enable_vertex_attrib_array(&self, index: u32) -> Result<(), Error> {
        unsafe { self.gl.enable_vertex_attrib_array(index) };
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
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, ::glow::FLOAT, normalized, stride, offset)
        };
        Ok(())
    }

    fn draw_triangles(&self, first: i32, count: i32) -> Result<(), Error> {
        unsafe { self.gl.draw_arrays(::glow::TRIANGLES, first, count) };
        Ok(())
    }
}
