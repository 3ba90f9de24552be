//! The seam between the renderer and whatever host rasterizes for it.
//!
//! `Backend` is the slice of WebGL 1 the triangle needs. Each web variant
//! implements it over a different access path; `soft` implements it in plain
//! Rust so the renderer can run headless.

use std::fmt;

use crate::error::Error;

pub mod soft;
#[cfg(target_arch = "wasm32")]
pub mod web;

/// WebGL 1 enum values, as listed on MDN.
pub mod gl {
    pub const ARRAY_BUFFER: u32 = 0x8892;
    pub const COLOR_BUFFER_BIT: u32 = 0x0000_4000;
    pub const COMPILE_STATUS: u32 = 0x8B81;
    pub const FLOAT: u32 = 0x1406;
    pub const FRAGMENT_SHADER: u32 = 0x8B30;
    pub const LINK_STATUS: u32 = 0x8B82;
    pub const STATIC_DRAW: u32 = 0x88E4;
    pub const TRIANGLES: u32 = 0x0004;
    pub const VERTEX_SHADER: u32 = 0x8B31;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// A WebGL 1 rendering context, reduced to the calls the triangle makes.
///
/// Calls take `&self` like the JS API does. They return `Result` because the
/// dynamic variants go through reflection and the host may throw.
pub trait Backend {
    type Shader;
    type Program;
    type Buffer;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, Error>;
    fn shader_source(&self, shader: &Self::Shader, source: &str) -> Result<(), Error>;
    fn compile_shader(&self, shader: &Self::Shader) -> Result<(), Error>;
    /// `getShaderParameter(shader, COMPILE_STATUS)`.
    fn compile_status(&self, shader: &Self::Shader) -> Result<bool, Error>;
    fn shader_info_log(&self, shader: &Self::Shader) -> Result<String, Error>;
    fn delete_shader(&self, shader: Self::Shader) -> Result<(), Error>;

    fn create_program(&self) -> Result<Self::Program, Error>;
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader) -> Result<(), Error>;
    fn link_program(&self, program: &Self::Program) -> Result<(), Error>;
    /// `getProgramParameter(program, LINK_STATUS)`.
    fn link_status(&self, program: &Self::Program) -> Result<bool, Error>;
    fn program_info_log(&self, program: &Self::Program) -> Result<String, Error>;
    fn delete_program(&self, program: Self::Program) -> Result<(), Error>;
    fn use_program(&self, program: &Self::Program) -> Result<(), Error>;
    /// `getAttribLocation`; `None` stands for `-1`.
    fn attrib_location(&self, program: &Self::Program, name: &str) -> Result<Option<u32>, Error>;

    fn create_buffer(&self) -> Result<Self::Buffer, Error>;
    /// Binds to `ARRAY_BUFFER`.
    fn bind_array_buffer(&self, buffer: &Self::Buffer) -> Result<(), Error>;
    /// `bufferData(ARRAY_BUFFER, data, STATIC_DRAW)`.
    fn array_buffer_data(&self, data: &[f32]) -> Result<(), Error>;

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) -> Result<(), Error>;
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) -> Result<(), Error>;
    /// `clear(COLOR_BUFFER_BIT)`.
    fn clear_color_buffer(&self) -> Result<(), Error>;

    fn enable_vertex_attrib_array(&self, index: u32) -> Result<(), Error>;
    /// `vertexAttribPointer(index, size, FLOAT, normalized, stride, offset)`.
    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) -> Result<(), Error>;
    /// `drawArrays(TRIANGLES, first, count)`.
    fn draw_triangles(&self, first: i32, count: i32) -> Result<(), Error>;
}

/// A drawing element that can hand out a context.
pub trait Surface {
    type Context: Backend;

    /// `clientWidth` and `clientHeight`.
    fn client_size(&self) -> Result<(u32, u32), Error>;
    /// Writes the `width` and `height` attributes.
    fn set_size(&self, width: u32, height: u32) -> Result<(), Error>;
    /// `getContext("webgl")`; `Ok(None)` when the host has no WebGL.
    fn context(&self) -> Result<Option<Self::Context>, Error>;
}
