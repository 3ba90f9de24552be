use log::{debug, error};

use crate::backend::{Backend, ShaderStage};
use crate::error::Error;

use super::shader::Sources;

/// Compiles `source` as a `stage` shader.
///
/// On failure the driver's info log is logged, the shader object is deleted
/// and the log comes back inside `Error::Compile`.
pub fn create_shader<B: Backend>(
    gl: &B,
    stage: ShaderStage,
    source: &str,
) -> Result<B::Shader, Error> {
    let shader = gl.create_shader(stage)?;
    gl.shader_source(&shader, source)?;
    gl.compile_shader(&shader)?;
    if gl.compile_status(&shader)? {
        debug!("compiled {} shader", stage);
        return Ok(shader);
    }

    let log = gl.shader_info_log(&shader)?;
    error!("{}", log);
    gl.delete_shader(shader)?;
    Err(Error::Compile { stage, log })
}

/// Links a vertex and a fragment shader into a program.
pub fn create_program<B: Backend>(
    gl: &B,
    vertex: &B::Shader,
    fragment: &B::Shader,
) -> Result<B::Program, Error> {
    let program = gl.create_program()?;
    gl.attach_shader(&program, vertex)?;
    gl.attach_shader(&program, fragment)?;
    gl.link_program(&program)?;
    if gl.link_status(&program)? {
        debug!("linked program");
        return Ok(program);
    }

    let log = gl.program_info_log(&program)?;
    error!("{}", log);
    gl.delete_program(program)?;
    Err(Error::Link { log })
}

/// Compiles both stages of `sources` and links them.
pub fn build<B: Backend>(gl: &B, sources: &Sources<'_>) -> Result<B::Program, Error> {
    let vertex = create_shader(gl, ShaderStage::Vertex, sources.vertex)?;
    let fragment = create_shader(gl, ShaderStage::Fragment, sources.fragment)?;
    create_program(gl, &vertex, &fragment)
}
