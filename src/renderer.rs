use log::{debug, error, info};

use crate::backend::{Backend, Surface};
use crate::error::Error;

pub mod pipeline;
pub mod shader;
pub mod vertex;

pub use shader::Sources;
use vertex::{COMPONENTS, TRIANGLE, VERTEX_COUNT};

/// Pixel size of the drawing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

/// Everything the single draw needs, created once.
pub struct Renderer<'a, B: Backend> {
    gl: &'a B,
    dims: Extent,
    program: B::Program,
    position: u32,
    position_buffer: B::Buffer,
}

impl<'a, B> Renderer<'a, B>
where
    B: Backend,
{
    /// Compiles and links `sources`, then uploads the triangle.
    pub fn new(gl: &'a B, dims: Extent, sources: &Sources<'_>) -> Result<Self, Error> {
        let program = pipeline::build(gl, sources)?;

        // Look up where the vertex data needs to go
        let position = gl
            .attrib_location(&program, shader::POSITION_ATTRIBUTE)?
            .ok_or_else(|| Error::Link {
                log: format!("attribute `{}` is not active", shader::POSITION_ATTRIBUTE),
            })?;

        let position_buffer = gl.create_buffer()?;
        gl.bind_array_buffer(&position_buffer)?;
        gl.array_buffer_data(&TRIANGLE)?;
        debug!("uploaded {} vertices", VERTEX_COUNT);

        Ok(Renderer {
            gl,
            dims,
            program,
            position,
            position_buffer,
        })
    }

    /// Clears the surface and issues the one draw call.
    pub fn render(&self) -> Result<(), Error> {
        let gl = self.gl;

        // Clip space to pixels
        gl.viewport(0, 0, self.dims.width as i32, self.dims.height as i32)?;

        gl.clear_color(0.0, 0.0, 0.0, 0.0)?;
        gl.clear_color_buffer()?;

        gl.use_program(&self.program)?;
        gl.enable_vertex_attrib_array(self.position)?;
        gl.bind_array_buffer(&self.position_buffer)?;

        // Tightly packed floats from the start of the buffer
        gl.vertex_attrib_pointer_f32(self.position, COMPONENTS, false, 0, 0)?;

        gl.draw_triangles(0, VERTEX_COUNT)?;
        info!(
            "drew {} vertices into {}x{}",
            VERTEX_COUNT, self.dims.width, self.dims.height
        );
        Ok(())
    }
}

/// Sizes `surface` to its client area, grabs a context and draws the triangle.
///
/// Returns the drawing buffer size. A host without WebGL yields
/// `Error::Unsupported` before anything is compiled or drawn.
pub fn run<S: Surface>(surface: &S, sources: &Sources<'_>) -> Result<Extent, Error> {
    let (width, height) = surface.client_size()?;
    surface.set_size(width, height)?;
    let dims = Extent { width, height };

    let gl = match surface.context()? {
        Some(gl) => gl,
        None => {
            error!("{}", Error::Unsupported);
            return Err(Error::Unsupported);
        }
    };

    let renderer = Renderer::new(&gl, dims, sources)?;
    renderer.render()?;
    Ok(dims)
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use super::*;
    use crate::backend::ShaderStage;

    /// Logs every call in order; handles are sequential ids.
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
        next: Cell<u32>,
        stages: RefCell<HashMap<u32, ShaderStage>>,
        failing: Option<ShaderStage>,
    }

    impl Recorder {
        fn failing(stage: ShaderStage) -> Self {
            Recorder {
                failing: Some(stage),
                ..Default::default()
            }
        }

        fn log(&self, call: String) -> Result<(), Error> {
            self.calls.borrow_mut().push(call);
            Ok(())
        }

        fn handle(&self) -> u32 {
            self.next.set(self.next.get() + 1);
            self.next.get()
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl Backend for Recorder {
        type Shader = u32;
        type Program = u32;
        type Buffer = u32;

        fn create_shader(&self, stage: ShaderStage) -> Result<u32, Error> {
            self.log(format!("createShader {}", stage))?;
            let id = self.handle();
            self.stages.borrow_mut().insert(id, stage);
            Ok(id)
        }

        fn shader_source(&self, shader: &u32, _source: &str) -> Result<(), Error> {
            self.log(format!("shaderSource {}", shader))
        }

        fn compile_shader(&self, shader: &u32) -> Result<(), Error> {
            self.log(format!("compileShader {}", shader))
        }

        fn compile_status(&self, shader: &u32) -> Result<bool, Error> {
            self.log(format!("compileStatus {}", shader))?;
            Ok(self.stages.borrow().get(shader).copied() != self.failing)
        }

        fn shader_info_log(&self, shader: &u32) -> Result<String, Error> {
            self.log(format!("shaderInfoLog {}", shader))?;
            Ok("ERROR: 0:1: 'x' : syntax error\n".to_owned())
        }

        fn delete_shader(&self, shader: u32) -> Result<(), Error> {
            self.log(format!("deleteShader {}", shader))
        }

        fn create_program(&self) -> Result<u32, Error> {
            self.log("createProgram".to_owned())?;
            Ok(self.handle())
        }

        fn attach_shader(&self, program: &u32, shader: &u32) -> Result<(), Error> {
            self.log(format!("attachShader {} {}", program, shader))
        }

        fn link_program(&self, program: &u32) -> Result<(), Error> {
            self.log(format!("linkProgram {}", program))
        }

        fn link_status(&self, program: &u32) -> Result<bool, Error> {
            self.log(format!("linkStatus {}", program))?;
            Ok(true)
        }

        fn program_info_log(&self, program: &u32) -> Result<String, Error> {
            self.log(format!("programInfoLog {}", program))?;
            Ok(String::new())
        }

        fn delete_program(&self, program: u32) -> Result<(), Error> {
            self.log(format!("deleteProgram {}", program))
        }

        fn use_program(&self, program: &u32) -> Result<(), Error> {
            self.log(format!("useProgram {}", program))
        }

        fn attrib_location(&self, program: &u32, name: &str) -> Result<Option<u32>, Error> {
            self.log(format!("getAttribLocation {} {}", program, name))?;
            Ok(Some(0))
        }

        fn create_buffer(&self) -> Result<u32, Error> {
            self.log("createBuffer".to_owned())?;
            Ok(self.handle())
        }

        fn bind_array_buffer(&self, buffer: &u32) -> Result<(), Error> {
            self.log(format!("bindBuffer ARRAY_BUFFER {}", buffer))
        }

        fn array_buffer_data(&self, data: &[f32]) -> Result<(), Error> {
            self.log(format!("bufferData ARRAY_BUFFER {:?} STATIC_DRAW", data))
        }

        fn viewport(&self, x: i32, y: i32, width: i32, height: i32) -> Result<(), Error> {
            self.log(format!("viewport {} {} {} {}", x, y, width, height))
        }

        fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) -> Result<(), Error> {
            self.log(format!("clearColor {} {} {} {}", r, g, b, a))
        }

        fn clear_color_buffer(&self) -> Result<(), Error> {
            self.log("clear COLOR_BUFFER_BIT".to_owned())
        }

        fn enable_vertex_attrib_array(&self, index: u32) -> Result<(), Error> {
            self.log(format!("enableVertexAttribArray {}", index))
        }

        fn vertex_attrib_pointer_f32(
            &self,
            index: u32,
            size: i32,
            normalized: bool,
            stride: i32,
            offset: i32,
        ) -> Result<(), Error> {
            self.log(format!(
                "vertexAttribPointer {} {} FLOAT {} {} {}",
                index, size, normalized, stride, offset
            ))
        }

        fn draw_triangles(&self, first: i32, count: i32) -> Result<(), Error> {
            self.log(format!("drawArrays TRIANGLES {} {}", first, count))
        }
    }

    const SETUP: [&str; 17] = [
        "createShader vertex",
        "shaderSource 1",
        "compileShader 1",
        "compileStatus 1",
        "createShader fragment",
        "shaderSource 2",
        "compileShader 2",
        "compileStatus 2",
        "createProgram",
        "attachShader 3 1",
        "attachShader 3 2",
        "linkProgram 3",
        "linkStatus 3",
        "getAttribLocation 3 a_position",
        "createBuffer",
        "bindBuffer ARRAY_BUFFER 4",
        "bufferData ARRAY_BUFFER [0.0, 0.0, 0.0, 0.5, 0.7, 0.0] STATIC_DRAW",
    ];

    #[test]
    fn call_sequence() {
        let gl = Recorder::default();
        let dims = Extent {
            width: 320,
            height: 200,
        };
        let renderer = Renderer::new(&gl, dims, &Sources::default()).unwrap();
        assert_eq!(gl.calls(), SETUP);

        renderer.render().unwrap();
        let draw = &gl.calls()[SETUP.len()..];
        assert_eq!(
            draw,
            [
                "viewport 0 0 320 200",
                "clearColor 0 0 0 0",
                "clear COLOR_BUFFER_BIT",
                "useProgram 3",
                "enableVertexAttribArray 0",
                "bindBuffer ARRAY_BUFFER 4",
                "vertexAttribPointer 0 2 FLOAT false 0 0",
                "drawArrays TRIANGLES 0 3",
            ]
        );
    }

    #[test]
    fn failed_compile_ends_at_delete() {
        let gl = Recorder::failing(ShaderStage::Fragment);
        let dims = Extent {
            width: 1,
            height: 1,
        };
        let err = Renderer::new(&gl, dims, &Sources::default()).err();
        assert_eq!(
            err,
            Some(Error::Compile {
                stage: ShaderStage::Fragment,
                log: "ERROR: 0:1: 'x' : syntax error\n".to_owned(),
            })
        );

        let mut expected = SETUP[..8].to_vec();
        expected.extend(["shaderInfoLog 2", "deleteShader 2"]);
        assert_eq!(gl.calls(), expected);
        assert!(!gl.calls().iter().any(|c| c.starts_with("drawArrays")));
    }
}
