//! Headless host: a canvas stand-in and a WebGL 1 context that rasterizes
//! on the CPU.
//!
//! GL errors that a browser would only record through `getError` come back
//! as `Error::Host` here, so misuse shows up in tests right away.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, trace};

use crate::backend::{Backend, ShaderStage, Surface};
use crate::error::Error;

mod glsl;
mod raster;

pub use glsl::{compile, Compiled};
pub use raster::Framebuffer;

const MAX_VERTEX_ATTRIBS: u32 = 16;

/// HTML default for a canvas without `width`/`height` attributes.
const DEFAULT_SIZE: (u32, u32) = (300, 150);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoftShader(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoftProgram(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoftBuffer(u32);

struct ShaderObject {
    stage: ShaderStage,
    source: String,
    compiled: Option<Compiled>,
    info_log: String,
}

#[derive(Default)]
struct ProgramObject {
    attached: Vec<SoftShader>,
    linked: Option<Linked>,
    info_log: String,
}

#[derive(Debug, Clone)]
struct Linked {
    /// Active attributes; the index is the location.
    attributes: Vec<String>,
    position: Option<usize>,
    color: [f32; 4],
}

#[derive(Debug, Clone, Copy)]
struct AttribPointer {
    buffer: SoftBuffer,
    size: i32,
    stride: i32,
    offset: i32,
}

#[derive(Debug, Clone, Copy, Default)]
struct AttribState {
    enabled: bool,
    pointer: Option<AttribPointer>,
}

struct Device {
    framebuffer: Framebuffer,
    next_id: u32,
    shaders: HashMap<SoftShader, ShaderObject>,
    programs: HashMap<SoftProgram, ProgramObject>,
    buffers: HashMap<SoftBuffer, Vec<u8>>,
    array_buffer: Option<SoftBuffer>,
    current_program: Option<SoftProgram>,
    viewport: raster::Viewport,
    clear_color: [f32; 4],
    attribs: Vec<AttribState>,
    draw_calls: u32,
}

fn invalid(msg: &str) -> Error {
    Error::Host(msg.to_owned())
}

impl Device {
    fn new(width: u32, height: u32) -> Self {
        Device {
            framebuffer: Framebuffer::new(width, height),
            next_id: 1,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            array_buffer: None,
            current_program: None,
            viewport: [0, 0, width as i32, height as i32],
            clear_color: [0.0; 4],
            attribs: vec![AttribState::default(); MAX_VERTEX_ATTRIBS as usize],
            draw_calls: 0,
        }
    }

    fn id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn shader(&mut self, shader: &SoftShader) -> Result<&mut ShaderObject, Error> {
        self.shaders
            .get_mut(shader)
            .ok_or_else(|| invalid("INVALID_VALUE: no such shader"))
    }

    fn program(&mut self, program: &SoftProgram) -> Result<&mut ProgramObject, Error> {
        self.programs
            .get_mut(program)
            .ok_or_else(|| invalid("INVALID_VALUE: no such program"))
    }

    fn link(&self, program: &ProgramObject) -> Result<Linked, String> {
        let mut vertex = None;
        let mut fragment = None;
        for handle in &program.attached {
            let shader = match self.shaders.get(handle) {
                Some(shader) => shader,
                None => continue,
            };
            match (&shader.compiled, shader.stage) {
                (Some(Compiled::Vertex { position, .. }), _) => vertex = Some(position.clone()),
                (Some(Compiled::Fragment { color }), _) => fragment = Some(*color),
                (None, ShaderStage::Vertex) => {
                    return Err("Attached vertex shader is not compiled.\n".to_owned())
                }
                (None, ShaderStage::Fragment) => {
                    return Err("Attached fragment shader is not compiled.\n".to_owned())
                }
            }
        }

        let position = vertex.ok_or("Missing vertex shader.\n")?;
        let color = fragment.ok_or("Missing fragment shader.\n")?;
        let attributes: Vec<String> = position.iter().cloned().collect();
        Ok(Linked {
            position: if attributes.is_empty() { None } else { Some(0) },
            attributes,
            color: color.unwrap_or([0.0; 4]),
        })
    }

    /// Reads vertex `index` of the attribute at `location`, padded to vec4.
    fn fetch(&self, location: usize, index: usize) -> Result<[f32; 4], Error> {
        let mut out = [0.0, 0.0, 0.0, 1.0];
        let state = self.attribs[location];
        if !state.enabled {
            return Ok(out);
        }
        let ptr = state
            .pointer
            .ok_or_else(|| invalid("INVALID_OPERATION: attribute has no buffer"))?;
        let data = self
            .buffers
            .get(&ptr.buffer)
            .ok_or_else(|| invalid("INVALID_OPERATION: attribute buffer was deleted"))?;
        let elem = std::mem::size_of::<f32>();
        let stride = if ptr.stride == 0 {
            ptr.size as usize * elem
        } else {
            ptr.stride as usize
        };
        let start = ptr.offset as usize + index * stride;
        for (i, slot) in out.iter_mut().take(ptr.size as usize).enumerate() {
            let at = start + i * elem;
            let bytes = data
                .get(at..at + elem)
                .ok_or_else(|| invalid("INVALID_OPERATION: attribute reads past buffer end"))?;
            *slot = bytemuck::pod_read_unaligned::<f32>(bytes);
        }
        Ok(out)
    }

    fn draw_triangles(&mut self, first: i32, count: i32) -> Result<usize, Error> {
        if first < 0 || count < 0 {
            return Err(invalid("INVALID_VALUE: negative first or count"));
        }
        let program = self
            .current_program
            .ok_or_else(|| invalid("INVALID_OPERATION: no program in use"))?;
        let linked = self
            .programs
            .get(&program)
            .and_then(|p| p.linked.clone())
            .ok_or_else(|| invalid("INVALID_OPERATION: program is not linked"))?;
        self.draw_calls += 1;

        let color = raster::to_rgba8(linked.color);
        let mut filled = 0;
        let (first, count) = (first as usize, count as usize);
        for tri in (first..first + count - count % 3).step_by(3) {
            let mut verts = [[0.0; 2]; 3];
            for (k, vert) in verts.iter_mut().enumerate() {
                let position = match linked.position {
                    Some(location) => self.fetch(location, tri + k)?,
                    None => [0.0, 0.0, 0.0, 1.0],
                };
                *vert = raster::to_window(position, self.viewport);
            }
            trace!("triangle {:?}", verts);
            filled += raster::fill_triangle(&mut self.framebuffer, self.viewport, verts, color);
        }
        Ok(filled)
    }
}

/// A `<canvas>` stand-in.
///
/// `client` is the laid-out size; `width`/`height` attributes start at the
/// HTML default of 300x150 until `set_size` writes them.
pub struct SoftCanvas {
    client: Cell<(u32, u32)>,
    size: Cell<(u32, u32)>,
    webgl: bool,
    device: Rc<RefCell<Device>>,
}

impl SoftCanvas {
    pub fn new(client_width: u32, client_height: u32) -> Self {
        SoftCanvas {
            client: Cell::new((client_width, client_height)),
            size: Cell::new(DEFAULT_SIZE),
            webgl: true,
            device: Rc::new(RefCell::new(Device::new(DEFAULT_SIZE.0, DEFAULT_SIZE.1))),
        }
    }

    /// Makes `getContext("webgl")` come back empty.
    pub fn without_webgl(mut self) -> Self {
        self.webgl = false;
        self
    }

    /// Simulates a later CSS resize; the drawing buffer is left alone.
    pub fn resize_client(&self, width: u32, height: u32) {
        self.client.set((width, height));
    }

    /// Current `width` and `height` attributes.
    pub fn size(&self) -> (u32, u32) {
        self.size.get()
    }

    pub fn draw_calls(&self) -> u32 {
        self.device.borrow().draw_calls
    }

    /// Copy of the drawing buffer.
    pub fn snapshot(&self) -> Framebuffer {
        self.device.borrow().framebuffer.clone()
    }
}

impl Surface for SoftCanvas {
    type Context = SoftContext;

    fn client_size(&self) -> Result<(u32, u32), Error> {
        Ok(self.client.get())
    }

    fn set_size(&self, width: u32, height: u32) -> Result<(), Error> {
        self.size.set((width, height));
        // Resizing a canvas resets its drawing buffer.
        self.device.borrow_mut().framebuffer = Framebuffer::new(width, height);
        debug!("canvas sized to {}x{}", width, height);
        Ok(())
    }

    fn context(&self) -> Result<Option<SoftContext>, Error> {
        if !self.webgl {
            return Ok(None);
        }
        Ok(Some(SoftContext {
            device: Rc::clone(&self.device),
        }))
    }
}

/// CPU implementation of the `Backend` calls.
pub struct SoftContext {
    device: Rc<RefCell<Device>>,
}

impl Backend for SoftContext {
    type Shader = SoftShader;
    type Program = SoftProgram;
    type Buffer = SoftBuffer;

    fn create_shader(&self, stage: ShaderStage) -> Result<SoftShader, Error> {
        let mut dev = self.device.borrow_mut();
        let handle = SoftShader(dev.id());
        dev.shaders.insert(
            handle,
            ShaderObject {
                stage,
                source: String::new(),
                compiled: None,
                info_log: String::new(),
            },
        );
        Ok(handle)
    }

    fn shader_source(&self, shader: &SoftShader, source: &str) -> Result<(), Error> {
        self.device.borrow_mut().shader(shader)?.source = source.to_owned();
        Ok(())
    }

    fn compile_shader(&self, shader: &SoftShader) -> Result<(), Error> {
        let mut dev = self.device.borrow_mut();
        let obj = dev.shader(shader)?;
        match glsl::compile(obj.stage, &obj.source) {
            Ok(compiled) => {
                obj.compiled = Some(compiled);
                obj.info_log.clear();
            }
            Err(log) => {
                obj.compiled = None;
                obj.info_log = log;
            }
        }
        Ok(())
    }

    fn compile_status(&self, shader: &SoftShader) -> Result<bool, Error> {
        Ok(self.device.borrow_mut().shader(shader)?.compiled.is_some())
    }

    fn shader_info_log(&self, shader: &SoftShader) -> Result<String, Error> {
        Ok(self.device.borrow_mut().shader(shader)?.info_log.clone())
    }

    fn delete_shader(&self, shader: SoftShader) -> Result<(), Error> {
        self.device.borrow_mut().shaders.remove(&shader);
        Ok(())
    }

    fn create_program(&self) -> Result<SoftProgram, Error> {
        let mut dev = self.device.borrow_mut();
        let handle = SoftProgram(dev.id());
        dev.programs.insert(handle, ProgramObject::default());
        Ok(handle)
    }

    fn attach_shader(&self, program: &SoftProgram, shader: &SoftShader) -> Result<(), Error> {
        let mut dev = self.device.borrow_mut();
        if !dev.shaders.contains_key(shader) {
            return Err(invalid("INVALID_VALUE: no such shader"));
        }
        let obj = dev.program(program)?;
        if obj.attached.contains(shader) {
            return Err(invalid("INVALID_OPERATION: shader already attached"));
        }
        obj.attached.push(*shader);
        Ok(())
    }

    fn link_program(&self, program: &SoftProgram) -> Result<(), Error> {
        let mut dev = self.device.borrow_mut();
        let result = {
            let obj = dev
                .programs
                .get(program)
                .ok_or_else(|| invalid("INVALID_VALUE: no such program"))?;
            dev.link(obj)
        };
        let obj = dev.program(program)?;
        match result {
            Ok(linked) => {
                obj.linked = Some(linked);
                obj.info_log.clear();
            }
            Err(log) => {
                obj.linked = None;
                obj.info_log = log;
            }
        }
        Ok(())
    }

    fn link_status(&self, program: &SoftProgram) -> Result<bool, Error> {
        Ok(self.device.borrow_mut().program(program)?.linked.is_some())
    }

    fn program_info_log(&self, program: &SoftProgram) -> Result<String, Error> {
        Ok(self.device.borrow_mut().program(program)?.info_log.clone())
    }

    fn delete_program(&self, program: SoftProgram) -> Result<(), Error> {
        let mut dev = self.device.borrow_mut();
        dev.programs.remove(&program);
        if dev.current_program == Some(program) {
            dev.current_program = None;
        }
        Ok(())
    }

    fn use_program(&self, program: &SoftProgram) -> Result<(), Error> {
        let mut dev = self.device.borrow_mut();
        if dev.program(program)?.linked.is_none() {
            return Err(invalid("INVALID_OPERATION: program is not linked"));
        }
        dev.current_program = Some(*program);
        Ok(())
    }

    fn attrib_location(&self, program: &SoftProgram, name: &str) -> Result<Option<u32>, Error> {
        let mut dev = self.device.borrow_mut();
        let linked = dev
            .program(program)?
            .linked
            .as_ref()
            .ok_or_else(|| invalid("INVALID_OPERATION: program is not linked"))?;
        Ok(linked
            .attributes
            .iter()
            .position(|a| a == name)
            .map(|i| i as u32))
    }

    fn create_buffer(&self) -> Result<SoftBuffer, Error> {
        let mut dev = self.device.borrow_mut();
        let handle = SoftBuffer(dev.id());
        dev.buffers.insert(handle, Vec::new());
        Ok(handle)
    }

    fn bind_array_buffer(&self, buffer: &SoftBuffer) -> Result<(), Error> {
        let mut dev = self.device.borrow_mut();
        if !dev.buffers.contains_key(buffer) {
            return Err(invalid("INVALID_OPERATION: no such buffer"));
        }
        dev.array_buffer = Some(*buffer);
        Ok(())
    }

    fn array_buffer_data(&self, data: &[f32]) -> Result<(), Error> {
        let mut dev = self.device.borrow_mut();
        let bound = dev
            .array_buffer
            .ok_or_else(|| invalid("INVALID_OPERATION: no buffer bound to ARRAY_BUFFER"))?;
        let bytes: &[u8] = bytemuck::cast_slice(data);
        dev.buffers.insert(bound, bytes.to_vec());
        Ok(())
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) -> Result<(), Error> {
        if width < 0 || height < 0 {
            return Err(invalid("INVALID_VALUE: negative viewport size"));
        }
        self.device.borrow_mut().viewport = [x, y, width, height];
        Ok(())
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) -> Result<(), Error> {
        self.device.borrow_mut().clear_color = [r, g, b, a];
        Ok(())
    }

    fn clear_color_buffer(&self) -> Result<(), Error> {
        let mut dev = self.device.borrow_mut();
        let color = raster::to_rgba8(dev.clear_color);
        dev.framebuffer.fill(color);
        Ok(())
    }

    fn enable_vertex_attrib_array(&self, index: u32) -> Result<(), Error> {
        if index >= MAX_VERTEX_ATTRIBS {
            return Err(invalid("INVALID_VALUE: attribute index out of range"));
        }
        self.device.borrow_mut().attribs[index as usize].enabled = true;
        Ok(())
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        // Only integer data is normalized; FLOAT ignores the flag.
        _normalized: bool,
        stride: i32,
        offset: i32,
    ) -> Result<(), Error> {
        if index >= MAX_VERTEX_ATTRIBS || !(1..=4).contains(&size) || stride < 0 || offset < 0 {
            return Err(invalid("INVALID_VALUE: bad vertex attribute pointer"));
        }
        let mut dev = self.device.borrow_mut();
        let buffer = dev
            .array_buffer
            .ok_or_else(|| invalid("INVALID_OPERATION: no buffer bound to ARRAY_BUFFER"))?;
        dev.attribs[index as usize].pointer = Some(AttribPointer {
            buffer,
            size,
            stride,
            offset,
        });
        Ok(())
    }

    fn draw_triangles(&self, first: i32, count: i32) -> Result<(), Error> {
        let filled = self.device.borrow_mut().draw_triangles(first, count)?;
        debug!("rasterized {} pixels", filled);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::pipeline;

    fn context() -> (SoftCanvas, SoftContext) {
        let canvas = SoftCanvas::new(8, 8);
        canvas.set_size(8, 8).unwrap();
        let gl = canvas.context().unwrap().unwrap();
        (canvas, gl)
    }

    #[test]
    fn link_requires_both_stages() {
        let (_canvas, gl) = context();
        let vs = pipeline::create_shader(
            &gl,
            ShaderStage::Vertex,
            "attribute vec4 p; void main() { gl_Position = p; }",
        )
        .unwrap();
        let program = gl.create_program().unwrap();
        gl.attach_shader(&program, &vs).unwrap();
        gl.link_program(&program).unwrap();
        assert!(!gl.link_status(&program).unwrap());
        assert_eq!(gl.program_info_log(&program).unwrap(), "Missing fragment shader.\n");
    }

    #[test]
    fn uncompiled_shader_fails_link() {
        let (_canvas, gl) = context();
        let vs = gl.create_shader(ShaderStage::Vertex).unwrap();
        gl.shader_source(&vs, "void main( {").unwrap();
        gl.compile_shader(&vs).unwrap();
        assert!(!gl.compile_status(&vs).unwrap());
        let fs = gl.create_shader(ShaderStage::Fragment).unwrap();
        gl.shader_source(&fs, "void main() {}").unwrap();
        gl.compile_shader(&fs).unwrap();

        assert_eq!(
            pipeline::create_program(&gl, &vs, &fs).err(),
            Some(Error::Link {
                log: "Attached vertex shader is not compiled.\n".to_owned()
            })
        );
    }

    #[test]
    fn draw_without_program_is_an_error() {
        let (canvas, gl) = context();
        assert!(gl.draw_triangles(0, 3).is_err());
        assert_eq!(canvas.draw_calls(), 0);
    }

    #[test]
    fn strided_buffer() {
        let (canvas, gl) = context();
        let program = pipeline::build(&gl, &Default::default()).unwrap();
        let loc = gl.attrib_location(&program, "a_position").unwrap().unwrap();
        assert_eq!(gl.attrib_location(&program, "a_color").unwrap(), None);

        // x, y, padding; a full-screen-ish triangle from the second vertex on.
        #[rustfmt::skip]
        let data = [
            9.0, 9.0, 0.0,
            -1.0, -1.0, 0.0,
            1.0, -1.0, 0.0,
            -1.0, 1.0, 0.0,
        ];
        let buf = gl.create_buffer().unwrap();
        gl.bind_array_buffer(&buf).unwrap();
        gl.array_buffer_data(&data).unwrap();
        gl.viewport(0, 0, 8, 8).unwrap();
        gl.use_program(&program).unwrap();
        gl.enable_vertex_attrib_array(loc).unwrap();
        gl.vertex_attrib_pointer_f32(loc, 2, false, 12, 12).unwrap();
        gl.draw_triangles(0, 3).unwrap();

        let fb = canvas.snapshot();
        assert_eq!(fb.pixel(0, 0), Some([255, 0, 128, 255]));
        assert_eq!(fb.pixel(7, 7), Some([0, 0, 0, 0]));
        assert_eq!(fb.count([255, 0, 128, 255]), 28);
    }

    #[test]
    fn normalized_flag_is_ignored_for_floats() {
        let draw = |normalized: bool| {
            let (canvas, gl) = context();
            let program = pipeline::build(&gl, &Default::default()).unwrap();
            let buf = gl.create_buffer().unwrap();
            gl.bind_array_buffer(&buf).unwrap();
            gl.array_buffer_data(&[-1.0, -1.0, 3.0, -1.0, -1.0, 3.0]).unwrap();
            gl.viewport(0, 0, 8, 8).unwrap();
            gl.use_program(&program).unwrap();
            gl.enable_vertex_attrib_array(0).unwrap();
            gl.vertex_attrib_pointer_f32(0, 2, normalized, 0, 0).unwrap();
            gl.draw_triangles(0, 3).unwrap();
            canvas.snapshot()
        };
        let plain = draw(false);
        assert_eq!(plain.count([255, 0, 128, 255]), 64);
        assert_eq!(draw(true), plain);
    }
}
