/// Attribute the vertex shader reads positions from.
pub const POSITION_ATTRIBUTE: &str = "a_position";

pub const VERTEX: &str = r#"
// an attribute will receive data from a buffer
attribute vec4 a_position;

// all shaders have a main function
void main() {
    // gl_Position is a special variable a vertex shader
    // is responsible for setting
    gl_Position = a_position;
}
"#;

pub const FRAGMENT: &str = r#"
// fragment shaders don't have a default precision so we need
// to pick one. mediump is a good default
precision mediump float;

void main() {
    // gl_FragColor is a special variable a fragment shader
    // is responsible for setting
    gl_FragColor = vec4(1, 0, 0.5, 1); // reddish-purple
}
"#;

/// A vertex/fragment source pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sources<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

impl Default for Sources<'static> {
    fn default() -> Self {
        Sources {
            vertex: VERTEX,
            fragment: FRAGMENT,
        }
    }
}
