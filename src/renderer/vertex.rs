/// Components per vertex.
pub const COMPONENTS: i32 = 2;

/// Three 2d points in clip space.
#[rustfmt::skip]
pub const TRIANGLE: [f32; 6] = [
    0.0, 0.0,
    0.0, 0.5,
    0.7, 0.0,
];

pub const VERTEX_COUNT: i32 = TRIANGLE.len() as i32 / COMPONENTS;
