/// An RGBA8 drawing buffer with the origin at the bottom-left, as GL sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Framebuffer {
    /// A transparent black buffer, like a freshly sized canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Framebuffer {
            width,
            height,
            pixels: vec![[0; 4]; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at column `x`, row `y` counted from the bottom.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    pub fn fill(&mut self, color: [u8; 4]) {
        for px in &mut self.pixels {
            *px = color;
        }
    }

    /// Number of pixels equal to `color`.
    pub fn count(&self, color: [u8; 4]) -> usize {
        self.pixels.iter().filter(|&&px| px == color).count()
    }

    /// Tightly packed RGBA rows, top row first, as image files expect.
    pub fn to_rgba_top_down(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for row in self.pixels.chunks(self.width.max(1) as usize).rev() {
            for px in row {
                out.extend_from_slice(px);
            }
        }
        out
    }

    fn put(&mut self, x: u32, y: u32, color: [u8; 4]) {
        let idx = (y * self.width + x) as usize;
        self.pixels[idx] = color;
    }
}

/// Unorm conversion of a color channel.
pub fn to_unorm8(c: f32) -> u8 {
    (c.max(0.0).min(1.0) * 255.0).round() as u8
}

pub fn to_rgba8(color: [f32; 4]) -> [u8; 4] {
    [
        to_unorm8(color[0]),
        to_unorm8(color[1]),
        to_unorm8(color[2]),
        to_unorm8(color[3]),
    ]
}

/// `(x, y, width, height)` in window pixels.
pub type Viewport = [i32; 4];

/// Maps a clip-space position to window coordinates.
pub fn to_window(position: [f32; 4], viewport: Viewport) -> [f32; 2] {
    let w = if position[3] == 0.0 { 1.0 } else { position[3] };
    let (nx, ny) = (position[0] / w, position[1] / w);
    let [vx, vy, vw, vh] = viewport;
    [
        (nx + 1.0) * 0.5 * vw as f32 + vx as f32,
        (ny + 1.0) * 0.5 * vh as f32 + vy as f32,
    ]
}

fn edge(a: [f32; 2], b: [f32; 2], p: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}

/// Top or left edge of a counter-clockwise triangle, y pointing up.
fn is_top_left(a: [f32; 2], b: [f32; 2]) -> bool {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    (dy == 0.0 && dx < 0.0) || dy < 0.0
}

/// Fills every pixel whose center lies inside the triangle, using the
/// top-left rule for centers exactly on an edge. Returns the pixel count.
pub fn fill_triangle(
    fb: &mut Framebuffer,
    viewport: Viewport,
    verts: [[f32; 2]; 3],
    color: [u8; 4],
) -> usize {
    let [mut a, b, mut c] = verts;
    let area = edge(a, b, c);
    if area == 0.0 || !area.is_finite() {
        return 0;
    }
    if area < 0.0 {
        std::mem::swap(&mut a, &mut c);
    }
    let edges = [(b, c), (c, a), (a, b)];
    let bias: Vec<bool> = edges.iter().map(|&(p, q)| is_top_left(p, q)).collect();

    let [vx, vy, vw, vh] = viewport;
    let x_min = vx.max(0) as f32;
    let y_min = vy.max(0) as f32;
    let x_max = ((vx + vw) as f32).min(fb.width as f32);
    let y_max = ((vy + vh) as f32).min(fb.height as f32);

    let lo_x = a[0].min(b[0]).min(c[0]).floor().max(x_min);
    let hi_x = a[0].max(b[0]).max(c[0]).ceil().min(x_max);
    let lo_y = a[1].min(b[1]).min(c[1]).floor().max(y_min);
    let hi_y = a[1].max(b[1]).max(c[1]).ceil().min(y_max);
    if lo_x >= hi_x || lo_y >= hi_y {
        return 0;
    }

    let mut filled = 0;
    for y in lo_y as u32..hi_y as u32 {
        for x in lo_x as u32..hi_x as u32 {
            let p = [x as f32 + 0.5, y as f32 + 0.5];
            let inside = edges.iter().zip(&bias).all(|(&(e0, e1), &top_left)| {
                let w = edge(e0, e1, p);
                w > 0.0 || (w == 0.0 && top_left)
            });
            if inside {
                fb.put(x, y, color);
                filled += 1;
            }
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unorm() {
        assert_eq!(to_rgba8([1.0, 0.0, 0.5, 1.0]), [255, 0, 128, 255]);
        assert_eq!(to_rgba8([-2.0, 2.0, 0.25, 0.0]), [0, 255, 64, 0]);
    }

    #[test]
    fn window_mapping() {
        let vp = [0, 0, 100, 50];
        assert_eq!(to_window([0.0, 0.0, 0.0, 1.0], vp), [50.0, 25.0]);
        assert_eq!(to_window([-1.0, -1.0, 0.0, 1.0], vp), [0.0, 0.0]);
        assert_eq!(to_window([1.0, 1.0, 0.0, 1.0], vp), [100.0, 50.0]);
    }

    #[test]
    fn shared_edge_is_filled_once() {
        // Two triangles splitting a 4x4 square along its diagonal.
        let mut fb = Framebuffer::new(4, 4);
        let vp = [0, 0, 4, 4];
        let red = [255, 0, 0, 255];
        let n = fill_triangle(&mut fb, vp, [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0]], red)
            + fill_triangle(&mut fb, vp, [[0.0, 0.0], [4.0, 4.0], [0.0, 4.0]], red);
        assert_eq!(n, 16);
        assert_eq!(fb.count(red), 16);
    }

    #[test]
    fn winding_does_not_matter() {
        let vp = [0, 0, 8, 8];
        let tri = [[1.0, 1.0], [7.0, 1.0], [1.0, 7.0]];
        let mut ccw = Framebuffer::new(8, 8);
        let mut cw = Framebuffer::new(8, 8);
        fill_triangle(&mut ccw, vp, tri, [1, 2, 3, 4]);
        fill_triangle(&mut cw, vp, [tri[0], tri[2], tri[1]], [1, 2, 3, 4]);
        assert_eq!(ccw, cw);
        assert!(ccw.count([1, 2, 3, 4]) > 0);
    }

    #[test]
    fn degenerate_and_offscreen() {
        let mut fb = Framebuffer::new(4, 4);
        let vp = [0, 0, 4, 4];
        assert_eq!(fill_triangle(&mut fb, vp, [[0.0, 0.0], [2.0, 2.0], [4.0, 4.0]], [9; 4]), 0);
        let offscreen = [[10.0, 10.0], [20.0, 10.0], [10.0, 20.0]];
        assert_eq!(fill_triangle(&mut fb, vp, offscreen, [9; 4]), 0);
        assert_eq!(fb.count([0; 4]), 16);
    }

    #[test]
    fn rows_flip_for_export() {
        let mut fb = Framebuffer::new(1, 2);
        fb.put(0, 0, [1, 1, 1, 1]);
        assert_eq!(fb.to_rgba_top_down(), vec![0, 0, 0, 0, 1, 1, 1, 1]);
    }
}
