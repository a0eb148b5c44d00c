use crate::error::Result;
use crate::math::{apply_lighting, calculate_light_intensity, edge_function};
use crate::scene::Material;
use crate::texture::{Pixmap, Rgba};
use crate::vertex::Vertex;

/// Color target plus depth buffer. Smaller depth is closer to the viewer.
pub struct FrameBuffer {
    pub color: Pixmap,
    pub depth: Vec<f64>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Ok(Self {
            color: Pixmap::new(width, height)?,
            depth: vec![f64::INFINITY; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.color.width()
    }

    pub fn height(&self) -> usize {
        self.color.height()
    }

    pub fn clear(&mut self) {
        self.color.fill(Rgba::TRANSPARENT);
        self.depth.fill(f64::INFINITY);
    }
}

/// Draws a triangle with per-pixel lighting
///
/// Either winding is accepted; hidden surfaces are resolved by the depth buffer.
/// Depth is taken from `-z`, so the viewer looks down the negative z axis.
pub fn draw_triangle(
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    frame: &mut FrameBuffer,
    light_dir: &[f64; 3],
    material: &Material,
) {
    let width = frame.width();
    let height = frame.height();

    // Compute bounding box of the triangle
    let min_x = v0.screen_position[0]
        .min(v1.screen_position[0])
        .min(v2.screen_position[0])
        .floor()
        .max(0.0);
    let max_x = v0.screen_position[0]
        .max(v1.screen_position[0])
        .max(v2.screen_position[0])
        .ceil()
        .min(width as f64 - 1.0);
    let min_y = v0.screen_position[1]
        .min(v1.screen_position[1])
        .min(v2.screen_position[1])
        .floor()
        .max(0.0);
    let max_y = v0.screen_position[1]
        .max(v1.screen_position[1])
        .max(v2.screen_position[1])
        .ceil()
        .min(height as f64 - 1.0);
    if min_x > max_x || min_y > max_y {
        return;
    }
    let (min_x, max_x, min_y, max_y) = (
        min_x as usize,
        max_x as usize,
        min_y as usize,
        max_y as usize,
    );

    // Precompute area of the triangle
    let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
    if area == 0.0 {
        return;
    }

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = [x as f64 + 0.5, y as f64 + 0.5];

            // Normalized barycentric coordinates; all non-negative inside
            let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p) / area;
            let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p) / area;
            let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let depth = -(v0.position[2] * w0 + v1.position[2] * w1 + v2.position[2] * w2);
            let offset = y * width + x;
            if depth >= frame.depth[offset] {
                continue;
            }

            let base_color = match material {
                Material::Solid(color) => *color,
                Material::Textured(texture) => {
                    let u = v0.uv[0] * w0 + v1.uv[0] * w1 + v2.uv[0] * w2;
                    let v = v0.uv[1] * w0 + v1.uv[1] * w1 + v2.uv[1] * w2;
                    texture.sample(u, v)
                }
            };
            if base_color.a == 0 {
                continue;
            }

            // Interpolate normal
            let nx = v0.normal[0] * w0 + v1.normal[0] * w1 + v2.normal[0] * w2;
            let ny = v0.normal[1] * w0 + v1.normal[1] * w1 + v2.normal[1] * w2;
            let nz = v0.normal[2] * w0 + v1.normal[2] * w1 + v2.normal[2] * w2;
            let length = (nx * nx + ny * ny + nz * nz).sqrt();
            let light_intensity = if length > 0.0 {
                calculate_light_intensity(&[nx / length, ny / length, nz / length], light_dir)
            } else {
                1.0
            };

            frame.depth[offset] = depth;
            frame
                .color
                .set_pixel(x, y, apply_lighting(base_color, light_intensity));
        }
    }
}

/// Draws a line between two points in the pixel buffer using Bresenham's algorithm
pub fn draw_line(x0: f64, y0: f64, x1: f64, y1: f64, target: &mut Pixmap, color: Rgba) {
    let width = target.width() as isize;
    let height = target.height() as isize;
    let (mut x0, mut y0, x1, y1) = (
        x0.round() as isize,
        y0.round() as isize,
        x1.round() as isize,
        y1.round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy

    loop {
        if x0 >= 0 && x0 < width && y0 >= 0 && y0 < height {
            target.set_pixel(x0 as usize, y0 as usize, color);
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
