//! Procedural geometry for the spindle: disc caps, the ring side wall and tick quads.
//!
//! Triangles wind counter-clockwise when seen from outside the solid, so the
//! normal from `calculate_normal` points away from the disc.

use crate::error::{Result, SpindleError};
use std::f64::consts::PI;

/// CPU-side triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f64; 3]>,
    pub triangles: Vec<[u32; 3]>,
    /// Parallel to `positions` when present.
    pub texture_coordinates: Option<Vec<[f64; 2]>>,
}

impl Mesh {
    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(triangles),
            texture_coordinates: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Flattened index count, three per triangle.
    pub fn index_count(&self) -> usize {
        self.triangles.len() * 3
    }

    /// True when every index references a position and UVs (if any) line up.
    pub fn is_valid(&self) -> bool {
        let n = self.positions.len();
        let indices_ok = self
            .triangles
            .iter()
            .all(|tri| tri.iter().all(|&i| (i as usize) < n));
        let uvs_ok = self
            .texture_coordinates
            .as_ref()
            .map_or(true, |uv| uv.len() == n);
        indices_ok && uvs_ok
    }

    fn push(&mut self, position: [f64; 3]) {
        self.positions.push(position);
    }
}

fn check_segments(segments: usize) -> Result<()> {
    if segments < 3 {
        return Err(SpindleError::TooFewSegments(segments));
    }
    Ok(())
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(SpindleError::InvalidArgument(format!(
            "{name} must be a positive number, got {value}"
        )));
    }
    Ok(())
}

/// Flat circular face at height `z`, as a triangle fan around the center.
///
/// Vertex 0 is the center; vertices `1..=segments + 1` walk the perimeter with the
/// last one repeating the first angle to close the ring. Back-facing caps get the
/// reversed winding.
pub fn disc_cap(radius: f64, z: f64, segments: usize, front_facing: bool) -> Result<Mesh> {
    check_segments(segments)?;
    check_positive("radius", radius)?;

    let mut mesh = Mesh::with_capacity(segments + 2, segments);
    let mut uvs = Vec::with_capacity(segments + 2);

    mesh.push([0.0, 0.0, z]);
    uvs.push([0.5, 0.5]);

    for i in 0..=segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        let (sin, cos) = angle.sin_cos();
        mesh.push([radius * cos, radius * sin, z]);
        // image rows grow downwards
        uvs.push([0.5 + 0.5 * cos, 0.5 - 0.5 * sin]);
    }

    for i in 1..=segments as u32 {
        if front_facing {
            mesh.triangles.push([0, i, i + 1]);
        } else {
            mesh.triangles.push([0, i + 1, i]);
        }
    }

    mesh.texture_coordinates = Some(uvs);
    Ok(mesh)
}

/// Cylindrical side wall spanning `z_base..z_base + thickness`.
///
/// Vertices alternate front (`z_base + thickness`) and back (`z_base`) per angle step.
pub fn ring_side(segments: usize, radius: f64, thickness: f64, z_base: f64) -> Result<Mesh> {
    check_segments(segments)?;
    check_positive("radius", radius)?;
    check_positive("thickness", thickness)?;

    let z_front = z_base + thickness;
    let z_back = z_base;
    let mut mesh = Mesh::with_capacity(2 * (segments + 1), 2 * segments);

    for i in 0..=segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        let x = radius * angle.cos();
        let y = radius * angle.sin();
        mesh.push([x, y, z_front]);
        mesh.push([x, y, z_back]);
    }

    for i in 0..segments as u32 {
        let i0 = i * 2;
        let i1 = i * 2 + 1;
        let i2 = i * 2 + 2;
        let i3 = i * 2 + 3;
        mesh.triangles.push([i0, i1, i3]);
        mesh.triangles.push([i0, i3, i2]);
    }

    Ok(mesh)
}

/// Thin quad tangent to the side wall at `angle_degrees`, running from `z = 0` to
/// `z = -thickness`.
pub fn tick_mark(angle_degrees: f64, radius: f64, thickness: f64, line_width: f64) -> Result<Mesh> {
    check_positive("radius", radius)?;
    check_positive("thickness", thickness)?;
    check_positive("line width", line_width)?;

    let angle = angle_degrees.to_radians();
    let x = radius * angle.cos();
    let y = radius * angle.sin();

    let length = (x * x + y * y).sqrt();
    let tx = -y / length * line_width;
    let ty = x / length * line_width;

    let mut mesh = Mesh::with_capacity(4, 2);
    mesh.push([x + tx, y + ty, 0.0]);
    mesh.push([x - tx, y - ty, 0.0]);
    mesh.push([x - tx, y - ty, -thickness]);
    mesh.push([x + tx, y + ty, -thickness]);
    mesh.triangles.push([0, 1, 2]);
    mesh.triangles.push([0, 2, 3]);
    Ok(mesh)
}
