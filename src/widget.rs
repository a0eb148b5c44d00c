use crate::error::Result;
use crate::graphics::{draw_triangle, FrameBuffer};
use crate::math::{
    calculate_normal, multiply_matrices, multiply_matrix_vector, normalize, orientation, rotation_x,
};
use crate::mesh::Mesh;
use crate::scene::{DiscModel, SceneAssembler};
use crate::state::{Axis, StateObserver};
use crate::vertex::Vertex;
use std::time::Instant;
use tracing::warn;

/// Fixed camera elevation so an edge-on disc still reads as an ellipse.
const CAMERA_ELEVATION_DEG: f64 = 20.0;

/// Live rotation applied to the model when painting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// 3D spindle view: owns the disc model and the transform applied to it.
pub struct SpindleView {
    scene: SceneAssembler,
    orientation: Orientation,
    light_dir: [f64; 3],
    needs_repaint: bool,
    rebuilds: usize,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl SpindleView {
    /// Creates the view and builds the initial model.
    pub fn new(mut scene: SceneAssembler, thickness: f64) -> Result<Self> {
        scene.rebuild(thickness)?;
        Ok(Self {
            scene,
            orientation: Orientation::default(),
            light_dir: normalize([-0.4, 0.5, 1.0]),
            needs_repaint: true,
            rebuilds: 1,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        })
    }

    pub fn model(&self) -> &DiscModel {
        self.scene.model()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn needs_repaint(&self) -> bool {
        self.needs_repaint
    }

    pub fn request_paint(&mut self) {
        self.needs_repaint = true;
    }

    /// Number of full model rebuilds since creation.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    fn transform(&self) -> [[f64; 3]; 3] {
        let o = self.orientation;
        multiply_matrices(
            &rotation_x(CAMERA_ELEVATION_DEG),
            &orientation(o.roll, o.pitch, o.yaw),
        )
    }

    /// Computes the projected vertices of one mesh for the current orientation
    fn compute_projected_vertices(
        &self,
        mesh: &Mesh,
        rotation: &[[f64; 3]; 3],
        center: [f64; 2],
        scale: f64,
    ) -> Vec<Vertex> {
        let transformed: Vec<[f64; 3]> = mesh
            .positions
            .iter()
            .map(|p| multiply_matrix_vector(rotation, p))
            .collect();

        // Compute vertex normals
        let mut vertex_normals = vec![[0.0; 3]; transformed.len()];
        for tri in &mesh.triangles {
            let [a, b, c] = tri.map(|i| i as usize);
            let normal = calculate_normal(&transformed[a], &transformed[b], &transformed[c]);
            for &index in &[a, b, c] {
                vertex_normals[index][0] += normal[0];
                vertex_normals[index][1] += normal[1];
                vertex_normals[index][2] += normal[2];
            }
        }

        transformed
            .iter()
            .zip(vertex_normals)
            .enumerate()
            .map(|(i, (&position, normal))| Vertex {
                position,
                screen_position: [
                    center[0] + position[0] * scale,
                    center[1] - position[1] * scale,
                ],
                normal: normalize(normal),
                uv: mesh
                    .texture_coordinates
                    .as_ref()
                    .map_or([0.0, 0.0], |uv| uv[i]),
            })
            .collect()
    }

    /// Paint the disc into `frame`
    pub fn paint(&mut self, frame: &mut FrameBuffer) {
        // Update FPS calculation
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        frame.clear();
        let width = frame.width() as f64;
        let height = frame.height() as f64;
        let center = [width / 2.0, height / 2.0];
        let radius = self.scene.shape().radius;
        let scale = width.min(height) / 2.0 * 0.85 / radius;
        let rotation = self.transform();

        for geometry in &self.scene.model().geometries {
            let vertices =
                self.compute_projected_vertices(&geometry.mesh, &rotation, center, scale);
            for tri in &geometry.mesh.triangles {
                let [a, b, c] = tri.map(|i| i as usize);
                draw_triangle(
                    &vertices[a],
                    &vertices[b],
                    &vertices[c],
                    frame,
                    &self.light_dir,
                    &geometry.material,
                );
            }
        }

        self.needs_repaint = false;
    }
}

impl StateObserver for SpindleView {
    fn on_angle_changed(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Roll => self.orientation.roll = value,
            Axis::Pitch => self.orientation.pitch = value,
            Axis::Yaw => self.orientation.yaw = value,
        }
        self.needs_repaint = true;
    }

    fn on_thickness_changed(&mut self, value: f64) {
        match self.scene.rebuild(value) {
            Ok(_) => self.rebuilds += 1,
            Err(e) => warn!(thickness = value, error = %e, "disc rebuild failed"),
        }
        self.needs_repaint = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TextureConfig;
    use crate::scene::DiscShape;
    use crate::state::SpindleState;
    use crate::texture::{DialFace, Rgba};

    fn view() -> SpindleView {
        let scene = SceneAssembler::new(
            DiscShape::default(),
            &TextureConfig {
                width: 32,
                height: 32,
            },
            Box::new(DialFace::default()),
        );
        SpindleView::new(scene, 0.4).unwrap()
    }

    #[test]
    fn angle_changes_do_not_rebuild() {
        let mut view = view();
        let mut state = SpindleState::default();
        state.set_roll(12.0);
        state.set_pitch(-3.0);
        state.dispatch(&mut view);
        assert_eq!(view.rebuilds(), 1);
        assert_eq!(
            view.orientation(),
            Orientation {
                roll: 12.0,
                pitch: -3.0,
                yaw: 0.0
            }
        );
        assert!(view.needs_repaint());
    }

    #[test]
    fn thickness_change_rebuilds() {
        let mut view = view();
        let mut state = SpindleState::default();
        state.set_thickness(0.6);
        state.dispatch(&mut view);
        assert_eq!(view.rebuilds(), 2);
        assert_eq!(view.model().len(), 39);
        assert_eq!(view.model().geometries[1].mesh.positions[0][2], -0.6);
    }

    #[test]
    fn failed_rebuild_is_not_counted() {
        let mut view = view();
        view.on_thickness_changed(-1.0);
        assert_eq!(view.rebuilds(), 1);
    }

    #[test]
    fn paint_covers_center_and_leaves_corners() {
        let mut view = view();
        let mut frame = FrameBuffer::new(40, 40).unwrap();
        view.paint(&mut frame);
        assert!(!view.needs_repaint());
        assert_ne!(frame.color.pixel(20, 20), Rgba::TRANSPARENT);
        assert_eq!(frame.color.pixel(0, 0), Rgba::TRANSPARENT);
        assert_eq!(frame.color.pixel(39, 39), Rgba::TRANSPARENT);
    }
}
