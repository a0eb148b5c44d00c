//! Disc model assembly: caps, side wall and tick marks with their materials.

use crate::config::{GeometryConfig, TextureConfig, MAX_TICK_MARKS};
use crate::error::{Result, SpindleError};
use crate::mesh::{disc_cap, ring_side, tick_mark, Mesh};
use crate::texture::{render_masked_texture, Rgba, Texture, Visual};
use std::sync::Arc;
use tracing::debug;

/// Diffuse surface description.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Textured(Arc<Texture>),
    Solid(Rgba),
}

/// Which piece of the disc a geometry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    FrontCap,
    BackCap,
    Ring,
    Tick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub part: Part,
    pub mesh: Mesh,
    pub material: Material,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscModel {
    pub geometries: Vec<Geometry>,
}

impl DiscModel {
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn count(&self, part: Part) -> usize {
        self.geometries.iter().filter(|g| g.part == part).count()
    }
}

/// Shape parameters that stay fixed across rebuilds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscShape {
    pub radius: f64,
    pub segments: usize,
    pub tick_step_degrees: f64,
    pub tick_line_width: f64,
}

impl Default for DiscShape {
    fn default() -> Self {
        Self::from(&GeometryConfig::default())
    }
}

impl From<&GeometryConfig> for DiscShape {
    fn from(config: &GeometryConfig) -> Self {
        Self {
            radius: config.radius,
            segments: config.segments,
            tick_step_degrees: config.tick_step_degrees,
            tick_line_width: config.tick_line_width,
        }
    }
}

/// Build the full disc for `thickness`, with `face` as the caps' material.
///
/// The front cap sits at `z = 0`, the back cap at `z = -thickness`.
pub fn build_disc_model(shape: &DiscShape, thickness: f64, face: Arc<Texture>) -> Result<DiscModel> {
    // at most MAX_TICK_MARKS ticks per turn
    let min_step = 360.0 / MAX_TICK_MARKS as f64;
    if !(shape.tick_step_degrees >= min_step) || !shape.tick_step_degrees.is_finite() {
        return Err(SpindleError::InvalidArgument(format!(
            "tick step must be a finite number of at least {min_step} degrees, got {}",
            shape.tick_step_degrees
        )));
    }

    let tick_count = (360.0 / shape.tick_step_degrees).ceil() as usize;
    let capacity = tick_count.checked_add(3).ok_or_else(|| {
        SpindleError::InvalidArgument(format!("too many tick marks: {tick_count}"))
    })?;
    let mut geometries = Vec::with_capacity(capacity);

    geometries.push(Geometry {
        part: Part::FrontCap,
        mesh: disc_cap(shape.radius, 0.0, shape.segments, true)?,
        material: Material::Textured(Arc::clone(&face)),
    });
    geometries.push(Geometry {
        part: Part::BackCap,
        mesh: disc_cap(shape.radius, -thickness, shape.segments, false)?,
        material: Material::Textured(face),
    });
    geometries.push(Geometry {
        part: Part::Ring,
        mesh: ring_side(shape.segments, shape.radius, thickness, -thickness)?,
        material: Material::Solid(Rgba::GRAY),
    });

    for i in 0..tick_count {
        let angle = i as f64 * shape.tick_step_degrees;
        if angle >= 360.0 {
            break;
        }
        geometries.push(Geometry {
            part: Part::Tick,
            mesh: tick_mark(angle, shape.radius, thickness, shape.tick_line_width)?,
            material: Material::Solid(Rgba::BLACK),
        });
    }

    Ok(DiscModel { geometries })
}

/// Owns the current disc model and rebuilds it wholesale.
pub struct SceneAssembler {
    shape: DiscShape,
    texture_size: (usize, usize),
    face: Box<dyn Visual>,
    model: DiscModel,
}

impl SceneAssembler {
    pub fn new(shape: DiscShape, texture: &TextureConfig, face: Box<dyn Visual>) -> Self {
        Self {
            shape,
            texture_size: (texture.width, texture.height),
            face,
            model: DiscModel::default(),
        }
    }

    pub fn shape(&self) -> &DiscShape {
        &self.shape
    }

    pub fn model(&self) -> &DiscModel {
        &self.model
    }

    /// Drop the current model and rebuild it, texture included.
    ///
    /// On error the previous model is already cleared and stays empty.
    pub fn rebuild(&mut self, thickness: f64) -> Result<&DiscModel> {
        self.model.geometries.clear();

        let (width, height) = self.texture_size;
        let texture = Arc::new(render_masked_texture(self.face.as_ref(), width, height)?);
        self.model = build_disc_model(&self.shape, thickness, texture)?;

        debug!(
            thickness,
            geometries = self.model.len(),
            "rebuilt disc model"
        );
        Ok(&self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::DialFace;

    fn small_face() -> Arc<Texture> {
        Arc::new(render_masked_texture(&DialFace::default(), 8, 8).unwrap())
    }

    /// Angle of a tick's outer edge midpoint, in `[0, 360)`.
    fn tick_angle(mesh: &Mesh) -> f64 {
        let [a, b] = [mesh.positions[0], mesh.positions[1]];
        let (x, y) = ((a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0);
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }

    fn tick_angles(model: &DiscModel) -> Vec<f64> {
        model
            .geometries
            .iter()
            .filter(|g| g.part == Part::Tick)
            .map(|g| tick_angle(&g.mesh))
            .collect()
    }

    fn assembler() -> SceneAssembler {
        SceneAssembler::new(
            DiscShape::default(),
            &TextureConfig::default(),
            Box::new(DialFace::default()),
        )
    }

    #[test]
    fn default_model_has_39_geometries() {
        let mut scene = assembler();
        let model = scene.rebuild(0.4).unwrap();
        assert_eq!(model.len(), 39);
        assert_eq!(model.count(Part::FrontCap), 1);
        assert_eq!(model.count(Part::BackCap), 1);
        assert_eq!(model.count(Part::Ring), 1);
        assert_eq!(model.count(Part::Tick), 36);
    }

    #[test]
    fn materials_per_part() {
        let mut scene = assembler();
        let model = scene.rebuild(0.4).unwrap();
        for g in &model.geometries {
            match g.part {
                Part::FrontCap | Part::BackCap => {
                    assert!(matches!(g.material, Material::Textured(_)))
                }
                Part::Ring => assert_eq!(g.material, Material::Solid(Rgba::GRAY)),
                Part::Tick => assert_eq!(g.material, Material::Solid(Rgba::BLACK)),
            }
        }
    }

    #[test]
    fn parts_span_thickness() {
        let mut scene = assembler();
        let t = 0.25;
        let model = scene.rebuild(t).unwrap();
        let front = &model.geometries[0].mesh;
        let back = &model.geometries[1].mesh;
        let ring = &model.geometries[2].mesh;
        assert!(front.positions.iter().all(|p| p[2] == 0.0));
        assert!(back.positions.iter().all(|p| p[2] == -t));
        for p in &ring.positions {
            assert!(p[2] == 0.0 || p[2] == -t, "ring z {}", p[2]);
        }
    }

    #[test]
    fn rebuild_replaces_model() {
        let mut scene = assembler();
        scene.rebuild(0.4).unwrap();
        let thick = scene.model().clone();
        scene.rebuild(0.8).unwrap();
        assert_eq!(scene.model().len(), 39);
        assert_ne!(scene.model(), &thick);
        assert_eq!(scene.model().geometries[1].mesh.positions[0][2], -0.8);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut scene = assembler();
        let a = scene.rebuild(0.4).unwrap().clone();
        let b = scene.rebuild(0.4).unwrap().clone();
        assert_eq!(a.len(), b.len());
        for (ga, gb) in a.geometries.iter().zip(b.geometries.iter()) {
            assert_eq!(ga.part, gb.part);
            assert_eq!(ga.mesh.triangles, gb.mesh.triangles);
            for (pa, pb) in ga.mesh.positions.iter().zip(gb.mesh.positions.iter()) {
                for k in 0..3 {
                    assert!((pa[k] - pb[k]).abs() <= 1e-9);
                }
            }
        }
    }

    #[test]
    fn uneven_tick_step_stops_before_full_turn() {
        let shape = DiscShape {
            tick_step_degrees: 7.0,
            ..DiscShape::default()
        };
        let model = build_disc_model(&shape, 0.4, small_face()).unwrap();
        // 0, 7, ..., 357
        assert_eq!(model.count(Part::Tick), 52);
        let angles = tick_angles(&model);
        assert!((angles[51] - 357.0).abs() < 1e-9, "last tick at {}", angles[51]);
    }

    #[test]
    fn ticks_sit_at_multiples_of_the_step() {
        for step in [10.0, 7.0, 45.0, 360.0] {
            let shape = DiscShape {
                tick_step_degrees: step,
                ..DiscShape::default()
            };
            let model = build_disc_model(&shape, 0.4, small_face()).unwrap();
            let angles = tick_angles(&model);
            assert!(!angles.is_empty());
            for (i, angle) in angles.iter().enumerate() {
                let expected = i as f64 * step;
                assert!(expected < 360.0);
                assert!(
                    (angle - expected).abs() < 1e-9,
                    "step {step}: tick {i} at {angle}, expected {expected}"
                );
            }
            // nothing doubles up on the 0 degree tick
            let at_zero = angles.iter().filter(|a| a.abs() < 1e-9 || (360.0 - *a).abs() < 1e-9);
            assert_eq!(at_zero.count(), 1, "step {step}");
        }
    }

    #[test]
    fn tiny_tick_step_is_an_error() {
        let shape = DiscShape {
            tick_step_degrees: 1e-300,
            ..DiscShape::default()
        };
        assert!(matches!(
            build_disc_model(&shape, 0.4, small_face()),
            Err(SpindleError::InvalidArgument(_))
        ));

        let finest = DiscShape {
            tick_step_degrees: 360.0 / MAX_TICK_MARKS as f64,
            ..DiscShape::default()
        };
        let model = build_disc_model(&finest, 0.4, small_face()).unwrap();
        assert!(model.count(Part::Tick) <= MAX_TICK_MARKS + 1);
    }

    #[test]
    fn invalid_thickness_clears_model() {
        let mut scene = assembler();
        scene.rebuild(0.4).unwrap();
        assert!(scene.rebuild(0.0).is_err());
        assert!(scene.model().is_empty());
    }
}
