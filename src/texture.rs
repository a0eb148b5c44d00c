//! Texture compositing: rasterize a 2D visual and clip it with a hard circular mask.
//!
//! Buffers are row-major RGBA, 4 bytes per pixel, premultiplied alpha.

use crate::error::{Result, SpindleError};
use crate::graphics::draw_line;
use std::f64::consts::PI;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::rgba8(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::rgb8(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb8(255, 255, 255);
    pub const GRAY: Rgba = Rgba::rgb8(128, 128, 128);

    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn as_rgba8(self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }
}

/// Owned pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Pixmap {
    /// A fully transparent buffer.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let len = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .filter(|&n| n > 0)
            .ok_or(SpindleError::InvalidDimensions { width, height })?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let offset = (y * self.width + x) * 4;
        Rgba::rgba8(
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        )
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        let offset = (y * self.width + x) * 4;
        let (r, g, b, a) = color.as_rgba8();
        self.data[offset] = r;
        self.data[offset + 1] = g;
        self.data[offset + 2] = b;
        self.data[offset + 3] = a;
    }

    pub fn fill(&mut self, color: Rgba) {
        let (r, g, b, a) = color.as_rgba8();
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[r, g, b, a]);
        }
    }
}

/// Anything that can paint itself into a pixel buffer.
pub trait Visual {
    fn render(&self, target: &mut Pixmap);
}

/// The spindle assembly face: colored sectors, a graduation ring, spokes and a hub.
#[derive(Debug, Clone)]
pub struct DialFace {
    pub sectors: Vec<Rgba>,
    pub spoke_step_degrees: f64,
    pub background: Rgba,
    pub line: Rgba,
}

impl Default for DialFace {
    fn default() -> Self {
        Self {
            sectors: vec![
                Rgba::rgb8(220, 60, 60),
                Rgba::rgb8(240, 200, 60),
                Rgba::rgb8(70, 180, 90),
                Rgba::rgb8(60, 120, 220),
            ],
            spoke_step_degrees: 30.0,
            background: Rgba::rgb8(40, 40, 48),
            line: Rgba::WHITE,
        }
    }
}

impl Visual for DialFace {
    fn render(&self, target: &mut Pixmap) {
        let (w, h) = (target.width(), target.height());
        let cx = w as f64 / 2.0;
        let cy = h as f64 / 2.0;
        let outer = w.min(h) as f64 / 2.0;
        let hub = outer * 0.12;

        target.fill(self.background);

        if !self.sectors.is_empty() {
            let sector_span = 2.0 * PI / self.sectors.len() as f64;
            for y in 0..h {
                for x in 0..w {
                    let dx = x as f64 - cx;
                    let dy = cy - y as f64;
                    let dist = (dx * dx + dy * dy).sqrt();
                    if dist < outer * 0.9 && dist > hub {
                        let angle = dy.atan2(dx).rem_euclid(2.0 * PI);
                        let idx = ((angle / sector_span) as usize).min(self.sectors.len() - 1);
                        target.set_pixel(x, y, self.sectors[idx]);
                    } else if dist <= hub {
                        target.set_pixel(x, y, self.line);
                    }
                }
            }
        }

        if self.spoke_step_degrees > 0.0 {
            let mut deg: f64 = 0.0;
            while deg < 360.0 {
                let (sin, cos) = deg.to_radians().sin_cos();
                draw_line(
                    cx + cos * hub,
                    cy - sin * hub,
                    cx + cos * outer * 0.9,
                    cy - sin * outer * 0.9,
                    target,
                    self.line,
                );
                deg += self.spoke_step_degrees;
            }
        }
    }
}

/// Opaque white mask whose alpha is 255 strictly inside `width / 2` of the center.
pub fn circular_mask(width: usize, height: usize) -> Result<Pixmap> {
    let mut mask = Pixmap::new(width, height)?;
    let radius = (width / 2) as f64;
    let cx = (width / 2) as f64;
    let cy = (height / 2) as f64;

    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            let alpha = if dist < radius { 255 } else { 0 };
            mask.set_pixel(x, y, Rgba::rgba8(255, 255, 255, alpha));
        }
    }
    Ok(mask)
}

/// Multiply every channel of `source` by the mask's alpha.
pub fn apply_mask(source: &mut Pixmap, mask: &Pixmap) -> Result<()> {
    if source.width() != mask.width() || source.height() != mask.height() {
        return Err(SpindleError::InvalidArgument(format!(
            "mask is {}x{} but source is {}x{}",
            mask.width(),
            mask.height(),
            source.width(),
            source.height()
        )));
    }
    for (px, m) in source
        .data_mut()
        .chunks_exact_mut(4)
        .zip(mask.data().chunks_exact(4))
    {
        let alpha = m[3] as u16;
        for channel in px.iter_mut() {
            *channel = (*channel as u16 * alpha / 255) as u8;
        }
    }
    Ok(())
}

/// A circularly clipped image used as a diffuse material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pixels: Pixmap,
}

impl Texture {
    pub fn pixels(&self) -> &Pixmap {
        &self.pixels
    }

    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    /// Nearest-neighbour lookup; `(0, 0)` is the top-left corner.
    pub fn sample(&self, u: f64, v: f64) -> Rgba {
        let w = self.pixels.width();
        let h = self.pixels.height();
        let x = ((u.clamp(0.0, 1.0) * w as f64) as usize).min(w - 1);
        let y = ((v.clamp(0.0, 1.0) * h as f64) as usize).min(h - 1);
        self.pixels.pixel(x, y)
    }
}

/// Rasterize `visual` at `width x height` and clip it to a circle.
pub fn render_masked_texture(visual: &dyn Visual, width: usize, height: usize) -> Result<Texture> {
    let mut pixels = Pixmap::new(width, height)?;
    visual.render(&mut pixels);
    let mask = circular_mask(width, height)?;
    apply_mask(&mut pixels, &mask)?;
    Ok(Texture { pixels })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Solid(Rgba);

    impl Visual for Solid {
        fn render(&self, target: &mut Pixmap) {
            target.fill(self.0);
        }
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let err = render_masked_texture(&Solid(Rgba::WHITE), 0, 200).unwrap_err();
        assert!(matches!(
            err,
            SpindleError::InvalidDimensions {
                width: 0,
                height: 200
            }
        ));
        assert!(circular_mask(200, 0).is_err());
    }

    #[test]
    fn overflowing_dimensions_are_rejected() {
        assert!(matches!(
            Pixmap::new(usize::MAX, 2),
            Err(SpindleError::InvalidDimensions { height: 2, .. })
        ));
    }

    #[test]
    fn mask_boundary_is_strict() {
        let mask = circular_mask(200, 200).unwrap();
        // distance 99 from (100, 100)
        assert_eq!(mask.pixel(199, 100).a, 255);
        assert_eq!(mask.pixel(100, 1).a, 255);
        // exactly 100
        assert_eq!(mask.pixel(0, 100).a, 0);
        assert_eq!(mask.pixel(100, 0).a, 0);
        assert_eq!(mask.pixel(160, 180).a, 0);
        // 20^2 + 99^2 = 101^2
        assert_eq!(mask.pixel(120, 199).a, 0);
        assert_eq!(mask.pixel(170, 170).a, 255);
    }

    #[test]
    fn mask_rgb_is_white() {
        let mask = circular_mask(16, 16).unwrap();
        for px in mask.data().chunks_exact(4) {
            assert_eq!(&px[..3], &[255, 255, 255]);
        }
    }

    #[test]
    fn masked_texture_clears_outside_and_keeps_inside() {
        let color = Rgba::rgb8(10, 120, 250);
        let tex = render_masked_texture(&Solid(color), 200, 200).unwrap();
        assert_eq!(tex.pixels().pixel(100, 100), color);
        assert_eq!(tex.pixels().pixel(199, 100), color);
        assert_eq!(tex.pixels().pixel(0, 0), Rgba::TRANSPARENT);
        assert_eq!(tex.pixels().pixel(0, 100), Rgba::TRANSPARENT);
    }

    #[test]
    fn apply_mask_rejects_size_mismatch() {
        let mut source = Pixmap::new(4, 4).unwrap();
        let mask = circular_mask(8, 8).unwrap();
        assert!(matches!(
            apply_mask(&mut source, &mask),
            Err(SpindleError::InvalidArgument(_))
        ));
    }

    #[test]
    fn sample_maps_uv_to_pixels() {
        let tex = render_masked_texture(&DialFace::default(), 200, 200).unwrap();
        assert_eq!(tex.sample(0.0, 0.0), Rgba::TRANSPARENT);
        assert_eq!(tex.sample(1.0, 1.0), Rgba::TRANSPARENT);
        // the hub is drawn in the line color
        assert_eq!(tex.sample(0.5, 0.5), Rgba::WHITE);
    }

    #[test]
    fn dial_face_sectors_follow_angle() {
        let dial = DialFace {
            spoke_step_degrees: 0.0,
            ..DialFace::default()
        };
        let mut target = Pixmap::new(100, 100).unwrap();
        dial.render(&mut target);
        // first quadrant (up-right in image space) gets sector 0
        assert_eq!(target.pixel(70, 30), dial.sectors[0]);
        assert_eq!(target.pixel(30, 30), dial.sectors[1]);
        assert_eq!(target.pixel(30, 70), dial.sectors[2]);
        assert_eq!(target.pixel(70, 70), dial.sectors[3]);
    }
}
