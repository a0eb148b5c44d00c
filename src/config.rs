//! Configuration loader: geometry, animation and texture parameters from TOML.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable consulted when no `--config` flag is given.
pub const CONFIG_ENV: &str = "SPINDLE3D_CONFIG";

/// Upper bound on tick marks around the ring, so the smallest step is 0.1 degrees.
pub const MAX_TICK_MARKS: usize = 3600;

/// Largest accepted texture side, in pixels.
pub const MAX_TEXTURE_SIDE: usize = 4096;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub radius: f64,
    pub thickness: f64,
    pub segments: usize,
    pub tick_step_degrees: f64,
    pub tick_line_width: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            thickness: 0.4,
            segments: 64,
            tick_step_degrees: 10.0,
            tick_line_width: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub roll_step_deg: f64,
    pub move_unit: f64,
    pub start_limit_deg: f64,
    pub stop_limit_deg: f64,
    pub tick_interval_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            roll_step_deg: 4.0,
            move_unit: 0.5,
            start_limit_deg: -90.0,
            stop_limit_deg: 0.0,
            tick_interval_ms: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
        }
    }
}

/// All tunables, one table per concern.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpindleConfig {
    pub geometry: GeometryConfig,
    pub animation: AnimationConfig,
    pub texture: TextureConfig,
}

impl SpindleConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SpindleConfig = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Run all range checks, collecting every violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();
        let g = &self.geometry;
        let a = &self.animation;

        if g.segments < 3 {
            errors.push(format!("geometry.segments must be >= 3, got {}", g.segments));
        }
        require_positive(&mut errors, "geometry.radius", g.radius);
        require_positive(&mut errors, "geometry.thickness", g.thickness);
        require_positive(&mut errors, "geometry.tick_line_width", g.tick_line_width);
        let min_step = 360.0 / MAX_TICK_MARKS as f64;
        if !(g.tick_step_degrees >= min_step && g.tick_step_degrees <= 360.0) {
            errors.push(format!(
                "geometry.tick_step_degrees must be in [{min_step}, 360], got {}",
                g.tick_step_degrees
            ));
        }

        require_positive(&mut errors, "animation.move_unit", a.move_unit);
        if !(a.start_limit_deg < a.stop_limit_deg) {
            errors.push(format!(
                "animation.start_limit_deg ({}) must be below stop_limit_deg ({})",
                a.start_limit_deg, a.stop_limit_deg
            ));
        }
        if a.tick_interval_ms == 0 {
            errors.push("animation.tick_interval_ms must be >= 1".into());
        }

        let side = 1..=MAX_TEXTURE_SIDE;
        if !side.contains(&self.texture.width) || !side.contains(&self.texture.height) {
            errors.push(format!(
                "texture size must be within 1..={MAX_TEXTURE_SIDE} per side, got {}x{}",
                self.texture.width, self.texture.height
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(errors.join("; ")))
        }
    }
}

fn require_positive(errors: &mut Vec<String>, name: &str, value: f64) {
    if !(value > 0.0) || !value.is_finite() {
        errors.push(format!("{name} must be a positive finite number, got {value}"));
    }
}

/// Load config from a specific TOML file path.
pub fn load_from_path(path: &Path) -> Result<SpindleConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;
    let config = SpindleConfig::from_toml(&content)?;
    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Resolve the config source.
///
/// Tries in order:
/// 1. the explicit path (from `--config`)
/// 2. the `SPINDLE3D_CONFIG` environment variable
/// 3. built-in defaults
pub fn load(explicit: Option<&Path>) -> Result<SpindleConfig, ConfigError> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

    match path {
        Some(path) => load_from_path(&path),
        None => {
            info!("no config file given, using defaults");
            Ok(SpindleConfig::default())
        }
    }
}
