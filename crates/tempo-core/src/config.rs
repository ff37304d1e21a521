use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{TempoError, TempoResult};
use crate::units::CanvasSize;
use crate::Color;

/// Default bound on a single element's first-use preparation.
pub const DEFAULT_PREPARE_TIMEOUT_SECS: f64 = 10.0;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub fps: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self { fps: 30.0 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub background: Color,
    pub prepare_timeout_secs: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            prepare_timeout_secs: DEFAULT_PREPARE_TIMEOUT_SECS,
        }
    }
}

/// Which implementation runs the per-pixel transition algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlendBackendKind {
    #[default]
    Gpu,
    Software,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TransitionsConfig {
    pub backend: BlendBackendKind,
}

/// Engine configuration, usually loaded from a `tempo.toml`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub transitions: TransitionsConfig,
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> TempoResult<Self> {
        let config: EngineConfig =
            toml::from_str(contents).map_err(|e| TempoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> TempoResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn save_to_file(&self, path: &Path) -> TempoResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| TempoError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values no render could succeed with.
    pub fn validate(&self) -> TempoResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(TempoError::Config(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas.width, self.canvas.height
            )));
        }
        if !(self.timeline.fps.is_finite() && self.timeline.fps > 0.0) {
            return Err(TempoError::Config(format!(
                "fps must be positive, got {}",
                self.timeline.fps
            )));
        }
        if !(self.render.prepare_timeout_secs.is_finite() && self.render.prepare_timeout_secs > 0.0)
        {
            return Err(TempoError::Config(format!(
                "prepare_timeout_secs must be positive, got {}",
                self.render.prepare_timeout_secs
            )));
        }
        Ok(())
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.canvas.width as f64, self.canvas.height as f64)
    }

    pub fn prepare_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.render.prepare_timeout_secs)
    }
}
