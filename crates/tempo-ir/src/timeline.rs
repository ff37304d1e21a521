use serde::Serialize;
use tempo_core::{EngineConfig, TempoError, TempoResult};

use crate::layer::Layer;
use crate::transition::TransitionSpec;

/// Slack used when mapping times onto frame indices.
const FRAME_EPSILON: f64 = 1e-6;

/// Layers from `layers` active at `t`, stably sorted by ascending z-index.
/// Later entries draw on top.
pub fn active_layers(layers: &[Layer], t: f64) -> Vec<&Layer> {
    let mut active: Vec<&Layer> = layers.iter().filter(|l| l.is_active_at(t)).collect();
    active.sort_by_key(|l| l.z_index);
    active
}

/// The root of the scene graph: layers on a fixed frame clock.
#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    fps: f64,
    /// Total duration in seconds.
    duration: f64,
    pub layers: Vec<Layer>,
    pub transitions: Vec<TransitionSpec>,
}

impl Timeline {
    pub fn new(fps: f64, duration: f64) -> TempoResult<Self> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(TempoError::invalid(format!(
                "timeline fps must be positive, got {}",
                fps
            )));
        }
        if !(duration.is_finite() && duration >= 0.0) {
            return Err(TempoError::invalid(format!(
                "timeline duration must be finite and non-negative, got {}",
                duration
            )));
        }
        Ok(Self {
            fps,
            duration,
            layers: Vec::new(),
            transitions: Vec::new(),
        })
    }

    /// A timeline using the configured frame rate.
    pub fn from_config(config: &EngineConfig, duration: f64) -> TempoResult<Self> {
        Self::new(config.timeline.fps, duration)
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn add_transition(&mut self, transition: TransitionSpec) {
        self.transitions.push(transition);
    }

    /// Total number of frames covering the duration.
    pub fn frame_count(&self) -> u64 {
        (self.duration * self.fps - FRAME_EPSILON).ceil().max(0.0) as u64
    }

    /// Time of a frame: exactly `index / fps`.
    pub fn time_at_frame(&self, index: u64) -> f64 {
        index as f64 / self.fps
    }

    /// The frame showing time `t`.
    pub fn frame_at_time(&self, t: f64) -> u64 {
        (t * self.fps + FRAME_EPSILON).floor().max(0.0) as u64
    }

    /// Layers active at `t`, stably sorted by ascending z-index.
    pub fn active_layers_at(&self, t: f64) -> Vec<&Layer> {
        active_layers(&self.layers, t)
    }

    /// The transition running at `t`, if any.
    pub fn transition_at(&self, t: f64) -> Option<&TransitionSpec> {
        self.transitions.iter().find(|tr| tr.contains(t))
    }
}
