//! Element state resolution.
//!
//! Merges an element's base config with the states of all its animations at
//! a query time, rebases relative translations, and converts every layout
//! field to pixels.

use serde::Serialize;
use tempo_core::{Axis, CanvasSize, Dimension};

use crate::animation::Animation;
use crate::element::{Element, ElementConfig};
use crate::fragment::Fragment;

/// Tolerance when comparing a query time to an animation's start.
pub const TIME_EPSILON: f64 = 1e-3;

/// Smallest scale handed to a painter.
pub const MIN_SCALE: f64 = 1e-4;

/// A fully interpolated element state in pixel space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedState {
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub opacity: f64,
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub anchor_x: f64,
    pub anchor_y: f64,
    pub visible: bool,
}

impl ResolvedState {
    fn from_fragment(fragment: &Fragment, config: &ElementConfig, canvas: CanvasSize) -> Self {
        let px = |d: Dimension, axis: Axis| d.to_pixels(canvas, axis);
        Self {
            x: px(fragment.x.unwrap_or(config.x), Axis::X),
            y: px(fragment.y.unwrap_or(config.y), Axis::Y),
            width: fragment.width.map(|w| px(w, Axis::X)),
            height: fragment.height.map(|h| px(h, Axis::Y)),
            opacity: fragment.opacity.unwrap_or(config.opacity).clamp(0.0, 1.0),
            rotation: fragment.rotation.unwrap_or(config.rotation),
            scale_x: fragment.scale_x.unwrap_or(config.scale_x).max(MIN_SCALE),
            scale_y: fragment.scale_y.unwrap_or(config.scale_y).max(MIN_SCALE),
            anchor_x: config.anchor_x,
            anchor_y: config.anchor_y,
            visible: true,
        }
    }

    /// Box size, defaulting missing axes to the canvas.
    pub fn size_or(&self, canvas: CanvasSize) -> (f64, f64) {
        (
            self.width.unwrap_or(canvas.width),
            self.height.unwrap_or(canvas.height),
        )
    }
}

/// Where a query time falls relative to one animation's run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Before,
    /// At or within [`TIME_EPSILON`] after the start.
    Starting,
    /// Running, with the time elapsed since the start.
    Running(f64),
    Finished,
}

/// Classify `time` against `[start, start + duration]`.
pub fn phase_at(start: f64, duration: f64, time: f64) -> Phase {
    if time < start - TIME_EPSILON {
        Phase::Before
    } else if time <= start + TIME_EPSILON {
        Phase::Starting
    } else if time > start + duration {
        Phase::Finished
    } else {
        Phase::Running(time - start)
    }
}

/// Absolute start time of `animation` on `element`.
///
/// Non-negative delays count from the element's start; negative delays count
/// back from its effective end.
pub fn absolute_start(element: &Element, animation: &Animation) -> f64 {
    let delay = animation.delay();
    if delay >= 0.0 {
        element.start_time() + delay
    } else {
        element.effective_end_time() + delay
    }
}

/// Resolve `element` at `time` against a canvas.
///
/// Never mutates the element. Outside its active window the element resolves
/// to its config with zero opacity.
pub fn resolve(element: &Element, time: f64, canvas: CanvasSize) -> ResolvedState {
    let config = &element.config;
    let base = config.to_fragment();

    if !element.is_active_at(time) {
        let mut state = ResolvedState::from_fragment(&base, config, canvas);
        state.opacity = 0.0;
        state.visible = false;
        return state;
    }

    if element.animations().is_empty() {
        return ResolvedState::from_fragment(&base, config, canvas);
    }

    let mut ordered: Vec<(f64, &Animation)> = element
        .animations()
        .iter()
        .map(|animation| (absolute_start(element, animation), animation))
        .collect();
    ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged = base;
    for (index, (start, animation)) in ordered.iter().enumerate() {
        let fragment = match phase_at(*start, animation.duration(), time) {
            // A later animation waiting to start must not override one already running.
            Phase::Before if index > 0 => continue,
            Phase::Before | Phase::Starting => animation.initial_state(),
            Phase::Running(elapsed) => animation.state_at(elapsed),
            Phase::Finished => animation.final_state(),
        };
        merged.merge(&fragment);
    }

    rebase_translation(&mut merged, config, canvas);
    ResolvedState::from_fragment(&merged, config, canvas)
}

/// Replace relative translation with an absolute position built on the
/// element's original config position.
fn rebase_translation(state: &mut Fragment, config: &ElementConfig, canvas: CanvasSize) {
    if let Some(dx) = state.translate_x.take() {
        let x = config.x.to_pixels(canvas, Axis::X) + dx.to_pixels(canvas, Axis::X);
        state.x = Some(Dimension::Px(x));
    }
    if let Some(dy) = state.translate_y.take() {
        let y = config.y.to_pixels(canvas, Axis::Y) + dy.to_pixels(canvas, Axis::Y);
        state.y = Some(Dimension::Px(y));
    }
}
