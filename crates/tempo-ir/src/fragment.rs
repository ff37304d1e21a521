use serde::{Deserialize, Serialize};
use tempo_core::Dimension;

/// A partial element state naming only the fields an animation affects.
///
/// Absent fields are `None` and are never defaulted: merging a fragment
/// only overwrites what it defines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,
    /// Offset relative to the element's own base position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate_x: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate_y: Option<Dimension>,
}

fn lerp_num(a: Option<f64>, b: Option<f64>, t: f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + (b - a) * t),
        _ => None,
    }
}

fn lerp_dim(a: Option<Dimension>, b: Option<Dimension>, t: f64) -> Option<Dimension> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.lerp(&b, t)),
        _ => None,
    }
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opacity(v: f64) -> Self {
        Self {
            opacity: Some(v),
            ..Self::default()
        }
    }

    pub fn scale(v: f64) -> Self {
        Self {
            scale_x: Some(v),
            scale_y: Some(v),
            ..Self::default()
        }
    }

    pub fn translate(x: Dimension, y: Dimension) -> Self {
        Self {
            translate_x: Some(x),
            translate_y: Some(y),
            ..Self::default()
        }
    }

    pub fn with_opacity(mut self, v: f64) -> Self {
        self.opacity = Some(v);
        self
    }

    pub fn with_position(mut self, x: impl Into<Dimension>, y: impl Into<Dimension>) -> Self {
        self.x = Some(x.into());
        self.y = Some(y.into());
        self
    }

    pub fn with_size(mut self, width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        self.width = Some(width.into());
        self.height = Some(height.into());
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn with_scale(mut self, sx: f64, sy: f64) -> Self {
        self.scale_x = Some(sx);
        self.scale_y = Some(sy);
        self
    }

    pub fn with_translate_x(mut self, dx: Dimension) -> Self {
        self.translate_x = Some(dx);
        self
    }

    pub fn with_translate_y(mut self, dy: Dimension) -> Self {
        self.translate_y = Some(dy);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Fragment::default()
    }

    /// True if the fragment carries relative translation.
    pub fn is_relative(&self) -> bool {
        self.translate_x.is_some() || self.translate_y.is_some()
    }

    /// Overwrite fields defined in `other`; undefined fields are left alone.
    pub fn merge(&mut self, other: &Fragment) {
        if other.x.is_some() {
            self.x = other.x;
        }
        if other.y.is_some() {
            self.y = other.y;
        }
        if other.width.is_some() {
            self.width = other.width;
        }
        if other.height.is_some() {
            self.height = other.height;
        }
        if other.opacity.is_some() {
            self.opacity = other.opacity;
        }
        if other.rotation.is_some() {
            self.rotation = other.rotation;
        }
        if other.scale_x.is_some() {
            self.scale_x = other.scale_x;
        }
        if other.scale_y.is_some() {
            self.scale_y = other.scale_y;
        }
        if other.translate_x.is_some() {
            self.translate_x = other.translate_x;
        }
        if other.translate_y.is_some() {
            self.translate_y = other.translate_y;
        }
    }

    /// Interpolate towards `to`. Only fields present on both sides survive.
    pub fn lerp(&self, to: &Fragment, t: f64) -> Fragment {
        Fragment {
            x: lerp_dim(self.x, to.x, t),
            y: lerp_dim(self.y, to.y, t),
            width: lerp_dim(self.width, to.width, t),
            height: lerp_dim(self.height, to.height, t),
            opacity: lerp_num(self.opacity, to.opacity, t),
            rotation: lerp_num(self.rotation, to.rotation, t),
            scale_x: lerp_num(self.scale_x, to.scale_x, t),
            scale_y: lerp_num(self.scale_y, to.scale_y, t),
            translate_x: lerp_dim(self.translate_x, to.translate_x, t),
            translate_y: lerp_dim(self.translate_y, to.translate_y, t),
        }
    }
}
