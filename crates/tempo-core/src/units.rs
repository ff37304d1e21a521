//! Dimension units and their conversion to pixels.
//!
//! Layout fields may be authored as plain pixels or as strings in a relative
//! unit. `x` and `width` resolve against the canvas width, `y` and `height`
//! against the canvas height. The `rpx` unit divides the canvas width into
//! 750 parts regardless of axis.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{TempoError, TempoResult};

/// Number of responsive parts the canvas width is divided into.
pub const RPX_PARTS: f64 = 750.0;

/// Canvas dimensions used as the reference for relative units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Which canvas axis a value resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// A length that may be relative to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DimensionRepr", into = "DimensionRepr")]
pub enum Dimension {
    Px(f64),
    Percent(f64),
    Vw(f64),
    Vh(f64),
    Vmin(f64),
    Vmax(f64),
    Rpx(f64),
}

impl Dimension {
    /// Resolve this dimension to pixels on the given axis.
    pub fn to_pixels(&self, canvas: CanvasSize, axis: Axis) -> f64 {
        match *self {
            Dimension::Px(v) => v,
            Dimension::Percent(v) => {
                let basis = match axis {
                    Axis::X => canvas.width,
                    Axis::Y => canvas.height,
                };
                basis * v / 100.0
            }
            Dimension::Vw(v) => canvas.width * v / 100.0,
            Dimension::Vh(v) => canvas.height * v / 100.0,
            Dimension::Vmin(v) => canvas.width.min(canvas.height) * v / 100.0,
            Dimension::Vmax(v) => canvas.width.max(canvas.height) * v / 100.0,
            Dimension::Rpx(v) => canvas.width * v / RPX_PARTS,
        }
    }

    /// The numeric magnitude, ignoring the unit.
    pub fn value(&self) -> f64 {
        match *self {
            Dimension::Px(v)
            | Dimension::Percent(v)
            | Dimension::Vw(v)
            | Dimension::Vh(v)
            | Dimension::Vmin(v)
            | Dimension::Vmax(v)
            | Dimension::Rpx(v) => v,
        }
    }

    /// Same unit with a different magnitude.
    pub fn with_value(&self, v: f64) -> Dimension {
        match self {
            Dimension::Px(_) => Dimension::Px(v),
            Dimension::Percent(_) => Dimension::Percent(v),
            Dimension::Vw(_) => Dimension::Vw(v),
            Dimension::Vh(_) => Dimension::Vh(v),
            Dimension::Vmin(_) => Dimension::Vmin(v),
            Dimension::Vmax(_) => Dimension::Vmax(v),
            Dimension::Rpx(_) => Dimension::Rpx(v),
        }
    }

    pub fn same_unit(&self, other: &Dimension) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn is_pixels(&self) -> bool {
        matches!(self, Dimension::Px(_))
    }

    /// Interpolate between two dimensions.
    ///
    /// Values in the same unit interpolate numerically. Mixed units cannot be
    /// compared without a canvas, so the start value holds until `t >= 1`.
    pub fn lerp(&self, other: &Dimension, t: f64) -> Dimension {
        if self.same_unit(other) {
            let a = self.value();
            self.with_value(a + (other.value() - a) * t)
        } else if t >= 1.0 {
            *other
        } else {
            *self
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Dimension::Px(0.0)
    }
}

impl From<f64> for Dimension {
    fn from(v: f64) -> Self {
        Dimension::Px(v)
    }
}

impl FromStr for Dimension {
    type Err = TempoError;

    fn from_str(input: &str) -> TempoResult<Self> {
        let s = input.trim();
        let unit_start = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+' || c == 'e'))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(unit_start);
        let value: f64 = number.parse().map_err(|_| TempoError::Unit {
            input: input.to_string(),
        })?;
        if !value.is_finite() {
            return Err(TempoError::Unit {
                input: input.to_string(),
            });
        }
        let dim = match unit.trim().to_ascii_lowercase().as_str() {
            "" | "px" => Dimension::Px(value),
            "%" => Dimension::Percent(value),
            "vw" => Dimension::Vw(value),
            "vh" => Dimension::Vh(value),
            "vmin" => Dimension::Vmin(value),
            "vmax" => Dimension::Vmax(value),
            "rpx" => Dimension::Rpx(value),
            _ => {
                return Err(TempoError::Unit {
                    input: input.to_string(),
                })
            }
        };
        Ok(dim)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Px(v) => write!(f, "{}px", v),
            Dimension::Percent(v) => write!(f, "{}%", v),
            Dimension::Vw(v) => write!(f, "{}vw", v),
            Dimension::Vh(v) => write!(f, "{}vh", v),
            Dimension::Vmin(v) => write!(f, "{}vmin", v),
            Dimension::Vmax(v) => write!(f, "{}vmax", v),
            Dimension::Rpx(v) => write!(f, "{}rpx", v),
        }
    }
}

/// Serialized form: bare numbers are pixels, strings carry a unit.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DimensionRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<DimensionRepr> for Dimension {
    type Error = TempoError;

    fn try_from(repr: DimensionRepr) -> TempoResult<Self> {
        match repr {
            DimensionRepr::Number(v) => Ok(Dimension::Px(v)),
            DimensionRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Dimension> for DimensionRepr {
    fn from(dim: Dimension) -> Self {
        match dim {
            Dimension::Px(v) => DimensionRepr::Number(v),
            other => DimensionRepr::Text(other.to_string()),
        }
    }
}

/// Convert a dimension string to pixels on the given axis.
pub fn to_pixels(input: &str, canvas: CanvasSize, axis: Axis) -> TempoResult<f64> {
    let dim: Dimension = input.parse()?;
    Ok(dim.to_pixels(canvas, axis))
}
