//! # tempo-core
//!
//! Core types and primitives for the Tempo composition engine.
//! This crate contains foundational types shared across all Tempo crates:
//! time windows, easing curves, dimension units, colors, frame buffers,
//! content hashes, engine configuration and the error type.

pub mod color;
pub mod config;
pub mod easing;
pub mod error;
pub mod frame;
pub mod hash;
pub mod time;
pub mod units;

pub use color::Color;
pub use config::EngineConfig;
pub use easing::Easing;
pub use error::{TempoError, TempoResult};
pub use frame::{FrameBuffer, PixelFormat};
pub use time::TimeWindow;
pub use units::{to_pixels, Axis, CanvasSize, Dimension};
