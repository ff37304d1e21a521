//! # tempo-render
//!
//! The Tempo frame compositor. Fills a surface, draws the timeline's active
//! layers through registered painters, and blends adjacent scenes with
//! GPU transition algorithms.

pub mod gpu;
pub mod layer;
pub mod painter;
pub mod renderer;
pub mod transition;

pub use gpu::GpuContext;
pub use layer::{FrameReport, LayerDrawer};
pub use painter::{PaintContext, Painter, PainterRegistry, ShapePainter, SolidPainter};
pub use renderer::{RenderResult, RenderedFrame, Renderer};
pub use transition::{
    BlendBackend, Blender, SoftwareBackend, TransitionEngine, TransitionRegistry, WgpuBackend,
};
