//! # tempo-ir
//!
//! The Tempo scene graph: a timeline of priority-ordered layers, each holding
//! time-bounded elements with attached animations.
//!
//! The graph is built once by an external builder and then only read. The
//! [`resolve`] entry point turns an element and a query time into the fully
//! interpolated, pixel-space state a painter draws from.

pub mod animation;
pub mod element;
pub mod fragment;
pub mod layer;
pub mod preset;
pub mod resolve;
pub mod timeline;
pub mod transition;

pub use animation::{Animation, Keyframe, Keyframes, Motion};
pub use element::{Element, ElementConfig, ElementId, ElementKind, SegmentInfo, ShapeKind};
pub use fragment::Fragment;
pub use layer::{Layer, LayerId};
pub use preset::preset;
pub use resolve::{resolve, ResolvedState};
pub use timeline::{active_layers, Timeline};
pub use transition::TransitionSpec;
