use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tempo_core::{Color, Dimension, TempoError, TempoResult, TimeWindow};

use crate::animation::Animation;
use crate::fragment::Fragment;

/// Unique identifier for an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    Ellipse,
}

/// What an element draws. Painters are looked up by [`ElementKind::type_name`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// A flat color filling the element's box.
    Solid { color: Color },
    Shape {
        shape: ShapeKind,
        fill: Option<Color>,
        stroke: Option<Color>,
        stroke_width: f64,
    },
    /// An element drawn by an externally registered painter.
    Custom {
        type_name: String,
        #[serde(default)]
        props: serde_json::Value,
    },
}

impl ElementKind {
    pub fn type_name(&self) -> &str {
        match self {
            ElementKind::Solid { .. } => "solid",
            ElementKind::Shape { .. } => "shape",
            ElementKind::Custom { type_name, .. } => type_name,
        }
    }
}

/// The authored, static state of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementConfig {
    pub x: Dimension,
    pub y: Dimension,
    /// Box size; `None` lets the painter use the whole canvas.
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    pub opacity: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Transform origin as a fraction of the box.
    pub anchor_x: f64,
    pub anchor_y: f64,
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self {
            x: Dimension::Px(0.0),
            y: Dimension::Px(0.0),
            width: None,
            height: None,
            opacity: 1.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            anchor_x: 0.5,
            anchor_y: 0.5,
        }
    }
}

impl ElementConfig {
    /// The config as a fragment defining every animatable field it has.
    pub fn to_fragment(&self) -> Fragment {
        Fragment {
            x: Some(self.x),
            y: Some(self.y),
            width: self.width,
            height: self.height,
            opacity: Some(self.opacity),
            rotation: Some(self.rotation),
            scale_x: Some(self.scale_x),
            scale_y: Some(self.scale_y),
            translate_x: None,
            translate_y: None,
        }
    }
}

/// Marks an element generated as one staggered piece of a parent, such as a
/// single letter of split text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub parent: ElementId,
    pub index: usize,
    /// Offset of this segment's start from the parent's start, in seconds.
    pub stagger: f64,
}

/// A time-bounded visual entity with its attached animations.
#[derive(Debug, Serialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub config: ElementConfig,
    animations: Vec<Animation>,
    pub window: TimeWindow,
    pub visible: bool,
    /// Draw order among siblings; lower draws first.
    pub priority: i32,
    pub segment: Option<SegmentInfo>,
    #[serde(skip)]
    prepared: AtomicBool,
    #[serde(skip)]
    appeared: AtomicBool,
}

impl Clone for Element {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            kind: self.kind.clone(),
            config: self.config.clone(),
            animations: self.animations.clone(),
            window: self.window,
            visible: self.visible,
            priority: self.priority,
            segment: self.segment.clone(),
            prepared: AtomicBool::new(self.is_prepared()),
            appeared: AtomicBool::new(self.has_appeared()),
        }
    }
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind) -> Self {
        Self {
            id,
            kind,
            config: ElementConfig::default(),
            animations: Vec::new(),
            window: TimeWindow::always(),
            visible: true,
            priority: 0,
            segment: None,
            prepared: AtomicBool::new(false),
            appeared: AtomicBool::new(false),
        }
    }

    /// Builder: set the time window.
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_config(mut self, config: ElementConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_position(mut self, x: impl Into<Dimension>, y: impl Into<Dimension>) -> Self {
        self.config.x = x.into();
        self.config.y = y.into();
        self
    }

    pub fn with_size(mut self, width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        self.config.width = Some(width.into());
        self.config.height = Some(height.into());
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.config.opacity = opacity;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_segment(mut self, segment: SegmentInfo) -> Self {
        self.segment = Some(segment);
        self
    }

    /// Builder: attach an animation, failing if it is malformed.
    pub fn with_animation(mut self, animation: Animation) -> TempoResult<Self> {
        self.attach(animation)?;
        Ok(self)
    }

    /// Validate an animation, take ownership of it and link it back to this
    /// element.
    pub fn attach(&mut self, mut animation: Animation) -> TempoResult<()> {
        animation.validate().map_err(|e| {
            TempoError::invalid(format!(
                "{} element '{}': {}",
                self.kind.type_name(),
                self.id,
                e
            ))
        })?;
        if let Some(requested) = animation.substituted_for() {
            tracing::warn!(
                element = %self.id,
                kind = self.kind.type_name(),
                preset = requested,
                fallback = %animation.name,
                "element uses an unknown animation preset"
            );
        }
        animation.set_owner(self.id.clone());
        self.animations.push(animation);
        Ok(())
    }

    /// Attached animations, in attachment order.
    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn start_time(&self) -> f64 {
        self.window.start()
    }

    pub fn end_time(&self) -> f64 {
        self.window.end()
    }

    /// End time that negative delays anchor to.
    ///
    /// Segments end early by their own stagger so staggered exits finish in
    /// entrance order. Only the segment's own offset is subtracted.
    pub fn effective_end_time(&self) -> f64 {
        match &self.segment {
            Some(segment) => self.window.end() - segment.stagger,
            None => self.window.end(),
        }
    }

    /// Visible and inside `[start, end]`.
    pub fn is_active_at(&self, t: f64) -> bool {
        self.visible && self.window.contains(t)
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared.load(Ordering::Acquire)
    }

    pub fn mark_prepared(&self) {
        self.prepared.store(true, Ordering::Release);
    }

    pub fn has_appeared(&self) -> bool {
        self.appeared.load(Ordering::Acquire)
    }

    /// Record that the element was drawn. Returns true only for the first
    /// call since the last [`Element::reset_appeared`].
    pub fn mark_appeared(&self) -> bool {
        self.appeared
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn reset_appeared(&self) {
        self.appeared.store(false, Ordering::Release);
    }
}
