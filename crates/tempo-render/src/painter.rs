//! Per-type drawing capabilities.
//!
//! Every element kind is drawn by a [`Painter`] registered under the kind's
//! type name. Painters may expose an async first-use preparation step
//! (font or asset loading, for instance) which the layer drawer awaits with a
//! bounded timeout before the first draw.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tempo_core::{CanvasSize, Color, FrameBuffer, TempoError, TempoResult};
use tempo_ir::element::{Element, ElementKind, ShapeKind};
use tempo_ir::resolve::ResolvedState;

/// What a painter needs to put one element on a surface.
pub struct PaintContext<'a> {
    pub element: &'a Element,
    pub state: &'a ResolvedState,
    pub canvas: CanvasSize,
    /// Element opacity multiplied by its layer's opacity.
    pub opacity: f64,
}

#[async_trait]
pub trait Painter: Send + Sync {
    /// The element type name this painter draws.
    fn type_name(&self) -> &str;

    /// True if `element` still needs [`Painter::prepare`] before drawing.
    fn needs_prepare(&self, _element: &Element) -> bool {
        false
    }

    async fn prepare(&self, _element: &Element) -> Result<(), anyhow::Error> {
        Ok(())
    }

    fn paint(&self, surface: &mut FrameBuffer, ctx: &PaintContext<'_>) -> TempoResult<()>;
}

/// Painters keyed by element type name.
#[derive(Clone, Default)]
pub struct PainterRegistry {
    painters: HashMap<String, Arc<dyn Painter>>,
}

impl PainterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in solid and shape painters.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SolidPainter));
        registry.register(Arc::new(ShapePainter));
        registry
    }

    /// Register a painter, replacing any previous one for the same type.
    pub fn register(&mut self, painter: Arc<dyn Painter>) {
        self.painters.insert(painter.type_name().to_string(), painter);
    }

    pub fn has(&self, type_name: &str) -> bool {
        self.painters.contains_key(type_name)
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<dyn Painter>> {
        self.painters.get(type_name).cloned()
    }

    /// The painter for `element`, or a render error if none is registered.
    pub fn for_element(&self, element: &Element) -> TempoResult<Arc<dyn Painter>> {
        let type_name = element.kind.type_name();
        self.get(type_name).ok_or_else(|| {
            TempoError::Render(format!(
                "no painter registered for {} element '{}'",
                type_name, element.id
            ))
        })
    }

    /// Registered type names, sorted.
    pub fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = self.painters.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Rasterize the element's transformed box.
///
/// `coverage` receives box-local coordinates and the box size and returns the
/// color to blend at that point, if any. Rotation and scale pivot around the
/// element's anchor.
pub fn paint_box<F>(surface: &mut FrameBuffer, ctx: &PaintContext<'_>, coverage: F)
where
    F: Fn(f64, f64, f64, f64) -> Option<Color>,
{
    let state = ctx.state;
    let (w, h) = state.size_or(ctx.canvas);
    if w <= 0.0 || h <= 0.0 || ctx.opacity <= 0.0 {
        return;
    }
    let ax = state.anchor_x * w;
    let ay = state.anchor_y * h;
    let pivot = (state.x + ax, state.y + ay);
    let (sin, cos) = state.rotation.to_radians().sin_cos();

    let to_world = |lx: f64, ly: f64| {
        let dx = (lx - ax) * state.scale_x;
        let dy = (ly - ay) * state.scale_y;
        (pivot.0 + dx * cos - dy * sin, pivot.1 + dx * sin + dy * cos)
    };
    let corners = [to_world(0.0, 0.0), to_world(w, 0.0), to_world(0.0, h), to_world(w, h)];
    let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
    let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
    let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
    let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

    let x0 = min_x.floor().max(0.0) as u32;
    let y0 = min_y.floor().max(0.0) as u32;
    let x1 = max_x.ceil().min(surface.width as f64).max(0.0) as u32;
    let y1 = max_y.ceil().min(surface.height as f64).max(0.0) as u32;

    for py in y0..y1 {
        for px in x0..x1 {
            let dx = px as f64 + 0.5 - pivot.0;
            let dy = py as f64 + 0.5 - pivot.1;
            let lx = (dx * cos + dy * sin) / state.scale_x + ax;
            let ly = (-dx * sin + dy * cos) / state.scale_y + ay;
            if lx < 0.0 || ly < 0.0 || lx >= w || ly >= h {
                continue;
            }
            if let Some(color) = coverage(lx, ly, w, h) {
                surface.blend_pixel(px, py, &color.fade(ctx.opacity));
            }
        }
    }
}

/// Fills the element box with a flat color.
pub struct SolidPainter;

#[async_trait]
impl Painter for SolidPainter {
    fn type_name(&self) -> &str {
        "solid"
    }

    fn paint(&self, surface: &mut FrameBuffer, ctx: &PaintContext<'_>) -> TempoResult<()> {
        let ElementKind::Solid { color } = &ctx.element.kind else {
            return Err(TempoError::Render(format!(
                "solid painter cannot draw {} element '{}'",
                ctx.element.kind.type_name(),
                ctx.element.id
            )));
        };
        paint_box(surface, ctx, |_, _, _, _| Some(*color));
        Ok(())
    }
}

/// Draws filled and stroked rectangles and ellipses.
pub struct ShapePainter;

#[async_trait]
impl Painter for ShapePainter {
    fn type_name(&self) -> &str {
        "shape"
    }

    fn paint(&self, surface: &mut FrameBuffer, ctx: &PaintContext<'_>) -> TempoResult<()> {
        let ElementKind::Shape {
            shape,
            fill,
            stroke,
            stroke_width,
        } = &ctx.element.kind
        else {
            return Err(TempoError::Render(format!(
                "shape painter cannot draw {} element '{}'",
                ctx.element.kind.type_name(),
                ctx.element.id
            )));
        };
        let sw = stroke_width.max(0.0);
        let shape = *shape;
        let fill = *fill;
        let stroke = if sw > 0.0 { *stroke } else { None };

        paint_box(surface, ctx, |lx, ly, w, h| {
            let on_stroke = match shape {
                ShapeKind::Rect => lx < sw || ly < sw || lx >= w - sw || ly >= h - sw,
                ShapeKind::Ellipse => {
                    let (rx, ry) = (w / 2.0, h / 2.0);
                    let nx = (lx - rx) / rx;
                    let ny = (ly - ry) / ry;
                    if nx * nx + ny * ny > 1.0 {
                        return None;
                    }
                    let (ix, iy) = ((rx - sw).max(0.0), (ry - sw).max(0.0));
                    if ix <= 0.0 || iy <= 0.0 {
                        true
                    } else {
                        let ex = (lx - rx) / ix;
                        let ey = (ly - ry) / iy;
                        ex * ex + ey * ey > 1.0
                    }
                }
            };
            match (on_stroke, stroke) {
                (true, Some(stroke)) => Some(stroke),
                _ => fill,
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_core::{Dimension, PixelFormat, TimeWindow};
    use tempo_ir::element::ElementId;
    use tempo_ir::resolve::resolve;

    const CANVAS: CanvasSize = CanvasSize {
        width: 8.0,
        height: 8.0,
    };

    fn paint(painter: &dyn Painter, element: &Element) -> FrameBuffer {
        let mut surface = FrameBuffer::new(8, 8, PixelFormat::Rgba8);
        let state = resolve(element, 0.0, CANVAS);
        let ctx = PaintContext {
            element,
            state: &state,
            canvas: CANVAS,
            opacity: state.opacity,
        };
        painter.paint(&mut surface, &ctx).unwrap();
        surface
    }

    #[test]
    fn test_solid_fills_its_box_only() {
        let element = Element::new(ElementId::new("s"), ElementKind::Solid { color: Color::RED })
            .with_window(TimeWindow::always())
            .with_position(2.0, 2.0)
            .with_size(4.0, Dimension::Percent(50.0));
        let surface = paint(&SolidPainter, &element);
        assert_eq!(surface.get_pixel(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(surface.get_pixel(5, 5), Some([255, 0, 0, 255]));
        assert_eq!(surface.get_pixel(6, 6), Some([0, 0, 0, 0]));
        assert_eq!(surface.get_pixel(1, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_shape_stroke_and_fill() {
        let element = Element::new(
            ElementId::new("r"),
            ElementKind::Shape {
                shape: ShapeKind::Rect,
                fill: Some(Color::BLUE),
                stroke: Some(Color::GREEN),
                stroke_width: 1.0,
            },
        )
        .with_size(8.0, 8.0);
        let surface = paint(&ShapePainter, &element);
        assert_eq!(surface.get_pixel(0, 0), Some([0, 255, 0, 255]));
        assert_eq!(surface.get_pixel(4, 4), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_ellipse_leaves_corners_empty() {
        let element = Element::new(
            ElementId::new("e"),
            ElementKind::Shape {
                shape: ShapeKind::Ellipse,
                fill: Some(Color::WHITE),
                stroke: None,
                stroke_width: 0.0,
            },
        )
        .with_size(8.0, 8.0);
        let surface = paint(&ShapePainter, &element);
        assert_eq!(surface.get_pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.get_pixel(4, 4), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_wrong_kind_is_an_error() {
        let element = Element::new(ElementId::new("s"), ElementKind::Solid { color: Color::RED });
        let state = resolve(&element, 0.0, CANVAS);
        let ctx = PaintContext {
            element: &element,
            state: &state,
            canvas: CANVAS,
            opacity: 1.0,
        };
        let mut surface = FrameBuffer::new(8, 8, PixelFormat::Rgba8);
        assert!(ShapePainter.paint(&mut surface, &ctx).is_err());
    }

    #[test]
    fn test_registry_lookup() {
        let registry = PainterRegistry::with_builtin();
        assert_eq!(registry.available(), vec!["shape", "solid"]);
        let image = Element::new(
            ElementId::new("img"),
            ElementKind::Custom {
                type_name: "image".into(),
                props: serde_json::json!({ "source": "logo.png" }),
            },
        );
        assert!(matches!(
            registry.for_element(&image),
            Err(TempoError::Render(_))
        ));
    }
}
