use std::time::{Duration, Instant};
use tempo_core::{CanvasSize, FrameBuffer, TempoError, TempoResult};
use tempo_ir::element::{Element, ElementId};
use tempo_ir::layer::Layer;
use tempo_ir::resolve::resolve;

use crate::painter::{PaintContext, Painter, PainterRegistry};

/// What happened while drawing one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Elements drawn, in draw order.
    pub drawn: Vec<ElementId>,
    /// Elements drawn for the first time in their current active window.
    pub appeared: Vec<ElementId>,
}

/// Draws the active elements of a layer onto a surface.
pub struct LayerDrawer<'a> {
    painters: &'a PainterRegistry,
    canvas: CanvasSize,
    prepare_timeout: Duration,
}

impl<'a> LayerDrawer<'a> {
    pub fn new(
        painters: &'a PainterRegistry,
        canvas: CanvasSize,
        prepare_timeout: Duration,
    ) -> Self {
        Self {
            painters,
            canvas,
            prepare_timeout,
        }
    }

    /// Draw every active element of `layer` at time `t`, in priority order.
    ///
    /// Preparation is awaited one element at a time. A timed-out or failed
    /// preparation fails the whole draw.
    pub async fn draw(
        &self,
        layer: &Layer,
        surface: &mut FrameBuffer,
        t: f64,
        report: &mut FrameReport,
    ) -> TempoResult<()> {
        for element in &layer.elements {
            if !element.is_active_at(t) {
                element.reset_appeared();
            }
        }

        let active = layer.active_elements(t);
        tracing::debug!(layer = %layer.id, t, elements = active.len(), "drawing layer");

        for element in active {
            let painter = self.painters.for_element(element)?;
            self.ensure_prepared(painter.as_ref(), element).await?;

            let state = resolve(element, t, self.canvas);
            let ctx = PaintContext {
                element,
                state: &state,
                canvas: self.canvas,
                opacity: state.opacity * layer.opacity,
            };
            painter.paint(surface, &ctx)?;

            report.drawn.push(element.id.clone());
            if element.mark_appeared() {
                report.appeared.push(element.id.clone());
            }
        }
        Ok(())
    }

    async fn ensure_prepared(&self, painter: &dyn Painter, element: &Element) -> TempoResult<()> {
        if element.is_prepared() || !painter.needs_prepare(element) {
            return Ok(());
        }
        let kind = element.kind.type_name().to_string();
        let started = Instant::now();
        match tokio::time::timeout(self.prepare_timeout, painter.prepare(element)).await {
            Ok(Ok(())) => {
                element.mark_prepared();
                tracing::debug!(
                    element = %element.id,
                    kind = %kind,
                    elapsed = ?started.elapsed(),
                    "element prepared"
                );
                Ok(())
            }
            Ok(Err(source)) => {
                tracing::error!(
                    element = %element.id,
                    kind = %kind,
                    error = %source,
                    "element preparation failed"
                );
                Err(TempoError::Prepare {
                    element: element.id.to_string(),
                    kind,
                    source,
                })
            }
            Err(_) => {
                let elapsed = started.elapsed();
                tracing::error!(
                    element = %element.id,
                    kind = %kind,
                    elapsed = ?elapsed,
                    "element preparation timed out"
                );
                Err(TempoError::PrepareTimeout {
                    element: element.id.to_string(),
                    kind,
                    elapsed,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempo_core::{Color, PixelFormat, TimeWindow};
    use tempo_ir::element::ElementKind;
    use tempo_ir::layer::LayerId;

    /// Counts preparations and paints the element box white.
    struct CountingPainter {
        prepares: AtomicUsize,
    }

    #[async_trait]
    impl Painter for CountingPainter {
        fn type_name(&self) -> &str {
            "counted"
        }

        fn needs_prepare(&self, _element: &Element) -> bool {
            true
        }

        async fn prepare(&self, _element: &Element) -> Result<(), anyhow::Error> {
            self.prepares.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn paint(&self, surface: &mut FrameBuffer, ctx: &PaintContext<'_>) -> TempoResult<()> {
            crate::painter::paint_box(surface, ctx, |_, _, _, _| Some(Color::WHITE));
            Ok(())
        }
    }

    fn counted(id: &str, window: TimeWindow) -> Element {
        Element::new(
            ElementId::new(id),
            ElementKind::Custom {
                type_name: "counted".into(),
                props: serde_json::Value::Null,
            },
        )
        .with_window(window)
    }

    #[tokio::test]
    async fn test_prepare_runs_once_and_appearance_resets() {
        let painter = Arc::new(CountingPainter {
            prepares: AtomicUsize::new(0),
        });
        let mut painters = PainterRegistry::new();
        painters.register(painter.clone());
        let drawer = LayerDrawer::new(&painters, CanvasSize::new(4.0, 4.0), Duration::from_secs(1));
        let layer =
            Layer::new(LayerId::new("l")).with_element(counted("a", TimeWindow::between(0.0, 1.0)));
        let mut surface = FrameBuffer::new(4, 4, PixelFormat::Rgba8);

        let mut first = FrameReport::default();
        drawer.draw(&layer, &mut surface, 0.0, &mut first).await.unwrap();
        assert_eq!(first.appeared, vec![ElementId::new("a")]);

        let mut second = FrameReport::default();
        drawer.draw(&layer, &mut surface, 0.5, &mut second).await.unwrap();
        assert_eq!(second.drawn, vec![ElementId::new("a")]);
        assert!(second.appeared.is_empty());
        assert_eq!(painter.prepares.load(Ordering::SeqCst), 1);

        let mut gone = FrameReport::default();
        drawer.draw(&layer, &mut surface, 2.0, &mut gone).await.unwrap();
        assert!(gone.drawn.is_empty());
        assert!(!layer.elements[0].has_appeared());
    }
}
