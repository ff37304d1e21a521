use std::sync::Arc;
use std::time::Duration;
use tempo_core::config::DEFAULT_PREPARE_TIMEOUT_SECS;
use tempo_core::hash::{self, ContentHash};
use tempo_core::{CanvasSize, Color, EngineConfig, FrameBuffer, PixelFormat, TempoResult};
use tempo_ir::layer::Layer;
use tempo_ir::timeline::{active_layers, Timeline};

use crate::layer::{FrameReport, LayerDrawer};
use crate::painter::{Painter, PainterRegistry};

/// One composited frame.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub time: f64,
    pub frame: FrameBuffer,
    pub report: FrameReport,
}

impl RenderedFrame {
    pub fn content_hash(&self) -> ContentHash {
        hash::hash_frame(&self.frame)
    }
}

/// The result of rendering a whole timeline.
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// All rendered frames in order.
    pub frames: Vec<FrameBuffer>,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl RenderResult {
    /// Hash over every frame; identical graphs render to identical hashes.
    pub fn content_hash(&self) -> ContentHash {
        hash::hash_frames(&self.frames)
    }

    pub fn frame_hash(&self, index: usize) -> Option<ContentHash> {
        self.frames.get(index).map(hash::hash_frame)
    }
}

/// Frame compositor: fills a surface and draws active layers onto it.
///
/// A renderer holds no per-frame state, so one instance can serve any number
/// of sequential frames. Concurrent renders should each own a renderer.
pub struct Renderer {
    width: u32,
    height: u32,
    background: Color,
    prepare_timeout: Duration,
    painters: PainterRegistry,
}

impl Renderer {
    /// A renderer with the built-in painters and default settings.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Color::BLACK,
            prepare_timeout: Duration::from_secs_f64(DEFAULT_PREPARE_TIMEOUT_SECS),
            painters: PainterRegistry::with_builtin(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.canvas.width, config.canvas.height)
            .with_background(config.render.background)
            .with_prepare_timeout(config.prepare_timeout())
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_prepare_timeout(mut self, timeout: Duration) -> Self {
        self.prepare_timeout = timeout;
        self
    }

    /// Builder: register an additional painter.
    pub fn with_painter(mut self, painter: Arc<dyn Painter>) -> Self {
        self.painters.register(painter);
        self
    }

    pub fn painters_mut(&mut self) -> &mut PainterRegistry {
        &mut self.painters
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.width as f64, self.height as f64)
    }

    /// Composite `layers` at time `t` over `background`.
    ///
    /// Any draw or preparation failure fails the frame; no partial frame is
    /// returned.
    pub async fn render_frame(
        &self,
        layers: &[Layer],
        t: f64,
        background: &Color,
    ) -> TempoResult<RenderedFrame> {
        let mut surface = FrameBuffer::new(self.width, self.height, PixelFormat::Rgba8);
        surface.fill(background);

        for layer in layers.iter().filter(|l| !l.is_active_at(t)) {
            for element in &layer.elements {
                element.reset_appeared();
            }
        }

        let drawer = LayerDrawer::new(&self.painters, self.canvas(), self.prepare_timeout);
        let mut report = FrameReport::default();
        for layer in active_layers(layers, t) {
            drawer.draw(layer, &mut surface, t, &mut report).await?;
        }

        Ok(RenderedFrame {
            time: t,
            frame: surface,
            report,
        })
    }

    /// Composite a timeline at `t` using the configured background.
    pub async fn render_at(&self, timeline: &Timeline, t: f64) -> TempoResult<RenderedFrame> {
        self.render_frame(&timeline.layers, t, &self.background).await
    }

    /// Composite the frame at `index`, exactly `index / fps` seconds in.
    pub async fn render_frame_index(
        &self,
        timeline: &Timeline,
        index: u64,
    ) -> TempoResult<RenderedFrame> {
        self.render_at(timeline, timeline.time_at_frame(index)).await
    }

    /// Render every frame of `timeline` in order.
    pub async fn render_timeline(&self, timeline: &Timeline) -> TempoResult<RenderResult> {
        let count = timeline.frame_count();
        tracing::info!(frames = count, fps = timeline.fps(), "rendering timeline");
        let mut frames = Vec::with_capacity(count as usize);
        for index in 0..count {
            frames.push(self.render_frame_index(timeline, index).await?.frame);
        }
        Ok(RenderResult {
            frames,
            width: self.width,
            height: self.height,
            fps: timeline.fps(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_core::TimeWindow;
    use tempo_ir::element::{Element, ElementId, ElementKind};
    use tempo_ir::layer::LayerId;

    fn full_solid(id: &str, color: Color) -> Element {
        Element::new(ElementId::new(id), ElementKind::Solid { color })
    }

    #[tokio::test]
    async fn test_background_fill() {
        let renderer = Renderer::new(4, 4);
        let frame = renderer.render_frame(&[], 0.0, &Color::BLUE).await.unwrap();
        assert_eq!(frame.frame.get_pixel(3, 3), Some([0, 0, 255, 255]));
        assert!(frame.report.drawn.is_empty());
    }

    #[tokio::test]
    async fn test_higher_z_index_draws_on_top() {
        let renderer = Renderer::new(2, 2);
        let layers = vec![
            Layer::new(LayerId::new("top"))
                .with_z_index(1)
                .with_element(full_solid("red", Color::RED)),
            Layer::new(LayerId::new("bottom")).with_element(full_solid("green", Color::GREEN)),
        ];
        let frame = renderer.render_frame(&layers, 0.0, &Color::BLACK).await.unwrap();
        assert_eq!(frame.frame.get_pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(
            frame.report.drawn,
            vec![ElementId::new("green"), ElementId::new("red")]
        );
    }

    #[tokio::test]
    async fn test_layer_opacity_multiplies() {
        let renderer = Renderer::new(1, 1);
        let layers = vec![Layer::new(LayerId::new("half"))
            .with_opacity(0.5)
            .with_element(full_solid("white", Color::WHITE))];
        let frame = renderer.render_frame(&layers, 0.0, &Color::BLACK).await.unwrap();
        assert_eq!(frame.frame.get_pixel(0, 0), Some([128, 128, 128, 255]));
    }

    #[tokio::test]
    async fn test_inactive_layer_resets_appearance() {
        let renderer = Renderer::new(1, 1);
        let layers = vec![Layer::new(LayerId::new("l"))
            .with_window(TimeWindow::between(0.0, 1.0))
            .with_element(full_solid("a", Color::WHITE))];
        let first = renderer.render_frame(&layers, 0.5, &Color::BLACK).await.unwrap();
        assert_eq!(first.report.appeared.len(), 1);
        renderer.render_frame(&layers, 2.0, &Color::BLACK).await.unwrap();
        let again = renderer.render_frame(&layers, 0.5, &Color::BLACK).await.unwrap();
        assert_eq!(again.report.appeared, vec![ElementId::new("a")]);
    }
}
