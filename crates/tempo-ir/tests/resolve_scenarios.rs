use tempo_core::{to_pixels, Axis, CanvasSize, Color, Dimension, Easing, TimeWindow};
use tempo_ir::animation::Animation;
use tempo_ir::element::{Element, ElementId, ElementKind};
use tempo_ir::fragment::Fragment;
use tempo_ir::layer::{Layer, LayerId};
use tempo_ir::preset::preset;
use tempo_ir::resolve::{absolute_start, phase_at, resolve, Phase};
use tempo_ir::timeline::Timeline;

const CANVAS: CanvasSize = CanvasSize {
    width: 720.0,
    height: 1280.0,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fade(from: f64, to: f64) -> Animation {
    Animation::tween(Fragment::opacity(from), Fragment::opacity(to), 1.0)
}

/// Element{start 0, duration 5} fading in over its first second.
fn fading_element() -> Element {
    Element::new(ElementId::new("title"), ElementKind::Solid { color: Color::WHITE })
        .with_window(TimeWindow::span(0.0, 5.0))
        .with_animation(fade(0.0, 1.0))
        .unwrap()
}

fn opacity_at(element: &Element, t: f64) -> f64 {
    resolve(element, t, CANVAS).opacity
}

#[test]
fn test_fade_in_over_first_second() {
    init_logging();
    let element = fading_element();
    assert_eq!(opacity_at(&element, 0.0), 0.0);
    assert!((opacity_at(&element, 0.5) - 0.5).abs() < 1e-6);
    assert_eq!(opacity_at(&element, 1.0), 1.0);
    assert_eq!(opacity_at(&element, 5.0), 1.0);
}

#[test]
fn test_fade_out_anchored_to_end() {
    init_logging();
    let element = fading_element().with_animation(fade(1.0, 0.0).with_delay(-1.0)).unwrap();
    assert!((opacity_at(&element, 4.0) - 1.0).abs() < 1e-6);
    assert!((opacity_at(&element, 4.5) - 0.5).abs() < 1e-6);
    assert_eq!(opacity_at(&element, 5.0), 0.0);
    // The pending fade-out must not pull opacity up before the fade-in finishes.
    assert!((opacity_at(&element, 0.25) - 0.25).abs() < 1e-6);
}

#[test]
fn test_negative_delay_anchoring() {
    let element = Element::new(ElementId::new("e"), ElementKind::Solid { color: Color::RED })
        .with_window(TimeWindow::between(2.0, 7.0))
        .with_animation(
            Animation::tween(Fragment::scale(1.0), Fragment::scale(3.0), 1.0).with_delay(-1.0),
        )
        .unwrap();
    let animation = &element.animations()[0];
    let start = absolute_start(&element, animation);
    assert_eq!(start, 6.0);

    assert_eq!(resolve(&element, 6.0, CANVAS).scale_x, 1.0);
    assert_eq!(resolve(&element, 7.0, CANVAS).scale_x, 3.0);
    for t in [7.0001, 8.0, 100.0] {
        assert_eq!(phase_at(start, animation.duration(), t), Phase::Finished);
    }
}

#[test]
fn test_visibility_gating_forces_zero_opacity() {
    let element = Element::new(ElementId::new("e"), ElementKind::Solid { color: Color::RED })
        .with_window(TimeWindow::between(1.0, 2.0))
        .with_animation(fade(1.0, 1.0))
        .unwrap();
    for t in [0.0, 0.99, 2.01, 10.0] {
        let state = resolve(&element, t, CANVAS);
        assert_eq!(state.opacity, 0.0, "t={t}");
        assert!(!state.visible);
    }
    assert_eq!(opacity_at(&element, 1.5), 1.0);
}

#[test]
fn test_resolve_is_deterministic() {
    let element = fading_element()
        .with_position(Dimension::Percent(10.0), Dimension::Vh(25.0))
        .with_animation(preset("slideInLeft", 0.8, 0.2, Easing::EaseOutBack))
        .unwrap()
        .with_animation(preset("zoomOut", 0.5, -0.5, Easing::EaseInCubic))
        .unwrap();
    for t in [0.0, 0.3, 0.9, 2.0, 4.7] {
        let a = serde_json::to_vec(&resolve(&element, t, CANVAS)).unwrap();
        let b = serde_json::to_vec(&resolve(&element, t, CANVAS)).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_layers_ordered_by_z_index() {
    let timeline = Timeline::new(30.0, 3.0)
        .unwrap()
        .with_layer(Layer::new(LayerId::new("top")).with_z_index(2))
        .with_layer(Layer::new(LayerId::new("bottom")).with_z_index(0))
        .with_layer(Layer::new(LayerId::new("middle")).with_z_index(1));
    let z: Vec<i32> = timeline
        .active_layers_at(1.0)
        .iter()
        .map(|l| l.z_index)
        .collect();
    assert_eq!(z, vec![0, 1, 2]);
}

#[test]
fn test_percent_resolves_per_axis() {
    assert_eq!(to_pixels("50%", CANVAS, Axis::X).unwrap(), 360.0);
    assert_eq!(to_pixels("50%", CANVAS, Axis::Y).unwrap(), 640.0);
}

#[test]
fn test_unknown_preset_still_animates() {
    init_logging();
    let element = Element::new(ElementId::new("e"), ElementKind::Solid { color: Color::RED })
        .with_window(TimeWindow::span(0.0, 2.0))
        .with_animation(preset("doesNotExist", 1.0, 0.0, Easing::Linear))
        .unwrap();
    assert_eq!(opacity_at(&element, 0.0), 0.0);
    assert_eq!(opacity_at(&element, 1.5), 1.0);
}
