//! Named animation presets.
//!
//! Offset-style presets (slides) are authored as relative translations so
//! they work wherever the element is placed; the resolver rebases them onto
//! the element's own position.

use tempo_core::{Dimension, Easing};

use crate::animation::{Animation, Keyframe, Motion};
use crate::fragment::Fragment;

/// Preset substituted when a requested name is unknown.
pub const DEFAULT_PRESET: &str = "fadeIn";

/// Every preset name, in lookup order.
pub const PRESET_NAMES: &[&str] = &[
    "fadeIn",
    "fadeOut",
    "slideInLeft",
    "slideInRight",
    "slideInUp",
    "slideInDown",
    "slideOutLeft",
    "slideOutRight",
    "slideOutUp",
    "slideOutDown",
    "zoomIn",
    "zoomOut",
    "rotateIn",
    "popIn",
    "blink",
];

fn tween(from: Fragment, to: Fragment) -> Motion {
    Motion::Tween { from, to }
}

fn offset_x(percent: f64) -> Fragment {
    Fragment::translate(Dimension::Percent(percent), Dimension::Px(0.0))
}

fn offset_y(percent: f64) -> Fragment {
    Fragment::translate(Dimension::Px(0.0), Dimension::Percent(percent))
}

/// The motion for a preset name, if it exists. Matching ignores case.
pub fn lookup_preset(name: &str) -> Option<Motion> {
    let key = name.trim().to_ascii_lowercase();
    let motion = match key.as_str() {
        "fadein" => tween(Fragment::opacity(0.0), Fragment::opacity(1.0)),
        "fadeout" => tween(Fragment::opacity(1.0), Fragment::opacity(0.0)),
        "slideinleft" => tween(offset_x(-100.0), offset_x(0.0)),
        "slideinright" => tween(offset_x(100.0), offset_x(0.0)),
        "slideinup" => tween(offset_y(100.0), offset_y(0.0)),
        "slideindown" => tween(offset_y(-100.0), offset_y(0.0)),
        "slideoutleft" => tween(offset_x(0.0), offset_x(-100.0)),
        "slideoutright" => tween(offset_x(0.0), offset_x(100.0)),
        "slideoutup" => tween(offset_y(0.0), offset_y(-100.0)),
        "slideoutdown" => tween(offset_y(0.0), offset_y(100.0)),
        "zoomin" => tween(
            Fragment::scale(0.0).with_opacity(0.0),
            Fragment::scale(1.0).with_opacity(1.0),
        ),
        "zoomout" => tween(
            Fragment::scale(1.0).with_opacity(1.0),
            Fragment::scale(0.0).with_opacity(0.0),
        ),
        "rotatein" => tween(
            Fragment::opacity(0.0).with_rotation(-180.0),
            Fragment::opacity(1.0).with_rotation(0.0),
        ),
        "popin" => Motion::keyframes(vec![
            Keyframe::new(0.0, Fragment::scale(0.0)),
            Keyframe::new(0.7, Fragment::scale(1.1)),
            Keyframe::new(1.0, Fragment::scale(1.0)),
        ]),
        "blink" => Motion::keyframes(vec![
            Keyframe::new(0.0, Fragment::opacity(1.0)),
            Keyframe::new(0.5, Fragment::opacity(0.0)),
            Keyframe::new(1.0, Fragment::opacity(1.0)),
        ]),
        _ => return None,
    };
    Some(motion)
}

/// Build a preset animation.
///
/// Unknown names are logged and replaced with [`DEFAULT_PRESET`]; a missing
/// flourish never aborts a render.
pub fn preset(name: &str, duration: f64, delay: f64, easing: Easing) -> Animation {
    let Some(motion) = lookup_preset(name) else {
        tracing::warn!(
            preset = name,
            fallback = DEFAULT_PRESET,
            "unknown animation preset, substituting default"
        );
        let motion = lookup_preset(DEFAULT_PRESET)
            .unwrap_or_else(|| tween(Fragment::opacity(0.0), Fragment::opacity(1.0)));
        let mut animation = Animation::new(DEFAULT_PRESET, motion, duration)
            .with_delay(delay)
            .with_easing(easing);
        animation.set_substituted_for(name);
        return animation;
    };
    Animation::new(name, motion, duration)
        .with_delay(delay)
        .with_easing(easing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_preset_exists() {
        for name in PRESET_NAMES {
            assert!(lookup_preset(name).is_some(), "{name} missing");
        }
    }

    #[test]
    fn test_unknown_preset_becomes_fade_in() {
        let anim = preset("explodeSideways", 1.0, 0.0, Easing::Linear);
        assert_eq!(anim.name, DEFAULT_PRESET);
        assert_eq!(anim.substituted_for(), Some("explodeSideways"));
        assert_eq!(anim.initial_state().opacity, Some(0.0));
        assert_eq!(anim.final_state().opacity, Some(1.0));
    }

    #[test]
    fn test_slide_presets_are_relative() {
        let anim = preset("slideInLeft", 0.5, 0.0, Easing::EaseOutCubic);
        assert!(anim.is_relative());
        assert_eq!(
            anim.initial_state().translate_x,
            Some(Dimension::Percent(-100.0))
        );
        assert!(!preset("fadeOut", 0.5, -0.5, Easing::Linear).is_relative());
    }

    #[test]
    fn test_preset_carries_timing() {
        let anim = preset("fadeOut", 0.75, -0.75, Easing::EaseInQuad);
        assert_eq!(anim.duration(), 0.75);
        assert_eq!(anim.delay(), -0.75);
        assert_eq!(anim.easing(), Easing::EaseInQuad);
    }
}
