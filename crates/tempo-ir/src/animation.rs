use serde::{Deserialize, Serialize};
use tempo_core::{Easing, TempoError, TempoResult};

use crate::element::ElementId;
use crate::fragment::Fragment;

/// A keyframe: a fragment at a normalized position within the animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Position in [0, 1] of the animation's eased progress.
    pub at: f64,
    pub fragment: Fragment,
}

impl Keyframe {
    pub fn new(at: f64, fragment: Fragment) -> Self {
        Self {
            at: at.clamp(0.0, 1.0),
            fragment,
        }
    }
}

/// Keyframes clamped to [0, 1] and stably sorted by position.
///
/// Every way in (construction and deserialization) goes through
/// [`Keyframes::new`], so sampling can rely on the order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct Keyframes(Vec<Keyframe>);

impl Keyframes {
    pub fn new(frames: Vec<Keyframe>) -> Self {
        let mut frames: Vec<Keyframe> = frames
            .into_iter()
            .map(|k| Keyframe::new(k.at, k.fragment))
            .collect();
        frames.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self(frames)
    }

    pub fn as_slice(&self) -> &[Keyframe] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<Keyframe>> for Keyframes {
    fn from(frames: Vec<Keyframe>) -> Self {
        Self::new(frames)
    }
}

impl From<Keyframes> for Vec<Keyframe> {
    fn from(frames: Keyframes) -> Self {
        frames.0
    }
}

/// What an animation produces over its progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Motion {
    /// Interpolate from one fragment to another.
    Tween { from: Fragment, to: Fragment },
    /// Piecewise-linear interpolation over ordered keyframes.
    Keyframes(Keyframes),
}

impl Motion {
    pub fn keyframes(frames: Vec<Keyframe>) -> Self {
        Motion::Keyframes(Keyframes::new(frames))
    }

    /// Sample the motion at an already-eased progress value.
    fn sample(&self, progress: f64) -> Fragment {
        match self {
            Motion::Tween { from, to } => from.lerp(to, progress),
            Motion::Keyframes(frames) => sample_keyframes(frames.as_slice(), progress),
        }
    }
}

fn sample_keyframes(frames: &[Keyframe], progress: f64) -> Fragment {
    let (Some(first), Some(last)) = (frames.first(), frames.last()) else {
        return Fragment::default();
    };
    if progress <= first.at {
        return first.fragment.clone();
    }
    if progress >= last.at {
        return last.fragment.clone();
    }
    let idx = frames.partition_point(|k| k.at <= progress);
    let a = &frames[idx - 1];
    let b = &frames[idx];
    let span = b.at - a.at;
    if span <= 0.0 {
        return b.fragment.clone();
    }
    // Segments interpolate linearly; easing was applied to `progress` once.
    a.fragment.lerp(&b.fragment, (progress - a.at) / span)
}

/// A timed value producer attached to exactly one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    /// Preset or author-given name, used in diagnostics.
    pub name: String,
    duration: f64,
    /// Signed delay; negative values anchor the animation to the element's end.
    delay: f64,
    easing: Easing,
    motion: Motion,
    /// Non-owning link back to the element this animation is attached to.
    #[serde(skip)]
    owner: Option<ElementId>,
    /// Preset name that was requested but unknown, when this is its stand-in.
    #[serde(skip)]
    substituted_for: Option<String>,
}

impl Animation {
    pub fn new(name: impl Into<String>, motion: Motion, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
            delay: 0.0,
            easing: Easing::Linear,
            motion,
            owner: None,
            substituted_for: None,
        }
    }

    /// Create a simple "from → to" animation.
    pub fn tween(from: Fragment, to: Fragment, duration: f64) -> Self {
        Self::new("tween", Motion::Tween { from, to }, duration)
    }

    pub fn keyframes(frames: Vec<Keyframe>, duration: f64) -> Self {
        Self::new("keyframes", Motion::keyframes(frames), duration)
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn owner(&self) -> Option<&ElementId> {
        self.owner.as_ref()
    }

    pub(crate) fn set_owner(&mut self, owner: ElementId) {
        self.owner = Some(owner);
    }

    /// The unknown preset name this animation replaced, if any.
    pub fn substituted_for(&self) -> Option<&str> {
        self.substituted_for.as_deref()
    }

    pub(crate) fn set_substituted_for(&mut self, requested: impl Into<String>) {
        self.substituted_for = Some(requested.into());
    }

    /// Check the shape before the animation is attached.
    pub fn validate(&self) -> TempoResult<()> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(TempoError::invalid(format!(
                "animation '{}' must have a positive duration, got {}",
                self.name, self.duration
            )));
        }
        if !self.delay.is_finite() {
            return Err(TempoError::invalid(format!(
                "animation '{}' has a non-finite delay",
                self.name
            )));
        }
        if let Motion::Keyframes(frames) = &self.motion {
            if frames.is_empty() {
                return Err(TempoError::invalid(format!(
                    "animation '{}' has no keyframes",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// True if the animation emits offsets relative to the element's base position.
    pub fn is_relative(&self) -> bool {
        match &self.motion {
            Motion::Tween { from, to } => from.is_relative() || to.is_relative(),
            Motion::Keyframes(frames) => frames
                .as_slice()
                .iter()
                .any(|k| k.fragment.is_relative()),
        }
    }

    /// Eased progress at a time relative to the animation's start.
    pub fn eased_progress(&self, relative_time: f64) -> f64 {
        let t = (relative_time / self.duration).clamp(0.0, 1.0);
        self.easing.apply(t)
    }

    /// The state before the animation has run.
    pub fn initial_state(&self) -> Fragment {
        match &self.motion {
            Motion::Tween { from, .. } => from.clone(),
            Motion::Keyframes(_) => self.motion.sample(self.easing.apply(0.0)),
        }
    }

    /// The state once the animation has completed.
    pub fn final_state(&self) -> Fragment {
        match &self.motion {
            Motion::Tween { to, .. } => to.clone(),
            Motion::Keyframes(_) => self.motion.sample(self.easing.apply(1.0)),
        }
    }

    /// The state at `relative_time` seconds after the animation starts.
    pub fn state_at(&self, relative_time: f64) -> Fragment {
        if relative_time <= 0.0 {
            return self.initial_state();
        }
        if relative_time >= self.duration {
            return self.final_state();
        }
        self.motion.sample(self.eased_progress(relative_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fade(from: f64, to: f64) -> Animation {
        Animation::tween(Fragment::opacity(from), Fragment::opacity(to), 1.0)
    }

    #[test]
    fn test_tween_evaluate_linear() {
        let anim = fade(0.0, 1.0);
        assert_eq!(anim.state_at(0.0).opacity, Some(0.0));
        assert!((anim.state_at(0.5).opacity.unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(anim.state_at(1.0).opacity, Some(1.0));
    }

    #[test]
    fn test_tween_ease_in_lags() {
        let anim = fade(0.0, 1.0).with_easing(Easing::EaseInQuad);
        assert!(anim.state_at(0.5).opacity.unwrap() < 0.5);
    }

    #[test]
    fn test_boundaries_match_initial_and_final_for_every_easing() {
        let from = Fragment::opacity(0.2).with_scale(0.5, 0.5);
        let to = Fragment::opacity(0.9).with_scale(1.5, 1.5);
        for easing in Easing::ALL {
            let anim = Animation::tween(from.clone(), to.clone(), 2.0).with_easing(easing);
            assert_eq!(anim.state_at(0.0), anim.initial_state(), "{easing}");
            assert_eq!(anim.state_at(2.0), anim.final_state(), "{easing}");
            let near_end = anim.state_at(2.0 - 1e-9);
            assert!((near_end.opacity.unwrap() - 0.9).abs() < 1e-6, "{easing}");
        }
    }

    #[test]
    fn test_keyframes_interpolate_without_reapplying_easing() {
        let anim = Animation::keyframes(
            vec![
                Keyframe::new(0.0, Fragment::scale(0.0)),
                Keyframe::new(0.5, Fragment::scale(1.0)),
                Keyframe::new(1.0, Fragment::scale(3.0)),
            ],
            1.0,
        )
        .with_easing(Easing::EaseInQuad);

        // t = 0.5 -> eased 0.25 -> halfway through the first segment.
        let mid = anim.state_at(0.5);
        assert!((mid.scale_x.unwrap() - 0.5).abs() < 1e-9);

        // t ~ 0.866 -> eased 0.75 -> halfway through the second segment.
        let t = 0.75f64.sqrt();
        let late = anim.state_at(t);
        assert!((late.scale_x.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_keyframes_are_sorted() {
        let anim = Animation::keyframes(
            vec![
                Keyframe::new(1.0, Fragment::opacity(1.0)),
                Keyframe::new(0.0, Fragment::opacity(0.0)),
            ],
            2.0,
        );
        assert_eq!(anim.initial_state().opacity, Some(0.0));
        assert_eq!(anim.final_state().opacity, Some(1.0));
    }

    #[test]
    fn test_keyframe_variant_cannot_skip_ordering() {
        let direct = Motion::Keyframes(
            vec![
                Keyframe {
                    at: 1.0,
                    fragment: Fragment::opacity(1.0),
                },
                Keyframe {
                    at: 0.0,
                    fragment: Fragment::opacity(0.0),
                },
            ]
            .into(),
        );
        let anim = Animation::new("direct", direct, 1.0);
        assert_eq!(anim.initial_state().opacity, Some(0.0));
        assert_eq!(anim.final_state().opacity, Some(1.0));
    }

    #[test]
    fn test_deserialized_keyframes_are_sorted_and_clamped() {
        let json = r#"{
            "name": "wobble",
            "duration": 1.0,
            "delay": 0.0,
            "easing": "linear",
            "motion": { "keyframes": [
                { "at": 0.0, "fragment": { "opacity": 0.0 } },
                { "at": 1.0, "fragment": { "opacity": 1.0 } },
                { "at": 0.5, "fragment": { "opacity": 0.2 } },
                { "at": 7.0, "fragment": { "opacity": 0.9 } }
            ] }
        }"#;
        let anim: Animation = serde_json::from_str(json).unwrap();
        let Motion::Keyframes(frames) = anim.motion() else {
            panic!("expected keyframes");
        };
        let positions: Vec<f64> = frames.as_slice().iter().map(|k| k.at).collect();
        assert_eq!(positions, vec![0.0, 0.5, 1.0, 1.0]);
        assert!((anim.state_at(0.25).opacity.unwrap() - 0.1).abs() < 1e-9);
        assert_eq!(anim.final_state().opacity, Some(0.9));

        let again: Animation =
            serde_json::from_str(&serde_json::to_string(&anim).unwrap()).unwrap();
        assert_eq!(again.motion(), anim.motion());
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        assert!(fade(0.0, 1.0).validate().is_ok());
        let bad = Animation::tween(Fragment::opacity(0.0), Fragment::opacity(1.0), 0.0);
        assert!(bad.validate().is_err());
        let empty = Animation::keyframes(Vec::new(), 1.0);
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_state_only_names_affected_fields() {
        let state = fade(0.0, 1.0).state_at(0.3);
        assert!(state.x.is_none());
        assert!(state.scale_x.is_none());
        assert!(!state.is_relative());
    }
}
