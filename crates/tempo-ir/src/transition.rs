use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tempo_core::{Easing, TimeWindow};

/// A declared blend between two adjacent scenes.
///
/// Only the algorithm name is stored; resolving it (including
/// `"random"` and aliases) happens once when a transition engine is built
/// from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionSpec {
    /// Algorithm or alias name. `None` is only valid for a zero-length cut.
    #[serde(default)]
    pub name: Option<String>,
    pub duration: f64,
    pub start_time: f64,
    #[serde(default)]
    pub easing: Easing,
    /// Overrides for the algorithm's parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, f64>,
}

impl TransitionSpec {
    pub fn new(name: impl Into<String>, duration: f64, start_time: f64) -> Self {
        Self {
            name: Some(name.into()),
            duration,
            start_time,
            easing: Easing::Linear,
            params: BTreeMap::new(),
        }
    }

    /// A hard cut at `start_time` with no algorithm.
    pub fn cut(start_time: f64) -> Self {
        Self {
            name: None,
            duration: 0.0,
            start_time,
            easing: Easing::Linear,
            params: BTreeMap::new(),
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: f64) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::span(self.start_time, self.duration)
    }

    /// True while the blend is running. Zero-length cuts contain no time.
    pub fn contains(&self, t: f64) -> bool {
        self.duration > 0.0 && self.window().contains(t)
    }

    /// Raw progress through the transition in [0, 1].
    pub fn progress_at(&self, t: f64) -> f64 {
        if self.duration <= 0.0 {
            return if t >= self.start_time { 1.0 } else { 0.0 };
        }
        ((t - self.start_time) / self.duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_through_window() {
        let spec = TransitionSpec::new("fade", 2.0, 4.0);
        assert_eq!(spec.progress_at(3.0), 0.0);
        assert_eq!(spec.progress_at(5.0), 0.5);
        assert_eq!(spec.progress_at(9.0), 1.0);
        assert!(spec.contains(6.0));
        assert!(!spec.contains(6.1));
    }

    #[test]
    fn test_cut_contains_nothing() {
        let cut = TransitionSpec::cut(3.0);
        assert!(!cut.contains(3.0));
        assert_eq!(cut.progress_at(2.9), 0.0);
        assert_eq!(cut.progress_at(3.0), 1.0);
    }

    #[test]
    fn test_deserialize_with_params() {
        let spec: TransitionSpec = serde_json::from_str(
            r#"{"name":"wipe","duration":1.0,"startTime":2.0,"easing":"easeInOutCubic","params":{"angle":90.0}}"#,
        )
        .unwrap();
        assert_eq!(spec.easing, Easing::EaseInOutCubic);
        assert_eq!(spec.params.get("angle"), Some(&90.0));
    }
}
