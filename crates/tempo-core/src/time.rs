use serde::{Deserialize, Serialize};
use std::fmt;

/// The span of time during which something is on screen.
///
/// `end` may be `f64::INFINITY` for open-ended windows. When a duration is
/// supplied the end is derived once at construction; later mutation of
/// `start` does not move `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "DeclaredWindow", into = "DeclaredWindow")]
pub struct TimeWindow {
    /// Start time in seconds (>= 0).
    start: f64,
    /// End time in seconds, inclusive. May be infinite.
    end: f64,
    /// Duration the window was declared with, if any.
    duration: Option<f64>,
}

impl TimeWindow {
    /// Build a window from its declared parts.
    ///
    /// A finite `duration` wins over a finite explicit `end`; an explicit
    /// infinite `end` is kept as-is. Without either the window never closes.
    pub fn new(start: f64, end: Option<f64>, duration: Option<f64>) -> Self {
        let start = start.max(0.0);
        let duration = duration.map(|d| d.max(0.0));
        let end = match (end, duration) {
            (Some(e), _) if e.is_infinite() => f64::INFINITY,
            (_, Some(d)) => start + d,
            (Some(e), None) => e.max(start),
            (None, None) => f64::INFINITY,
        };
        Self {
            start,
            end,
            duration,
        }
    }

    /// A window covering `[start, start + duration]`.
    pub fn span(start: f64, duration: f64) -> Self {
        Self::new(start, None, Some(duration))
    }

    /// A window covering `[start, end]`.
    pub fn between(start: f64, end: f64) -> Self {
        Self::new(start, Some(end), None)
    }

    /// A window open from `start` onward.
    pub fn from(start: f64) -> Self {
        Self::new(start, None, None)
    }

    /// A window covering all time.
    pub fn always() -> Self {
        Self::from(0.0)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// The declared duration, if one was given.
    pub fn declared_duration(&self) -> Option<f64> {
        self.duration
    }

    /// Length of the window; infinite for open windows.
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_open_ended(&self) -> bool {
        self.end.is_infinite()
    }

    /// Move the start. The end stays where it was derived.
    pub fn set_start(&mut self, start: f64) {
        self.start = start.max(0.0);
    }

    pub fn set_end(&mut self, end: f64) {
        self.end = end;
    }

    /// True when `start <= t <= end`.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}

/// The serialized form of a window: the parts it was declared with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct DeclaredWindow {
    #[serde(default)]
    start: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
}

impl From<DeclaredWindow> for TimeWindow {
    fn from(raw: DeclaredWindow) -> Self {
        TimeWindow::new(raw.start, raw.end, raw.duration)
    }
}

impl From<TimeWindow> for DeclaredWindow {
    fn from(window: TimeWindow) -> Self {
        // Infinity has no JSON or TOML form; an absent end means open-ended.
        let end = window.end.is_finite().then_some(window.end);
        // Only keep the duration while it still derives the stored end.
        let duration = window
            .duration
            .filter(|d| end.is_some() && window.start + d == window.end);
        DeclaredWindow {
            start: window.start,
            end,
            duration,
        }
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow::always()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_open_ended() {
            write!(f, "[{:.3}s, ∞)", self.start)
        } else {
            write!(f, "[{:.3}s, {:.3}s]", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_derives_end() {
        let w = TimeWindow::span(2.0, 5.0);
        assert!((w.end() - 7.0).abs() < 1e-9);
        assert_eq!(w.declared_duration(), Some(5.0));
    }

    #[test]
    fn test_duration_wins_over_finite_end() {
        let w = TimeWindow::new(1.0, Some(100.0), Some(2.0));
        assert!((w.end() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_infinity_is_kept() {
        let w = TimeWindow::new(1.0, Some(f64::INFINITY), Some(2.0));
        assert!(w.is_open_ended());
    }

    #[test]
    fn test_end_not_rederived_on_mutation() {
        let mut w = TimeWindow::span(0.0, 5.0);
        w.set_start(3.0);
        assert!((w.end() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let w = TimeWindow::between(2.0, 7.0);
        assert!(w.contains(2.0));
        assert!(w.contains(7.0));
        assert!(!w.contains(7.0001));
        assert!(!w.contains(1.9999));
    }

    #[test]
    fn test_deserialize_derives_end_from_duration() {
        let w: TimeWindow =
            serde_json::from_str(r#"{ "start": 2.0, "end": 100.0, "duration": 3.0 }"#).unwrap();
        assert_eq!(w, TimeWindow::span(2.0, 3.0));
        assert!((w.end() - 5.0).abs() < 1e-9);

        let open: TimeWindow = serde_json::from_str(r#"{ "start": 1.0 }"#).unwrap();
        assert!(open.is_open_ended());
    }

    #[test]
    fn test_serialized_window_reads_back_unchanged() {
        let mut moved = TimeWindow::span(0.0, 5.0);
        moved.set_start(3.0);
        for w in [
            TimeWindow::span(1.0, 2.0),
            TimeWindow::between(0.5, 4.0),
            TimeWindow::from(4.0),
            moved,
        ] {
            let json = serde_json::to_string(&w).unwrap();
            let back: TimeWindow = serde_json::from_str(&json).unwrap();
            assert_eq!(back.start(), w.start(), "{json}");
            assert_eq!(back.end(), w.end(), "{json}");
        }
    }

    #[test]
    fn test_open_window() {
        let w = TimeWindow::from(4.0);
        assert!(w.contains(1e9));
        assert_eq!(format!("{}", w), "[4.000s, ∞)");
    }
}
