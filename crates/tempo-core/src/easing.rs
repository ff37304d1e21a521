use serde::{Deserialize, Serialize};

/// Easing curve applied to a normalized progress value.
///
/// Easings are looked up by id from a fixed table. An unknown id resolves to
/// [`Easing::Linear`] and never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Easing {
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInBack,
    EaseOutBack,
    EaseInOutBack,
    EaseInBounce,
    EaseOutBounce,
    EaseInOutBounce,
}

const BACK_C1: f64 = 1.70158;
const BACK_C2: f64 = BACK_C1 * 1.525;
const BACK_C3: f64 = BACK_C1 + 1.0;

impl Default for Easing {
    fn default() -> Self {
        Easing::Linear
    }
}

impl Easing {
    /// Every shipped easing, in table order.
    pub const ALL: [Easing; 13] = [
        Easing::Linear,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInBack,
        Easing::EaseOutBack,
        Easing::EaseInOutBack,
        Easing::EaseInBounce,
        Easing::EaseOutBounce,
        Easing::EaseInOutBounce,
    ];

    /// Canonical id of this easing.
    pub fn id(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseInQuad => "easeInQuad",
            Easing::EaseOutQuad => "easeOutQuad",
            Easing::EaseInOutQuad => "easeInOutQuad",
            Easing::EaseInCubic => "easeInCubic",
            Easing::EaseOutCubic => "easeOutCubic",
            Easing::EaseInOutCubic => "easeInOutCubic",
            Easing::EaseInBack => "easeInBack",
            Easing::EaseOutBack => "easeOutBack",
            Easing::EaseInOutBack => "easeInOutBack",
            Easing::EaseInBounce => "easeInBounce",
            Easing::EaseOutBounce => "easeOutBounce",
            Easing::EaseInOutBounce => "easeInOutBounce",
        }
    }

    /// Look up an easing by id. Case, `-` and `_` are ignored, and the bare
    /// `easeIn`/`easeOut`/`easeInOut` ids are quadratic.
    pub fn lookup(id: &str) -> Option<Easing> {
        let key: String = id
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let easing = match key.as_str() {
            "linear" | "" => Easing::Linear,
            "easein" | "easeinquad" | "quadin" => Easing::EaseInQuad,
            "easeout" | "easeoutquad" | "quadout" => Easing::EaseOutQuad,
            "easeinout" | "easeinoutquad" | "quadinout" => Easing::EaseInOutQuad,
            "easeincubic" | "cubicin" => Easing::EaseInCubic,
            "easeoutcubic" | "cubicout" => Easing::EaseOutCubic,
            "easeinoutcubic" | "cubicinout" => Easing::EaseInOutCubic,
            "easeinback" | "backin" => Easing::EaseInBack,
            "easeoutback" | "backout" => Easing::EaseOutBack,
            "easeinoutback" | "backinout" => Easing::EaseInOutBack,
            "easeinbounce" | "bouncein" => Easing::EaseInBounce,
            "easeoutbounce" | "bounceout" => Easing::EaseOutBounce,
            "easeinoutbounce" | "bounceinout" => Easing::EaseInOutBounce,
            _ => return None,
        };
        Some(easing)
    }

    /// Look up an easing by id, falling back to linear for unknown ids.
    pub fn from_id(id: &str) -> Easing {
        Self::lookup(id).unwrap_or_else(|| {
            tracing::warn!(easing = id, "unknown easing, falling back to linear");
            Easing::Linear
        })
    }

    /// Apply the easing function to a normalized time value t in [0, 1].
    ///
    /// Back easings overshoot the unit range in the middle of the curve;
    /// both endpoints are exact.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => t * (2.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => {
                let t1 = t - 1.0;
                t1 * t1 * t1 + 1.0
            }
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let t1 = 2.0 * t - 2.0;
                    0.5 * t1 * t1 * t1 + 1.0
                }
            }
            Easing::EaseInBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Easing::EaseOutBack => {
                let t1 = t - 1.0;
                1.0 + BACK_C3 * t1 * t1 * t1 + BACK_C1 * t1 * t1
            }
            Easing::EaseInOutBack => {
                if t < 0.5 {
                    let t2 = 2.0 * t;
                    (t2 * t2 * ((BACK_C2 + 1.0) * t2 - BACK_C2)) / 2.0
                } else {
                    let t2 = 2.0 * t - 2.0;
                    (t2 * t2 * ((BACK_C2 + 1.0) * t2 + BACK_C2) + 2.0) / 2.0
                }
            }
            Easing::EaseInBounce => 1.0 - bounce_out(1.0 - t),
            Easing::EaseOutBounce => bounce_out(t),
            Easing::EaseInOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
        }
    }
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

impl From<String> for Easing {
    fn from(id: String) -> Self {
        Easing::from_id(&id)
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.id().to_string()
    }
}

impl std::fmt::Display for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_linear() {
        let e = Easing::Linear;
        assert!((e.apply(0.0)).abs() < 0.001);
        assert!((e.apply(0.5) - 0.5).abs() < 0.001);
        assert!((e.apply(1.0) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_easing_ease_in() {
        let e = Easing::EaseInQuad;
        assert!(e.apply(0.5) < 0.5);
    }

    #[test]
    fn test_easing_ease_out() {
        let e = Easing::EaseOutQuad;
        assert!(e.apply(0.5) > 0.5);
    }

    #[test]
    fn test_easing_boundaries() {
        for easing in Easing::ALL {
            assert!(
                (easing.apply(0.0)).abs() < 1e-9,
                "{:?} should start at 0",
                easing
            );
            assert!(
                (easing.apply(1.0) - 1.0).abs() < 1e-9,
                "{:?} should end at 1",
                easing
            );
        }
    }

    #[test]
    fn test_back_overshoots() {
        assert!(Easing::EaseOutBack.apply(0.7) > 1.0);
        assert!(Easing::EaseInBack.apply(0.2) < 0.0);
    }

    #[test]
    fn test_lookup_ids_round_trip() {
        for easing in Easing::ALL {
            assert_eq!(Easing::lookup(easing.id()), Some(easing));
        }
    }

    #[test]
    fn test_lookup_aliases() {
        assert_eq!(Easing::from_id("easeIn"), Easing::EaseInQuad);
        assert_eq!(Easing::from_id("ease-out-bounce"), Easing::EaseOutBounce);
        assert_eq!(Easing::from_id("EASE_IN_OUT_CUBIC"), Easing::EaseInOutCubic);
    }

    #[test]
    fn test_unknown_id_falls_back_to_linear() {
        assert_eq!(Easing::from_id("wobble"), Easing::Linear);
    }

    #[test]
    fn test_serde_uses_ids() {
        let json = serde_json::to_string(&Easing::EaseOutBack).unwrap();
        assert_eq!(json, "\"easeOutBack\"");
        let back: Easing = serde_json::from_str("\"nonsense\"").unwrap();
        assert_eq!(back, Easing::Linear);
    }
}
