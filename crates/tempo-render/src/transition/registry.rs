//! Named per-pixel transition algorithms and parameterized aliases.
//!
//! Every algorithm ships twice: a WGSL body for the GPU backend and a CPU
//! function with the same math for the software backend. A WGSL body defines
//! `fn transition(uv: vec2<f32>) -> vec4<f32>` and may call `getFromColor`,
//! `getToColor` and `smoothEdge`, and read `u.progress`, `u.ratio`,
//! `u.param0` and `u.param1`.

use std::collections::BTreeMap;
use tempo_core::{TempoError, TempoResult};

/// Number of scalar parameters an algorithm can declare.
pub const MAX_PARAMS: usize = 8;

/// Reads the two input frames as normalized RGBA.
pub struct Sampler<'a> {
    from: &'a [u8],
    to: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> Sampler<'a> {
    /// Both slices must be tightly packed RGBA of `width * height` pixels.
    pub fn new(from: &'a [u8], to: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            from,
            to,
            width,
            height,
        }
    }

    pub fn ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    fn offset(&self, uv: [f32; 2]) -> usize {
        let w = self.width as f32;
        let h = self.height as f32;
        let x = (uv[0] * w).floor().clamp(0.0, w - 1.0) as usize;
        let y = (uv[1] * h).floor().clamp(0.0, h - 1.0) as usize;
        (y * self.width as usize + x) * 4
    }

    fn read(data: &[u8], offset: usize) -> [f32; 4] {
        match data.get(offset..offset + 4) {
            Some(px) => [
                px[0] as f32 / 255.0,
                px[1] as f32 / 255.0,
                px[2] as f32 / 255.0,
                px[3] as f32 / 255.0,
            ],
            None => [0.0; 4],
        }
    }

    pub fn from_color(&self, uv: [f32; 2]) -> [f32; 4] {
        Self::read(self.from, self.offset(uv))
    }

    pub fn to_color(&self, uv: [f32; 2]) -> [f32; 4] {
        Self::read(self.to, self.offset(uv))
    }
}

/// CPU implementation of an algorithm at one normalized coordinate.
pub type CpuBlendFn = fn(&Sampler<'_>, [f32; 2], f32, &[f32; MAX_PARAMS]) -> [f32; 4];

/// A per-pixel blend between two frames.
#[derive(Clone)]
pub struct Algorithm {
    pub name: String,
    /// Declared parameters with defaults, in uniform packing order.
    pub params: Vec<(String, f64)>,
    pub wgsl: String,
    pub cpu: CpuBlendFn,
}

impl std::fmt::Debug for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Algorithm")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

impl Algorithm {
    pub fn new(name: impl Into<String>, wgsl: impl Into<String>, cpu: CpuBlendFn) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            wgsl: wgsl.into(),
            cpu,
        }
    }

    /// Builder: declare a parameter and its default.
    pub fn with_param(mut self, name: impl Into<String>, default: f64) -> Self {
        self.params.push((name.into(), default));
        self
    }

    /// Index of a declared parameter.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|(n, _)| n == name)
    }
}

/// A name expanding to a base algorithm with parameter overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub base: String,
    pub params: Vec<(String, f64)>,
}

/// Lookup key: lowercase with `-`, `_` and whitespace removed.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Registry of transition algorithms and aliases, ordered by name.
#[derive(Debug, Clone)]
pub struct TransitionRegistry {
    algorithms: BTreeMap<String, Algorithm>,
    aliases: BTreeMap<String, Alias>,
}

impl Default for TransitionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TransitionRegistry {
    /// A registry with nothing in it.
    pub fn empty() -> Self {
        Self {
            algorithms: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }

    /// The shipped algorithms and aliases.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for algorithm in builtin_algorithms() {
            registry.register(algorithm);
        }
        let aliases: [(&str, &str, &[(&str, f64)]); 10] = [
            ("fadeblack", "fadecolor", &[("r", 0.0), ("g", 0.0), ("b", 0.0)]),
            ("fadewhite", "fadecolor", &[("r", 1.0), ("g", 1.0), ("b", 1.0)]),
            ("wipeleft", "wipe", &[("dx", -1.0), ("dy", 0.0)]),
            ("wiperight", "wipe", &[("dx", 1.0), ("dy", 0.0)]),
            ("wipeup", "wipe", &[("dx", 0.0), ("dy", -1.0)]),
            ("wipedown", "wipe", &[("dx", 0.0), ("dy", 1.0)]),
            ("slideleft", "directional", &[("dx", 1.0), ("dy", 0.0)]),
            ("slideright", "directional", &[("dx", -1.0), ("dy", 0.0)]),
            ("slideup", "directional", &[("dx", 0.0), ("dy", 1.0)]),
            ("slidedown", "directional", &[("dx", 0.0), ("dy", -1.0)]),
        ];
        for (name, base, params) in aliases {
            registry.aliases.insert(
                name.to_string(),
                Alias {
                    base: base.to_string(),
                    params: params.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
                },
            );
        }
        registry
    }

    /// Register an algorithm, replacing any previous one with the same name.
    pub fn register(&mut self, algorithm: Algorithm) {
        self.algorithms
            .insert(normalize_name(&algorithm.name), algorithm);
    }

    /// Register an alias for an existing algorithm.
    pub fn register_alias(
        &mut self,
        name: &str,
        base: &str,
        params: Vec<(String, f64)>,
    ) -> TempoResult<()> {
        let base_key = normalize_name(base);
        if !self.algorithms.contains_key(&base_key) {
            return Err(TempoError::unknown_transition(base));
        }
        self.aliases.insert(
            normalize_name(name),
            Alias {
                base: base_key,
                params,
            },
        );
        Ok(())
    }

    pub fn algorithm(&self, name: &str) -> Option<&Algorithm> {
        self.algorithms.get(&normalize_name(name))
    }

    pub fn alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.get(&normalize_name(name))
    }

    /// Algorithm names in sorted order. Aliases are not included.
    pub fn algorithm_names(&self) -> Vec<&str> {
        self.algorithms.keys().map(String::as_str).collect()
    }

    pub fn alias_names(&self) -> Vec<&str> {
        self.aliases.keys().map(String::as_str).collect()
    }

    /// Resolve a name to its algorithm plus alias overrides.
    pub fn resolve(&self, name: &str) -> Option<(&Algorithm, Vec<(String, f64)>)> {
        if let Some(algorithm) = self.algorithm(name) {
            return Some((algorithm, Vec::new()));
        }
        let alias = self.alias(name)?;
        let algorithm = self.algorithm(&alias.base)?;
        Some((algorithm, alias.params.clone()))
    }
}

fn mix(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Hermite step between two edges; edges may be given in either order.
fn smooth_edge(e0: f32, e1: f32, x: f32) -> f32 {
    if e0 == e1 {
        return if x < e0 { 0.0 } else { 1.0 };
    }
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// GLSL-style sign: zero stays zero.
fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

const FADE_WGSL: &str = r#"
fn transition(uv: vec2<f32>) -> vec4<f32> {
    return mix(getFromColor(uv), getToColor(uv), u.progress);
}
"#;

fn fade(s: &Sampler<'_>, uv: [f32; 2], progress: f32, _p: &[f32; MAX_PARAMS]) -> [f32; 4] {
    mix(s.from_color(uv), s.to_color(uv), progress)
}

const FADE_COLOR_WGSL: &str = r#"
fn transition(uv: vec2<f32>) -> vec4<f32> {
    let color = vec4<f32>(u.param0.xyz, 1.0);
    let phase = u.param0.w;
    let a = mix(color, getFromColor(uv), smoothEdge(1.0 - phase, 0.0, u.progress));
    let b = mix(color, getToColor(uv), smoothEdge(phase, 1.0, u.progress));
    return mix(a, b, u.progress);
}
"#;

fn fade_color(s: &Sampler<'_>, uv: [f32; 2], progress: f32, p: &[f32; MAX_PARAMS]) -> [f32; 4] {
    let color = [p[0], p[1], p[2], 1.0];
    let phase = p[3];
    let a = mix(color, s.from_color(uv), smooth_edge(1.0 - phase, 0.0, progress));
    let b = mix(color, s.to_color(uv), smooth_edge(phase, 1.0, progress));
    mix(a, b, progress)
}

const WIPE_WGSL: &str = r#"
fn transition(uv: vec2<f32>) -> vec4<f32> {
    let dir = u.param0.xy;
    let span = max(abs(dir.x) + abs(dir.y), 1e-6);
    let s = dot(uv - vec2<f32>(0.5), dir) / span + 0.5;
    return select(getFromColor(uv), getToColor(uv), s < u.progress);
}
"#;

fn wipe(s: &Sampler<'_>, uv: [f32; 2], progress: f32, p: &[f32; MAX_PARAMS]) -> [f32; 4] {
    let (dx, dy) = (p[0], p[1]);
    let span = (dx.abs() + dy.abs()).max(1e-6);
    let edge = ((uv[0] - 0.5) * dx + (uv[1] - 0.5) * dy) / span + 0.5;
    if edge < progress {
        s.to_color(uv)
    } else {
        s.from_color(uv)
    }
}

const DIRECTIONAL_WGSL: &str = r#"
fn transition(uv: vec2<f32>) -> vec4<f32> {
    let p = uv + u.progress * sign(u.param0.xy);
    let f = fract(p);
    let inside = p.x >= 0.0 && p.x <= 1.0 && p.y >= 0.0 && p.y <= 1.0;
    return select(getToColor(f), getFromColor(f), inside);
}
"#;

fn directional(s: &Sampler<'_>, uv: [f32; 2], progress: f32, p: &[f32; MAX_PARAMS]) -> [f32; 4] {
    let px = uv[0] + progress * sign(p[0]);
    let py = uv[1] + progress * sign(p[1]);
    let f = [px - px.floor(), py - py.floor()];
    if (0.0..=1.0).contains(&px) && (0.0..=1.0).contains(&py) {
        s.from_color(f)
    } else {
        s.to_color(f)
    }
}

const CIRCLE_OPEN_WGSL: &str = r#"
fn transition(uv: vec2<f32>) -> vec4<f32> {
    let smoothness = u.param0.x;
    let opening = u.param0.y > 0.5;
    let x = select(1.0 - u.progress, u.progress, opening);
    let d = distance(uv, vec2<f32>(0.5));
    let m = smoothEdge(-smoothness, 0.0, 1.414213562373 * d - x * (1.0 + smoothness));
    return mix(getFromColor(uv), getToColor(uv), select(m, 1.0 - m, opening));
}
"#;

fn circle_open(s: &Sampler<'_>, uv: [f32; 2], progress: f32, p: &[f32; MAX_PARAMS]) -> [f32; 4] {
    let smoothness = p[0];
    let opening = p[1] > 0.5;
    let x = if opening { progress } else { 1.0 - progress };
    let d = ((uv[0] - 0.5).powi(2) + (uv[1] - 0.5).powi(2)).sqrt();
    let m = smooth_edge(
        -smoothness,
        0.0,
        std::f32::consts::SQRT_2 * d - x * (1.0 + smoothness),
    );
    let weight = if opening { 1.0 - m } else { m };
    mix(s.from_color(uv), s.to_color(uv), weight)
}

const PIXELIZE_WGSL: &str = r#"
fn transition(uv: vec2<f32>) -> vec4<f32> {
    let squares = max(u.param0.x, 1.0);
    let steps = u.param0.y;
    let d = min(u.progress, 1.0 - u.progress);
    var dist = d;
    if (steps > 0.0) {
        dist = ceil(d * steps) / steps;
    }
    var p = uv;
    if (dist > 0.0) {
        let size = 2.0 * dist / squares;
        p = (floor(uv / size) + vec2<f32>(0.5)) * size;
    }
    return mix(getFromColor(p), getToColor(p), u.progress);
}
"#;

fn pixelize(s: &Sampler<'_>, uv: [f32; 2], progress: f32, p: &[f32; MAX_PARAMS]) -> [f32; 4] {
    let squares = p[0].max(1.0);
    let steps = p[1];
    let d = progress.min(1.0 - progress);
    let dist = if steps > 0.0 { (d * steps).ceil() / steps } else { d };
    let at = if dist > 0.0 {
        let size = 2.0 * dist / squares;
        [
            ((uv[0] / size).floor() + 0.5) * size,
            ((uv[1] / size).floor() + 0.5) * size,
        ]
    } else {
        uv
    };
    mix(s.from_color(at), s.to_color(at), progress)
}

fn builtin_algorithms() -> Vec<Algorithm> {
    vec![
        Algorithm::new("fade", FADE_WGSL, fade),
        Algorithm::new("fadecolor", FADE_COLOR_WGSL, fade_color)
            .with_param("r", 0.0)
            .with_param("g", 0.0)
            .with_param("b", 0.0)
            .with_param("color_phase", 0.4),
        Algorithm::new("wipe", WIPE_WGSL, wipe)
            .with_param("dx", 1.0)
            .with_param("dy", 0.0),
        Algorithm::new("directional", DIRECTIONAL_WGSL, directional)
            .with_param("dx", 0.0)
            .with_param("dy", 1.0),
        Algorithm::new("circleopen", CIRCLE_OPEN_WGSL, circle_open)
            .with_param("smoothness", 0.3)
            .with_param("opening", 1.0),
        Algorithm::new("pixelize", PIXELIZE_WGSL, pixelize)
            .with_param("squares_min", 20.0)
            .with_param("steps", 50.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn params(algorithm: &Algorithm) -> [f32; MAX_PARAMS] {
        let mut packed = [0.0; MAX_PARAMS];
        for (i, (_, v)) in algorithm.params.iter().enumerate() {
            packed[i] = *v as f32;
        }
        packed
    }

    #[test]
    fn test_builtin_names() {
        let registry = TransitionRegistry::builtin();
        assert_eq!(
            registry.algorithm_names(),
            vec!["circleopen", "directional", "fade", "fadecolor", "pixelize", "wipe"]
        );
        assert_eq!(registry.alias_names().len(), 10);
    }

    #[test]
    fn test_lookup_ignores_case_and_separators() {
        let registry = TransitionRegistry::builtin();
        assert!(registry.algorithm("Circle-Open").is_some());
        let (algorithm, overrides) = registry.resolve("wipe_left").unwrap();
        assert_eq!(algorithm.name, "wipe");
        assert_eq!(overrides[0], ("dx".to_string(), -1.0));
        assert!(registry.resolve("unknown-xyz").is_none());
    }

    #[test]
    fn test_register_alias_requires_base() {
        let mut registry = TransitionRegistry::builtin();
        assert!(registry
            .register_alias("fadered", "fadecolor", vec![("r".into(), 1.0)])
            .is_ok());
        assert!(registry.resolve("fadered").is_some());
        assert!(matches!(
            registry.register_alias("x", "nope", Vec::new()),
            Err(TempoError::UnknownTransition { .. })
        ));
    }

    #[test]
    fn test_every_algorithm_hits_endpoints() {
        let registry = TransitionRegistry::builtin();
        let from = WHITE.repeat(4);
        let to = BLACK.repeat(4);
        let sampler = Sampler::new(&from, &to, 2, 2);
        for name in registry.algorithm_names() {
            let algorithm = registry.algorithm(name).unwrap();
            let p = params(algorithm);
            for uv in [[0.25, 0.25], [0.75, 0.75], [0.25, 0.75]] {
                let start = (algorithm.cpu)(&sampler, uv, 0.0, &p);
                let end = (algorithm.cpu)(&sampler, uv, 1.0, &p);
                assert!((start[0] - 1.0).abs() < 1e-5, "{name} start {uv:?}");
                assert!(end[0].abs() < 1e-5, "{name} end {uv:?}");
            }
        }
    }

    #[test]
    fn test_fadecolor_passes_through_color() {
        let registry = TransitionRegistry::builtin();
        let algorithm = registry.algorithm("fadecolor").unwrap();
        let from = WHITE.to_vec();
        let to = WHITE.to_vec();
        let sampler = Sampler::new(&from, &to, 1, 1);
        let mid = (algorithm.cpu)(&sampler, [0.5, 0.5], 0.5, &params(algorithm));
        assert!(mid[0] < 0.1, "close to black at the midpoint, got {:?}", mid);
    }

    #[test]
    fn test_wipe_moves_across() {
        let registry = TransitionRegistry::builtin();
        let algorithm = registry.algorithm("wipe").unwrap();
        let from = WHITE.repeat(4);
        let to = BLACK.repeat(4);
        let sampler = Sampler::new(&from, &to, 4, 1);
        let p = params(algorithm);
        let left = (algorithm.cpu)(&sampler, [0.125, 0.5], 0.5, &p);
        let right = (algorithm.cpu)(&sampler, [0.875, 0.5], 0.5, &p);
        assert_eq!(left[0], 0.0);
        assert_eq!(right[0], 1.0);
    }
}
