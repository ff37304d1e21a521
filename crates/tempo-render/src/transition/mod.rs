//! Scene transitions: blends two rendered frames with a named algorithm.
//!
//! A [`TransitionEngine`] resolves its [`TransitionSpec`] once, at
//! construction: aliases are expanded, `"random"` is rolled, and unknown
//! names fail immediately. Each [`Blender::blend`] call is then a pure
//! function of its inputs.

pub mod backend;
pub mod registry;
pub mod wgpu_backend;

pub use backend::{backend_for, BlendBackend, BlendJob, SoftwareBackend};
pub use registry::{Algorithm, Alias, TransitionRegistry, MAX_PARAMS};
pub use wgpu_backend::WgpuBackend;

use rand::Rng;
use std::sync::Arc;
use tempo_core::{FrameBuffer, PixelFormat, TempoError, TempoResult};
use tempo_ir::transition::TransitionSpec;

/// Name that picks one registered algorithm at construction.
pub const RANDOM: &str = "random";

/// Names that explicitly request a hard cut.
const NO_OP_NAMES: &[&str] = &["none", "cut"];

#[derive(Debug, Clone)]
struct Resolved {
    algorithm: Algorithm,
    params: [f32; MAX_PARAMS],
}

/// A validated transition, ready to create blenders.
pub struct TransitionEngine {
    spec: TransitionSpec,
    resolved: Option<Resolved>,
    backend: Arc<dyn BlendBackend>,
}

impl std::fmt::Debug for TransitionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("spec", &self.spec)
            .field("algorithm", &self.algorithm_name())
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl TransitionEngine {
    /// Validate and resolve `spec` against `registry`.
    pub fn new(
        spec: TransitionSpec,
        registry: &TransitionRegistry,
        backend: Arc<dyn BlendBackend>,
    ) -> TempoResult<Self> {
        Self::with_rng(spec, registry, backend, &mut rand::thread_rng())
    }

    /// Like [`TransitionEngine::new`], drawing any random pick from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        spec: TransitionSpec,
        registry: &TransitionRegistry,
        backend: Arc<dyn BlendBackend>,
        rng: &mut R,
    ) -> TempoResult<Self> {
        if !(spec.duration.is_finite() && spec.duration >= 0.0) {
            return Err(TempoError::invalid(format!(
                "transition duration must be finite and non-negative, got {}",
                spec.duration
            )));
        }
        if !spec.start_time.is_finite() {
            return Err(TempoError::invalid("transition start time must be finite"));
        }

        let name = spec.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let resolved = match name {
            None if spec.duration == 0.0 => None,
            None => {
                return Err(TempoError::invalid(format!(
                    "a {}s transition needs an algorithm name",
                    spec.duration
                )))
            }
            Some(name) if NO_OP_NAMES.iter().any(|n| n.eq_ignore_ascii_case(name)) => None,
            Some(name) => Some(resolve_name(name, &spec, registry, rng)?),
        };

        Ok(Self {
            spec,
            resolved,
            backend,
        })
    }

    pub fn spec(&self) -> &TransitionSpec {
        &self.spec
    }

    /// The concrete algorithm, or `None` for a hard cut.
    pub fn algorithm_name(&self) -> Option<&str> {
        self.resolved.as_ref().map(|r| r.algorithm.name.as_str())
    }

    /// Packed parameter values handed to the algorithm.
    pub fn params(&self) -> Option<&[f32; MAX_PARAMS]> {
        self.resolved.as_ref().map(|r| &r.params)
    }

    /// A blender for frames of the given size and channel count (3 or 4).
    pub fn create(&self, width: u32, height: u32, channels: u32) -> TempoResult<Blender<'_>> {
        if width == 0 || height == 0 {
            return Err(TempoError::invalid(format!(
                "cannot blend empty {}x{} frames",
                width, height
            )));
        }
        Ok(Blender {
            engine: self,
            width,
            height,
            format: PixelFormat::from_channels(channels)?,
        })
    }
}

fn resolve_name<R: Rng + ?Sized>(
    name: &str,
    spec: &TransitionSpec,
    registry: &TransitionRegistry,
    rng: &mut R,
) -> TempoResult<Resolved> {
    let chosen = if name.eq_ignore_ascii_case(RANDOM) {
        let names = registry.algorithm_names();
        if names.is_empty() {
            return Err(TempoError::unknown_transition(name));
        }
        let pick = names[rng.gen_range(0..names.len())].to_string();
        tracing::info!(algorithm = %pick, "resolved random transition");
        pick
    } else {
        name.to_string()
    };

    let (algorithm, alias_params) = registry
        .resolve(&chosen)
        .ok_or_else(|| TempoError::unknown_transition(name))?;

    let mut values: Vec<f64> = algorithm.params.iter().map(|(_, v)| *v).collect();
    let overrides = alias_params
        .iter()
        .map(|(k, v)| (k.as_str(), *v))
        .chain(spec.params.iter().map(|(k, v)| (k.as_str(), *v)));
    for (key, value) in overrides {
        match algorithm.param_index(key) {
            Some(i) => values[i] = value,
            None => tracing::warn!(
                transition = %algorithm.name,
                param = key,
                "ignoring unknown transition parameter"
            ),
        }
    }

    let mut params = [0.0f32; MAX_PARAMS];
    for (slot, value) in params.iter_mut().zip(values) {
        *slot = value as f32;
    }
    Ok(Resolved {
        algorithm: algorithm.clone(),
        params,
    })
}

/// Blends frames of one size and format.
pub struct Blender<'a> {
    engine: &'a TransitionEngine,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl Blender<'_> {
    fn check(&self, frame: &FrameBuffer, which: &str) -> TempoResult<()> {
        if frame.width != self.width || frame.height != self.height || frame.format != self.format
        {
            return Err(TempoError::invalid(format!(
                "{} frame is {}x{} {:?}, blender expects {}x{} {:?}",
                which, frame.width, frame.height, frame.format, self.width, self.height, self.format
            )));
        }
        Ok(())
    }

    /// Blend at raw `progress` in [0, 1]; easing is applied once here.
    ///
    /// Without an algorithm this is a hard cut: `from` up to the eased
    /// midpoint, `to` after it.
    pub fn blend(
        &self,
        from: &FrameBuffer,
        to: &FrameBuffer,
        progress: f64,
    ) -> TempoResult<FrameBuffer> {
        self.check(from, "from")?;
        self.check(to, "to")?;
        let eased = self.engine.spec.easing.apply(progress.clamp(0.0, 1.0));

        let Some(resolved) = &self.engine.resolved else {
            return Ok(if eased <= 0.5 { from.clone() } else { to.clone() });
        };

        let from_rgba = from.to_rgba();
        let to_rgba = to.to_rgba();
        let job = BlendJob {
            algorithm: &resolved.algorithm,
            from: &from_rgba.data,
            to: &to_rgba.data,
            width: self.width,
            height: self.height,
            progress: eased as f32,
            params: resolved.params,
        };
        let data = self.engine.backend.blend(&job)?;
        let blended = FrameBuffer::from_raw(self.width, self.height, PixelFormat::Rgba8, data)?;
        Ok(blended.to_format(self.format))
    }

    /// Blend at timeline time `t`, using the transition's own window.
    pub fn blend_at(
        &self,
        from: &FrameBuffer,
        to: &FrameBuffer,
        t: f64,
    ) -> TempoResult<FrameBuffer> {
        self.blend(from, to, self.engine.spec.progress_at(t))
    }
}
