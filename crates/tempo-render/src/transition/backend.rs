use std::sync::Arc;
use tempo_core::config::BlendBackendKind;
use tempo_core::{TempoError, TempoResult};

use super::registry::{Algorithm, Sampler, MAX_PARAMS};
use super::wgpu_backend::WgpuBackend;

/// One blend call: two tightly packed RGBA frames and a resolved algorithm.
pub struct BlendJob<'a> {
    pub algorithm: &'a Algorithm,
    pub from: &'a [u8],
    pub to: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Eased progress in [0, 1].
    pub progress: f32,
    pub params: [f32; MAX_PARAMS],
}

impl BlendJob<'_> {
    fn check(&self) -> TempoResult<()> {
        let expected = (self.width as usize) * (self.height as usize) * 4;
        if self.from.len() != expected || self.to.len() != expected {
            return Err(TempoError::invalid(format!(
                "blend inputs must be {} bytes of RGBA, got {} and {}",
                expected,
                self.from.len(),
                self.to.len()
            )));
        }
        Ok(())
    }
}

/// Runs a per-pixel algorithm over a pair of frames.
pub trait BlendBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Blend the job's frames, returning tightly packed RGBA.
    fn blend(&self, job: &BlendJob<'_>) -> TempoResult<Vec<u8>>;
}

/// CPU reference implementation of every algorithm.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftwareBackend;

impl BlendBackend for SoftwareBackend {
    fn name(&self) -> &'static str {
        "software"
    }

    fn blend(&self, job: &BlendJob<'_>) -> TempoResult<Vec<u8>> {
        job.check()?;
        let sampler = Sampler::new(job.from, job.to, job.width, job.height);
        let (w, h) = (job.width as f32, job.height as f32);
        let mut out = Vec::with_capacity(job.from.len());
        for y in 0..job.height {
            for x in 0..job.width {
                let uv = [(x as f32 + 0.5) / w, (y as f32 + 0.5) / h];
                let color = (job.algorithm.cpu)(&sampler, uv, job.progress, &job.params);
                out.extend(color.iter().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8));
            }
        }
        Ok(out)
    }
}

/// Build the backend selected in configuration.
pub fn backend_for(kind: BlendBackendKind) -> TempoResult<Arc<dyn BlendBackend>> {
    match kind {
        BlendBackendKind::Gpu => Ok(Arc::new(WgpuBackend::new()?)),
        BlendBackendKind::Software => Ok(Arc::new(SoftwareBackend)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::registry::TransitionRegistry;

    #[test]
    fn test_software_fade_midpoint() {
        let registry = TransitionRegistry::builtin();
        let from = [255u8, 0, 0, 255].repeat(6);
        let to = [0u8, 0, 255, 255].repeat(6);
        let job = BlendJob {
            algorithm: registry.algorithm("fade").unwrap(),
            from: &from,
            to: &to,
            width: 3,
            height: 2,
            progress: 0.5,
            params: [0.0; MAX_PARAMS],
        };
        let out = SoftwareBackend.blend(&job).unwrap();
        assert_eq!(out.len(), 24);
        assert_eq!(&out[..4], &[128, 0, 128, 255]);
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let registry = TransitionRegistry::builtin();
        let job = BlendJob {
            algorithm: registry.algorithm("fade").unwrap(),
            from: &[0; 8],
            to: &[0; 4],
            width: 2,
            height: 1,
            progress: 0.5,
            params: [0.0; MAX_PARAMS],
        };
        assert!(SoftwareBackend.blend(&job).is_err());
    }

    #[test]
    fn test_software_backend_from_config() {
        let backend = backend_for(BlendBackendKind::Software).unwrap();
        assert_eq!(backend.name(), "software");
    }
}
