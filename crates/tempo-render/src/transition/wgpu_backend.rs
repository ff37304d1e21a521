use std::sync::Arc;
use tempo_core::{TempoError, TempoResult};
use wgpu::util::DeviceExt;

use super::backend::{BlendBackend, BlendJob};
use crate::gpu::GpuContext;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct BlendUniforms {
    progress: f32,
    width: f32,
    height: f32,
    ratio: f32,
    param0: [f32; 4],
    param1: [f32; 4],
}

const PRELUDE: &str = r#"
struct Uniforms {
    progress: f32,
    width: f32,
    height: f32,
    ratio: f32,
    param0: vec4<f32>,
    param1: vec4<f32>,
};

@group(0) @binding(0) var from_tex: texture_2d<f32>;
@group(0) @binding(1) var to_tex: texture_2d<f32>;
@group(0) @binding(2) var out_tex: texture_storage_2d<rgba8unorm, write>;
@group(0) @binding(3) var<uniform> u: Uniforms;

fn texel(uv: vec2<f32>) -> vec2<i32> {
    let size = vec2<f32>(u.width, u.height);
    let p = clamp(floor(uv * size), vec2<f32>(0.0), size - vec2<f32>(1.0));
    return vec2<i32>(p);
}

fn getFromColor(uv: vec2<f32>) -> vec4<f32> {
    return textureLoad(from_tex, texel(uv), 0);
}

fn getToColor(uv: vec2<f32>) -> vec4<f32> {
    return textureLoad(to_tex, texel(uv), 0);
}

fn smoothEdge(e0: f32, e1: f32, x: f32) -> f32 {
    if (e0 == e1) {
        return select(1.0, 0.0, x < e0);
    }
    let t = clamp((x - e0) / (e1 - e0), 0.0, 1.0);
    return t * t * (3.0 - 2.0 * t);
}
"#;

const ENTRY: &str = r#"
@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    if (f32(id.x) >= u.width || f32(id.y) >= u.height) {
        return;
    }
    let uv = (vec2<f32>(f32(id.x), f32(id.y)) + vec2<f32>(0.5)) / vec2<f32>(u.width, u.height);
    textureStore(out_tex, vec2<i32>(id.xy), clamp(transition(uv), vec4<f32>(0.0), vec4<f32>(1.0)));
}
"#;

/// Runs algorithms as wgpu compute shaders.
///
/// Textures, buffers and the pipeline are created for each call and
/// destroyed before it returns; nothing is pooled between calls.
pub struct WgpuBackend {
    gpu: Arc<GpuContext>,
}

impl WgpuBackend {
    /// Open a dedicated GPU context.
    pub fn new() -> TempoResult<Self> {
        Ok(Self::with_context(Arc::new(GpuContext::try_new()?)))
    }

    pub fn with_context(gpu: Arc<GpuContext>) -> Self {
        Self { gpu }
    }

    fn input_texture(&self, label: &str, data: &[u8], width: u32, height: u32) -> wgpu::Texture {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.gpu.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );
        texture
    }
}

impl BlendBackend for WgpuBackend {
    fn name(&self) -> &'static str {
        "wgpu"
    }

    fn blend(&self, job: &BlendJob<'_>) -> TempoResult<Vec<u8>> {
        let (width, height) = (job.width, job.height);
        let expected = (width as usize) * (height as usize) * 4;
        if job.from.len() != expected || job.to.len() != expected {
            return Err(TempoError::invalid(format!(
                "blend inputs must be {} bytes of RGBA",
                expected
            )));
        }
        let device = &self.gpu.device;

        let source = format!("{}\n{}\n{}", PRELUDE, job.algorithm.wgsl, ENTRY);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("transition_{}", job.algorithm.name)),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("transition_bind_group_layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba8Unorm,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("transition_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("transition_pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: "main",
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        });

        let texture_from = self.input_texture("transition_from", job.from, width, height);
        let texture_to = self.input_texture("transition_to", job.to, width, height);
        let texture_out = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("transition_out"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view_from = texture_from.create_view(&wgpu::TextureViewDescriptor::default());
        let view_to = texture_to.create_view(&wgpu::TextureViewDescriptor::default());
        let view_out = texture_out.create_view(&wgpu::TextureViewDescriptor::default());

        let p = job.params;
        let uniforms = BlendUniforms {
            progress: job.progress,
            width: width as f32,
            height: height as f32,
            ratio: width as f32 / height as f32,
            param0: [p[0], p[1], p[2], p[3]],
            param1: [p[4], p[5], p[6], p[7]],
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("transition_uniforms"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("transition_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view_from),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view_to),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&view_out),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("transition_encoder"),
        });
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor::default());
            cpass.set_pipeline(&pipeline);
            cpass.set_bind_group(0, &bind_group, &[]);
            cpass.dispatch_workgroups((width + 15) / 16, (height + 15) / 16, 1);
        }

        // Buffer copies need rows aligned to 256 bytes.
        let unpadded_bytes_per_row = width * 4;
        let padded_bytes_per_row = (unpadded_bytes_per_row + 255) & !255;
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("transition_readback"),
            size: (padded_bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &texture_out,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &readback,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.gpu.queue.submit(Some(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::Maintain::Wait);

        let mapped = rx
            .recv()
            .map_err(|e| TempoError::Gpu(format!("readback channel closed: {}", e)))?;
        let result = match mapped {
            Ok(()) => {
                let data = slice.get_mapped_range();
                let mut out = Vec::with_capacity(expected);
                for row in data.chunks(padded_bytes_per_row as usize).take(height as usize) {
                    out.extend_from_slice(&row[..unpadded_bytes_per_row as usize]);
                }
                drop(data);
                readback.unmap();
                Ok(out)
            }
            Err(e) => Err(TempoError::Gpu(format!(
                "failed to map transition output: {}",
                e
            ))),
        };

        readback.destroy();
        uniform_buffer.destroy();
        texture_from.destroy();
        texture_to.destroy();
        texture_out.destroy();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<BlendUniforms>(), 48);
    }

    #[test]
    fn test_shader_source_declares_entry_point() {
        assert!(PRELUDE.contains("fn getFromColor"));
        assert!(ENTRY.contains("fn main"));
        assert!(ENTRY.contains("transition(uv)"));
    }
}
