//! Headless GPU evaluation of the displacement stage.
//!
//! Uploads the plane once, then each call dispatches `surface.wgsl` over every
//! vertex and reads the displaced buffer back.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::error::{Error, Result};
use crate::surface::{DisplacedVertex, PlaneMesh, SurfaceUniforms};

const WORKGROUP_SIZE: u32 = 256;

/// Mesh vertex padded to 32 bytes for WGSL storage array alignment
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct GpuVertex {
    position: [f32; 3],
    _padding1: f32,
    uv: [f32; 2],
    _padding2: [f32; 2],
}

/// Compute pipeline and buffers for one plane mesh
pub struct GpuDisplacer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    output_buffer: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl GpuDisplacer {
    /// Create a headless device and upload `mesh`
    pub async fn new(mesh: &PlaneMesh) -> Result<Self> {
        let vertex_count = mesh.vertices.len() as u32;

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| Error::Gpu("Failed to find GPU adapter".to_string()))?;

        log::info!("GPU adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Surface Compute Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| Error::Gpu(format!("Failed to request device: {}", e)))?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Surface Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("surface.wgsl").into()),
        });

        let gpu_vertices: Vec<GpuVertex> = mesh
            .vertices
            .iter()
            .map(|v| GpuVertex {
                position: v.position,
                _padding1: 0.0,
                uv: v.uv,
                _padding2: [0.0; 2],
            })
            .collect();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plane Vertex Buffer"),
            contents: bytemuck::cast_slice(&gpu_vertices),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let output_size =
            u64::from(vertex_count) * std::mem::size_of::<DisplacedVertex>() as wgpu::BufferAddress;
        let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Displaced Buffer"),
            size: output_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        // Create staging buffer for readback
        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Displaced Staging Buffer"),
            size: output_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Surface Uniform Buffer"),
            contents: bytemuck::cast_slice(&[SurfaceUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Surface Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
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

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Surface Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: vertex_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Surface Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Surface Displace Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("cs_displace"),
            compilation_options: Default::default(),
            cache: None,
        });

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group,
            uniform_buffer,
            output_buffer,
            staging_buffer,
            vertex_count,
        })
    }

    /// Displace every vertex for `uniforms` and read the result back
    pub async fn displace(&self, uniforms: &SurfaceUniforms) -> Result<Vec<DisplacedVertex>> {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniforms]));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Surface Compute Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Surface Displace Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &self.bind_group, &[]);
            compute_pass.dispatch_workgroups(self.vertex_count.div_ceil(WORKGROUP_SIZE), 1, 1);
        }

        encoder.copy_buffer_to_buffer(
            &self.output_buffer,
            0,
            &self.staging_buffer,
            0,
            self.staging_buffer.size(),
        );
        self.queue.submit(Some(encoder.finish()));

        // Read back results
        let buffer_slice = self.staging_buffer.slice(..);
        let (sender, receiver) = futures::channel::oneshot::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        self.device.poll(wgpu::Maintain::Wait);
        receiver
            .await
            .map_err(|_| Error::Gpu("Readback channel closed".to_string()))?
            .map_err(|e| Error::Gpu(format!("Failed to map staging buffer: {}", e)))?;

        let data = buffer_slice.get_mapped_range();
        let result: Vec<DisplacedVertex> = bytemuck::cast_slice(&data).to_vec();

        drop(data);
        self.staging_buffer.unmap();

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SurfaceParams;
    use crate::surface::SurfaceSystem;

    #[test]
    fn test_gpu_vertex_layout() {
        assert_eq!(std::mem::size_of::<GpuVertex>(), 32);
    }

    /// Array stride of the storage buffer bound as global `name`
    fn storage_stride(module: &naga::Module, name: &str) -> u32 {
        let global = module
            .global_variables
            .iter()
            .map(|(_, var)| var)
            .find(|var| var.name.as_deref() == Some(name))
            .unwrap();
        match module.types[global.ty].inner {
            naga::TypeInner::Array { stride, .. } => stride,
            ref other => panic!("{name} is not an array: {other:?}"),
        }
    }

    #[test]
    fn test_shader_parses_and_validates() {
        let module = naga::front::wgsl::parse_str(include_str!("surface.wgsl")).unwrap();
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap();

        assert_eq!(module.entry_points.len(), 1);
        assert_eq!(module.entry_points[0].name, "cs_displace");
        assert_eq!(module.entry_points[0].stage, naga::ShaderStage::Compute);
        assert_eq!(module.entry_points[0].workgroup_size, [WORKGROUP_SIZE, 1, 1]);

        // Host-side layouts must match the WGSL array strides
        assert_eq!(storage_stride(&module, "vertices"), 32);
        assert_eq!(storage_stride(&module, "displaced"), 16);
        assert_eq!(
            storage_stride(&module, "vertices") as usize,
            std::mem::size_of::<GpuVertex>()
        );
        assert_eq!(
            storage_stride(&module, "displaced") as usize,
            std::mem::size_of::<DisplacedVertex>()
        );
    }

    #[test]
    #[ignore = "requires a GPU adapter"]
    fn test_gpu_matches_cpu() {
        let params = SurfaceParams {
            segments: 40,
            ..SurfaceParams::default()
        };
        let mut system = SurfaceSystem::new(&params).unwrap();
        let uniforms = SurfaceUniforms::new(1.25, 1.0);
        system.update(uniforms.time);

        let gpu = pollster::block_on(GpuDisplacer::new(&system.mesh)).unwrap();
        let displaced = pollster::block_on(gpu.displace(&uniforms)).unwrap();

        assert_eq!(displaced.len(), system.displaced().len());
        for (g, c) in displaced.iter().zip(system.displaced()) {
            assert!((g.noise - c.noise).abs() < 1e-3, "{} vs {}", g.noise, c.noise);
            assert!((g.position[2] - c.position[2]).abs() < 1e-3);
        }
    }
}
