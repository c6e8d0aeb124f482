// src/renderer.rs
// Cube-face mip-chain render pass: one fullscreen quad fanned out over the
// six faces of every destination mip level, filtered by a pluggable kernel
// RELEVANT FILES: src/kernel.rs, src/texture.rs, src/readback.rs, src/shaders/fullscreen_quad.wgsl

use bytemuck::{Pod, Zeroable};
use log::{debug, info};
use wgpu::util::DeviceExt;

use crate::device_caps::DeviceCaps;
use crate::error::{RenderError, RenderResult, ResourceStage};
use crate::gpu::{scoped, GpuContext};
use crate::kernel::FilterKernel;
use crate::readback::download_cube;
use crate::texture::{self, CubeImage, CUBE_FACE_COUNT, TARGET_FORMAT};

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct QuadVertex {
    position: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct LevelUniforms {
    mip_level: u32,
    _pad: [u32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct FaceUniforms {
    face_index: u32,
    _pad: [u32; 3],
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { position: [1.0, 1.0, 0.5, 1.0] },
    QuadVertex { position: [1.0, -1.0, 0.5, 1.0] },
    QuadVertex { position: [-1.0, -1.0, 0.5, 1.0] },
    QuadVertex { position: [-1.0, 1.0, 0.5, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// Renders a source cube texture into every face of every mip level of a
/// freshly allocated destination cube, then reads the result back.
///
/// Construction validates device capability and builds the fixed pipeline;
/// each `render` call runs level 0..N-1 to completion on its own destination.
/// There is no partial or incremental re-render: a failed render returns the
/// structured error and nothing else.
pub struct CubeFaceMipRenderer {
    caps: DeviceCaps,
    kernel_label: String,
    pipeline: wgpu::RenderPipeline,
    bind_layout: wgpu::BindGroupLayout,
    quad_vertices: wgpu::Buffer,
    quad_indices: wgpu::Buffer,
    level_uniform: wgpu::Buffer,
    face_uniforms: Vec<wgpu::Buffer>,
    sampler: wgpu::Sampler,
}

impl CubeFaceMipRenderer {
    /// Validate the device and build the fixed shader set and static
    /// geometry. Capability failures surface as `UnsupportedDevice` before
    /// any shader resource is allocated.
    pub fn new(gpu: &GpuContext, kernel: &dyn FilterKernel) -> RenderResult<Self> {
        let caps = DeviceCaps::from_device(&gpu.adapter, &gpu.device);
        caps.ensure_cube_render_support()?;

        let device = &gpu.device;

        let quad_module = scoped(device, ResourceStage::Shader, || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("cubeforge.shader.fullscreen_quad"),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/fullscreen_quad.wgsl").into()),
            })
        })?;
        let kernel_module = scoped(device, ResourceStage::Shader, || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("cubeforge.shader.kernel"),
                source: wgpu::ShaderSource::Wgsl(kernel.fragment_source()),
            })
        })?;

        let bind_layout = scoped(device, ResourceStage::Pipeline, || {
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("cubeforge.bind_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::Cube,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            })
        })?;

        let pipeline = scoped(device, ResourceStage::Pipeline, || {
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("cubeforge.pipeline_layout"),
                bind_group_layouts: &[&bind_layout],
                push_constant_ranges: &[],
            });
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("cubeforge.pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &quad_module,
                    entry_point: "vs_main",
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<QuadVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x4],
                    }],
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &kernel_module,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: TARGET_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
            })
        })?;

        let quad_vertices = scoped(device, ResourceStage::Buffer, || {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("cubeforge.quad.vertices"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            })
        })?;
        let quad_indices = scoped(device, ResourceStage::Buffer, || {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("cubeforge.quad.indices"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            })
        })?;

        // Zero-initialized so no stale memory can leak into the first level.
        let level_uniform = scoped(device, ResourceStage::Buffer, || {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("cubeforge.uniform.level"),
                contents: bytemuck::bytes_of(&LevelUniforms::zeroed()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        })?;

        // One immutable buffer per face: face identity reaches the fragment
        // shader without any per-face renderer state changing mid-render.
        let mut face_uniforms = Vec::with_capacity(CUBE_FACE_COUNT as usize);
        for face in 0..CUBE_FACE_COUNT {
            let buffer = scoped(device, ResourceStage::Buffer, || {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("cubeforge.uniform.face{face}")),
                    contents: bytemuck::bytes_of(&FaceUniforms {
                        face_index: face,
                        _pad: [0; 3],
                    }),
                    usage: wgpu::BufferUsages::UNIFORM,
                })
            })?;
            face_uniforms.push(buffer);
        }

        let sampler = scoped(device, ResourceStage::Sampler, || {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("cubeforge.sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::FilterMode::Linear,
                lod_min_clamp: 0.0,
                lod_max_clamp: 32.0,
                ..Default::default()
            })
        })?;

        info!(
            "cube renderer ready: kernel '{}' on {} ({})",
            kernel.label(),
            caps.adapter_name,
            caps.backend
        );

        Ok(Self {
            caps,
            kernel_label: kernel.label().to_owned(),
            pipeline,
            bind_layout,
            quad_vertices,
            quad_indices,
            level_uniform,
            face_uniforms,
            sampler,
        })
    }

    pub fn caps(&self) -> &DeviceCaps {
        &self.caps
    }

    pub fn kernel_label(&self) -> &str {
        &self.kernel_label
    }

    /// Render the source into a freshly allocated destination cube and read
    /// the finished chain back. All-or-nothing: the first failure aborts and
    /// nothing partial is returned.
    pub fn render(&self, gpu: &GpuContext, source: &CubeImage) -> RenderResult<CubeImage> {
        let meta = source.meta;
        self.caps.ensure_extent_supported(&meta)?;

        let device = &gpu.device;
        let queue = &gpu.queue;

        let source_texture = texture::upload_source_cube(device, queue, source)?;
        let source_view = scoped(device, ResourceStage::View, || {
            source_texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some("cubeforge.source.view"),
                format: Some(TARGET_FORMAT),
                dimension: Some(wgpu::TextureViewDimension::Cube),
                aspect: wgpu::TextureAspect::All,
                base_mip_level: 0,
                mip_level_count: Some(meta.mip_levels),
                base_array_layer: 0,
                array_layer_count: Some(CUBE_FACE_COUNT),
            })
        })?;

        let target = texture::create_target_cube(device, meta)?;

        let mut bind_groups = Vec::with_capacity(CUBE_FACE_COUNT as usize);
        for face in 0..CUBE_FACE_COUNT as usize {
            let group = scoped(device, ResourceStage::BindGroup, || {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("cubeforge.bind_group.face{face}")),
                    layout: &self.bind_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: self.level_uniform.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: self.face_uniforms[face].as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::TextureView(&source_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                })
            })?;
            bind_groups.push(group);
        }

        for level in 0..meta.mip_levels {
            let (width, height) = meta.mip_extent(level);

            // The level uniform is reused, not double-buffered; the blocking
            // poll below keeps level L's draws from racing this rewrite.
            queue.write_buffer(
                &self.level_uniform,
                0,
                bytemuck::bytes_of(&LevelUniforms {
                    mip_level: level,
                    _pad: [0; 3],
                }),
            );

            let mut face_views = Vec::with_capacity(CUBE_FACE_COUNT as usize);
            for face in 0..CUBE_FACE_COUNT {
                let view = scoped(device, ResourceStage::View, || {
                    target.create_view(&wgpu::TextureViewDescriptor {
                        label: Some(&format!("cubeforge.target.mip{level}.face{face}")),
                        format: Some(TARGET_FORMAT),
                        dimension: Some(wgpu::TextureViewDimension::D2),
                        aspect: wgpu::TextureAspect::All,
                        base_mip_level: level,
                        mip_level_count: Some(1),
                        base_array_layer: face,
                        array_layer_count: Some(1),
                    })
                })?;
                face_views.push(view);
            }

            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(&format!("cubeforge.encoder.mip{level}")),
            });

            // Explicit fan-out over the six array slices: one pass per face,
            // identical state, face identity supplied only by the static
            // face uniform each bind group carries.
            for (face, view) in face_views.iter().enumerate() {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some(&format!("cubeforge.pass.mip{level}.face{face}")),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &bind_groups[face], &[]);
                pass.set_vertex_buffer(0, self.quad_vertices.slice(..));
                pass.set_index_buffer(self.quad_indices.slice(..), wgpu::IndexFormat::Uint16);
                pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
                pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
            }

            device.push_error_scope(wgpu::ErrorFilter::Validation);
            queue.submit(Some(encoder.finish()));
            if let Some(err) = pollster::block_on(device.pop_error_scope()) {
                return Err(RenderError::draw(format!("mip {level}: {err}")));
            }

            // Per-level flush: level L+1 reuses the uniform buffer, so L's
            // GPU work must be complete before the next rewrite.
            device.poll(wgpu::Maintain::Wait);
            debug!("rendered mip {level} ({width}x{height}, 6 faces)");
        }

        let result = download_cube(device, queue, &target, meta)?;
        info!(
            "cube render complete: {}x{}, {} mips, kernel '{}'",
            meta.width, meta.height, meta.mip_levels, self.kernel_label
        );
        Ok(result)
    }
}
