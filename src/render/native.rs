use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use bytemuck::{bytes_of, Pod, Zeroable};
use glam::Mat3;
use log::{debug, info};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use crate::asset_gate::AssetKey;
use crate::assets::TextureData;
use crate::config::SceneConfig;
use crate::hud::Quad;
use crate::mesh::{Facing, MeshVertex, SphereMesh};
use crate::scene::{DrawItem, FrameSnapshot, MeshKind};

use super::shared::{MESH_SHADER, QUAD_SHADER};

const PLANET_PLACEHOLDER: [u8; 4] = [150, 150, 160, 255];
const STARFIELD_PLACEHOLDER: [u8; 4] = [0, 0, 0, 255];
const ENVIRONMENT_PLACEHOLDER: [u8; 4] = [60, 60, 70, 255];
const ENVIRONMENT_INTENSITY: f32 = 1.0;
const STARFIELD_SELF_ILLUMINATION: f32 = 0.6;
const SPHERE_RINGS: u32 = 64;

/// GPU renderer backed by wgpu that draws the orbit scene.
pub struct Renderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    depth: DepthBuffer,
    mesh_pipeline: wgpu::RenderPipeline,
    quad_pipeline: wgpu::RenderPipeline,
    global_layout: wgpu::BindGroupLayout,
    global_buffer: wgpu::Buffer,
    global_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    environment: GpuTexture,
    planet_mesh: MeshBuffers,
    starfield_mesh: MeshBuffers,
    slots: HashMap<AssetKey, ObjectSlot>,
    quad_buffer: wgpu::Buffer,
    quad_capacity: usize,
}

impl Renderer {
    /// Initializes the GPU renderer with one draw slot per configured planet.
    pub async fn new(window: Arc<Window>, scene: &SceneConfig) -> Result<Self> {
        let planets = scene.positions();
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(anyhow!("window has zero area"));
        }

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("failed to create rendering surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to acquire GPU adapter")?;
        info!("using GPU adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("renderer-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no supported formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|mode| *mode == wgpu::PresentMode::Mailbox)
                .unwrap_or(wgpu::PresentMode::Fifo),
            desired_maximum_frame_latency: 2,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth = DepthBuffer::create(&device, config.width, config.height);

        let global_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("global-bind-layout"),
            entries: &[
                uniform_entry::<GlobalUniform>(0),
                texture_entry(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // Per-object uniform and albedo texture
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object-bind-layout"),
            entries: &[uniform_entry::<ObjectUniform>(0), texture_entry(1)],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let global_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("global-uniform"),
            size: std::mem::size_of::<GlobalUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let environment = GpuTexture::upload(
            &device,
            &queue,
            &TextureData::solid(ENVIRONMENT_PLACEHOLDER),
            "environment-placeholder",
        );
        let global_bind_group = create_global_bind_group(
            &device,
            &global_layout,
            &global_buffer,
            &environment,
            &sampler,
        );

        let mesh_pipeline = create_mesh_pipeline(
            &device,
            surface_format,
            &[&global_layout, &object_layout],
        );
        let quad_pipeline = create_quad_pipeline(&device, surface_format);

        let planet_mesh = MeshBuffers::from_mesh(
            &device,
            &SphereMesh::uv_sphere(1.0, scene.orbit.segments, SPHERE_RINGS, Facing::Outward),
            "planet",
        );
        let starfield_mesh = MeshBuffers::from_mesh(
            &device,
            &SphereMesh::uv_sphere(1.0, scene.starfield.segments, SPHERE_RINGS, Facing::Inward),
            "starfield",
        );

        let mut slots = HashMap::new();
        let keys = std::iter::once(AssetKey::Starfield).chain((0..planets).map(AssetKey::Planet));
        for key in keys {
            let placeholder = match key {
                AssetKey::Starfield => STARFIELD_PLACEHOLDER,
                _ => PLANET_PLACEHOLDER,
            };
            let slot = ObjectSlot::new(
                &device,
                &queue,
                &object_layout,
                &TextureData::solid(placeholder),
                &format!("{key}"),
            );
            slots.insert(key, slot);
        }

        let quad_capacity = planets + 2;
        let quad_buffer = create_quad_buffer(&device, quad_capacity);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth,
            mesh_pipeline,
            quad_pipeline,
            global_layout,
            global_buffer,
            global_bind_group,
            object_layout,
            sampler,
            environment,
            planet_mesh,
            starfield_mesh,
            slots,
            quad_buffer,
            quad_capacity,
        })
    }

    /// Returns the identifier of the window owned by the renderer.
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// Exposes the inner window for event handling.
    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Resizes the swap chain to match the new dimensions.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if !apply_surface_size(&mut self.config, new_size) {
            return;
        }
        self.size = new_size;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthBuffer::create(&self.device, new_size.width, new_size.height);
    }

    /// Replaces the placeholder bound to `key` with decoded pixels.
    pub fn set_texture(&mut self, key: AssetKey, data: &TextureData) -> Result<()> {
        let max = self.device.limits().max_texture_dimension_2d;
        if data.width > max || data.height > max {
            return Err(anyhow!(
                "{}x{} texture exceeds the device limit of {max}",
                data.width,
                data.height
            ));
        }
        let label = format!("{key}");
        match key {
            AssetKey::Environment => {
                self.environment = GpuTexture::upload(&self.device, &self.queue, data, &label);
                self.global_bind_group = create_global_bind_group(
                    &self.device,
                    &self.global_layout,
                    &self.global_buffer,
                    &self.environment,
                    &self.sampler,
                );
            }
            AssetKey::Starfield | AssetKey::Planet(_) => {
                let slot = self
                    .slots
                    .get_mut(&key)
                    .with_context(|| format!("no draw slot for {key}"))?;
                slot.replace_texture(&self.device, &self.queue, &self.object_layout, data, &label);
            }
        }
        debug!("uploaded {label} ({}x{})", data.width, data.height);
        Ok(())
    }

    /// Draws one frame: meshes first, then the screen-space quads.
    pub fn render(&mut self, frame: &FrameSnapshot) -> Result<(), wgpu::SurfaceError> {
        self.write_uniforms(frame);
        let quad_vertices = quad_vertices(&frame.quads);
        if frame.quads.len() > self.quad_capacity {
            self.quad_capacity = frame.quads.len();
            self.quad_buffer = create_quad_buffer(&self.device, self.quad_capacity);
        }
        if !quad_vertices.is_empty() {
            self.queue
                .write_buffer(&self.quad_buffer, 0, bytemuck::cast_slice(&quad_vertices));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("renderer-encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.mesh_pipeline);
            pass.set_bind_group(0, &self.global_bind_group, &[]);
            for item in &frame.items {
                let Some(slot) = self.slots.get(&item.texture) else {
                    continue;
                };
                let mesh = match item.mesh {
                    MeshKind::Planet => &self.planet_mesh,
                    MeshKind::Starfield => &self.starfield_mesh,
                };
                pass.set_bind_group(1, &slot.bind_group, &[]);
                pass.set_vertex_buffer(0, mesh.vertex.slice(..));
                pass.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            if !quad_vertices.is_empty() {
                pass.set_pipeline(&self.quad_pipeline);
                pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
                pass.draw(0..quad_vertices.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn write_uniforms(&self, frame: &FrameSnapshot) {
        let globals = GlobalUniform {
            view_proj: frame.camera.view_proj.to_cols_array_2d(),
            camera_position: frame.camera.position.extend(1.0).into(),
            environment: [ENVIRONMENT_INTENSITY, 0.0, 0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.global_buffer, 0, bytes_of(&globals));

        for item in &frame.items {
            if let Some(slot) = self.slots.get(&item.texture) {
                self.queue
                    .write_buffer(&slot.uniform, 0, bytes_of(&ObjectUniform::new(item)));
            }
        }
    }
}

/// Copies a non-empty window size into the surface configuration.
/// Returns false, leaving the configuration untouched, for zero-area sizes.
fn apply_surface_size(config: &mut wgpu::SurfaceConfiguration, size: PhysicalSize<u32>) -> bool {
    if size.width == 0 || size.height == 0 {
        return false;
    }
    config.width = size.width;
    config.height = size.height;
    true
}

fn uniform_entry<T>(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn create_global_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    environment: &GpuTexture,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("global-bind-group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&environment.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_mesh_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("mesh-shader"),
        source: wgpu::ShaderSource::Wgsl(MESH_SHADER.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("mesh-pipeline-layout"),
        bind_group_layouts: layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("mesh-pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<MeshVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
            }],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
    })
}

fn create_quad_pipeline(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("quad-shader"),
        source: wgpu::ShaderSource::Wgsl(QUAD_SHADER.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("quad-pipeline-layout"),
        bind_group_layouts: &[],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("quad-pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_quad",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<QuadVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4],
            }],
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        // Drawn over the scene; the depth attachment is shared with the mesh pass.
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_quad",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        multiview: None,
    })
}

fn create_quad_buffer(device: &wgpu::Device, quads: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("quad-vertices"),
        size: (quads.max(1) * 6 * std::mem::size_of::<QuadVertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn quad_vertices(quads: &[Quad]) -> Vec<QuadVertex> {
    quads
        .iter()
        .flat_map(|quad| {
            let color = quad.color.to_array();
            let corner = |x: f32, y: f32| QuadVertex {
                position: [x, y],
                color,
            };
            [
                corner(quad.min.x, quad.min.y),
                corner(quad.max.x, quad.min.y),
                corner(quad.max.x, quad.max.y),
                corner(quad.min.x, quad.min.y),
                corner(quad.max.x, quad.max.y),
                corner(quad.min.x, quad.max.y),
            ]
        })
        .collect()
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl GpuTexture {
    fn upload(device: &wgpu::Device, queue: &wgpu::Queue, data: &TextureData, label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data.pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * data.width),
                rows_per_image: Some(data.height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Uniform buffer and albedo texture of one drawn sphere.
struct ObjectSlot {
    uniform: wgpu::Buffer,
    texture: GpuTexture,
    bind_group: wgpu::BindGroup,
}

impl ObjectSlot {
    fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        data: &TextureData,
        label: &str,
    ) -> Self {
        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-uniform")),
            contents: bytes_of(&ObjectUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let texture = GpuTexture::upload(device, queue, data, label);
        let bind_group = create_object_bind_group(device, layout, &uniform, &texture, label);
        Self {
            uniform,
            texture,
            bind_group,
        }
    }

    fn replace_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        data: &TextureData,
        label: &str,
    ) {
        self.texture = GpuTexture::upload(device, queue, data, label);
        self.bind_group = create_object_bind_group(device, layout, &self.uniform, &self.texture, label);
    }
}

fn create_object_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform: &wgpu::Buffer,
    texture: &GpuTexture,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label}-bind-group")),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
        ],
    })
}

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn from_mesh(device: &wgpu::Device, mesh: &SphereMesh, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
        }
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GlobalUniform {
    view_proj: [[f32; 4]; 4],
    camera_position: [f32; 4],
    environment: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ObjectUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 3],
    params: [f32; 4],
}

impl ObjectUniform {
    fn new(item: &DrawItem) -> Self {
        let normal = Mat3::from_mat4(item.model).inverse().transpose();
        let self_illumination = match item.mesh {
            MeshKind::Starfield => STARFIELD_SELF_ILLUMINATION,
            MeshKind::Planet => 0.0,
        };
        Self {
            model: item.model.to_cols_array_2d(),
            normal: mat3_to_3x4(normal),
            params: [self_illumination, 0.0, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct QuadVertex {
    position: [f32; 2],
    color: [f32; 4],
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec2, Vec3, Vec4};

    use super::*;

    fn surface_config(width: u32, height: u32) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
        }
    }

    #[test]
    fn surface_takes_the_new_window_size() {
        let mut config = surface_config(1280, 720);
        assert!(apply_surface_size(&mut config, PhysicalSize::new(1920, 1080)));
        assert_eq!((config.width, config.height), (1920, 1080));
    }

    #[test]
    fn zero_area_sizes_leave_the_surface_alone() {
        let mut config = surface_config(1280, 720);
        assert!(!apply_surface_size(&mut config, PhysicalSize::new(0, 1080)));
        assert!(!apply_surface_size(&mut config, PhysicalSize::new(1920, 0)));
        assert_eq!((config.width, config.height), (1280, 720));
    }

    #[test]
    fn quads_expand_to_two_triangles() {
        let quad = Quad {
            min: Vec2::new(-1.0, -0.5),
            max: Vec2::new(0.5, 1.0),
            color: Vec4::new(1.0, 0.0, 0.0, 0.5),
        };
        let vertices = quad_vertices(&[quad, quad]);
        assert_eq!(vertices.len(), 12);
        assert_eq!(vertices[0].position, [-1.0, -0.5]);
        assert_eq!(vertices[2].position, [0.5, 1.0]);
        assert!(vertices.iter().all(|v| v.color == [1.0, 0.0, 0.0, 0.5]));
    }

    #[test]
    fn uniform_layouts_match_the_shader() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 96);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 128);
        assert_eq!(std::mem::size_of::<QuadVertex>(), 24);
    }

    #[test]
    fn object_uniform_marks_the_starfield_self_lit() {
        let item = DrawItem {
            mesh: MeshKind::Starfield,
            model: Mat4::from_scale(Vec3::splat(50.0)),
            texture: AssetKey::Starfield,
        };
        let uniform = ObjectUniform::new(&item);
        assert_eq!(uniform.params[0], STARFIELD_SELF_ILLUMINATION);
        assert!((uniform.normal[0][0] - 1.0 / 50.0).abs() < 1e-6);
    }
}
