use crate::gpu::{GpuContext, RenderError, surface_extent};
use crate::mesh::{FrameUniforms, GpuMesh, ModelUniforms, Vertex};
use crate::shaders;
use rondavel_common::{NodeId, ViewportSize};
use rondavel_render::{FramePacket, RenderSettings, SceneRenderer};
use rondavel_scene::{PerspectiveCamera, SceneGraph};
use std::collections::BTreeMap;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Tessellated egui output to paint over the next presented frame.
pub struct UiFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

/// Scene colour and depth at drawing-buffer resolution.
struct OffscreenTarget {
    size: ViewportSize,
    color: wgpu::TextureView,
    depth: wgpu::TextureView,
    blit_bind_group: wgpu::BindGroup,
}

struct ShadowMap {
    size: u32,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    gpu: GpuContext,
    settings: RenderSettings,
    size: ViewportSize,
    pixel_ratio: f64,
    scene_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    shadow_layout: wgpu::BindGroupLayout,
    shadow_sampler: wgpu::Sampler,
    shadow_map: ShadowMap,
    blit_layout: wgpu::BindGroupLayout,
    blit_sampler: wgpu::Sampler,
    target: Option<OffscreenTarget>,
    meshes: BTreeMap<NodeId, GpuMesh>,
    egui: egui_wgpu::Renderer,
    ui: Option<UiFrame>,
}

impl WgpuRenderer {
    pub fn new(gpu: GpuContext, settings: RenderSettings) -> Self {
        let device = &gpu.device;
        let format = gpu.format();

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniform_buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_layout = uniform_layout(device, "frame_bind_group_layout");
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });
        let model_layout = uniform_layout(device, "model_bind_group_layout");

        let shadow_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let blit_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let blit_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // Scene pipeline
        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });
        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &model_layout, &shadow_layout],
            push_constant_ranges: &[],
        });
        let scene_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&scene_layout),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::LAYOUT],
            },
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Shadow pipeline
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHADOW_SHADER.into()),
        });
        let shadow_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("shadow_pipeline_layout"),
                bind_group_layouts: &[&frame_layout, &model_layout],
                push_constant_ranges: &[],
            });
        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow_pipeline"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_shadow"),
                compilation_options: Default::default(),
                buffers: &[Vertex::LAYOUT],
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Blit pipeline
        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BLIT_SHADER.into()),
        });
        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit_pipeline_layout"),
            bind_group_layouts: &[&blit_layout],
            push_constant_ranges: &[],
        });
        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit_pipeline"),
            layout: Some(&blit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: Some("vs_blit"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: Some("fs_blit"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: Default::default(),
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let shadow_map = create_shadow_map(device, &shadow_layout, &shadow_sampler, 512);
        let egui = egui_wgpu::Renderer::new(device, format, None, 1, false);

        Self {
            gpu,
            settings,
            size: ViewportSize::default(),
            pixel_ratio: 1.0,
            scene_pipeline,
            shadow_pipeline,
            blit_pipeline,
            frame_buffer,
            frame_bind_group,
            model_layout,
            shadow_layout,
            shadow_sampler,
            shadow_map,
            blit_layout,
            blit_sampler,
            target: None,
            meshes: BTreeMap::new(),
            egui,
            ui: None,
        }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Resize the window surface to its new physical size.
    pub fn resize_surface(&mut self, physical: ViewportSize) {
        self.gpu.resize_surface(physical);
    }

    /// Paint `frame` over the next presented frame. A frame that was queued
    /// but never painted still has its texture uploads applied.
    pub fn queue_ui(&mut self, mut frame: UiFrame) {
        if let Some(stale) = self.ui.take() {
            let mut delta = stale.textures_delta;
            delta.append(frame.textures_delta);
            frame.textures_delta = delta;
        }
        self.ui = Some(frame);
    }

    fn sync_meshes(&mut self, packet: &FramePacket) {
        let device = &self.gpu.device;
        self.meshes
            .retain(|id, _| packet.meshes.iter().any(|m| m.id == *id));
        for item in &packet.meshes {
            let stale = self
                .meshes
                .get(&item.id)
                .is_none_or(|mesh| mesh.geometry != item.geometry);
            if stale {
                self.meshes
                    .insert(item.id, GpuMesh::new(device, &self.model_layout, item));
            }
            if let Some(mesh) = self.meshes.get_mut(&item.id) {
                mesh.cast_shadow = item.cast_shadow;
                self.gpu.queue.write_buffer(
                    &mesh.model_buffer,
                    0,
                    bytemuck::bytes_of(&ModelUniforms::new(item)),
                );
            }
        }
    }

    fn ensure_shadow_map(&mut self, packet: &FramePacket) {
        let Some(light) = packet.shadow_light() else {
            return;
        };
        let size = light.shadow.map_size.max(1);
        if self.shadow_map.size != size {
            self.shadow_map =
                create_shadow_map(&self.gpu.device, &self.shadow_layout, &self.shadow_sampler, size);
            tracing::debug!("shadow map resized to {size}");
        }
    }

    fn ensure_target(&mut self) {
        let buffer = self.drawing_buffer_size();
        if self.target.as_ref().is_some_and(|t| t.size == buffer) {
            return;
        }
        let (width, height) = surface_extent(buffer);
        let device = &self.gpu.device;
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let color = device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("scene_color_target"),
                size: extent,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: self.gpu.format(),
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
            .create_view(&Default::default());
        let depth = device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("scene_depth_target"),
                size: extent,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&Default::default());
        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit_bind_group"),
            layout: &self.blit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&color),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.blit_sampler),
                },
            ],
        });
        tracing::debug!("drawing buffer allocated at {width}x{height}");
        self.target = Some(OffscreenTarget {
            size: buffer,
            color,
            depth,
            blit_bind_group,
        });
    }

    fn draw(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        let Some(output) = self.gpu.acquire()? else {
            return Ok(());
        };

        let packet = FramePacket::collect(scene, camera);
        self.sync_meshes(&packet);
        self.ensure_shadow_map(&packet);
        self.ensure_target();

        let uniforms = FrameUniforms::new(&packet, self.settings.shadow_map);
        self.gpu
            .queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniforms));

        let Some(target) = &self.target else {
            return Ok(());
        };
        let device = &self.gpu.device;
        let queue = &self.gpu.queue;
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        let casts = self.settings.shadow_map.enabled
            && packet.shadow_light().is_some();
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            if casts {
                pass.set_pipeline(&self.shadow_pipeline);
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                for mesh in self.meshes.values().filter(|m| m.cast_shadow) {
                    mesh.draw(&mut pass);
                }
            }
        }

        {
            let [r, g, b] = self.settings.clear_color.to_linear();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&self.scene_pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            pass.set_bind_group(2, &self.shadow_map.bind_group, &[]);
            for mesh in self.meshes.values() {
                mesh.draw(&mut pass);
            }
        }

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blit_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
            pass.set_pipeline(&self.blit_pipeline);
            pass.set_bind_group(0, &target.blit_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        let mut commands = Vec::new();
        if let Some(ui) = self.ui.take() {
            let surface = self.gpu.surface_size();
            let screen = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [surface.width, surface.height],
                pixels_per_point: ui.pixels_per_point,
            };
            for (id, delta) in &ui.textures_delta.set {
                self.egui.update_texture(device, queue, *id, delta);
            }
            commands =
                self.egui
                    .update_buffers(device, queue, &mut encoder, &ui.primitives, &screen);
            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    })
                    .forget_lifetime();
                self.egui.render(&mut pass, &ui.primitives, &screen);
            }
            for id in &ui.textures_delta.free {
                self.egui.free_texture(id);
            }
        }

        queue.submit(commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();
        Ok(())
    }
}

impl SceneRenderer for WgpuRenderer {
    type Error = RenderError;

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        self.draw(scene, camera)
    }

    fn set_size(&mut self, size: ViewportSize) {
        self.size = size;
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn size(&self) -> ViewportSize {
        self.size
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn create_shadow_map(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    size: u32,
) -> ShadowMap {
    let view = device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow_map"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        })
        .create_view(&Default::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("shadow_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    ShadowMap {
        size,
        view,
        bind_group,
    }
}
