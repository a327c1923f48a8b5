use std::num::NonZeroU64;

use backdrop_engine::coords::Rect;
use backdrop_engine::render::{
    premul_alpha_blend, QuadVertex, RenderCtx, RenderTarget, QUAD_INDICES, QUAD_VERTICES,
};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::source::DecodedImage;
use super::projection::CoverProjection;
use crate::field::DisplacementField;

const FIELD_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg32Float;
const FIELD_TEXEL_BYTES: u32 = 8;

/// GPU side of the distortion effect.
///
/// Owns the plane geometry, the shader program, the field lookup texture,
/// the image texture and the uniform buffer. Everything is created lazily on
/// first use; nothing is drawn until an image has been uploaded.
#[derive(Default)]
pub struct DistortionPipeline {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,

    uniform_buf: Option<wgpu::Buffer>,
    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,

    field_texture: Option<wgpu::Texture>,
    field_view: Option<wgpu::TextureView>,
    field_size: u32,

    image_texture: Option<wgpu::Texture>,
    image_view: Option<wgpu::TextureView>,
    image_size: Option<(u32, u32)>,
}

impl DistortionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    #[inline]
    pub fn has_field(&self) -> bool {
        self.field_texture.is_some()
    }

    pub fn upload_image(&mut self, ctx: &RenderCtx<'_>, image: &DecodedImage) {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("backdrop distortion image"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            size,
        );

        if let Some(old) = self.image_texture.take() {
            old.destroy();
        }
        self.image_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.image_texture = Some(texture);
        self.image_size = Some(image.size());
        self.bind_group = None;
    }

    /// Copies the field into its lookup texture, resizing it if needed.
    pub fn upload_field(&mut self, ctx: &RenderCtx<'_>, field: &DisplacementField) {
        let n = field.size() as u32;
        if n > ctx.max_texture_dimension {
            if self.field_size != n {
                log::warn!("distortion field {n}x{n} exceeds the device texture limit; not drawn");
                self.field_size = n;
            }
            return;
        }
        if self.field_size != n || self.field_texture.is_none() {
            if let Some(old) = self.field_texture.take() {
                old.destroy();
            }
            let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("backdrop distortion field"),
                size: wgpu::Extent3d {
                    width: n,
                    height: n,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: FIELD_FORMAT,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });
            self.field_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
            self.field_texture = Some(texture);
            self.field_size = n;
            self.bind_group = None;
        }

        let Some(texture) = self.field_texture.as_ref() else { return };
        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            field.as_bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(FIELD_TEXEL_BYTES * n),
                rows_per_image: Some(n),
            },
            wgpu::Extent3d {
                width: n,
                height: n,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Draws the displaced image into `container` (window coordinates).
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        container: Rect,
        projection: &CoverProjection,
        offset_scale: f32,
    ) {
        if self.image_view.is_none() || self.field_view.is_none() {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_static_buffers(ctx);
        self.ensure_bindings(ctx);
        self.write_uniforms(ctx, projection, offset_scale);

        let Some((x, y, w, h)) = physical_viewport(ctx, container) else { return };
        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("backdrop distortion pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_viewport(x, y, w, h, 0.0, 1.0);
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }

    /// Destroys every GPU object. Safe to call in any state.
    pub fn dispose(&mut self) {
        self.bind_group = None;
        self.bind_group_layout = None;
        self.pipeline = None;
        self.pipeline_format = None;
        self.sampler = None;

        for buf in [
            self.uniform_buf.take(),
            self.quad_vbo.take(),
            self.quad_ibo.take(),
        ]
        .into_iter()
        .flatten()
        {
            buf.destroy();
        }

        self.field_view = None;
        if let Some(tex) = self.field_texture.take() {
            tex.destroy();
        }
        self.field_size = 0;

        self.image_view = None;
        if let Some(tex) = self.image_texture.take() {
            tex.destroy();
        }
        self.image_size = None;
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("backdrop distortion shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/distortion.wgsl").into()),
        });

        let texture_entry = |binding: u32, filterable: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout =
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("backdrop distortion bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: NonZeroU64::new(
                                std::mem::size_of::<DistortionUniform>() as u64,
                            ),
                        },
                        count: None,
                    },
                    texture_entry(1, false),
                    texture_entry(2, true),
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout =
            ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("backdrop distortion pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("backdrop distortion pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);
        self.bind_group = None;
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_none() {
            self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("backdrop distortion quad vbo"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            }));
        }
        if self.quad_ibo.is_none() {
            self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("backdrop distortion quad ibo"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            }));
        }
        if self.uniform_buf.is_none() {
            self.uniform_buf = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("backdrop distortion ubo"),
                size: std::mem::size_of::<DistortionUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.bind_group = None;
        }
        if self.sampler.is_none() {
            self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("backdrop distortion sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            }));
            self.bind_group = None;
        }
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() {
            return;
        }
        let (Some(bgl), Some(ubo), Some(field), Some(image), Some(sampler)) = (
            self.bind_group_layout.as_ref(),
            self.uniform_buf.as_ref(),
            self.field_view.as_ref(),
            self.image_view.as_ref(),
            self.sampler.as_ref(),
        ) else {
            return;
        };

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("backdrop distortion bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(field),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(image),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
    }

    fn write_uniforms(&self, ctx: &RenderCtx<'_>, projection: &CoverProjection, offset_scale: f32) {
        let Some(ubo) = self.uniform_buf.as_ref() else { return };
        let uniform = DistortionUniform {
            transform: projection.matrix().to_cols_array_2d(),
            params: [offset_scale, self.field_size as f32, 0.0, 0.0],
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniform));
    }
}

/// `container` in physical pixels, clipped to the surface.
fn physical_viewport(ctx: &RenderCtx<'_>, container: Rect) -> Option<(f32, f32, f32, f32)> {
    let s = ctx.scale_factor.max(0.01);
    let max_w = (ctx.viewport.width * s).floor();
    let max_h = (ctx.viewport.height * s).floor();

    let x = (container.origin.x * s).clamp(0.0, max_w);
    let y = (container.origin.y * s).clamp(0.0, max_h);
    let w = (container.width() * s).min(max_w - x);
    let h = (container.height() * s).min(max_h - y);
    (w >= 1.0 && h >= 1.0).then_some((x, y, w, h))
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Uniform layout (80 bytes):
///
///  offset  0  transform  mat4x4<f32>
///  offset 64  params     vec4<f32>   (.x = offset scale, .y = field size)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct DistortionUniform {
    transform: [[f32; 4]; 4],
    params: [f32; 4],
}
