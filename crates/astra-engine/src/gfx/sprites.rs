use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::coords::{ColorRgba, Rect, Vec2};

use super::batch::{
    INDICES_PER_SPRITE, QuadFlush, QuadSink, SpriteBatch, SpriteVertex, VERTICES_PER_SPRITE,
    quad_indices,
};
use super::ctx::{RenderCtx, RenderTarget};
use super::texture::{Texture2D, TextureId};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
}

/// GPU half of the sprite batcher.
///
/// Owns the render pipeline, the fixed-capacity vertex buffer, the static
/// index buffer and the per-texture bind groups. Resources are created
/// lazily on first use (the device is only reachable through [`RenderCtx`]).
///
/// Each flush is self-contained: uniform + vertex-prefix writes, one render
/// pass loading the existing attachment, one indexed draw, one submit.
/// Submitting per flush keeps prefix re-uploads well-ordered on the queue:
/// `write_buffer` is staged until the next submit, so two flushes rewriting
/// the same prefix must not share a submission.
struct SpritePipeline {
    capacity: usize,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    globals_layout: Option<wgpu::BindGroupLayout>,
    texture_layout: Option<wgpu::BindGroupLayout>,

    globals_ubo: Option<wgpu::Buffer>,
    globals_group: Option<wgpu::BindGroup>,

    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,

    texture_groups: HashMap<TextureId, wgpu::BindGroup>,
}

impl SpritePipeline {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            pipeline_format: None,
            pipeline: None,
            globals_layout: None,
            texture_layout: None,
            globals_ubo: None,
            globals_group: None,
            vertex_buffer: None,
            index_buffer: None,
            texture_groups: HashMap::new(),
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline.is_some() && self.pipeline_format == Some(ctx.surface_format) {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("astra sprite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sprite.wgsl").into()),
        });

        let globals_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("astra sprite globals bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(
                                std::mem::size_of::<Globals>() as u64
                            ),
                        },
                        count: None,
                    }],
                });

        let texture_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("astra sprite texture bgl"),
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

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("astra sprite pipeline layout"),
                bind_group_layouts: &[&globals_layout, &texture_layout],
                immediate_size: 0,
            });

        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("astra sprite pipeline"),
                layout: Some(&pipeline_layout),

                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[SpriteVertex::layout()],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        // Straight-alpha blending; tints are not premultiplied.
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
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
        self.globals_layout = Some(globals_layout);
        self.texture_layout = Some(texture_layout);

        // Texture bind groups depend on the layout; rebuild on demand.
        self.globals_group = None;
        self.texture_groups.clear();
    }

    fn ensure_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.vertex_buffer.is_some() {
            return;
        }

        // Allocated once at capacity; flushes rewrite a prefix, never grow it.
        self.vertex_buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("astra sprite vbo"),
            size: (self.capacity * VERTICES_PER_SPRITE * std::mem::size_of::<SpriteVertex>())
                as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));

        self.index_buffer = Some(ctx.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("astra sprite ibo"),
                contents: bytemuck::cast_slice(&quad_indices(self.capacity)),
                usage: wgpu::BufferUsages::INDEX,
            },
        ));
    }

    fn ensure_globals(&mut self, ctx: &RenderCtx<'_>) {
        if self.globals_group.is_some() {
            return;
        }
        let Some(layout) = self.globals_layout.as_ref() else { return };

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("astra sprite globals ubo"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.globals_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("astra sprite globals group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        }));
        self.globals_ubo = Some(ubo);
    }

    /// Creates (once) the bind group for a texture the batch is about to use.
    fn ensure_texture(&mut self, ctx: &RenderCtx<'_>, texture: &Texture2D) {
        let id = texture.handle().id();
        if self.texture_groups.contains_key(&id) {
            return;
        }
        let Some(layout) = self.texture_layout.as_ref() else { return };

        let group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("astra sprite texture group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(texture.sampler()),
                },
            ],
        });
        self.texture_groups.insert(id, group);
    }

    fn flush(&mut self, ctx: &RenderCtx<'_>, target: &RenderTarget<'_>, flush: &QuadFlush<'_>) {
        self.ensure_globals(ctx);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(globals_group) = self.globals_group.as_ref() else { return };
        let Some(globals_ubo) = self.globals_ubo.as_ref() else { return };
        let Some(vertex_buffer) = self.vertex_buffer.as_ref() else { return };
        let Some(index_buffer) = self.index_buffer.as_ref() else { return };
        let Some(texture_group) = self.texture_groups.get(&flush.texture) else {
            log::warn!(
                "sprite flush for unregistered texture {:?}; skipping {} quads",
                flush.texture,
                flush.quads
            );
            return;
        };

        let globals = Globals {
            view_proj: flush.view_proj.to_cols_array_2d(),
        };
        ctx.queue.write_buffer(globals_ubo, 0, bytemuck::bytes_of(&globals));
        ctx.queue
            .write_buffer(vertex_buffer, 0, bytemuck::cast_slice(flush.vertices));

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("astra sprite flush encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("astra sprite pass"),
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

            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, globals_group, &[]);
            rpass.set_bind_group(1, texture_group, &[]);
            rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
            rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..(flush.quads * INDICES_PER_SPRITE) as u32, 0, 0..1);
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Adapter handing batch flushes to the pipeline with the frame's context.
struct PipelineSink<'a> {
    gpu: &'a mut SpritePipeline,
    ctx: &'a RenderCtx<'a>,
    target: &'a RenderTarget<'a>,
}

impl QuadSink for PipelineSink<'_> {
    fn flush(&mut self, flush: &QuadFlush<'_>) {
        self.gpu.flush(self.ctx, self.target, flush);
    }
}

/// The sprite batch renderer: accumulation state machine plus wgpu pipeline
/// behind one begin/draw/end facade.
///
/// Draws take `&Texture2D` so the bind group can be created before the quad
/// is queued; the batch itself only ever sees the texture's handle.
pub struct SpriteRenderer {
    batch: SpriteBatch,
    gpu: SpritePipeline,
}

impl SpriteRenderer {
    pub fn new() -> Self {
        Self::with_capacity(super::batch::DEFAULT_CAPACITY)
    }

    /// Capacity is in sprites and fixes the size of the shared GPU buffers.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            batch: SpriteBatch::with_capacity(capacity),
            gpu: SpritePipeline::new(capacity),
        }
    }

    /// Opens a batch session. See [`SpriteBatch::begin`].
    pub fn begin(&mut self, view_proj: Mat4) {
        self.batch.begin(view_proj);
    }

    /// Queues a whole-texture sprite quad.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &RenderTarget<'_>,
        texture: &Texture2D,
        position: Vec2,
        size: Vec2,
        color: ColorRgba,
        origin: Vec2,
        rotation: f32,
    ) {
        self.prepare(ctx, texture);
        let mut sink = PipelineSink { gpu: &mut self.gpu, ctx, target };
        self.batch
            .draw(&mut sink, texture.handle(), position, size, color, origin, rotation);
    }

    /// Queues a sprite quad sampling `source` from a sprite sheet.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_region(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &RenderTarget<'_>,
        texture: &Texture2D,
        position: Vec2,
        size: Vec2,
        source: Rect,
        color: ColorRgba,
        origin: Vec2,
        rotation: f32,
    ) {
        self.prepare(ctx, texture);
        let mut sink = PipelineSink { gpu: &mut self.gpu, ctx, target };
        self.batch.draw_region(
            &mut sink,
            texture.handle(),
            position,
            size,
            source,
            color,
            origin,
            rotation,
        );
    }

    /// Closes the session, flushing pending quads. See [`SpriteBatch::end`].
    pub fn end(&mut self, ctx: &RenderCtx<'_>, target: &RenderTarget<'_>) {
        let mut sink = PipelineSink { gpu: &mut self.gpu, ctx, target };
        self.batch.end(&mut sink);
    }

    /// Draw calls issued since the last reset (diagnostics).
    #[inline]
    pub fn draw_calls(&self) -> u32 {
        self.batch.draw_calls()
    }

    /// Reset the draw-call counter; call once at frame start.
    #[inline]
    pub fn reset_draw_calls(&mut self) {
        self.batch.reset_draw_calls();
    }

    fn prepare(&mut self, ctx: &RenderCtx<'_>, texture: &Texture2D) {
        self.gpu.ensure_pipeline(ctx);
        self.gpu.ensure_buffers(ctx);
        self.gpu.ensure_texture(ctx, texture);
    }
}

impl Default for SpriteRenderer {
    fn default() -> Self {
        Self::new()
    }
}
