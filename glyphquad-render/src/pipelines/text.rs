//! Text render pipeline — one texture per glyph, one reusable quad
//! buffer, one draw call per character.
//!
//! Drawing is immediate mode: [`WgpuTextDevice::draw_triangles`] records
//! a load-op render pass and submits it straight away. Buffer writes
//! queued before a submit land before that submit executes, so the quad
//! buffer can be overwritten for the next glyph as soon as the call
//! returns.

use std::sync::Arc;

use glyphquad_text::renderer::{COLOR_UNIFORM, PROJECTION_UNIFORM, SAMPLER_UNIFORM};
use glyphquad_text::{
    GlyphBitmap, GlyphError, GlyphUploader, QuadVertices, ShaderService, TextDevice,
    QUAD_VERTEX_COUNT,
};
use log::{debug, warn};
use wgpu::{
    AddressMode, BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, BlendState,
    Buffer, BufferBindingType, BufferDescriptor, BufferUsages, ColorTargetState, ColorWrites,
    CommandEncoderDescriptor, Device, Extent3d, Face, FilterMode, FragmentState, FrontFace,
    LoadOp, MultisampleState, Operations, PipelineCompilationOptions, PipelineLayoutDescriptor,
    PolygonMode, PrimitiveState, PrimitiveTopology, Queue, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, Sampler,
    SamplerBindingType, SamplerDescriptor, ShaderModuleDescriptor, ShaderStages, StoreOp,
    TextureDescriptor, TextureDimension, TextureFormat, TextureSampleType, TextureUsages,
    TextureView, TextureViewDimension, VertexState,
};

use crate::context::GpuContext;
use crate::vertex::{quad_vertex_layout, TextUniform};

/// Only one texture unit exists in this pipeline.
const GLYPH_UNIT: u32 = 0;

// ───────────────────── Glyph resources ────────────────────────────

/// Layout and sampler shared by every glyph texture.
pub struct GlyphResources {
    glyph_bgl: BindGroupLayout,
    sampler: Sampler,
}

impl GlyphResources {
    pub fn new(device: &Device) -> Self {
        let glyph_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("glyph_texture_bgl"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        sample_type: TextureSampleType::Float { filterable: true },
                        view_dimension: TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&SamplerDescriptor {
            label: Some("glyph_sampler"),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            ..Default::default()
        });

        Self { glyph_bgl, sampler }
    }
}

/// A glyph's single-channel texture and the bind group sampling it.
pub struct GlyphTexture {
    texture: wgpu::Texture,
    bind_group: Arc<BindGroup>,
}

impl GlyphTexture {
    /// Texture size in texels (empty glyphs are stored as 1×1).
    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

/// The single vertex buffer every glyph quad is written into.
pub struct QuadBuffer {
    buffer: Arc<Buffer>,
}

impl QuadBuffer {
    pub fn size(&self) -> u64 {
        self.buffer.size()
    }
}

// ───────────────────── Shader service ─────────────────────────────

/// WGSL text program with a CPU mirror of its uniform block.
///
/// Uniform writes are mirrored and flushed to the GPU before the next
/// draw that uses the program.
pub struct TextShader {
    pipeline: RenderPipeline,
    uniform_buffer: Buffer,
    uniform_bind_group: BindGroup,
    uniform: TextUniform,
    dirty: bool,
    active: bool,
}

impl TextShader {
    pub fn new(device: &Device, target_format: TextureFormat, resources: &GlyphResources) -> Self {
        // ── Shader ──────────────────────────────────────────────
        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("text_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shaders/text.wgsl").into()),
        });

        // ── Uniform bind group layout (group 0) ─────────────────
        let uniform_bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("text_uniform_bgl"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        // ── Pipeline layout ─────────────────────────────────────
        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("text_pipeline_layout"),
            bind_group_layouts: &[&uniform_bgl, &resources.glyph_bgl],
            push_constant_ranges: &[],
        });

        // ── Render pipeline ─────────────────────────────────────
        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("text_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                buffers: &[quad_vertex_layout()],
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: PipelineCompilationOptions::default(),
                targets: &[Some(ColorTargetState {
                    format: target_format,
                    blend: Some(BlendState::ALPHA_BLENDING),
                    write_mask: ColorWrites::ALL,
                })],
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                // Glyph triangles wind counter-clockwise in y-up space.
                front_face: FrontFace::Ccw,
                cull_mode: Some(Face::Back),
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        // ── Uniform buffer ──────────────────────────────────────
        let uniform_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("text_uniform_ub"),
            size: std::mem::size_of::<TextUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("text_uniform_bg"),
            layout: &uniform_bgl,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            uniform: TextUniform::default(),
            dirty: true,
            active: false,
        }
    }

    /// Current CPU-side uniform values.
    pub fn uniform(&self) -> &TextUniform {
        &self.uniform
    }

    fn flush(&mut self, queue: &Queue) {
        if self.dirty {
            queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniform));
            self.dirty = false;
        }
    }
}

impl ShaderService for TextShader {
    fn use_program(&mut self) {
        self.active = true;
    }

    fn set_mat4(&mut self, name: &str, value: &[[f32; 4]; 4]) {
        if name != PROJECTION_UNIFORM {
            warn!("text shader has no mat4 uniform {name:?}");
            return;
        }
        self.uniform.projection = *value;
        self.dirty = true;
    }

    fn set_vec3(&mut self, name: &str, value: [f32; 3]) {
        if name != COLOR_UNIFORM {
            warn!("text shader has no vec3 uniform {name:?}");
            return;
        }
        self.uniform.text_color = [value[0], value[1], value[2], 1.0];
        self.dirty = true;
    }

    fn set_int(&mut self, name: &str, value: i32) {
        if name != SAMPLER_UNIFORM {
            warn!("text shader has no int uniform {name:?}");
            return;
        }
        if value != GLYPH_UNIT as i32 {
            warn!("glyph sampler can only read texture unit {GLYPH_UNIT}, got {value}");
        }
    }
}

// ───────────────────── Device ─────────────────────────────────────

/// Backend for the text core, borrowed for a build or a frame.
pub struct WgpuTextDevice<'a> {
    gpu: &'a GpuContext,
    resources: &'a GlyphResources,
    target: Option<&'a TextureView>,
    active_unit: u32,
    bound_texture: Option<Arc<BindGroup>>,
    bound_quad: Option<Arc<Buffer>>,
    draw_calls: u32,
}

impl<'a> WgpuTextDevice<'a> {
    /// Device for uploading glyphs and allocating buffers; draws are ignored.
    pub fn for_upload(gpu: &'a GpuContext, resources: &'a GlyphResources) -> Self {
        Self::new(gpu, resources, None)
    }

    /// Device drawing into `target`.
    pub fn for_frame(
        gpu: &'a GpuContext,
        resources: &'a GlyphResources,
        target: &'a TextureView,
    ) -> Self {
        Self::new(gpu, resources, Some(target))
    }

    fn new(
        gpu: &'a GpuContext,
        resources: &'a GlyphResources,
        target: Option<&'a TextureView>,
    ) -> Self {
        Self {
            gpu,
            resources,
            target,
            active_unit: GLYPH_UNIT,
            bound_texture: None,
            bound_quad: None,
            draw_calls: 0,
        }
    }

    /// Draw calls submitted through this device.
    pub fn draw_calls(&self) -> u32 {
        self.draw_calls
    }
}

impl GlyphUploader for WgpuTextDevice<'_> {
    type Texture = GlyphTexture;

    fn upload_glyph(&mut self, code: u8, bitmap: &GlyphBitmap) -> Result<GlyphTexture, GlyphError> {
        let max = self.gpu.device.limits().max_texture_dimension_2d;
        if bitmap.width > max || bitmap.height > max {
            return Err(GlyphError::Upload {
                code,
                reason: format!("{}×{} exceeds {max}", bitmap.width, bitmap.height),
            });
        }

        // Zero-sized textures are invalid; blank glyphs get one clear texel.
        let blank = [0u8];
        let (width, height, texels) = if bitmap.is_empty() {
            (1, 1, &blank[..])
        } else {
            (bitmap.width, bitmap.height, bitmap.upload_bytes())
        };

        let size = Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.gpu.device.create_texture(&TextureDescriptor {
            label: Some("glyph_texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::R8Unorm,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        // Rows are tightly packed: one byte per texel, no row padding.
        self.gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            texels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.gpu.device.create_bind_group(&BindGroupDescriptor {
            label: Some("glyph_texture_bg"),
            layout: &self.resources.glyph_bgl,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&self.resources.sampler),
                },
            ],
        });

        Ok(GlyphTexture {
            texture,
            bind_group: Arc::new(bind_group),
        })
    }
}

impl TextDevice for WgpuTextDevice<'_> {
    type QuadBuffer = QuadBuffer;
    type Shader = TextShader;

    fn create_quad_buffer(&mut self) -> QuadBuffer {
        let buffer = self.gpu.device.create_buffer(&BufferDescriptor {
            label: Some("text_quad_vb"),
            size: std::mem::size_of::<QuadVertices>() as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        QuadBuffer {
            buffer: Arc::new(buffer),
        }
    }

    fn active_texture(&mut self, unit: u32) {
        if unit != GLYPH_UNIT {
            warn!("texture unit {unit} requested; only unit {GLYPH_UNIT} is available");
        }
        self.active_unit = unit;
    }

    fn bind_texture(&mut self, texture: Option<&GlyphTexture>) {
        if self.active_unit != GLYPH_UNIT {
            return;
        }
        self.bound_texture = texture.map(|t| Arc::clone(&t.bind_group));
    }

    fn bind_quad_buffer(&mut self, buffer: Option<&QuadBuffer>) {
        self.bound_quad = buffer.map(|b| Arc::clone(&b.buffer));
    }

    fn write_quad(&mut self, buffer: &mut QuadBuffer, vertices: &QuadVertices) {
        self.gpu
            .queue
            .write_buffer(&buffer.buffer, 0, bytemuck::cast_slice(vertices));
    }

    fn draw_triangles(&mut self, shader: &mut TextShader, vertex_count: u32) {
        let Some(target) = self.target else {
            debug!("draw ignored: upload-only device");
            return;
        };
        if !shader.active {
            warn!("draw ignored: text shader not in use");
            return;
        }
        let (Some(texture), Some(quad)) = (&self.bound_texture, &self.bound_quad) else {
            warn!("draw ignored: glyph texture or quad buffer not bound");
            return;
        };

        let vertex_count = vertex_count.min(QUAD_VERTEX_COUNT as u32);
        shader.flush(&self.gpu.queue);

        let mut encoder = self.gpu.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("glyph_draw_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("glyph_draw_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&shader.pipeline);
            pass.set_bind_group(0, &shader.uniform_bind_group, &[]);
            pass.set_bind_group(1, &**texture, &[]);
            pass.set_vertex_buffer(0, quad.slice(..));
            pass.draw(0..vertex_count, 0..1);
        }
        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        self.draw_calls += 1;
    }
}

// ===================================================================
// Tests
// ===================================================================
