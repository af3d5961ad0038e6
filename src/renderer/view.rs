use std::sync::Arc;
use wgpu::util::DeviceExt;

use super::draw::DrawItem;
use super::gpu::create_depth_texture;
use super::meshes::MeshCache;
use super::pipelines::Pipelines;
use super::uniforms::{ObjectUniform, SceneUniform};
use crate::core::ViewRect;
use crate::loaders::EnvironmentMap;

const INITIAL_OBJECT_CAPACITY: usize = 64;

/// GPU state owned by one view: its uniforms, shadow map and environment
pub struct ViewResources {
    scene_buffer: wgpu::Buffer,
    object_buffer: wgpu::Buffer,
    object_capacity: usize,
    object_stride: u64,

    shadow_map: wgpu::TextureView,
    shadow_map_size: u32,
    shadow_sampler: wgpu::Sampler,
    environment_view: wgpu::TextureView,
    environment: Option<Arc<EnvironmentMap>>,

    scene_bind_group: wgpu::BindGroup,
    shadow_bind_group: wgpu::BindGroup,
    object_bind_group: wgpu::BindGroup,
}

impl ViewResources {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, pipelines: &Pipelines, shadow_map_size: u32) -> Self {
        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::bytes_of(&<SceneUniform as bytemuck::Zeroable>::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let object_stride = object_stride(device);
        let object_buffer = create_object_buffer(device, object_stride, INITIAL_OBJECT_CAPACITY);

        let shadow_map = create_depth_texture(device, shadow_map_size, shadow_map_size, "Shadow Map");
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let environment_view = upload_environment(device, queue, &EnvironmentMap::solid([0.0; 3]));

        let scene_bind_group = create_scene_bind_group(
            device,
            pipelines,
            &scene_buffer,
            &shadow_map,
            &shadow_sampler,
            &environment_view,
        );
        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &pipelines.shadow_scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
            label: Some("shadow_scene_bind_group"),
        });
        let object_bind_group = create_object_bind_group(device, pipelines, &object_buffer);

        Self {
            scene_buffer,
            object_buffer,
            object_capacity: INITIAL_OBJECT_CAPACITY,
            object_stride,
            shadow_map,
            shadow_map_size,
            shadow_sampler,
            environment_view,
            environment: None,
            scene_bind_group,
            shadow_bind_group,
            object_bind_group,
        }
    }

    pub fn shadow_map_size(&self) -> u32 {
        self.shadow_map_size
    }

    /// Bind a new environment map when it differs from the one already uploaded
    pub fn set_environment(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &Pipelines,
        environment: Option<&Arc<EnvironmentMap>>,
    ) {
        let unchanged = match (&self.environment, environment) {
            (Some(current), Some(next)) => Arc::ptr_eq(current, next),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        self.environment_view = match environment {
            Some(map) => {
                log::info!("Uploading environment map {}x{}", map.width, map.height);
                upload_environment(device, queue, map)
            }
            None => upload_environment(device, queue, &EnvironmentMap::solid([0.0; 3])),
        };
        self.environment = environment.cloned();
        self.rebuild_scene_bind_group(device, pipelines);
    }

    /// Write scene and per-object uniforms for this frame
    pub fn update(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &Pipelines,
        scene: &SceneUniform,
        items: &[DrawItem],
    ) {
        queue.write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[*scene]));

        if items.len() > self.object_capacity {
            self.object_capacity = items.len().next_power_of_two();
            log::debug!("Growing object buffer to {} entries", self.object_capacity);
            self.object_buffer = create_object_buffer(device, self.object_stride, self.object_capacity);
            self.object_bind_group = create_object_bind_group(device, pipelines, &self.object_buffer);
        }

        if items.is_empty() {
            return;
        }

        let stride = self.object_stride as usize;
        let mut data = vec![0u8; stride * items.len()];
        for (index, item) in items.iter().enumerate() {
            let uniform = ObjectUniform::new(item);
            let bytes = bytemuck::bytes_of(&uniform);
            data[index * stride..index * stride + bytes.len()].copy_from_slice(bytes);
        }
        queue.write_buffer(&self.object_buffer, 0, &data);
    }

    /// Depth-only pass of every shadow caster from the light
    pub fn encode_shadow_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipelines: &Pipelines,
        meshes: &MeshCache,
        items: &[DrawItem],
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.shadow_map,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        pass.set_pipeline(&pipelines.shadow);
        pass.set_bind_group(0, &self.shadow_bind_group, &[]);

        for (index, item) in items.iter().enumerate().filter(|(_, item)| item.cast_shadow) {
            if let Some(mesh) = meshes.get(item.geometry.id()) {
                pass.set_bind_group(1, &self.object_bind_group, &[self.object_offset(index)]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
    }

    /// Background and lit meshes into the view's rectangle of the target
    #[allow(clippy::too_many_arguments)]
    pub fn encode_main_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipelines: &Pipelines,
        meshes: &MeshCache,
        items: &[DrawItem],
        target: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        rect: ViewRect,
        clear: bool,
    ) {
        let load = if clear {
            wgpu::LoadOp::Clear(wgpu::Color::BLACK)
        } else {
            wgpu::LoadOp::Load
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("View Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        pass.set_viewport(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
            0.0,
            1.0,
        );
        pass.set_scissor_rect(rect.x, rect.y, rect.width, rect.height);

        pass.set_pipeline(&pipelines.background);
        pass.set_bind_group(0, &self.scene_bind_group, &[]);
        pass.draw(0..3, 0..1);

        pass.set_pipeline(&pipelines.main);
        for (index, item) in items.iter().enumerate() {
            if let Some(mesh) = meshes.get(item.geometry.id()) {
                pass.set_bind_group(1, &self.object_bind_group, &[self.object_offset(index)]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
    }

    fn object_offset(&self, index: usize) -> u32 {
        (index as u64 * self.object_stride) as u32
    }

    fn rebuild_scene_bind_group(&mut self, device: &wgpu::Device, pipelines: &Pipelines) {
        self.scene_bind_group = create_scene_bind_group(
            device,
            pipelines,
            &self.scene_buffer,
            &self.shadow_map,
            &self.shadow_sampler,
            &self.environment_view,
        );
    }
}

/// Size of one object slot, rounded up to the dynamic offset alignment
fn object_stride(device: &wgpu::Device) -> u64 {
    let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
    let size = std::mem::size_of::<ObjectUniform>() as u64;
    size.div_ceil(alignment) * alignment
}

fn create_object_buffer(device: &wgpu::Device, stride: u64, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Object Uniform Buffer"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_object_bind_group(device: &wgpu::Device, pipelines: &Pipelines, buffer: &wgpu::Buffer) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &pipelines.object_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniform>() as u64),
            }),
        }],
        label: Some("object_bind_group"),
    })
}

fn create_scene_bind_group(
    device: &wgpu::Device,
    pipelines: &Pipelines,
    scene_buffer: &wgpu::Buffer,
    shadow_map: &wgpu::TextureView,
    shadow_sampler: &wgpu::Sampler,
    environment: &wgpu::TextureView,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &pipelines.scene_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(shadow_map),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(shadow_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(environment),
            },
        ],
        label: Some("scene_bind_group"),
    })
}

/// Linear float texture sampled with nearest lookups in the shader
fn upload_environment(device: &wgpu::Device, queue: &wgpu::Queue, map: &EnvironmentMap) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: map.width.max(1),
        height: map.height.max(1),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Environment Map"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba32Float,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytemuck::cast_slice(map.texels()),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(16 * size.width),
            rows_per_image: Some(size.height),
        },
        size,
    );

    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
