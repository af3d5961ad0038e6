//! wgpu forward renderer for the viewer's split window.
//!
//! Each view gets its own rectangle of the surface, its own lights and
//! shadow map, and optionally an environment map for reflections. Geometry
//! is uploaded once per `Geometry` and shared between views.

mod draw;
mod gpu;
mod meshes;
mod overlay;
mod pipelines;
mod uniforms;
mod view;

use anyhow::Result;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::window::Window;

pub use draw::{collect_draw_items, DrawItem};
pub use overlay::{OverlayStats, ViewStats};
pub use uniforms::{light_view_projection, ObjectUniform, SceneParams, SceneUniform, Vertex};

use crate::config::LightingConfig;
use crate::core::ViewRect;
use crate::loaders::EnvironmentMap;
use crate::math::Color;
use crate::scene::SceneNode;
use crate::traits::CameraController;
use gpu::{create_depth_texture, GpuContext};
use meshes::MeshCache;
use overlay::Overlay;
use pipelines::Pipelines;
use view::ViewResources;

/// Everything needed to draw one view this frame
pub struct ViewFrame<'a> {
    pub rect: ViewRect,
    /// `None` draws only the background, e.g. while the model is loading
    pub root: Option<&'a SceneNode>,
    pub camera: &'a dyn CameraController,
    pub lighting: &'a LightingConfig,
    pub shadows: bool,
    pub background: Color,
    pub environment: Option<&'a Arc<EnvironmentMap>>,
}

pub struct Renderer {
    gpu: GpuContext,
    pipelines: Pipelines,
    depth: wgpu::TextureView,
    meshes: MeshCache,
    views: Vec<ViewResources>,
    overlay: Option<Overlay>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, show_ui: bool) -> Result<Self> {
        let gpu = GpuContext::new(window.clone()).await?;
        let pipelines = Pipelines::new(&gpu.device, gpu.format());
        let (width, height) = gpu.size();
        let depth = create_depth_texture(&gpu.device, width, height, "Depth Texture");
        let overlay = show_ui.then(|| Overlay::new(&gpu.device, gpu.format(), &window));

        log::info!("Renderer initialized: {}x{} {:?}", width, height, gpu.format());

        Ok(Self {
            gpu,
            pipelines,
            depth,
            meshes: MeshCache::new(),
            views: Vec::new(),
            overlay,
        })
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.gpu.resize(size);
        self.depth = create_depth_texture(&self.gpu.device, size.width, size.height, "Depth Texture");
    }

    /// Recover from a lost or outdated surface
    pub fn reconfigure(&mut self) {
        self.gpu.reconfigure();
    }

    pub fn size(&self) -> (u32, u32) {
        self.gpu.size()
    }

    /// Forward a window event to the overlay; true when the overlay consumed it
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        match &mut self.overlay {
            Some(overlay) => overlay.handle_event(window, event),
            None => false,
        }
    }

    pub fn render(
        &mut self,
        window: &Window,
        frames: &[ViewFrame],
        stats: &OverlayStats,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.gpu.surface.get_current_texture()?;
        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        self.ensure_views(frames);

        let mut cleared = false;
        for (index, frame) in frames.iter().enumerate() {
            if frame.rect.is_empty() {
                continue;
            }

            let items = frame.root.map(collect_draw_items).unwrap_or_default();
            for item in &items {
                self.meshes.prepare(&self.gpu.device, &item.geometry);
            }

            let view = &mut self.views[index];
            view.set_environment(&self.gpu.device, &self.gpu.queue, &self.pipelines, frame.environment);

            let scene = SceneUniform::new(&SceneParams {
                camera: frame.camera,
                aspect: frame.rect.aspect(),
                lighting: frame.lighting,
                shadows: frame.shadows,
                background: frame.background,
                environment_average: frame.environment.map(|map| map.average()),
            });
            view.update(&self.gpu.device, &self.gpu.queue, &self.pipelines, &scene, &items);

            if frame.shadows && frame.lighting.directional.cast_shadow {
                view.encode_shadow_pass(&mut encoder, &self.pipelines, &self.meshes, &items);
            }
            view.encode_main_pass(
                &mut encoder,
                &self.pipelines,
                &self.meshes,
                &items,
                &target,
                &self.depth,
                frame.rect,
                !cleared,
            );
            cleared = true;
        }

        if !cleared {
            // Nothing visible, still clear so the window does not show garbage
            let _ = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
        }

        self.meshes.evict_unused();

        if let Some(overlay) = &mut self.overlay {
            let (width, height) = self.gpu.size();
            overlay.render(
                &self.gpu.device,
                &self.gpu.queue,
                &mut encoder,
                &target,
                window,
                [width, height],
                stats,
            );
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        window.pre_present_notify();
        output.present();

        Ok(())
    }

    /// One set of view resources per frame slot, rebuilt when the shadow map size changes
    fn ensure_views(&mut self, frames: &[ViewFrame]) {
        for (index, frame) in frames.iter().enumerate() {
            let shadow_size = if frame.shadows {
                frame.lighting.directional.shadow.map_size.max(1)
            } else {
                1
            };

            let stale = self
                .views
                .get(index)
                .is_none_or(|view| view.shadow_map_size() != shadow_size);
            if !stale {
                continue;
            }

            let view = ViewResources::new(&self.gpu.device, &self.gpu.queue, &self.pipelines, shadow_size);
            if index < self.views.len() {
                self.views[index] = view;
            } else {
                self.views.push(view);
            }
        }
    }
}
