use winit::window::Window;

/// What one view reports to the overlay
#[derive(Debug, Clone)]
pub struct ViewStats {
    pub label: &'static str,
    pub status: String,
    pub camera_distance: f32,
    /// Camera azimuth and polar angle in radians
    pub camera_angles: (f32, f32),
    /// Current spin of the tracked model, when there is one
    pub spin: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub fps: f32,
    pub views: Vec<ViewStats>,
}

/// egui window drawn on top of the views
pub struct Overlay {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl Overlay {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, window: &Window) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self { ctx, state, renderer }
    }

    /// Returns true when egui wants the event for itself
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        window: &Window,
        size_in_pixels: [u32; 2],
        stats: &OverlayStats,
    ) {
        let raw_input = self.state.take_egui_input(window);

        let full_output = self.ctx.run(raw_input, |ctx| {
            egui::Window::new("Model Viewer")
                .title_bar(true)
                .resizable(false)
                .fixed_pos(egui::pos2(10.0, 10.0))
                .default_width(220.0)
                .show(ctx, |ui| {
                    ui.heading(
                        egui::RichText::new(format!("{:.0} FPS", stats.fps))
                            .size(24.0)
                            .color(egui::Color32::from_rgb(74, 158, 255)),
                    );

                    let frame_time_ms = if stats.fps > 0.0 { 1000.0 / stats.fps } else { 0.0 };
                    ui.label(
                        egui::RichText::new(format!("{:.2} ms", frame_time_ms))
                            .size(14.0)
                            .color(egui::Color32::GRAY),
                    );

                    for view in &stats.views {
                        ui.add_space(5.0);
                        ui.separator();
                        ui.add_space(5.0);

                        ui.label(
                            egui::RichText::new(view.label)
                                .size(16.0)
                                .color(egui::Color32::from_rgb(100, 200, 100)),
                        );
                        ui.monospace(format!("Status: {}", view.status));
                        ui.monospace(format!("Distance: {:.2}", view.camera_distance));
                        ui.monospace(format!(
                            "Azimuth: {:.1}° Polar: {:.1}°",
                            view.camera_angles.0.to_degrees(),
                            view.camera_angles.1.to_degrees()
                        ));
                        if let Some(spin) = view.spin {
                            ui.monospace(format!("Spin: {:.1}°", spin.to_degrees()));
                        }
                    }
                });
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: full_output.pixels_per_point,
        };

        self.renderer
            .update_buffers(device, queue, encoder, &tris, &screen_descriptor);

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.renderer.render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
