//! Window-independent state of the viewer: both views, their cameras, the
//! frame clock and input routing. The binary feeds it winit input and hands
//! its view frames to the renderer.

use crate::animation::SpinAnimator;
use crate::camera::OrbitCamera;
use crate::config::{FallbackViewConfig, ModelViewConfig, ViewerConfig};
use crate::core::{Clock, Controller, FpsCounter, Layout, ViewRect, WindowDimensions};
use crate::frame::FrameInfo;
use crate::normalize::AssetNormalizer;
use crate::renderer::{OverlayStats, ViewFrame, ViewStats};
use crate::scene::SceneNode;
use crate::scenes::{fallback_scene, ModelSource, ModelStage};
use crate::traits::{CameraController, FrameHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewSlot {
    Model,
    Fallback,
}

struct ModelView {
    stage: ModelStage,
    camera: OrbitCamera,
    config: ModelViewConfig,
}

struct FallbackView {
    scene: SceneNode,
    camera: OrbitCamera,
    config: FallbackViewConfig,
}

pub struct Viewer {
    layout: Layout,
    model: ModelView,
    fallback: FallbackView,
    clock: Clock,
    fps: FpsCounter,
    frame: FrameInfo,
    /// View that owns the current drag
    active: Option<ViewSlot>,
}

impl Viewer {
    pub fn new(config: &ViewerConfig) -> Self {
        let model_config = config.model.clone();
        let stage = ModelStage::new(
            ModelSource::File(model_config.model_path.clone()),
            AssetNormalizer::new(model_config.material_defaults),
            SpinAnimator::new(model_config.spin_step),
        )
        .with_environment(model_config.environment_path.clone());

        Self {
            layout: config.window.layout,
            model: ModelView {
                stage,
                camera: OrbitCamera::from_config(&model_config.camera, &config.orbit),
                config: model_config,
            },
            fallback: FallbackView {
                scene: fallback_scene(&config.fallback),
                camera: OrbitCamera::from_config(&config.fallback.camera, &config.orbit),
                config: config.fallback.clone(),
            },
            clock: Clock::new(),
            fps: FpsCounter::default(),
            frame: FrameInfo::first(),
            active: None,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Start loading whatever the layout shows
    pub fn mount(&mut self) {
        if self.shows(ViewSlot::Model) {
            self.model.stage.mount();
        }
        self.clock.reset();
    }

    pub fn unmount(&mut self) {
        self.model.stage.unmount();
    }

    pub fn shows(&self, slot: ViewSlot) -> bool {
        match (self.layout, slot) {
            (Layout::Stacked, _) => true,
            (Layout::ModelOnly, ViewSlot::Model) => true,
            (Layout::FallbackOnly, ViewSlot::Fallback) => true,
            _ => false,
        }
    }

    /// Advance by wall-clock time
    pub fn tick(&mut self) -> FrameInfo {
        let frame = self.clock.next_frame();
        self.advance(frame)
    }

    /// Poll loads, run frame handlers and step the cameras
    pub fn advance(&mut self, frame: FrameInfo) -> FrameInfo {
        self.frame = frame;

        if let Some(fps) = self.fps.tick(frame.delta) {
            log::debug!("FPS: {:.1}", fps);
        }

        self.model.stage.poll();
        self.model.stage.on_frame(&frame);

        self.model.camera.update(frame.delta);
        self.fallback.camera.update(frame.delta);

        frame
    }

    pub fn frame(&self) -> FrameInfo {
        self.frame
    }

    /// Visible slots with their rectangles, model first
    pub fn rects(&self, dims: WindowDimensions) -> Vec<(ViewSlot, ViewRect)> {
        let (model, fallback) = self.layout.split(dims);
        model
            .map(|rect| (ViewSlot::Model, rect))
            .into_iter()
            .chain(fallback.map(|rect| (ViewSlot::Fallback, rect)))
            .collect()
    }

    pub fn slot_at(&self, x: f32, y: f32, dims: WindowDimensions) -> Option<ViewSlot> {
        self.rects(dims)
            .into_iter()
            .find(|(_, rect)| rect.contains(x, y))
            .map(|(slot, _)| slot)
    }

    /// Route pointer input to the view under the cursor; a drag stays with
    /// the view it started in until every button is released
    pub fn handle_input(&mut self, controller: &dyn Controller, cursor: Option<(f32, f32)>, dims: WindowDimensions) {
        let hovered = cursor.and_then(|(x, y)| self.slot_at(x, y, dims));

        if controller.drag_mode().is_some() {
            if self.active.is_none() {
                self.active = hovered;
            }
        } else {
            self.active = None;
        }

        let Some(slot) = self.active.or(hovered) else {
            return;
        };
        let Some(rect) = self.rects(dims).into_iter().find(|(s, _)| *s == slot).map(|(_, r)| r) else {
            return;
        };

        let camera = self.camera_mut(slot);
        if controller.drag_mode().is_some() || controller.scroll_delta() != 0.0 {
            camera.apply_input(controller, rect.height as f32);
        }
    }

    pub fn camera(&self, slot: ViewSlot) -> &OrbitCamera {
        match slot {
            ViewSlot::Model => &self.model.camera,
            ViewSlot::Fallback => &self.fallback.camera,
        }
    }

    pub fn camera_mut(&mut self, slot: ViewSlot) -> &mut OrbitCamera {
        match slot {
            ViewSlot::Model => &mut self.model.camera,
            ViewSlot::Fallback => &mut self.fallback.camera,
        }
    }

    pub fn stage(&self) -> &ModelStage {
        &self.model.stage
    }

    pub fn stage_mut(&mut self) -> &mut ModelStage {
        &mut self.model.stage
    }

    pub fn fallback_root(&self) -> &SceneNode {
        &self.fallback.scene
    }

    /// Draw requests for the visible views
    pub fn view_frames(&self, dims: WindowDimensions) -> Vec<ViewFrame<'_>> {
        self.rects(dims)
            .into_iter()
            .map(|(slot, rect)| match slot {
                ViewSlot::Model => ViewFrame {
                    rect,
                    root: self.model.stage.root(),
                    camera: &self.model.camera,
                    lighting: &self.model.config.lighting,
                    shadows: self.model.config.shadows,
                    background: self.model.config.background,
                    environment: self.model.stage.environment(),
                },
                ViewSlot::Fallback => ViewFrame {
                    rect,
                    root: Some(&self.fallback.scene),
                    camera: &self.fallback.camera,
                    lighting: &self.fallback.config.lighting,
                    shadows: self.fallback.config.shadows,
                    background: self.fallback.config.background,
                    environment: None,
                },
            })
            .collect()
    }

    pub fn stats(&self) -> OverlayStats {
        let views = [ViewSlot::Model, ViewSlot::Fallback]
            .into_iter()
            .filter(|slot| self.shows(*slot))
            .map(|slot| {
                let camera = self.camera(slot);
                let (label, status, spin) = match slot {
                    ViewSlot::Model => (
                        "Model",
                        self.model.stage.status().to_string(),
                        self.model.stage.root().map(|root| root.rotation.y),
                    ),
                    ViewSlot::Fallback => ("Fallback", "static".to_string(), None),
                };
                ViewStats {
                    label,
                    status,
                    camera_distance: camera.distance(),
                    camera_angles: (camera.azimuth, camera.polar),
                    spin,
                }
            })
            .collect();

        OverlayStats {
            fps: self.fps.fps(),
            views,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Button;

    struct Pointer {
        pressed: Vec<Button>,
        delta: (f32, f32),
        scroll: f32,
    }

    impl Controller for Pointer {
        fn is_down(&self, button: Button) -> bool {
            self.pressed.contains(&button)
        }

        fn get_down_keys(&self) -> &[Button] {
            &self.pressed
        }

        fn pointer_delta(&self) -> (f32, f32) {
            self.delta
        }

        fn scroll_delta(&self) -> f32 {
            self.scroll
        }
    }

    fn viewer(layout: Layout) -> Viewer {
        let mut config = ViewerConfig::default();
        config.window.layout = layout;
        config.orbit.enable_damping = false;
        Viewer::new(&config)
    }

    const DIMS: WindowDimensions = WindowDimensions { width: 800, height: 600 };

    #[test]
    fn test_stacked_layout_routes_by_cursor() {
        let viewer = viewer(Layout::Stacked);
        assert_eq!(viewer.slot_at(100.0, 100.0, DIMS), Some(ViewSlot::Model));
        assert_eq!(viewer.slot_at(100.0, 500.0, DIMS), Some(ViewSlot::Fallback));
    }

    #[test]
    fn test_drag_stays_with_starting_view() {
        let mut viewer = viewer(Layout::Stacked);
        let model_azimuth = viewer.camera(ViewSlot::Model).azimuth;
        let fallback_azimuth = viewer.camera(ViewSlot::Fallback).azimuth;

        let drag = Pointer {
            pressed: vec![Button::MouseLeft],
            delta: (30.0, 0.0),
            scroll: 0.0,
        };
        viewer.handle_input(&drag, Some((100.0, 100.0)), DIMS);
        // Cursor wandered into the lower view while still dragging
        viewer.handle_input(&drag, Some((100.0, 500.0)), DIMS);
        viewer.advance(FrameInfo::first().advance(0.016));

        assert_ne!(viewer.camera(ViewSlot::Model).azimuth, model_azimuth);
        assert_eq!(viewer.camera(ViewSlot::Fallback).azimuth, fallback_azimuth);
    }

    #[test]
    fn test_scroll_zooms_hovered_view() {
        let mut viewer = viewer(Layout::Stacked);
        let before = viewer.camera(ViewSlot::Fallback).distance();

        let wheel = Pointer {
            pressed: vec![],
            delta: (0.0, 0.0),
            scroll: 1.0,
        };
        viewer.handle_input(&wheel, Some((10.0, 590.0)), DIMS);
        viewer.advance(FrameInfo::first().advance(0.016));

        assert!(viewer.camera(ViewSlot::Fallback).distance() < before);
    }

    #[test]
    fn test_single_view_layout_frames() {
        let viewer = viewer(Layout::FallbackOnly);
        let frames = viewer.view_frames(DIMS);
        assert_eq!(frames.len(), 1);
        assert!(frames[0].root.is_some());
        assert_eq!(frames[0].rect.height, 600);
        assert!(!viewer.shows(ViewSlot::Model));
    }

    #[test]
    fn test_model_view_draws_nothing_until_loaded() {
        let viewer = viewer(Layout::Stacked);
        let frames = viewer.view_frames(DIMS);
        assert!(frames[0].root.is_none());
        assert!(frames[1].root.is_some());
    }

    #[test]
    fn test_stats_list_visible_views() {
        let viewer = viewer(Layout::ModelOnly);
        let stats = viewer.stats();
        assert_eq!(stats.views.len(), 1);
        assert_eq!(stats.views[0].label, "Model");
        assert_eq!(stats.views[0].status, "idle");
        assert!(stats.views[0].spin.is_none());
    }
}
