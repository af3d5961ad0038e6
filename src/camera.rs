use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};

use crate::config::{CameraConfig, OrbitConfig};
use crate::core::{Controller, DragMode};
use crate::traits::CameraController;

/// Keeps the camera from flipping over the poles
const POLAR_EPSILON: f32 = 1e-3;
/// Radius factor per wheel line at zoom speed 1
pub const ZOOM_STEP: f32 = 0.95;

/// Motion still to be applied, decayed by damping each update
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct OrbitDelta {
    azimuth: f32,
    polar: f32,
    pan: Vec3,
}

/// Camera orbiting a target point, driven by drag and wheel input
///
/// Angles follow the usual spherical convention around +Y: `azimuth` is
/// measured from +Z towards +X and `polar` from +Y downwards.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    pub azimuth: f32,
    pub polar: f32,
    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    settings: OrbitConfig,
    delta: OrbitDelta,
    pending_scale: f32,
}

impl OrbitCamera {
    pub fn from_position(position: Vec3, target: Vec3, fov_degrees: f32, near: f32, far: f32) -> Self {
        let offset = position - target;
        let radius = offset.length();
        let (azimuth, polar) = if radius > 0.0 {
            (offset.x.atan2(offset.z), (offset.y / radius).clamp(-1.0, 1.0).acos())
        } else {
            (0.0, PI * 0.5)
        };

        Self {
            target,
            radius,
            azimuth,
            polar,
            fov: fov_degrees.to_radians(),
            near,
            far,
            settings: OrbitConfig::default(),
            delta: OrbitDelta::default(),
            pending_scale: 1.0,
        }
    }

    pub fn from_config(camera: &CameraConfig, orbit: &OrbitConfig) -> Self {
        Self::from_position(
            Vec3::from_array(camera.position),
            Vec3::from_array(camera.target),
            camera.fov,
            camera.near,
            camera.far,
        )
        .with_settings(*orbit)
    }

    pub fn with_settings(mut self, settings: OrbitConfig) -> Self {
        self.settings = settings;
        self.radius = self.clamp_radius(self.radius);
        self
    }

    pub fn settings(&self) -> &OrbitConfig {
        &self.settings
    }

    /// Drag by a pixel delta; a drag across the full viewport height is one turn
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.delta.azimuth -= TAU * dx / height * self.settings.rotate_speed;
        self.delta.polar -= TAU * dy / height * self.settings.rotate_speed;
    }

    /// Wheel steps; positive moves towards the target
    pub fn zoom(&mut self, steps: f32) {
        self.pending_scale *= ZOOM_STEP.powf(self.settings.zoom_speed * steps);
    }

    /// Slide the target in the view plane by a pixel delta
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        let world_per_pixel = 2.0 * self.radius * (self.fov * 0.5).tan() / height;
        let (right, up) = self.screen_axes();
        self.delta.pan += (-right * dx + up * dy) * world_per_pixel * self.settings.pan_speed;
    }

    /// Feed one frame of pointer input through the drag bindings
    pub fn apply_input(&mut self, controller: &dyn Controller, viewport_height: f32) {
        let (dx, dy) = controller.pointer_delta();
        match controller.drag_mode() {
            Some(DragMode::Rotate) => self.rotate(dx, dy, viewport_height),
            Some(DragMode::Pan) => self.pan(dx, dy, viewport_height),
            Some(DragMode::Dolly) => self.zoom(-dy / 10.0),
            None => {}
        }

        let scroll = controller.scroll_delta();
        if scroll != 0.0 {
            self.zoom(scroll);
        }
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    /// Whether damping still has motion to play out
    pub fn is_moving(&self) -> bool {
        self.delta.azimuth.abs() > 1e-6
            || self.delta.polar.abs() > 1e-6
            || self.delta.pan.length_squared() > 1e-12
            || (self.pending_scale - 1.0).abs() > 1e-6
    }

    fn screen_axes(&self) -> (Vec3, Vec3) {
        let forward = self.forward();
        let right = forward.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
        let up = right.cross(forward);
        (right, up)
    }

    fn clamp_radius(&self, radius: f32) -> f32 {
        radius.clamp(self.settings.min_distance, self.settings.max_distance)
    }
}

impl CameraController for OrbitCamera {
    /// Damping works per frame, like three.js OrbitControls, so `delta_time` is unused
    fn update(&mut self, _delta_time: f32) {
        let factor = if self.settings.enable_damping {
            self.settings.damping_factor
        } else {
            1.0
        };

        self.azimuth = (self.azimuth + self.delta.azimuth * factor).rem_euclid(TAU);
        self.polar = (self.polar + self.delta.polar * factor).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.target += self.delta.pan * factor;

        self.radius = self.clamp_radius(self.radius * self.pending_scale);
        self.pending_scale = 1.0;

        if self.settings.enable_damping {
            self.delta.azimuth *= 1.0 - factor;
            self.delta.polar *= 1.0 - factor;
            self.delta.pan *= 1.0 - factor;
        } else {
            self.delta = OrbitDelta::default();
        }
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect.max(f32::EPSILON), self.near, self.far)
    }

    fn position(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        self.target + Vec3::new(sin_polar * sin_azimuth, cos_polar, sin_polar * cos_azimuth) * self.radius
    }

    fn forward(&self) -> Vec3 {
        (self.target - self.position()).normalize_or_zero()
    }
}
