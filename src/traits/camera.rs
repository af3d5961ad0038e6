use glam::{Mat4, Vec3};

/// Camera movement and control abstraction
pub trait CameraController {
    /// Update camera state based on elapsed time
    fn update(&mut self, delta_time: f32);

    /// Get the view matrix for rendering
    fn view_matrix(&self) -> Mat4;

    /// Get the projection matrix for the given aspect ratio
    fn projection_matrix(&self, aspect: f32) -> Mat4;

    /// Get the camera position in world space
    fn position(&self) -> Vec3;

    /// Get the camera forward direction
    fn forward(&self) -> Vec3;
}
