use glam::Vec3;

use crate::math::Color;

/// Material capability needed to bring a surface under scene lighting
pub trait SurfaceMaterial: Sized {
    /// Whether the material already responds to lights physically
    fn is_light_reactive(&self) -> bool;

    fn base_color(&self) -> Color;

    /// Build a light-reactive material
    fn light_reactive(color: Color, roughness: f32, metalness: f32) -> Self;
}

/// Minimal node interface for walking and patching a loaded scene graph
pub trait SceneGraphNode {
    type Material: SurfaceMaterial;

    /// Carries geometry meant to be drawn as a surface
    fn is_mesh(&self) -> bool;

    fn material(&self) -> Option<&Self::Material>;

    fn replace_material(&mut self, material: Self::Material);

    fn set_shadows(&mut self, cast: bool, receive: bool);

    /// Call `visit` once for each direct child
    fn for_each_child_mut(&mut self, visit: &mut dyn FnMut(&mut Self));
}

/// Anything with an Euler orientation that can be spun
pub trait Oriented {
    fn rotation(&self) -> Vec3;

    fn rotation_mut(&mut self) -> &mut Vec3;
}
