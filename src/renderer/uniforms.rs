use glam::{Mat4, Vec3};

use super::draw::DrawItem;
use crate::config::{DirectionalLightConfig, LightingConfig};
use crate::math::Color;
use crate::scene::MaterialKind;
use crate::traits::CameraController;

/// Interleaved vertex as uploaded to the GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-view lighting and camera data, shared by the shadow and main passes
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// xyz: unit vector towards the light, w: intensity
    pub light_direction: [f32; 4],
    /// rgb: light color, w: 1.0 when shadows are sampled
    pub light_color: [f32; 4],
    /// rgb: ambient color times intensity, w: 1.0 when an environment is bound
    pub ambient: [f32; 4],
    /// rgb: hemisphere sky color, w: hemisphere intensity (0 when absent)
    pub sky_color: [f32; 4],
    pub ground_color: [f32; 4],
    pub environment_average: [f32; 4],
    pub background: [f32; 4],
    /// x: depth bias, y: shadow texel size
    pub shadow_params: [f32; 4],
}

/// Everything about a view the scene uniform is built from
pub struct SceneParams<'a> {
    pub camera: &'a dyn CameraController,
    pub aspect: f32,
    pub lighting: &'a LightingConfig,
    pub shadows: bool,
    pub background: Color,
    pub environment_average: Option<[f32; 3]>,
}

impl SceneUniform {
    pub fn new(params: &SceneParams) -> Self {
        let lighting = params.lighting;
        let directional = &lighting.directional;
        let shadows = params.shadows && directional.cast_shadow;

        let view_proj = params.camera.projection_matrix(params.aspect) * params.camera.view_matrix();
        let towards_light = (Vec3::from_array(directional.position) - Vec3::from_array(directional.target))
            .normalize_or(Vec3::Y);

        let ambient = lighting.ambient.color.to_array().map(|c| c * lighting.ambient.intensity);
        let (sky, ground, hemisphere_intensity) = match &lighting.hemisphere {
            Some(hemisphere) => (hemisphere.sky, hemisphere.ground, hemisphere.intensity),
            None => (Color::BLACK, Color::BLACK, 0.0),
        };
        let environment = params.environment_average;
        let average = environment.unwrap_or([0.0; 3]);

        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_view_proj: light_view_projection(directional).to_cols_array_2d(),
            camera_position: params.camera.position().extend(1.0).to_array(),
            light_direction: towards_light.extend(directional.intensity).to_array(),
            light_color: rgbw(directional.color, if shadows { 1.0 } else { 0.0 }),
            ambient: [ambient[0], ambient[1], ambient[2], if environment.is_some() { 1.0 } else { 0.0 }],
            sky_color: rgbw(sky, hemisphere_intensity),
            ground_color: rgbw(ground, 0.0),
            environment_average: [average[0], average[1], average[2], 0.0],
            background: rgbw(params.background, 1.0),
            shadow_params: [
                directional.shadow.bias,
                1.0 / directional.shadow.map_size.max(1) as f32,
                0.0,
                0.0,
            ],
        }
    }
}

/// Orthographic camera looking from the light towards its target
pub fn light_view_projection(light: &DirectionalLightConfig) -> Mat4 {
    let eye = Vec3::from_array(light.position);
    let target = Vec3::from_array(light.target);
    let direction = (target - eye).normalize_or(Vec3::NEG_Y);
    let up = if direction.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };

    let extent = light.shadow.extent;
    let projection = Mat4::orthographic_rh(-extent, extent, -extent, extent, light.shadow.near, light.shadow.far);
    projection * Mat4::look_at_rh(eye, target, up)
}

/// Per-draw transform and material, addressed with a dynamic offset
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x: roughness, y: metalness, z: shading model, w: 1.0 when receiving shadows
    pub params: [f32; 4],
}

impl ObjectUniform {
    pub fn new(item: &DrawItem) -> Self {
        let material = &item.material;
        Self {
            model: item.world.to_cols_array_2d(),
            normal_matrix: item.world.inverse().transpose().to_cols_array_2d(),
            color: rgbw(material.color, 1.0),
            params: [
                material.roughness,
                material.metalness,
                shading_model(material.kind),
                if item.receive_shadow { 1.0 } else { 0.0 },
            ],
        }
    }
}

/// Shading model index understood by the scene shader
pub fn shading_model(kind: MaterialKind) -> f32 {
    match kind {
        MaterialKind::Basic => 0.0,
        MaterialKind::Lambert => 1.0,
        MaterialKind::Phong => 2.0,
        MaterialKind::Standard => 3.0,
    }
}

fn rgbw(color: Color, w: f32) -> [f32; 4] {
    let [r, g, b] = color.to_array();
    [r, g, b, w]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrbitCamera;
    use crate::config::ModelViewConfig;
    use crate::scene::{Geometry, Material};
    use std::sync::Arc;

    #[test]
    fn test_uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<SceneUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 160);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }

    #[test]
    fn test_light_projection_centers_target() {
        let light = DirectionalLightConfig::default();
        let clip = light_view_projection(&light) * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn test_light_straight_down_still_projects() {
        let light = DirectionalLightConfig {
            position: [0.0, 10.0, 0.0],
            ..DirectionalLightConfig::default()
        };
        let matrix = light_view_projection(&light);
        assert!(matrix.is_finite());
    }

    #[test]
    fn test_scene_uniform_flags() {
        let config = ModelViewConfig::default();
        let camera = OrbitCamera::from_config(&config.camera, &Default::default());
        let uniform = SceneUniform::new(&SceneParams {
            camera: &camera,
            aspect: 1.5,
            lighting: &config.lighting,
            shadows: true,
            background: config.background,
            environment_average: Some([0.1, 0.2, 0.3]),
        });

        assert_eq!(uniform.light_color[3], 1.0);
        assert_eq!(uniform.ambient[3], 1.0);
        assert!((uniform.ambient[0] - 0.2).abs() < 1e-6);
        assert_eq!(uniform.sky_color[3], 0.5);
        assert_eq!(uniform.light_direction[3], 1.5);
        assert_eq!(uniform.environment_average[1], 0.2);
    }

    #[test]
    fn test_object_uniform_packs_material() {
        let item = DrawItem {
            world: Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            geometry: Arc::new(Geometry::cuboid(1.0, 1.0, 1.0)),
            material: Arc::new(Material::standard(Color::RED, 0.25, 0.75)),
            cast_shadow: true,
            receive_shadow: true,
        };
        let uniform = ObjectUniform::new(&item);
        assert_eq!(uniform.params, [0.25, 0.75, 3.0, 1.0]);
        assert_eq!(uniform.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniform.color, [1.0, 0.0, 0.0, 1.0]);
    }
}
