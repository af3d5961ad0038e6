use std::sync::Arc;

use crate::config::FallbackViewConfig;
use crate::scene::{Geometry, Material, SceneNode};

/// Static scene shown beside the model: one pink box, no shadows
pub fn fallback_scene(config: &FallbackViewConfig) -> SceneNode {
    let [width, height, depth] = config.box_size;
    let geometry = Arc::new(Geometry::cuboid(width, height, depth));
    let material = Arc::new(Material::standard(config.color, 1.0, 0.0).with_name("fallback"));

    SceneNode::group("fallback").with_child(
        SceneNode::mesh(geometry, Some(material)).with_name("box"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Color;

    #[test]
    fn test_default_box() {
        let scene = fallback_scene(&FallbackViewConfig::default());
        assert_eq!(scene.mesh_count(), 1);

        let mesh = scene.find("box").unwrap();
        let material = mesh.material.as_ref().unwrap();
        assert_eq!(material.color, Color::PINK);
        assert!(material.is_standard());
        assert!(!mesh.cast_shadow && !mesh.receive_shadow);

        let geometry = mesh.geometry.as_ref().unwrap();
        let max = geometry
            .positions
            .iter()
            .fold([f32::MIN; 3], |acc, p| [acc[0].max(p[0]), acc[1].max(p[1]), acc[2].max(p[2])]);
        assert_eq!(max, [1.0, 1.5, 1.0]);
    }

    #[test]
    fn test_configured_size_and_color() {
        let config = FallbackViewConfig {
            box_size: [1.0, 1.0, 4.0],
            color: Color::RED,
            ..FallbackViewConfig::default()
        };
        let scene = fallback_scene(&config);
        let mesh = scene.find("box").unwrap();
        assert_eq!(mesh.material.as_ref().unwrap().color, Color::RED);
        assert_eq!(mesh.geometry.as_ref().unwrap().vertex_count(), 24);
    }
}
