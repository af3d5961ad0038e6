//! Prepares a freshly loaded scene graph for lit, shadowed display.
//!
//! Every mesh is switched to cast and receive shadows, and any material that
//! does not respond to scene lighting is swapped for a standard material that
//! keeps the original base color. Materials that already qualify are left
//! alone, so running the pass again changes nothing.

use serde::{Deserialize, Serialize};

use crate::traits::{SceneGraphNode, SurfaceMaterial};

pub const DEFAULT_ROUGHNESS: f32 = 0.5;
pub const DEFAULT_METALNESS: f32 = 0.5;

/// Factors given to materials created by an upgrade
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDefaults {
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for MaterialDefaults {
    fn default() -> Self {
        Self {
            roughness: DEFAULT_ROUGHNESS,
            metalness: DEFAULT_METALNESS,
        }
    }
}

/// Counts gathered during one normalization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub visited: usize,
    pub meshes: usize,
    pub upgraded: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AssetNormalizer {
    defaults: MaterialDefaults,
}

impl AssetNormalizer {
    pub fn new(defaults: MaterialDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> MaterialDefaults {
        self.defaults
    }

    pub fn normalize<N: SceneGraphNode>(&self, root: &mut N) {
        let report = self.normalize_with_report(root);
        log::debug!(
            "normalized scene: {} nodes, {} meshes, {} materials upgraded",
            report.visited,
            report.meshes,
            report.upgraded
        );
    }

    pub fn normalize_with_report<N: SceneGraphNode>(&self, root: &mut N) -> NormalizeReport {
        let mut report = NormalizeReport::default();
        visit(root, &self.defaults, &mut report);
        report
    }
}

/// Normalize with the stock 0.5 roughness / 0.5 metalness defaults
pub fn normalize<N: SceneGraphNode>(root: &mut N) {
    AssetNormalizer::default().normalize(root);
}

fn visit<N: SceneGraphNode>(node: &mut N, defaults: &MaterialDefaults, report: &mut NormalizeReport) {
    report.visited += 1;

    if node.is_mesh() {
        report.meshes += 1;
        node.set_shadows(true, true);

        let replacement = node
            .material()
            .filter(|material| !material.is_light_reactive())
            .map(|material| {
                N::Material::light_reactive(material.base_color(), defaults.roughness, defaults.metalness)
            });

        if let Some(material) = replacement {
            node.replace_material(material);
            report.upgraded += 1;
        }
    }

    node.for_each_child_mut(&mut |child: &mut N| visit(child, defaults, report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Color;
    use crate::scene::{Geometry, Material, MaterialKind, SceneNode};
    use std::sync::Arc;

    fn cube() -> Arc<Geometry> {
        Arc::new(Geometry::cuboid(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_scenario_red_basic_mesh_and_group() {
        let mut root = SceneNode::group("root")
            .with_child(SceneNode::mesh(cube(), Some(Arc::new(Material::basic(Color::RED)))).with_name("mesh"))
            .with_child(SceneNode::group("empty"));

        normalize(&mut root);

        let mesh = root.find("mesh").unwrap();
        assert!(mesh.cast_shadow);
        assert!(mesh.receive_shadow);
        let material = mesh.material.as_ref().unwrap();
        assert_eq!(material.kind, MaterialKind::Standard);
        assert_eq!(material.color, Color::RED);
        assert_eq!(material.roughness, 0.5);
        assert_eq!(material.metalness, 0.5);

        let empty = root.find("empty").unwrap();
        assert!(!empty.cast_shadow);
        assert!(!empty.receive_shadow);
        assert!(empty.material.is_none());
    }

    #[test]
    fn test_report_counts() {
        let mut root = SceneNode::group("root")
            .with_child(SceneNode::mesh(cube(), Some(Arc::new(Material::phong(Color::WHITE)))))
            .with_child(SceneNode::mesh(cube(), Some(Arc::new(Material::default()))))
            .with_child(SceneNode::mesh(cube(), None));

        let report = AssetNormalizer::default().normalize_with_report(&mut root);
        assert_eq!(
            report,
            NormalizeReport {
                visited: 4,
                meshes: 3,
                upgraded: 1
            }
        );
    }

    #[test]
    fn test_custom_defaults_apply_to_upgrades() {
        let normalizer = AssetNormalizer::new(MaterialDefaults {
            roughness: 0.2,
            metalness: 0.9,
        });
        let mut mesh = SceneNode::mesh(cube(), Some(Arc::new(Material::lambert(Color::PINK))));

        normalizer.normalize(&mut mesh);

        let material = mesh.material.unwrap();
        assert_eq!(material.roughness, 0.2);
        assert_eq!(material.metalness, 0.9);
    }

    #[test]
    fn test_mesh_without_material_only_gets_shadows() {
        let mut mesh = SceneNode::mesh(cube(), None);
        normalize(&mut mesh);
        assert!(mesh.cast_shadow && mesh.receive_shadow);
        assert!(mesh.material.is_none());
    }

    #[test]
    fn test_shadow_flags_are_overwritten() {
        let mut mesh = SceneNode::mesh(cube(), None).with_shadows(false, true);
        normalize(&mut mesh);
        assert!(mesh.cast_shadow && mesh.receive_shadow);
    }

    #[test]
    fn test_lone_group_is_untouched() {
        let mut group = SceneNode::group("lonely");
        let report = AssetNormalizer::default().normalize_with_report(&mut group);
        assert_eq!(report.visited, 1);
        assert_eq!(report.meshes, 0);
        assert!(!group.cast_shadow);
    }
}
