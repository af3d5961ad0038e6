use glam::Mat4;
use std::sync::Arc;

use crate::scene::{Geometry, Material, SceneNode};

/// One mesh ready for drawing, with its transform flattened to world space
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub world: Mat4,
    pub geometry: Arc<Geometry>,
    pub material: Arc<Material>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

/// Flatten a scene tree into draw items, parents before children
///
/// Meshes without a material are drawn with the default standard material.
pub fn collect_draw_items(root: &SceneNode) -> Vec<DrawItem> {
    let fallback = Arc::new(Material::default());
    let mut items = Vec::new();
    collect(root, Mat4::IDENTITY, &fallback, &mut items);
    items
}

fn collect(node: &SceneNode, parent: Mat4, fallback: &Arc<Material>, items: &mut Vec<DrawItem>) {
    let world = parent * node.local_matrix();

    if let Some(geometry) = &node.geometry {
        items.push(DrawItem {
            world,
            geometry: geometry.clone(),
            material: node.material.clone().unwrap_or_else(|| fallback.clone()),
            cast_shadow: node.cast_shadow,
            receive_shadow: node.receive_shadow,
        });
    }

    for child in &node.children {
        collect(child, world, fallback, items);
    }
}
