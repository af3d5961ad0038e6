use glam::{Mat4, Vec3};
use std::sync::Arc;

use super::{Geometry, Material};
use crate::math::compose_trs;
use crate::traits::{Oriented, SceneGraphNode};

/// Node in an owned tree of renderable objects
///
/// A node is a mesh exactly when it carries a geometry. Geometry and materials
/// are reference counted so loaders can share them between nodes, and so a
/// material's identity survives a clone of the tree.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: Option<String>,
    pub translation: Vec3,
    /// Euler angles in radians, applied in XYZ order
    pub rotation: Vec3,
    pub scale: Vec3,
    pub geometry: Option<Arc<Geometry>>,
    pub material: Option<Arc<Material>>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Empty transform node
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn mesh(geometry: Arc<Geometry>, material: Option<Arc<Material>>) -> Self {
        Self {
            geometry: Some(geometry),
            material,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }

    pub fn is_mesh(&self) -> bool {
        self.geometry.is_some()
    }

    pub fn local_matrix(&self) -> Mat4 {
        compose_trs(self.translation, self.rotation, self.scale)
    }

    /// Pre-order iterator over this node and all descendants
    pub fn iter(&self) -> SceneIter<'_> {
        SceneIter { stack: vec![self] }
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    pub fn mesh_count(&self) -> usize {
        self.iter().filter(|n| n.is_mesh()).count()
    }

    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        self.iter().find(|n| n.name.as_deref() == Some(name))
    }
}

impl Default for SceneNode {
    fn default() -> Self {
        Self {
            name: None,
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            geometry: None,
            material: None,
            cast_shadow: false,
            receive_shadow: false,
            children: Vec::new(),
        }
    }
}

/// Depth-first, pre-order traversal
pub struct SceneIter<'a> {
    stack: Vec<&'a SceneNode>,
}

impl<'a> Iterator for SceneIter<'a> {
    type Item = &'a SceneNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl SceneGraphNode for SceneNode {
    type Material = Material;

    fn is_mesh(&self) -> bool {
        SceneNode::is_mesh(self)
    }

    fn material(&self) -> Option<&Material> {
        self.material.as_deref()
    }

    fn replace_material(&mut self, material: Material) {
        self.material = Some(Arc::new(material));
    }

    fn set_shadows(&mut self, cast: bool, receive: bool) {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
    }

    fn for_each_child_mut(&mut self, visit: &mut dyn FnMut(&mut Self)) {
        for child in &mut self.children {
            visit(child);
        }
    }
}

impl Oriented for SceneNode {
    fn rotation(&self) -> Vec3 {
        self.rotation
    }

    fn rotation_mut(&mut self) -> &mut Vec3 {
        &mut self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Color;

    fn sample_tree() -> SceneNode {
        let cube = Arc::new(Geometry::cuboid(1.0, 1.0, 1.0));
        SceneNode::group("root")
            .with_child(
                SceneNode::group("body")
                    .with_child(SceneNode::mesh(cube.clone(), None).with_name("wheel")),
            )
            .with_child(
                SceneNode::mesh(cube, Some(Arc::new(Material::basic(Color::RED)))).with_name("hood"),
            )
    }

    #[test]
    fn test_iter_is_pre_order() {
        let tree = sample_tree();
        let names: Vec<_> = tree.iter().filter_map(|n| n.name.as_deref()).collect();
        assert_eq!(names, vec!["root", "body", "wheel", "hood"]);
    }

    #[test]
    fn test_counts() {
        let tree = sample_tree();
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.mesh_count(), 2);
    }

    #[test]
    fn test_find_by_name() {
        let tree = sample_tree();
        assert!(tree.find("wheel").is_some_and(|n| n.is_mesh()));
        assert!(tree.find("missing").is_none());
    }

    #[test]
    fn test_default_node_has_no_shadows() {
        let node = SceneNode::default();
        assert!(!node.cast_shadow);
        assert!(!node.receive_shadow);
        assert_eq!(node.scale, Vec3::ONE);
    }

    #[test]
    fn test_clone_shares_materials() {
        let tree = sample_tree();
        let copy = tree.clone();
        let original = tree.find("hood").and_then(|n| n.material.clone()).unwrap();
        let cloned = copy.find("hood").and_then(|n| n.material.clone()).unwrap();
        assert!(Arc::ptr_eq(&original, &cloned));
    }
}
