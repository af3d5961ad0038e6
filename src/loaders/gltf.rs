use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::math::{decompose_trs, Color};
use crate::scene::{Geometry, Material, SceneNode};

/// Loads a glTF or GLB file into an owned scene tree
pub fn load_gltf(path: impl AsRef<Path>) -> Result<SceneNode> {
    let path = path.as_ref();
    log::info!("Loading glTF file: {:?}", path);

    let (document, buffers, _images) =
        gltf::import(path).context(format!("Failed to load glTF file: {:?}", path))?;

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scene".to_string());

    build_scene(&document, &buffers, name)
}

/// Loads glTF from memory (JSON with embedded buffers, or GLB)
pub fn load_gltf_slice(bytes: &[u8]) -> Result<SceneNode> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).context("Failed to load glTF from memory")?;
    build_scene(&document, &buffers, "scene".to_string())
}

/// Converts the default scene (or the first one) into a tree under a single root
fn build_scene(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    name: String,
) -> Result<SceneNode> {
    log::info!(
        "glTF loaded: {} scenes, {} nodes, {} meshes, {} materials",
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count(),
        document.materials().count()
    );

    let mut builder = SceneBuilder {
        buffers,
        geometries: HashMap::new(),
        materials: HashMap::new(),
    };

    let mut root = SceneNode::group(name);

    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        log::debug!("Processing scene: {:?}", scene.name());
        for node in scene.nodes() {
            root.children.push(builder.convert_node(&node)?);
        }
    } else {
        log::warn!("glTF document has no scenes");
    }

    log::info!(
        "Built scene tree: {} nodes, {} meshes",
        root.node_count(),
        root.mesh_count()
    );
    Ok(root)
}

/// Shares converted geometry and materials across every node that references them
struct SceneBuilder<'a> {
    buffers: &'a [gltf::buffer::Data],
    geometries: HashMap<(usize, usize), Arc<Geometry>>,
    materials: HashMap<Option<usize>, Arc<Material>>,
}

impl SceneBuilder<'_> {
    /// Recursively converts glTF nodes
    fn convert_node(&mut self, node: &gltf::Node) -> Result<SceneNode> {
        // Nodes may carry either TRS properties or a full matrix
        let (translation, rotation, scale) = decompose_trs(&node.transform().matrix());

        let mut converted = SceneNode {
            name: node.name().map(str::to_string),
            translation,
            rotation,
            scale,
            ..SceneNode::default()
        };

        if let Some(mesh) = node.mesh() {
            let mut surfaces = self.convert_mesh(&mesh)?;
            if surfaces.len() == 1 {
                let (geometry, material) = surfaces.remove(0);
                converted.geometry = Some(geometry);
                converted.material = Some(material);
            } else {
                // One child per primitive, like a multi-material mesh split into a group
                converted.children.extend(
                    surfaces
                        .into_iter()
                        .map(|(geometry, material)| SceneNode::mesh(geometry, Some(material))),
                );
            }
        }

        for child in node.children() {
            converted.children.push(self.convert_node(&child)?);
        }

        Ok(converted)
    }

    /// Converts every triangle primitive of a mesh
    fn convert_mesh(&mut self, mesh: &gltf::Mesh) -> Result<Vec<(Arc<Geometry>, Arc<Material>)>> {
        log::debug!("  Processing mesh: {:?}", mesh.name());

        let mut surfaces = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping primitive {} of mesh {:?}: unsupported mode {:?}",
                    primitive.index(),
                    mesh.name(),
                    primitive.mode()
                );
                continue;
            }

            let geometry = match self.geometries.get(&(mesh.index(), primitive.index())) {
                Some(geometry) => geometry.clone(),
                None => {
                    let geometry = Arc::new(self.read_geometry(&primitive)?);
                    self.geometries
                        .insert((mesh.index(), primitive.index()), geometry.clone());
                    geometry
                }
            };

            let material = self
                .materials
                .entry(primitive.material().index())
                .or_insert_with(|| Arc::new(convert_material(&primitive.material())))
                .clone();

            surfaces.push((geometry, material));
        }

        Ok(surfaces)
    }

    fn read_geometry(&self, primitive: &gltf::Primitive) -> Result<Geometry> {
        let reader = primitive.reader(|buffer| self.buffers.get(buffer.index()).map(|data| &data[..]));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .collect();

        let indices: Option<Vec<u32>> = reader.read_indices().map(|indices| indices.into_u32().collect());

        let normals: Option<Vec<[f32; 3]>> = reader
            .read_normals()
            .map(|normals| normals.collect())
            .filter(|normals: &Vec<[f32; 3]>| normals.len() == positions.len());

        Ok(match normals {
            Some(normals) => {
                let indices = indices.unwrap_or_else(|| (0..positions.len() as u32).collect());
                Geometry::new(positions, normals, indices)
            }
            None => Geometry::from_positions(positions, indices),
        })
    }
}

/// Unlit glTF materials stay flat; everything else is metal/roughness PBR
fn convert_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();
    let color = Color::new(r, g, b);

    let converted = if material.unlit() {
        Material::basic(color)
    } else {
        Material::standard(color, pbr.roughness_factor(), pbr.metallic_factor())
    };

    match material.name() {
        Some(name) => converted.with_name(name),
        None => converted,
    }
}
