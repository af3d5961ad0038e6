use std::collections::{HashMap, HashSet};
use wgpu::util::DeviceExt;

use super::uniforms::Vertex;
use crate::scene::Geometry;

pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

/// Vertex and index buffers keyed by geometry id, uploaded once
#[derive(Default)]
pub struct MeshCache {
    meshes: HashMap<u64, GpuMesh>,
    used: HashSet<u64>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload the geometry if this is the first time it is seen
    pub fn prepare(&mut self, device: &wgpu::Device, geometry: &Geometry) {
        self.used.insert(geometry.id());
        self.meshes
            .entry(geometry.id())
            .or_insert_with(|| upload(device, geometry));
    }

    pub fn get(&self, id: u64) -> Option<&GpuMesh> {
        self.meshes.get(&id)
    }

    /// Drop buffers for geometry that was not prepared since the last call
    pub fn evict_unused(&mut self) {
        let used = std::mem::take(&mut self.used);
        let before = self.meshes.len();
        self.meshes.retain(|id, _| used.contains(id));
        if self.meshes.len() != before {
            log::debug!("Released {} unused meshes", before - self.meshes.len());
        }
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

fn upload(device: &wgpu::Device, geometry: &Geometry) -> GpuMesh {
    let vertices: Vec<Vertex> = geometry
        .positions
        .iter()
        .zip(&geometry.normals)
        .map(|(position, normal)| Vertex {
            position: *position,
            normal: *normal,
        })
        .collect();

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Vertices"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Indices"),
        contents: bytemuck::cast_slice(&geometry.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: geometry.indices.len() as u32,
    }
}
