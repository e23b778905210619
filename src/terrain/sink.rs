use bevy::render::mesh::{
    Indices, Mesh, MeshVertexAttribute, PrimitiveTopology, VertexAttributeValues,
};
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::VertexFormat;

/// Per-vertex `[u, v, texture_index, blend]`.
pub const ATTRIBUTE_ATLAS: MeshVertexAttribute =
    MeshVertexAttribute::new("Vertex_AtlasUvBlend", 2_731_094_817, VertexFormat::Float32x4);

/// How often a buffer's contents are expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Rewritten every rebuild, up to once per frame.
    Dynamic,
}

impl BufferUsage {
    /// Dynamic meshes keep their main-world copy so they can be rewritten in place.
    pub fn asset_usages(self) -> RenderAssetUsages {
        match self {
            BufferUsage::Dynamic => {
                RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferSlot {
    Positions,
    Normals,
    Atlas,
}

/// Component width and usage of one vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLayout {
    pub slot: BufferSlot,
    pub components: usize,
    pub usage: BufferUsage,
}

/// Vertex buffer layouts of a surface mesh. Indices are always `u16`.
pub const SURFACE_LAYOUT: [BufferLayout; 3] = [
    BufferLayout { slot: BufferSlot::Positions, components: 3, usage: BufferUsage::Dynamic },
    BufferLayout { slot: BufferSlot::Normals, components: 3, usage: BufferUsage::Dynamic },
    BufferLayout { slot: BufferSlot::Atlas, components: 4, usage: BufferUsage::Dynamic },
];

/// Read-only view of one completed rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshBuffers<'a> {
    pub positions: &'a [[f32; 3]],
    pub normals: &'a [[f32; 3]],
    pub atlas: &'a [[f32; 4]],
    pub indices: &'a [u16],
}

impl<'a> MeshBuffers<'a> {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn quad_count(&self) -> usize {
        self.positions.len() / 4
    }

    /// Flattened contents of a vertex buffer, `components` floats per vertex.
    pub fn slot(&self, slot: BufferSlot) -> &'a [f32] {
        match slot {
            BufferSlot::Positions => bytemuck::cast_slice(self.positions),
            BufferSlot::Normals => bytemuck::cast_slice(self.normals),
            BufferSlot::Atlas => bytemuck::cast_slice(self.atlas),
        }
    }

    /// Raw little-endian index bytes, ready for a GPU upload.
    pub fn index_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.indices)
    }
}

/// Receives finished surface buffers, replacing whatever it held before.
pub trait MeshSink {
    fn replace_buffers(&mut self, buffers: &MeshBuffers<'_>);
}

/// Empty triangle-list mesh suitable for repeated surface rebuilds.
pub fn surface_mesh() -> Mesh {
    Mesh::new(PrimitiveTopology::TriangleList, BufferUsage::Dynamic.asset_usages())
}

impl MeshSink for Mesh {
    fn replace_buffers(&mut self, buffers: &MeshBuffers<'_>) {
        match self.attribute_mut(Mesh::ATTRIBUTE_POSITION) {
            Some(VertexAttributeValues::Float32x3(v)) => overwrite(v, buffers.positions),
            _ => self.insert_attribute(Mesh::ATTRIBUTE_POSITION, buffers.positions.to_vec()),
        }
        match self.attribute_mut(Mesh::ATTRIBUTE_NORMAL) {
            Some(VertexAttributeValues::Float32x3(v)) => overwrite(v, buffers.normals),
            _ => self.insert_attribute(Mesh::ATTRIBUTE_NORMAL, buffers.normals.to_vec()),
        }
        match self.attribute_mut(ATTRIBUTE_ATLAS) {
            Some(VertexAttributeValues::Float32x4(v)) => overwrite(v, buffers.atlas),
            _ => self.insert_attribute(ATTRIBUTE_ATLAS, buffers.atlas.to_vec()),
        }
        match self.indices_mut() {
            Some(Indices::U16(v)) => overwrite(v, buffers.indices),
            _ => self.insert_indices(Indices::U16(buffers.indices.to_vec())),
        }
    }
}

fn overwrite<T: Copy>(dst: &mut Vec<T>, src: &[T]) {
    dst.clear();
    dst.extend_from_slice(src);
}

/// Owned, flattened copy of the last delivered buffers.
///
/// Useful for headless consumers that upload through their own GPU layer.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CpuMesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub atlas: Vec<f32>,
    pub indices: Vec<u16>,
    /// Number of deliveries received.
    pub uploads: usize,
}

impl CpuMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

impl MeshSink for CpuMesh {
    fn replace_buffers(&mut self, buffers: &MeshBuffers<'_>) {
        overwrite(&mut self.positions, buffers.slot(BufferSlot::Positions));
        overwrite(&mut self.normals, buffers.slot(BufferSlot::Normals));
        overwrite(&mut self.atlas, buffers.slot(BufferSlot::Atlas));
        overwrite(&mut self.indices, buffers.indices);
        self.uploads += 1;
    }
}
