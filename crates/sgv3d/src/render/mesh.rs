//! Client-side mesh data
//!
//! A [`Mesh`] is a bag of per-vertex attributes plus optional indices, tagged
//! with how the device should assemble primitives from them. It only lives on
//! the client until it is bound into a
//! [`MeshBuffer`](crate::render::MeshBuffer), which hands back a
//! [`GraphMesh`](crate::render::GraphMesh) range in its place.

use crate::foundation::math::{Vec3, Vec4};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Which attribute arrays a mesh (or a buffer layout) carries
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MeshAttributes: u8 {
        /// Vertex positions
        const POSITION = 1 << 0;
        /// Vertex normals
        const NORMAL = 1 << 1;
        /// Vertex colours
        const COLOR = 1 << 2;
        /// Element indices
        const INDEX = 1 << 3;
    }
}

/// Primitive assembly mode for a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrimitiveMode {
    /// One point per vertex
    Points,
    /// Independent line segments
    Lines,
    /// Connected line segments
    LineStrip,
    /// Closed connected line segments
    LineLoop,
    /// Independent triangles
    #[default]
    Triangles,
    /// Triangle strip
    TriangleStrip,
    /// Triangle fan
    TriangleFan,
}

/// Interleaved vertex record used by mesh storage files
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in model space
    pub pos: [f32; 3],
    /// Normal vector
    pub normal: [f32; 3],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(pos: [f32; 3], normal: [f32; 3]) -> Self {
        Self { pos, normal }
    }
}

/// Client-side mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Vertex normals (empty or one per vertex)
    pub normals: Vec<Vec3>,
    /// Vertex colours (empty or one per vertex)
    pub colors: Vec<Vec4>,
    /// Element indices (empty for array draws)
    pub indices: Vec<u32>,
    /// How primitives are assembled
    pub mode: PrimitiveMode,
}

impl Mesh {
    /// Create an empty mesh with the given primitive mode
    pub fn new(mode: PrimitiveMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Build a mesh from interleaved vertex records
    pub fn from_vertices(vertices: &[Vertex], mode: PrimitiveMode) -> Self {
        Self {
            positions: vertices.iter().map(|v| Vec3::from(v.pos)).collect(),
            normals: vertices.iter().map(|v| Vec3::from(v.normal)).collect(),
            mode,
            ..Self::default()
        }
    }

    /// Add a position-only vertex
    pub fn push_position(&mut self, position: Vec3) -> &mut Self {
        self.positions.push(position);
        self
    }

    /// Add a coloured vertex
    pub fn push_colored(&mut self, position: Vec3, color: Vec4) -> &mut Self {
        self.positions.push(position);
        self.colors.push(color);
        self
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of indices
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// True when the mesh has no vertices
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Attribute arrays present in this mesh
    pub fn attributes(&self) -> MeshAttributes {
        let mut mask = MeshAttributes::empty();
        mask.set(MeshAttributes::POSITION, !self.positions.is_empty());
        mask.set(MeshAttributes::NORMAL, !self.normals.is_empty());
        mask.set(MeshAttributes::COLOR, !self.colors.is_empty());
        mask.set(MeshAttributes::INDEX, !self.indices.is_empty());
        mask
    }

    /// Append another mesh, rebasing its indices onto this mesh's vertices
    pub fn concatenate(&mut self, other: &Mesh) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.colors.extend_from_slice(&other.colors);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Drop vertices past `vertices` and indices past `indices`
    pub fn truncate(&mut self, vertices: usize, indices: usize) {
        self.positions.truncate(vertices);
        self.normals.truncate(vertices);
        self.colors.truncate(vertices);
        self.indices.truncate(indices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        let mut mesh = Mesh::new(PrimitiveMode::Triangles);
        mesh.push_position(Vec3::new(0.0, 0.0, 0.0))
            .push_position(Vec3::new(1.0, 0.0, 0.0))
            .push_position(Vec3::new(0.0, 1.0, 0.0));
        mesh.indices = vec![0, 1, 2];
        mesh
    }

    #[test]
    fn test_attributes_mask() {
        let mut mesh = triangle();
        assert_eq!(mesh.attributes(), MeshAttributes::POSITION | MeshAttributes::INDEX);

        mesh.colors = vec![Vec4::new(1.0, 0.0, 0.0, 1.0); 3];
        assert!(mesh.attributes().contains(MeshAttributes::COLOR));
        assert!(Mesh::default().attributes().is_empty());
    }

    #[test]
    fn test_concatenate_offsets_indices() {
        let mut mesh = triangle();
        mesh.concatenate(&triangle());

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_truncate_undoes_concatenate() {
        let mut a = Mesh::new(PrimitiveMode::Triangles);
        a.push_colored(Vec3::zeros(), Vec4::zeros());
        a.indices = vec![0];
        let before = a.clone();

        let mut b = a.clone();
        b.push_colored(Vec3::x(), Vec4::zeros());
        a.concatenate(&b);
        a.truncate(1, 1);
        assert_eq!(a, before);
    }

    #[test]
    fn test_from_vertices_splits_attributes() {
        let vertices = [
            Vertex::new([1.0, 2.0, 3.0], [0.0, 0.0, 1.0]),
            Vertex::new([4.0, 5.0, 6.0], [0.0, 1.0, 0.0]),
        ];
        let mesh = Mesh::from_vertices(&vertices, PrimitiveMode::Points);

        assert_eq!(mesh.positions[1], Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(mesh.normals[0], Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.attributes(), MeshAttributes::POSITION | MeshAttributes::NORMAL);
        assert_eq!(mesh.mode, PrimitiveMode::Points);
    }
}
