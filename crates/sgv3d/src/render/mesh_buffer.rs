//! Mesh binding into device buffers
//!
//! A [`MeshBuffer`] owns one device buffer set with a fixed attribute layout.
//! Binding a [`Mesh`] moves its data into the buffer and returns a
//! [`GraphMesh`] naming the mesh's slice of it.
//!
//! - **Static** buffers take exactly one mesh, uploaded once.
//! - **Dynamic** buffers append: every bind re-uploads the whole accumulated
//!   data set. Earlier ranges stay valid because data is only ever appended.

use crate::render::device::{BufferId, BufferUsage, DeviceError, GraphicsDevice, IndexRange};
use crate::render::graph_mesh::GraphMesh;
use crate::render::mesh::{Mesh, MeshAttributes};

/// Errors from binding a mesh
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Mesh has no vertices
    #[error("Attempt to bind a mesh with no vertices")]
    EmptyMesh,

    /// A static buffer already holds its mesh
    #[error("Static buffer {0:?} is already bound; use a dynamic buffer to add more meshes")]
    AlreadyBound(BufferId),

    /// Mesh attributes differ from the buffer layout
    #[error("Mesh attributes {found:?} do not match buffer layout {expected:?}")]
    AttributeMismatch {
        /// Layout of the buffer
        expected: MeshAttributes,
        /// Attributes present in the mesh
        found: MeshAttributes,
    },

    /// An attribute array does not have one entry per vertex
    #[error("Attribute {attribute:?} has {found} entries for {vertices} vertices")]
    AttributeLength {
        /// Offending attribute
        attribute: MeshAttributes,
        /// Number of vertices
        vertices: usize,
        /// Number of entries found
        found: usize,
    },

    /// An index names a vertex the mesh does not have
    #[error("Index {index} out of range for {vertices} vertices")]
    IndexOutOfRange {
        /// Offending index
        index: u32,
        /// Number of vertices
        vertices: usize,
    },

    /// Buffer would hold more elements than a draw range can address
    #[error("Buffer would hold {count} elements, more than a u32 range can address")]
    TooLarge {
        /// Element count the bind would reach
        count: usize,
    },

    /// Device rejected an upload
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

/// Client-side mirror of a device buffer set
#[derive(Debug)]
pub struct MeshBuffer {
    id: BufferId,
    usage: BufferUsage,
    attributes: MeshAttributes,
    data: Mesh,
    bound_meshes: usize,
    uploads: u64,
}

impl MeshBuffer {
    /// Create a buffer set on the device for meshes with exactly `attributes`
    pub fn new(
        device: &mut dyn GraphicsDevice,
        usage: BufferUsage,
        attributes: MeshAttributes,
    ) -> Result<Self, MeshError> {
        if !attributes.contains(MeshAttributes::POSITION) {
            log::warn!("Creating mesh buffer without positions; every bind will fail");
        }
        let id = device.create_buffer(attributes)?;
        log::debug!("Created {usage:?} mesh buffer {id:?} with layout {attributes:?}");

        Ok(Self {
            id,
            usage,
            attributes,
            data: Mesh::default(),
            bound_meshes: 0,
            uploads: 0,
        })
    }

    /// Create a buffer laid out for the attributes `mesh` carries
    pub fn for_mesh(
        device: &mut dyn GraphicsDevice,
        usage: BufferUsage,
        mesh: &Mesh,
    ) -> Result<Self, MeshError> {
        Self::new(device, usage, mesh.attributes())
    }

    /// Device handle of this buffer set
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Usage hint given at creation
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Attribute layout
    pub fn attributes(&self) -> MeshAttributes {
        self.attributes
    }

    /// Vertices held so far
    pub fn vertex_count(&self) -> usize {
        self.data.vertex_count()
    }

    /// Indices held so far
    pub fn index_count(&self) -> usize {
        self.data.index_count()
    }

    /// Number of meshes bound so far
    pub fn mesh_count(&self) -> usize {
        self.bound_meshes
    }

    /// Number of full-buffer uploads performed
    pub fn upload_count(&self) -> u64 {
        self.uploads
    }

    /// Move `mesh` into the buffer and return its range
    pub fn bind(&mut self, mesh: Mesh, device: &mut dyn GraphicsDevice) -> Result<GraphMesh, MeshError> {
        self.validate(&mesh)?;

        if self.usage == BufferUsage::Static && self.bound_meshes > 0 {
            return Err(MeshError::AlreadyBound(self.id));
        }

        let indexed = self.attributes.contains(MeshAttributes::INDEX);
        let (vertices, indices) = (self.data.vertex_count(), self.data.index_count());
        // Indices are rebased by the vertex total, so it must fit too
        element_range(vertices, mesh.vertex_count())?;
        let range = if indexed {
            element_range(indices, mesh.index_count())?
        } else {
            element_range(vertices, mesh.vertex_count())?
        };
        let mode = mesh.mode;

        if self.bound_meshes == 0 {
            self.data = mesh;
        } else {
            self.data.concatenate(&mesh);
        }
        if let Err(e) = self.upload(device) {
            self.data.truncate(vertices, indices);
            log::warn!("Upload to {:?} failed; dropped the rejected mesh", self.id);
            return Err(e);
        }
        self.bound_meshes += 1;

        log::debug!(
            "Bound mesh into {:?}: {} elements from {} ({:?}, indexed: {})",
            self.id,
            range.count,
            range.first,
            mode,
            indexed
        );
        Ok(GraphMesh::new(self.id, mode, range, indexed))
    }

    fn validate(&self, mesh: &Mesh) -> Result<(), MeshError> {
        if mesh.is_empty() {
            return Err(MeshError::EmptyMesh);
        }

        let found = mesh.attributes();
        if found != self.attributes {
            return Err(MeshError::AttributeMismatch {
                expected: self.attributes,
                found,
            });
        }

        let vertices = mesh.vertex_count();
        for (attribute, len) in [
            (MeshAttributes::NORMAL, mesh.normals.len()),
            (MeshAttributes::COLOR, mesh.colors.len()),
        ] {
            if len != 0 && len != vertices {
                return Err(MeshError::AttributeLength { attribute, vertices, found: len });
            }
        }

        if let Some(&index) = mesh.indices.iter().find(|&&i| i as usize >= vertices) {
            return Err(MeshError::IndexOutOfRange { index, vertices });
        }
        Ok(())
    }

    fn upload(&mut self, device: &mut dyn GraphicsDevice) -> Result<(), MeshError> {
        let usage = self.usage;
        let id = self.id;

        if self.attributes.contains(MeshAttributes::POSITION) {
            let positions: Vec<[f32; 3]> = self.data.positions.iter().map(|p| (*p).into()).collect();
            device.upload_attribute(id, MeshAttributes::POSITION, bytemuck::cast_slice(&positions), usage)?;
        }
        if self.attributes.contains(MeshAttributes::NORMAL) {
            let normals: Vec<[f32; 3]> = self.data.normals.iter().map(|n| (*n).into()).collect();
            device.upload_attribute(id, MeshAttributes::NORMAL, bytemuck::cast_slice(&normals), usage)?;
        }
        if self.attributes.contains(MeshAttributes::COLOR) {
            let colors: Vec<[f32; 4]> = self.data.colors.iter().map(|c| (*c).into()).collect();
            device.upload_attribute(id, MeshAttributes::COLOR, bytemuck::cast_slice(&colors), usage)?;
        }
        if self.attributes.contains(MeshAttributes::INDEX) {
            device.upload_attribute(id, MeshAttributes::INDEX, bytemuck::cast_slice(&self.data.indices), usage)?;
        }

        self.uploads += 1;
        Ok(())
    }
}

/// Range of `added` elements after `previous`, if the total fits in `u32`
fn element_range(previous: usize, added: usize) -> Result<IndexRange, MeshError> {
    let too_large = || MeshError::TooLarge {
        count: previous.saturating_add(added),
    };
    let first = u32::try_from(previous).map_err(|_| too_large())?;
    let count = u32::try_from(added).map_err(|_| too_large())?;
    first.checked_add(count).ok_or_else(too_large)?;
    Ok(IndexRange::new(first, count))
}
