//! Graphics device boundary
//!
//! The scene graph never talks to a graphics API directly. Everything it needs
//! from the device (buffer upload, uniform lookup, program binding, draws) goes
//! through [`GraphicsDevice`], so an OpenGL context, a test recorder or any
//! other backend can sit behind it.

use crate::foundation::math::{Mat4, Vec3};
use crate::render::mesh::{MeshAttributes, PrimitiveMode};

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Handle to a device buffer set (one buffer per attribute plus indices)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// Handle to a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u32);

/// Location of a uniform within a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

/// Program plus the buffer whose vertex layout it draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramBinding {
    /// Shader program
    pub program: ProgramId,
    /// Buffer set bound as the vertex source
    pub buffer: BufferId,
}

impl ProgramBinding {
    /// Pair a program with a buffer
    pub fn new(program: ProgramId, buffer: BufferId) -> Self {
        Self { program, buffer }
    }
}

/// Buffer usage hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Uploaded once, never changed
    Static,
    /// Re-uploaded whenever a mesh is appended
    Dynamic,
}

/// Contiguous range of vertices or indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IndexRange {
    /// First element
    pub first: u32,
    /// Number of elements
    pub count: u32,
}

impl IndexRange {
    /// Create a range
    pub fn new(first: u32, count: u32) -> Self {
        Self { first, count }
    }

    /// One past the last element, or `None` if that overflows `u32`
    pub fn end(&self) -> Option<u32> {
        self.first.checked_add(self.count)
    }
}

/// A single primitive draw against the bound program and buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawCall {
    /// Primitive assembly mode
    pub mode: PrimitiveMode,
    /// Range of vertices, or of indices when `indexed`
    pub range: IndexRange,
    /// Whether `range` addresses the index buffer
    pub indexed: bool,
}

/// Errors reported by a graphics device
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// Buffer handle was never created by this device
    #[error("Unknown buffer {0:?}")]
    UnknownBuffer(BufferId),

    /// Program handle was never registered with this device
    #[error("Unknown program {0:?}")]
    UnknownProgram(ProgramId),

    /// A draw reaches past the uploaded data
    #[error("Draw of {count} elements from {first} exceeds {available} uploaded elements")]
    RangeOutOfBounds {
        /// First element requested
        first: u32,
        /// Number of elements requested
        count: u32,
        /// Elements available on the device
        available: usize,
    },

    /// A draw or uniform upload happened with no program bound
    #[error("No program bound")]
    NoProgramBound,

    /// Frame begin/end called out of order
    #[error("Frame state error: {0}")]
    FrameState(String),
}

/// Operations the scene graph needs from a graphics device
pub trait GraphicsDevice {
    /// Create an empty buffer set with one device buffer per attribute
    fn create_buffer(&mut self, attributes: MeshAttributes) -> DeviceResult<BufferId>;

    /// Replace the full contents of one attribute buffer
    ///
    /// `attribute` holds exactly one flag.
    fn upload_attribute(
        &mut self,
        buffer: BufferId,
        attribute: MeshAttributes,
        data: &[u8],
        usage: BufferUsage,
    ) -> DeviceResult<()>;

    /// Look up a uniform in a program; `None` if the program has no such uniform
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Make a program and its vertex source current
    fn bind_program(&mut self, binding: ProgramBinding) -> DeviceResult<()>;

    /// Upload a 4x4 matrix uniform to the bound program
    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) -> DeviceResult<()>;

    /// Upload a 3-vector uniform to the bound program
    fn set_uniform_vec3(&mut self, location: UniformLocation, value: &Vec3) -> DeviceResult<()>;

    /// Issue one draw from the bound buffer
    fn draw(&mut self, call: DrawCall) -> DeviceResult<()>;

    /// Start a frame, clearing colour and depth
    fn begin_frame(&mut self, clear_color: [f32; 4]) -> DeviceResult<()>;

    /// Finish a frame and present it
    fn end_frame(&mut self) -> DeviceResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_end_checks_overflow() {
        assert_eq!(IndexRange::new(4, 6).end(), Some(10));
        assert_eq!(IndexRange::new(u32::MAX, 1).end(), None);
    }
}
