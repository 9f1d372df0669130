//! Headless graphics device
//!
//! [`RecordingDevice`] keeps uploaded buffers in memory and appends every call
//! it receives to a command log. It checks the same contracts a real driver
//! would trip over (unknown handles, draws past the uploaded data, uniforms
//! with no program bound), which makes it the device of choice for tests and
//! for running scenes without a window.

use std::collections::{BTreeMap, HashMap};

use crate::foundation::math::{Mat4, Vec3};
use crate::render::device::{
    BufferId, BufferUsage, DeviceError, DeviceResult, DrawCall, GraphicsDevice, ProgramBinding, ProgramId,
    UniformLocation,
};
use crate::render::mesh::MeshAttributes;

/// One call received by the device
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// Buffer set created
    CreateBuffer(BufferId),
    /// Attribute buffer replaced
    Upload {
        /// Target buffer set
        buffer: BufferId,
        /// Attribute replaced
        attribute: MeshAttributes,
        /// Size of the new contents
        bytes: usize,
    },
    /// Program made current
    BindProgram(ProgramBinding),
    /// Matrix uniform uploaded
    SetMat4 {
        /// Uniform location
        location: UniformLocation,
        /// Value
        value: Mat4,
    },
    /// Vector uniform uploaded
    SetVec3 {
        /// Uniform location
        location: UniformLocation,
        /// Value
        value: Vec3,
    },
    /// Draw issued
    Draw(RecordedDraw),
    /// Frame started
    BeginFrame([f32; 4]),
    /// Frame finished
    EndFrame,
}

/// A draw together with the state it was issued under
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedDraw {
    /// Program and buffer bound at the time
    pub binding: ProgramBinding,
    /// The draw itself
    pub call: DrawCall,
    /// Most recent matrix uniform uploaded before the draw
    pub model: Option<Mat4>,
}

#[derive(Debug)]
struct RecordedBuffer {
    attributes: MeshAttributes,
    data: BTreeMap<u8, Vec<u8>>,
    usage: Option<BufferUsage>,
}

/// In-memory [`GraphicsDevice`] that records everything
#[derive(Debug, Default)]
pub struct RecordingDevice {
    buffers: BTreeMap<BufferId, RecordedBuffer>,
    programs: HashMap<ProgramId, HashMap<String, UniformLocation>>,
    next_buffer: u32,
    next_program: u32,
    bound: Option<ProgramBinding>,
    last_matrix: Option<Mat4>,
    in_frame: bool,
    frames: u64,
    commands: Vec<DeviceCommand>,
}

impl RecordingDevice {
    /// Create an empty device
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a program exposing the given uniforms
    ///
    /// Locations are assigned in order, starting at zero.
    pub fn register_program(&mut self, uniforms: &[&str]) -> ProgramId {
        let id = ProgramId(self.next_program);
        self.next_program += 1;
        let layout = uniforms
            .iter()
            .enumerate()
            .map(|(i, name)| ((*name).to_string(), UniformLocation(i as i32)))
            .collect();
        self.programs.insert(id, layout);
        id
    }

    /// Every call received so far
    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Every draw received so far, in order
    pub fn draws(&self) -> Vec<RecordedDraw> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DeviceCommand::Draw(draw) => Some(*draw),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded commands, keeping buffers and programs
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Completed frames
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Currently bound program
    pub fn bound_program(&self) -> Option<ProgramBinding> {
        self.bound
    }

    /// Number of elements uploaded for one attribute of a buffer
    pub fn element_count(&self, buffer: BufferId, attribute: MeshAttributes) -> Option<usize> {
        let bytes = self.buffers.get(&buffer)?.data.get(&attribute.bits())?.len();
        Some(bytes / element_size(attribute))
    }

    /// Index buffer contents of a buffer set
    pub fn index_data(&self, buffer: BufferId) -> Option<Vec<u32>> {
        let bytes = self.buffers.get(&buffer)?.data.get(&MeshAttributes::INDEX.bits())?;
        Some(bytes.chunks_exact(4).map(bytemuck::pod_read_unaligned::<u32>).collect())
    }

    /// Usage hint of the last upload to a buffer set
    pub fn buffer_usage(&self, buffer: BufferId) -> Option<BufferUsage> {
        self.buffers.get(&buffer)?.usage
    }

    fn require_bound(&self) -> DeviceResult<ProgramBinding> {
        self.bound.ok_or(DeviceError::NoProgramBound)
    }
}

fn element_size(attribute: MeshAttributes) -> usize {
    if attribute == MeshAttributes::COLOR {
        16
    } else if attribute == MeshAttributes::INDEX {
        4
    } else {
        12
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_buffer(&mut self, attributes: MeshAttributes) -> DeviceResult<BufferId> {
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        self.buffers.insert(
            id,
            RecordedBuffer {
                attributes,
                data: BTreeMap::new(),
                usage: None,
            },
        );
        self.commands.push(DeviceCommand::CreateBuffer(id));
        Ok(id)
    }

    fn upload_attribute(
        &mut self,
        buffer: BufferId,
        attribute: MeshAttributes,
        data: &[u8],
        usage: BufferUsage,
    ) -> DeviceResult<()> {
        let recorded = self.buffers.get_mut(&buffer).ok_or(DeviceError::UnknownBuffer(buffer))?;
        if !recorded.attributes.contains(attribute) {
            log::warn!("Upload of {attribute:?} to {buffer:?}, which was not created with it");
        }
        recorded.data.insert(attribute.bits(), data.to_vec());
        recorded.usage = Some(usage);
        self.commands.push(DeviceCommand::Upload {
            buffer,
            attribute,
            bytes: data.len(),
        });
        Ok(())
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.programs.get(&program)?.get(name).copied()
    }

    fn bind_program(&mut self, binding: ProgramBinding) -> DeviceResult<()> {
        if !self.programs.contains_key(&binding.program) {
            return Err(DeviceError::UnknownProgram(binding.program));
        }
        if !self.buffers.contains_key(&binding.buffer) {
            return Err(DeviceError::UnknownBuffer(binding.buffer));
        }
        self.bound = Some(binding);
        self.commands.push(DeviceCommand::BindProgram(binding));
        Ok(())
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) -> DeviceResult<()> {
        self.require_bound()?;
        self.last_matrix = Some(*value);
        self.commands.push(DeviceCommand::SetMat4 { location, value: *value });
        Ok(())
    }

    fn set_uniform_vec3(&mut self, location: UniformLocation, value: &Vec3) -> DeviceResult<()> {
        self.require_bound()?;
        self.commands.push(DeviceCommand::SetVec3 { location, value: *value });
        Ok(())
    }

    fn draw(&mut self, call: DrawCall) -> DeviceResult<()> {
        let binding = self.require_bound()?;
        let attribute = if call.indexed {
            MeshAttributes::INDEX
        } else {
            MeshAttributes::POSITION
        };
        let available = self.element_count(binding.buffer, attribute).unwrap_or(0);
        let fits = call.range.end().is_some_and(|end| end as usize <= available);
        if !fits {
            return Err(DeviceError::RangeOutOfBounds {
                first: call.range.first,
                count: call.range.count,
                available,
            });
        }

        self.commands.push(DeviceCommand::Draw(RecordedDraw {
            binding,
            call,
            model: self.last_matrix,
        }));
        Ok(())
    }

    fn begin_frame(&mut self, clear_color: [f32; 4]) -> DeviceResult<()> {
        if self.in_frame {
            return Err(DeviceError::FrameState("begin_frame called twice".to_string()));
        }
        self.in_frame = true;
        self.commands.push(DeviceCommand::BeginFrame(clear_color));
        Ok(())
    }

    fn end_frame(&mut self) -> DeviceResult<()> {
        if !self.in_frame {
            return Err(DeviceError::FrameState("end_frame without begin_frame".to_string()));
        }
        self.in_frame = false;
        self.frames += 1;
        self.commands.push(DeviceCommand::EndFrame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::IndexRange;
    use crate::render::mesh::PrimitiveMode;

    fn device_with_buffer() -> (RecordingDevice, ProgramBinding) {
        let mut device = RecordingDevice::new();
        let program = device.register_program(&["model", "view"]);
        let buffer = device.create_buffer(MeshAttributes::POSITION).unwrap();
        let positions = [[0.0_f32; 3]; 4];
        device
            .upload_attribute(buffer, MeshAttributes::POSITION, bytemuck::cast_slice(&positions), BufferUsage::Static)
            .unwrap();
        (device, ProgramBinding::new(program, buffer))
    }

    fn points(first: u32, count: u32) -> DrawCall {
        DrawCall {
            mode: PrimitiveMode::Points,
            range: IndexRange::new(first, count),
            indexed: false,
        }
    }

    #[test]
    fn test_uniform_locations_follow_registration_order() {
        let (device, binding) = device_with_buffer();
        assert_eq!(device.uniform_location(binding.program, "view"), Some(UniformLocation(1)));
        assert_eq!(device.uniform_location(binding.program, "missing"), None);
    }

    #[test]
    fn test_draw_requires_bound_program() {
        let (mut device, _) = device_with_buffer();
        assert_eq!(device.draw(points(0, 1)), Err(DeviceError::NoProgramBound));
    }

    #[test]
    fn test_draw_past_uploaded_data_rejected() {
        let (mut device, binding) = device_with_buffer();
        device.bind_program(binding).unwrap();

        device.draw(points(0, 4)).unwrap();
        assert_eq!(
            device.draw(points(2, 3)),
            Err(DeviceError::RangeOutOfBounds { first: 2, count: 3, available: 4 })
        );
        assert_eq!(
            device.draw(points(u32::MAX, 2)),
            Err(DeviceError::RangeOutOfBounds { first: u32::MAX, count: 2, available: 4 })
        );
        assert_eq!(device.draws().len(), 1);
    }

    #[test]
    fn test_draw_captures_last_matrix() {
        let (mut device, binding) = device_with_buffer();
        device.bind_program(binding).unwrap();
        let model = Mat4::new_scaling(3.0);
        device.set_uniform_mat4(UniformLocation(0), &model).unwrap();
        device.draw(points(0, 1)).unwrap();

        assert_eq!(device.draws()[0].model, Some(model));
        assert_eq!(device.draws()[0].binding, binding);
    }

    #[test]
    fn test_frame_pairing_enforced() {
        let mut device = RecordingDevice::new();
        assert!(device.end_frame().is_err());
        device.begin_frame([0.0; 4]).unwrap();
        assert!(device.begin_frame([0.0; 4]).is_err());
        device.end_frame().unwrap();
        assert_eq!(device.frame_count(), 1);
    }

    #[test]
    fn test_bind_unknown_program_rejected() {
        let (mut device, binding) = device_with_buffer();
        let bogus = ProgramBinding::new(ProgramId(42), binding.buffer);
        assert_eq!(device.bind_program(bogus), Err(DeviceError::UnknownProgram(ProgramId(42))));
    }
}
