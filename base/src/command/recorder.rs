
use ash::vk;

use crate::context::VkDevice;
use crate::command::VkCommandType;
use crate::error::{VkResult, VkError};

use std::marker::PhantomData;
use std::ptr;

/// Records commands into a single command buffer.
pub struct VkCmdRecorder<'a, T: VkCommandType> {

    phantom_marker: PhantomData<T>,

    pub(super) device: &'a VkDevice,
    pub(super) command: vk::CommandBuffer,
}

impl<'a, T: VkCommandType> VkCmdRecorder<'a, T> {

    pub fn new(device: &'a VkDevice, command: vk::CommandBuffer) -> VkCmdRecorder<'a, T> {

        VkCmdRecorder {
            device, command,
            phantom_marker: PhantomData,
        }
    }

    /// Reset the command buffer to the initial state. Its pool must allow resetting single buffers.
    pub fn reset_command(&self, flags: vk::CommandBufferResetFlags) -> VkResult<&VkCmdRecorder<'a, T>> {

        unsafe {
            self.device.logic.handle.reset_command_buffer(self.command, flags)
                .map_err(|_| VkError::device("Reset Command Buffer"))?;
        }
        Ok(self)
    }

    /// Start recording. The buffer is re-recorded every frame, so no usage flag is set.
    pub fn begin_record(&self) -> VkResult<&VkCmdRecorder<'a, T>> {

        let begin_ci = vk::CommandBufferBeginInfo {
            s_type: vk::StructureType::COMMAND_BUFFER_BEGIN_INFO,
            p_next: ptr::null(),
            flags : vk::CommandBufferUsageFlags::empty(),
            p_inheritance_info: ptr::null(),
        };

        unsafe {
            self.device.logic.handle.begin_command_buffer(self.command, &begin_ci)
                .map_err(|_| VkError::device("Begin Command Buffer"))?;
        }
        Ok(self)
    }

    pub fn end_record(&self) -> VkResult<()> {

        unsafe {
            self.device.logic.handle.end_command_buffer(self.command)
                .map_err(|_| VkError::device("End Command Buffer"))?;
        }
        Ok(())
    }
}
