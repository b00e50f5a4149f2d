
use ash::vk;

use crate::ci::VulkanCI;
use crate::context::VkDevice;
use crate::error::VkResult;

use std::ptr;

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::SubmitInfo.
#[derive(Debug, Clone)]
pub struct SubmitCI {
    ci: vk::SubmitInfo,
    wait_stages       : Vec<vk::PipelineStageFlags>,
    wait_semaphores   : Vec<vk::Semaphore>,
    signal_semaphores : Vec<vk::Semaphore>,
    commands          : Vec<vk::CommandBuffer>,
}

impl VulkanCI<vk::SubmitInfo> for SubmitCI {

    fn default_ci() -> vk::SubmitInfo {

        vk::SubmitInfo {
            s_type: vk::StructureType::SUBMIT_INFO,
            p_next: ptr::null(),
            wait_semaphore_count   : 0,
            p_wait_semaphores      : ptr::null(),
            p_wait_dst_stage_mask  : ptr::null(),
            command_buffer_count   : 0,
            p_command_buffers      : ptr::null(),
            signal_semaphore_count : 0,
            p_signal_semaphores    : ptr::null(),
        }
    }
}

impl SubmitCI {

    pub fn new() -> SubmitCI {
        SubmitCI {
            ci: SubmitCI::default_ci(),
            wait_stages       : Vec::new(),
            wait_semaphores   : Vec::new(),
            signal_semaphores : Vec::new(),
            commands          : Vec::new(),
        }
    }

    #[inline]
    pub fn add_command(mut self, command: vk::CommandBuffer) -> SubmitCI {
        self.commands.push(command); self
    }

    /// Wait for `semaphore` before the commands reach `stage`.
    #[inline]
    pub fn add_wait(mut self, stage: vk::PipelineStageFlags, semaphore: vk::Semaphore) -> SubmitCI {
        self.wait_stages.push(stage);
        self.wait_semaphores.push(semaphore); self
    }

    #[inline]
    pub fn add_signal(mut self, semaphore: vk::Semaphore) -> SubmitCI {
        self.signal_semaphores.push(semaphore); self
    }

    /// The raw submit info. It borrows from `self`, which must outlive its use.
    pub fn value(&self) -> vk::SubmitInfo {

        vk::SubmitInfo {
            wait_semaphore_count   : self.wait_semaphores.len() as _,
            p_wait_semaphores      : self.wait_semaphores.as_ptr(),
            p_wait_dst_stage_mask  : self.wait_stages.as_ptr(),
            command_buffer_count   : self.commands.len() as _,
            p_command_buffers      : self.commands.as_ptr(),
            signal_semaphore_count : self.signal_semaphores.len() as _,
            p_signal_semaphores    : self.signal_semaphores.as_ptr(),
            ..self.ci
        }
    }

    /// Submit to the graphics queue, signaling `fence` once the commands completed.
    pub fn submit(&self, device: &VkDevice, fence: vk::Fence) -> VkResult<()> {
        device.submit(&[self.value()], fence)
    }
}
// ----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    #[test]
    fn submit_info_counts_match() {
        let submit = SubmitCI::new()
            .add_wait(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT, vk::Semaphore::from_raw(1))
            .add_command(vk::CommandBuffer::from_raw(2))
            .add_signal(vk::Semaphore::from_raw(3));
        let info = submit.value();

        assert_eq!(info.wait_semaphore_count, 1);
        assert_eq!(info.command_buffer_count, 1);
        assert_eq!(info.signal_semaphore_count, 1);
        assert_eq!(unsafe { *info.p_wait_dst_stage_mask }, vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT);
        assert_eq!(unsafe { *info.p_signal_semaphores }, vk::Semaphore::from_raw(3));
    }
}
