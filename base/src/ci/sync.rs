
use ash::vk;

use crate::context::VkDevice;
use crate::context::{VkObjectDiscardable, VkObjectWaitable};
use crate::ci::{VulkanCI, VkObjectBuildableCI};
use crate::utils::time::VkTimeDuration;
use crate::error::{VkResult, VkError};

use std::ptr;

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::SemaphoreCreateInfo.
#[derive(Debug, Clone)]
pub struct SemaphoreCI {
    ci: vk::SemaphoreCreateInfo,
}

impl VulkanCI<vk::SemaphoreCreateInfo> for SemaphoreCI {

    fn default_ci() -> vk::SemaphoreCreateInfo {

        vk::SemaphoreCreateInfo {
            s_type: vk::StructureType::SEMAPHORE_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::SemaphoreCreateFlags::empty(),
        }
    }
}

impl VkObjectBuildableCI for SemaphoreCI {
    type ObjectType = vk::Semaphore;

    fn build(&self, device: &VkDevice) -> VkResult<vk::Semaphore> {

        let semaphore = unsafe {
            device.logic.handle.create_semaphore(&self.ci, None)
                .map_err(|_| VkError::create("Semaphore"))?
        };
        Ok(semaphore)
    }
}

impl SemaphoreCI {

    pub fn new() -> SemaphoreCI {

        SemaphoreCI {
            ci: SemaphoreCI::default_ci(),
        }
    }
}

impl VkObjectDiscardable for vk::Semaphore {

    fn discard(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_semaphore(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::FenceCreateInfo.
#[derive(Debug, Clone)]
pub struct FenceCI {
    ci: vk::FenceCreateInfo,
}

impl VulkanCI<vk::FenceCreateInfo> for FenceCI {

    fn default_ci() -> vk::FenceCreateInfo {

        vk::FenceCreateInfo {
            s_type: vk::StructureType::FENCE_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::FenceCreateFlags::empty(),
        }
    }
}

impl VkObjectBuildableCI for FenceCI {
    type ObjectType = vk::Fence;

    fn build(&self, device: &VkDevice) -> VkResult<vk::Fence> {

        let fence = unsafe {
            device.logic.handle.create_fence(&self.ci, None)
                .map_err(|_| VkError::create("Fence"))?
        };
        Ok(fence)
    }
}

impl FenceCI {

    /// `is_signaled` creates the fence in signaled state, so that the first wait on it returns at once.
    pub fn new(is_signaled: bool) -> FenceCI {

        let mut fence = FenceCI { ci: FenceCI::default_ci() };

        if is_signaled {
            fence.ci.flags = vk::FenceCreateFlags::SIGNALED;
        }

        fence
    }
}

impl VkObjectDiscardable for vk::Fence {

    fn discard(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_fence(self, None);
        }
    }
}

impl VkObjectWaitable for vk::Fence {

    fn wait(self, device: &VkDevice, time: VkTimeDuration) -> VkResult<()> {
        unsafe {
            device.logic.handle.wait_for_fences(&[self], true, time.into())
                .map_err(|_| VkError::device("Wait for fences"))
        }
    }
}

/// Set the fence back to unsignaled state.
pub fn reset_fence(device: &VkDevice, fence: vk::Fence) -> VkResult<()> {

    unsafe {
        device.logic.handle.reset_fences(&[fence])
            .map_err(|_| VkError::device("Reset fences"))
    }
}
// ----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_signaled_flag() {
        assert_eq!(FenceCI::new(true).ci.flags, vk::FenceCreateFlags::SIGNALED);
        assert!(FenceCI::new(false).ci.flags.is_empty());
        assert_eq!(FenceCI::new(false).ci.s_type, vk::StructureType::FENCE_CREATE_INFO);
    }
}
