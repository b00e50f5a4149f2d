
use ash::vk;

use crate::context::VkDevice;
use crate::context::VkObjectDiscardable;
use crate::ci::{VulkanCI, VkObjectBuildableCI};
use crate::error::{VkResult, VkError};
use crate::vkuint;

use std::ptr;

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::CommandBufferAllocateInfo.
#[derive(Debug, Clone)]
pub struct CommandBufferAI {
    ai: vk::CommandBufferAllocateInfo,
}

impl VulkanCI<vk::CommandBufferAllocateInfo> for CommandBufferAI {

    fn default_ci() -> vk::CommandBufferAllocateInfo {

        vk::CommandBufferAllocateInfo {
            s_type: vk::StructureType::COMMAND_BUFFER_ALLOCATE_INFO,
            p_next: ptr::null(),
            command_pool: vk::CommandPool::null(),
            level: vk::CommandBufferLevel::PRIMARY,
            command_buffer_count: 1,
        }
    }
}

impl VkObjectBuildableCI for CommandBufferAI {
    type ObjectType = Vec<vk::CommandBuffer>;

    /// The command buffers are freed along with their pool.
    fn build(&self, device: &VkDevice) -> VkResult<Vec<vk::CommandBuffer>> {

        let commands = unsafe {
            device.logic.handle.allocate_command_buffers(&self.ai)
                .map_err(|_| VkError::create("Command Buffers"))?
        };
        Ok(commands)
    }
}

impl CommandBufferAI {

    pub fn new(pool: vk::CommandPool, count: vkuint) -> CommandBufferAI {

        CommandBufferAI {
            ai: vk::CommandBufferAllocateInfo {
                command_pool: pool,
                command_buffer_count: count,
                ..CommandBufferAI::default_ci()
            }
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::CommandPoolCreateInfo.
///
/// Command buffers of the pool can be reset one by one by default.
#[derive(Debug, Clone)]
pub struct CommandPoolCI {
    ci: vk::CommandPoolCreateInfo,
}

impl VulkanCI<vk::CommandPoolCreateInfo> for CommandPoolCI {

    fn default_ci() -> vk::CommandPoolCreateInfo {

        vk::CommandPoolCreateInfo {
            s_type: vk::StructureType::COMMAND_POOL_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
            queue_family_index: 0,
        }
    }
}

impl VkObjectBuildableCI for CommandPoolCI {
    type ObjectType = vk::CommandPool;

    fn build(&self, device: &VkDevice) -> VkResult<vk::CommandPool> {

        let pool = unsafe {
            device.logic.handle.create_command_pool(&self.ci, None)
                .map_err(|_| VkError::create("Command Pool"))?
        };
        Ok(pool)
    }
}

impl CommandPoolCI {

    pub fn new(queue_family: vkuint) -> CommandPoolCI {

        CommandPoolCI {
            ci: vk::CommandPoolCreateInfo {
                queue_family_index: queue_family,
                ..CommandPoolCI::default_ci()
            },
        }
    }
}

impl VkObjectDiscardable for vk::CommandPool {

    fn discard(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_command_pool(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    #[test]
    fn pool_resets_buffers_individually() {
        let ci = CommandPoolCI::new(2);
        assert_eq!(ci.ci.queue_family_index, 2);
        assert!(ci.ci.flags.contains(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER));
    }

    #[test]
    fn primary_buffers_by_default() {
        let pool = vk::CommandPool::from_raw(7);
        let ai = CommandBufferAI::new(pool, 1);

        assert_eq!(ai.ai.level, vk::CommandBufferLevel::PRIMARY);
        assert_eq!(ai.ai.command_pool, pool);
        assert_eq!(ai.ai.command_buffer_count, 1);
    }
}
