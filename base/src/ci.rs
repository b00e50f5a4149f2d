
pub mod shader;
pub mod pipeline;
pub mod command;
pub mod sync;
pub mod device;

use crate::context::VkDevice;
use crate::VkResult;

/// Wrapper of a raw Vulkan create info, filled with default values at first.
pub(crate) trait VulkanCI<CI>: Sized {

    fn default_ci() -> CI;
}

/// Create infos that build a Vulkan object on a device.
pub trait VkObjectBuildableCI {
    type ObjectType;

    fn build(&self, device: &VkDevice) -> VkResult<Self::ObjectType>;
}
