
mod physical;
mod logical;
mod queue;

pub use self::logical::{VkLogicalDevice, DeviceQueues};
pub use self::physical::{VkPhysicalDevice, PhysicalDevConfig};
pub use self::queue::{VkQueue, QueueFamilyIndices};

use ash::vk;

use crate::context::instance::VkInstance;
use crate::context::surface::VkSurface;
use crate::error::{VkResult, VkError};

/// The selected physical device together with the logical device created from it.
pub struct VkDevice {

    pub logic : logical::VkLogicalDevice,
    pub phy   : physical::VkPhysicalDevice,
}

impl VkDevice {

    pub fn new(instance: &VkInstance, surface: &VkSurface, config: PhysicalDevConfig) -> VkResult<VkDevice> {

        let phy = VkPhysicalDevice::new(instance, surface, config)?;
        let logic = VkLogicalDevice::new(instance, &phy)?;

        let device = VkDevice { logic, phy };
        Ok(device)
    }

    #[inline]
    pub fn build<T>(&self, ci: &T) -> VkResult<T::ObjectType>
        where
            T: crate::ci::VkObjectBuildableCI {
        ci.build(self)
    }

    #[inline]
    pub fn discard(&self, object: impl VkObjectDiscardable) {
        object.discard(self);
    }

    /// Block until the device has finished all submitted work.
    pub fn wait_idle(&self) -> VkResult<()> {

        unsafe {
            self.logic.handle.device_wait_idle()
                .map_err(|_| VkError::device("Device Waiting Idle"))
        }
    }

    /// Submit command buffers to the graphics queue.
    pub fn submit(&self, submit_infos: &[vk::SubmitInfo], fence: vk::Fence) -> VkResult<()> {

        unsafe {
            self.logic.handle.queue_submit(self.logic.queues.graphics.handle, submit_infos, fence)
                .map_err(|_| VkError::device("Queue Submit"))
        }
    }

    /// Destroy the logical device. Every object created from it must have been destroyed before.
    pub fn discard_self(&self) {
        self.logic.discard();
    }
}

/// Device-level objects that are destroyed through the logical device.
pub trait VkObjectDiscardable: Copy {

    fn discard(self, device: &VkDevice);
}

/// Device-level objects that can be waited on by the host.
pub trait VkObjectWaitable: Copy {

    fn wait(self, device: &VkDevice, time: crate::utils::time::VkTimeDuration) -> VkResult<()>;
}
