
use ash::vk;

use crate::context::instance::VkInstance;
use crate::context::device::physical::VkPhysicalDevice;
use crate::context::device::queue::{self, VkQueue};
use crate::utils::cast::cstrings2ptrs;
use crate::error::{VkResult, VkError};

use std::ptr;

pub struct VkLogicalDevice {

    pub handle: ash::Device,
    pub queues: DeviceQueues,
}

/// The queues fetched after device creation. Both may refer to the same queue.
pub struct DeviceQueues {
    pub graphics: VkQueue,
    pub present : VkQueue,
}

impl VkLogicalDevice {

    pub fn new(instance: &VkInstance, phy: &VkPhysicalDevice) -> VkResult<VkLogicalDevice> {

        let queue_cis = queue::queue_cis(&phy.families);

        // device layers are deprecated, but still set for older implementations.
        let enable_layer_names = cstrings2ptrs(&instance.enable_layer_names);
        let enable_extension_names = cstrings2ptrs(phy.enable_extensions());

        // Create the logical device.
        let device_ci = vk::DeviceCreateInfo {
            s_type                     : vk::StructureType::DEVICE_CREATE_INFO,
            p_next                     : ptr::null(),
            flags                      : vk::DeviceCreateFlags::empty(),
            queue_create_info_count    : queue_cis.len() as _,
            p_queue_create_infos       : queue_cis.as_ptr(),
            enabled_layer_count        : enable_layer_names.len() as _,
            pp_enabled_layer_names     : enable_layer_names.as_ptr(),
            enabled_extension_count    : enable_extension_names.len() as _,
            pp_enabled_extension_names : enable_extension_names.as_ptr(),
            p_enabled_features         : phy.enable_features(),
        };

        let handle = unsafe {
            instance.handle.create_device(phy.handle, &device_ci, None)
                .map_err(|_| VkError::create("Logical Device"))?
        };
        log::debug!("Logical device created with {} queue(s).", queue_cis.len());

        let queues = DeviceQueues {
            graphics: fetch_queue(&handle, phy.families.graphics),
            present : fetch_queue(&handle, phy.families.present),
        };

        let device = VkLogicalDevice { handle, queues };
        Ok(device)
    }

    pub fn discard(&self) {

        unsafe {
            self.handle.destroy_device(None);
        }
        log::debug!("Logical device destroyed.");
    }
}

fn fetch_queue(device: &ash::Device, family_index: crate::vkuint) -> VkQueue {

    let handle = unsafe {
        device.get_device_queue(family_index, 0)
    };

    VkQueue { handle, family_index }
}
