
use ash::vk;

use crate::error::VkResult;
use crate::{vkfloat, vkuint};

use std::ptr;

static QUEUE_PRIORITY: vkfloat = 1.0;

/// The queue families used by the renderer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct QueueFamilyIndices {
    pub graphics: vkuint,
    pub present : vkuint,
}

impl QueueFamilyIndices {

    /// Find the graphics and present queue families.
    ///
    /// `is_presentable` tells if the queue family at the given index can present to the surface.
    /// The graphics family is chosen for presentation whenever it is able to present.
    pub fn find(families: &[vk::QueueFamilyProperties], mut is_presentable: impl FnMut(vkuint) -> VkResult<bool>) -> VkResult<Option<QueueFamilyIndices>> {

        let graphics = families.iter().position(|family| {
            family.queue_count > 0 && family.queue_flags.contains(vk::QueueFlags::GRAPHICS)
        }).map(|index| index as vkuint);

        let graphics = match graphics {
            | Some(index) => index,
            | None => return Ok(None),
        };

        if is_presentable(graphics)? {
            return Ok(Some(QueueFamilyIndices { graphics, present: graphics }))
        }

        for (index, family) in families.iter().enumerate() {
            let index = index as vkuint;

            if family.queue_count > 0 && index != graphics && is_presentable(index)? {
                return Ok(Some(QueueFamilyIndices { graphics, present: index }))
            }
        }

        Ok(None)
    }

    /// Return the distinct family indices, graphics first.
    pub fn unique(&self) -> Vec<vkuint> {

        if self.graphics == self.present {
            vec![self.graphics]
        } else {
            vec![self.graphics, self.present]
        }
    }

    pub fn is_shared(&self) -> bool {
        self.graphics == self.present
    }
}

/// Queue create infos requesting one queue for each distinct family.
///
/// The returned infos point into a static priority, so they can outlive this call.
pub(crate) fn queue_cis(families: &QueueFamilyIndices) -> Vec<vk::DeviceQueueCreateInfo> {

    families.unique().into_iter().map(|family_index| {
        vk::DeviceQueueCreateInfo {
            s_type: vk::StructureType::DEVICE_QUEUE_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::DeviceQueueCreateFlags::empty(),
            queue_family_index: family_index,
            queue_count       : 1,
            p_queue_priorities: &QUEUE_PRIORITY,
        }
    }).collect()
}

/// A queue fetched from the logical device, along with its family.
#[derive(Debug, Clone, Copy)]
pub struct VkQueue {
    pub handle: vk::Queue,
    pub family_index: vkuint,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(flags: vk::QueueFlags, queue_count: vkuint) -> vk::QueueFamilyProperties {
        vk::QueueFamilyProperties {
            queue_flags: flags,
            queue_count,
            ..Default::default()
        }
    }

    #[test]
    fn graphics_family_presents_when_able() {
        let families = [
            family(vk::QueueFlags::TRANSFER, 2),
            family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE, 16),
            family(vk::QueueFlags::COMPUTE, 4),
        ];

        let indices = QueueFamilyIndices::find(&families, |_| Ok(true)).unwrap();
        assert_eq!(indices, Some(QueueFamilyIndices { graphics: 1, present: 1 }));
        assert_eq!(indices.unwrap().unique(), vec![1]);
    }

    #[test]
    fn separate_present_family() {
        let families = [
            family(vk::QueueFlags::GRAPHICS, 1),
            family(vk::QueueFlags::COMPUTE, 1),
            family(vk::QueueFlags::TRANSFER, 1),
        ];

        let indices = QueueFamilyIndices::find(&families, |index| Ok(index == 2)).unwrap().unwrap();
        assert_eq!(indices, QueueFamilyIndices { graphics: 0, present: 2 });
        assert!(!indices.is_shared());
        assert_eq!(indices.unique(), vec![0, 2]);
        assert_eq!(queue_cis(&indices).len(), 2);
    }

    #[test]
    fn empty_graphics_family_is_skipped() {
        let families = [
            family(vk::QueueFlags::GRAPHICS, 0),
            family(vk::QueueFlags::GRAPHICS, 1),
        ];

        let indices = QueueFamilyIndices::find(&families, |_| Ok(true)).unwrap().unwrap();
        assert_eq!(indices.graphics, 1);
    }

    #[test]
    fn missing_families_yield_none() {
        let no_graphics = [family(vk::QueueFlags::COMPUTE, 1)];
        assert_eq!(QueueFamilyIndices::find(&no_graphics, |_| Ok(true)).unwrap(), None);

        let no_present = [family(vk::QueueFlags::GRAPHICS, 1)];
        assert_eq!(QueueFamilyIndices::find(&no_present, |_| Ok(false)).unwrap(), None);
    }

    #[test]
    fn queue_ci_requests_one_queue_per_family() {
        let indices = QueueFamilyIndices { graphics: 3, present: 3 };
        let cis = queue_cis(&indices);

        assert_eq!(cis.len(), 1);
        assert_eq!(cis[0].queue_family_index, 3);
        assert_eq!(cis[0].queue_count, 1);
        assert_eq!(unsafe { *cis[0].p_queue_priorities }, 1.0);
    }
}
