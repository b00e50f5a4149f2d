
use ash::vk;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};

use crate::context::instance::VkInstance;
use crate::context::objects::VkBackendObject;
use crate::error::{VkResult, VkError};
use crate::vkuint;

/// Wrapper class for `vk::Surface`.
pub struct VkSurface {

    /// the handle of `vk::SurfaceKHR`.
    pub(crate) handle: vk::SurfaceKHR,
    /// the extension loader provides functions for creation and destruction of `vk::SurfaceKHR` object.
    loader: ash::extensions::khr::Surface,
}

/// What a surface supports on a given physical device, used to pick the swapchain parameters.
pub struct SurfaceSupport {

    pub capabilities : vk::SurfaceCapabilitiesKHR,
    pub formats      : Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl VkSurface {

    /// Initialize surface extension loader and `vk::Surface` object.
    pub fn new(instance: &VkInstance, window: &winit::window::Window) -> VkResult<VkSurface> {

        let handle = unsafe {
            ash_window::create_surface(&instance.entry, &instance.handle, window.raw_display_handle(), window.raw_window_handle(), None)
                .map_err(|_| VkError::unlink("Platform Surface"))?
        };
        log::debug!("Window surface created.");

        let loader = ash::extensions::khr::Surface::new(&instance.entry, &instance.handle);

        let surface = VkSurface { handle, loader };
        Ok(surface)
    }

    /// Query whether a queue family of a physical device supports presentation to this surface.
    pub fn query_is_family_presentable(&self, physical_device: vk::PhysicalDevice, queue_family_index: vkuint) -> VkResult<bool> {

        unsafe {
            self.loader.get_physical_device_surface_support(physical_device, queue_family_index, self.handle)
                .map_err(|_| VkError::query("Surface Present Support"))
        }
    }

    /// Query the basic capabilities of a surface.
    ///
    /// capabilities usually needs in swapchain creation.
    pub fn query_capabilities(&self, physical_device: vk::PhysicalDevice) -> VkResult<vk::SurfaceCapabilitiesKHR> {

        unsafe {
            self.loader.get_physical_device_surface_capabilities(physical_device, self.handle)
                .map_err(|_| VkError::query("Surface Capabilities"))
        }
    }

    /// Query the supported swapchain format tuples for a surface.
    pub fn query_formats(&self, physical_device: vk::PhysicalDevice) -> VkResult<Vec<vk::SurfaceFormatKHR>> {

        unsafe {
            self.loader.get_physical_device_surface_formats(physical_device, self.handle)
                .map_err(|_| VkError::query("Surface Formats"))
        }
    }

    /// Query the supported presentation modes for a surface.
    pub fn query_present_modes(&self, physical_device: vk::PhysicalDevice) -> VkResult<Vec<vk::PresentModeKHR>> {

        unsafe {
            self.loader.get_physical_device_surface_present_modes(physical_device, self.handle)
                .map_err(|_| VkError::query("Surface Present Modes"))
        }
    }

    pub fn query_support(&self, physical_device: vk::PhysicalDevice) -> VkResult<SurfaceSupport> {

        let support = SurfaceSupport {
            capabilities : self.query_capabilities(physical_device)?,
            formats      : self.query_formats(physical_device)?,
            present_modes: self.query_present_modes(physical_device)?,
        };
        Ok(support)
    }
}

impl SurfaceSupport {

    /// A swapchain can only be created if the surface reports at least one format and one present mode.
    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

impl VkBackendObject for VkSurface {

    /// Destroy the `vk::SurfaceKHR` object.
    unsafe fn discard(&self) {
        self.loader.destroy_surface(self.handle, None);
        log::debug!("Window surface destroyed.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn support(formats: usize, modes: usize) -> SurfaceSupport {
        SurfaceSupport {
            capabilities: vk::SurfaceCapabilitiesKHR::default(),
            formats: vec![vk::SurfaceFormatKHR::default(); formats],
            present_modes: vec![vk::PresentModeKHR::FIFO; modes],
        }
    }

    #[test]
    fn adequate_support_needs_formats_and_modes() {
        assert!(support(1, 1).is_adequate());
        assert!(!support(0, 2).is_adequate());
        assert!(!support(3, 0).is_adequate());
    }
}
