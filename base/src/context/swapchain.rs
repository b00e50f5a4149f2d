
use ash::vk;
use failure::Fail;

use crate::context::instance::VkInstance;
use crate::context::device::{VkDevice, VkQueue};
use crate::context::surface::VkSurface;
use crate::utils::time::VkTimeDuration;
use crate::error::{VkResult, VkError};
use crate::vkuint;

use std::ptr;

#[derive(Debug, Clone)]
pub struct SwapchainConfig {

    /// wait for the vertical blank before presenting (FIFO). Otherwise prefer MAILBOX, then IMMEDIATE.
    pub present_vsync: bool,
    /// time-out of image acquisition.
    pub image_acquire_time: VkTimeDuration,
}

impl Default for SwapchainConfig {

    fn default() -> SwapchainConfig {
        SwapchainConfig {
            present_vsync: false,
            image_acquire_time: VkTimeDuration::Infinite,
        }
    }
}

pub struct VkSwapchain {

    /// handle of `vk::SwapchainKHR`.
    handle: vk::SwapchainKHR,
    /// the extension loader provides functions for creation and destruction of `vk::SwapchainKHR` object.
    loader: ash::extensions::khr::Swapchain,
    /// the color views of the presentable images, destroyed before the swapchain.
    /// The images themselves are owned by the swapchain.
    image_views: Vec<vk::ImageView>,
    /// the format of presentable images.
    format: vk::Format,
    /// the dimension of presentable images.
    dimension: vk::Extent2D,
    /// the queue used to present image.
    present_queue: VkQueue,

    config: SwapchainConfig,
}

#[derive(Debug, Fail, Eq, PartialEq)]
pub enum SwapchainSyncError {
    #[fail(display = "No image became available within the time allowed.")]
    TimeOut,
    /// the operation succeeded, but the swapchain no longer matches the surface exactly.
    #[fail(display = "Swapchain image {} does not match the surface properties exactly.", _0)]
    SubOptimal(vkuint),
    #[fail(display = "Surface has changed and is not compatible with the swapchain.")]
    SurfaceOutDate,
    #[fail(display = "Get unknown error from swapchain: {}.", _0)]
    Unknown(vk::Result),
}

impl VkSwapchain {

    /// Create the swapchain and the views of its images.
    ///
    /// `window_dimension` is the framebuffer size of the window, used when the surface lets the swapchain pick its extent.
    pub fn new(instance: &VkInstance, device: &VkDevice, surface: &VkSurface, config: SwapchainConfig, window_dimension: vk::Extent2D) -> VkResult<VkSwapchain> {

        let support = surface.query_support(device.phy.handle)?;
        let caps = &support.capabilities;

        let surface_format = choose_surface_format(&support.formats)
            .ok_or_else(|| VkError::unsupported("surface format"))?;
        let present_mode = choose_present_mode(&support.present_modes, config.present_vsync);
        let extent = choose_extent(caps, window_dimension);
        let image_count = choose_image_count(caps);
        let composite_alpha = choose_composite_alpha(caps);

        let families = device.phy.families;
        let family_indices = families.unique();
        let (sharing_mode, family_indices) = if families.is_shared() {
            (vk::SharingMode::EXCLUSIVE, Vec::new())
        } else {
            (vk::SharingMode::CONCURRENT, family_indices)
        };

        let swapchain_ci = vk::SwapchainCreateInfoKHR {
            s_type                   : vk::StructureType::SWAPCHAIN_CREATE_INFO_KHR,
            p_next                   : ptr::null(),
            flags                    : vk::SwapchainCreateFlagsKHR::empty(),
            surface                  : surface.handle,
            min_image_count          : image_count,
            image_format             : surface_format.format,
            image_color_space        : surface_format.color_space,
            image_extent             : extent,
            image_array_layers       : 1,
            image_usage              : vk::ImageUsageFlags::COLOR_ATTACHMENT,
            image_sharing_mode       : sharing_mode,
            queue_family_index_count : family_indices.len() as _,
            p_queue_family_indices   : if family_indices.is_empty() { ptr::null() } else { family_indices.as_ptr() },
            pre_transform            : caps.current_transform,
            composite_alpha,
            present_mode,
            // setting clipped to vk::TRUE allows the implementation to discard rendering outside of the surface area.
            clipped                  : vk::TRUE,
            old_swapchain            : vk::SwapchainKHR::null(),
        };

        let loader = ash::extensions::khr::Swapchain::new(&instance.handle, &device.logic.handle);

        let handle = unsafe {
            loader.create_swapchain(&swapchain_ci, None)
                .map_err(|_| VkError::create("Swapchain"))?
        };

        let image_views = match obtain_image_views(device, handle, &loader, surface_format.format) {
            | Ok(image_views) => image_views,
            | Err(e) => {
                unsafe { loader.destroy_swapchain(handle, None); }
                return Err(e)
            },
        };

        log::info!("Swapchain created: {} images of {:?} ({:?}), {}x{}, {:?}.",
            image_views.len(), surface_format.format, surface_format.color_space, extent.width, extent.height, present_mode);

        let result = VkSwapchain {
            handle, loader, image_views, config,
            present_queue: device.logic.queues.present,
            format: surface_format.format,
            dimension: extent,
        };
        Ok(result)
    }

    /// Acquire an available presentable image to use, and retrieve the index of that image.
    ///
    /// `semaphore` is signaled once the image is ready to be rendered to.
    /// `SubOptimal` still carries the acquired index, and the semaphore is signaled in that case too.
    pub fn next_image(&self, semaphore: vk::Semaphore) -> Result<vkuint, SwapchainSyncError> {

        let (image_index, is_sub_optimal) = unsafe {
            self.loader.acquire_next_image(self.handle, self.config.image_acquire_time.into(), semaphore, vk::Fence::null())
                .map_err(sync_error)?
        };

        if is_sub_optimal {
            Err(SwapchainSyncError::SubOptimal(image_index))
        } else {
            Ok(image_index)
        }
    }

    /// Queue an image for presentation.
    ///
    /// `wait_semaphores` specifies the semaphores to wait for before issuing the present request.
    ///
    /// `image_index` is the index of swapchain’s presentable images.
    pub fn present(&self, wait_semaphores: &[vk::Semaphore], image_index: vkuint) -> Result<(), SwapchainSyncError> {

        let present_info = vk::PresentInfoKHR {
            s_type              : vk::StructureType::PRESENT_INFO_KHR,
            p_next              : ptr::null(),
            wait_semaphore_count: wait_semaphores.len() as _,
            p_wait_semaphores   : wait_semaphores.as_ptr(),
            swapchain_count     : 1,
            p_swapchains        : &self.handle,
            p_image_indices     : &image_index,
            p_results           : ptr::null_mut(),
        };

        let is_sub_optimal = unsafe {
            self.loader.queue_present(self.present_queue.handle, &present_info)
                .map_err(sync_error)?
        };

        if is_sub_optimal {
            Err(SwapchainSyncError::SubOptimal(image_index))
        } else {
            Ok(())
        }
    }

    #[inline]
    pub fn dimension(&self) -> vk::Extent2D {
        self.dimension
    }

    #[inline]
    pub fn format(&self) -> vk::Format {
        self.format
    }

    pub fn image_views(&self) -> &[vk::ImageView] {
        &self.image_views
    }

    /// Destroy the image views, then the `vk::SwapchainKHR` object.
    ///
    /// The application must not destroy `vk::SwapchainKHR` until after completion of all outstanding operations on images that were acquired from the `vk::SwapchainKHR`.
    pub fn discard(&self, device: &VkDevice) {

        unsafe {

            self.image_views.iter().for_each(|&view| {
                device.logic.handle.destroy_image_view(view, None);
            });

            self.loader.destroy_swapchain(self.handle, None);
        }
        log::debug!("Swapchain destroyed.");
    }
}

fn sync_error(error: vk::Result) -> SwapchainSyncError {

    match error {
        | vk::Result::TIMEOUT
        | vk::Result::NOT_READY             => SwapchainSyncError::TimeOut,
        | vk::Result::ERROR_OUT_OF_DATE_KHR => SwapchainSyncError::SurfaceOutDate,
        | _ => SwapchainSyncError::Unknown(error),
    }
}

fn obtain_image_views(device: &VkDevice, swapchain: vk::SwapchainKHR, loader: &ash::extensions::khr::Swapchain, format: vk::Format) -> VkResult<Vec<vk::ImageView>> {

    let image_handles = unsafe {
        loader.get_swapchain_images(swapchain)
            .map_err(|_| VkError::query("Swapchain Images"))?
    };

    let mut result: Vec<vk::ImageView> = Vec::with_capacity(image_handles.len());

    for image_handle in image_handles.into_iter() {

        let view_ci = vk::ImageViewCreateInfo {
            s_type     : vk::StructureType::IMAGE_VIEW_CREATE_INFO,
            p_next     : ptr::null(),
            flags      : vk::ImageViewCreateFlags::empty(),
            image      : image_handle,
            view_type  : vk::ImageViewType::TYPE_2D,
            format,
            components : vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            },
            subresource_range: vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            },
        };

        let image_view = unsafe {
            device.logic.handle.create_image_view(&view_ci, None)
        };

        match image_view {
            | Ok(view) => result.push(view),
            | Err(_) => {
                // destroy the views created so far, newest first.
                result.iter().rev().for_each(|&view| unsafe {
                    device.logic.handle.destroy_image_view(view, None);
                });
                return Err(VkError::create("Image View"))
            },
        }
    }

    Ok(result)
}


// -----------------------------------------------------------------------------------
/// A single `UNDEFINED` entry means the surface has no preferred format.
fn choose_surface_format(available: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {

    const PREFERRED: vk::SurfaceFormatKHR = vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_SRGB,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    };

    match available {
        | [] => None,
        | [only] if only.format == vk::Format::UNDEFINED => Some(PREFERRED),
        | _ => {
            available.iter().find(|surface_format| {
                surface_format.format == PREFERRED.format && surface_format.color_space == PREFERRED.color_space
            }).or(available.first()).cloned()
        },
    }
}

fn choose_present_mode(available: &[vk::PresentModeKHR], is_vsync: bool) -> vk::PresentModeKHR {

    // FIFO is always supported, and waits for the vertical blank.
    if is_vsync {
        return vk::PresentModeKHR::FIFO
    }

    [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE].iter()
        .find(|mode| available.contains(mode))
        .cloned()
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, window_dimension: vk::Extent2D) -> vk::Extent2D {

    // the special value u32::MAX means the swapchain decides the size of the surface.
    if caps.current_extent.width != vkuint::MAX {
        caps.current_extent
    } else {
        vk::Extent2D {
            width : window_dimension.width.clamp(caps.min_image_extent.width, caps.max_image_extent.width),
            height: window_dimension.height.clamp(caps.min_image_extent.height, caps.max_image_extent.height),
        }
    }
}

fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> vkuint {

    // zero max_image_count means there is no limit.
    let desired_count = caps.min_image_count + 1;
    if caps.max_image_count > 0 {
        desired_count.min(caps.max_image_count)
    } else {
        desired_count
    }
}

fn choose_composite_alpha(caps: &vk::SurfaceCapabilitiesKHR) -> vk::CompositeAlphaFlagsKHR {

    const CANDIDATE_COMPOSITE_ALPHAS: [vk::CompositeAlphaFlagsKHR; 4] = [
        vk::CompositeAlphaFlagsKHR::OPAQUE,
        vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED,
        vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED,
        vk::CompositeAlphaFlagsKHR::INHERIT,
    ];

    CANDIDATE_COMPOSITE_ALPHAS.iter().find(|&&composite_alpha| {
        caps.supported_composite_alpha.contains(composite_alpha)
    }).cloned().unwrap_or(vk::CompositeAlphaFlagsKHR::OPAQUE)
}
// -----------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR { format, color_space }
    }

    fn caps(current: vk::Extent2D, min: vk::Extent2D, max: vk::Extent2D) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            current_extent: current,
            min_image_extent: min,
            max_image_extent: max,
            ..Default::default()
        }
    }

    fn extent(width: vkuint, height: vkuint) -> vk::Extent2D {
        vk::Extent2D { width, height }
    }

    #[test]
    fn undefined_format_means_anything() {
        let available = [surface_format(vk::Format::UNDEFINED, vk::ColorSpaceKHR::SRGB_NONLINEAR)];
        let chosen = choose_surface_format(&available).unwrap();

        assert_eq!(chosen.format, vk::Format::B8G8R8A8_SRGB);
        assert_eq!(chosen.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
    }

    #[test]
    fn srgb_format_is_preferred() {
        let available = [
            surface_format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            surface_format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        assert_eq!(choose_surface_format(&available).unwrap().format, vk::Format::B8G8R8A8_SRGB);
    }

    #[test]
    fn first_format_is_the_fallback() {
        let available = [
            surface_format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            surface_format(vk::Format::B8G8R8A8_SRGB, vk::ColorSpaceKHR::DISPLAY_P3_NONLINEAR_EXT),
        ];
        assert_eq!(choose_surface_format(&available).unwrap().format, vk::Format::R8G8B8A8_UNORM);
        assert!(choose_surface_format(&[]).is_none());
    }

    #[test]
    fn present_mode_preference() {
        let all = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::MAILBOX];
        assert_eq!(choose_present_mode(&all, false), vk::PresentModeKHR::MAILBOX);
        assert_eq!(choose_present_mode(&all, true), vk::PresentModeKHR::FIFO);

        let no_mailbox = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];
        assert_eq!(choose_present_mode(&no_mailbox, false), vk::PresentModeKHR::IMMEDIATE);

        let fifo_only = [vk::PresentModeKHR::FIFO];
        assert_eq!(choose_present_mode(&fifo_only, false), vk::PresentModeKHR::FIFO);
    }

    #[test]
    fn defined_current_extent_is_used() {
        let caps = caps(extent(1024, 768), extent(1, 1), extent(4096, 4096));
        assert_eq!(choose_extent(&caps, extent(800, 600)), extent(1024, 768));
    }

    #[test]
    fn window_extent_is_clamped() {
        let caps = caps(extent(vkuint::MAX, vkuint::MAX), extent(100, 100), extent(640, 480));

        assert_eq!(choose_extent(&caps, extent(800, 600)), extent(640, 480));
        assert_eq!(choose_extent(&caps, extent(50, 300)), extent(100, 300));
    }

    #[test]
    fn image_count_respects_the_limit() {
        let mut caps = vk::SurfaceCapabilitiesKHR { min_image_count: 2, max_image_count: 0, ..Default::default() };
        assert_eq!(choose_image_count(&caps), 3);

        caps.max_image_count = 2;
        assert_eq!(choose_image_count(&caps), 2);

        caps.max_image_count = 8;
        assert_eq!(choose_image_count(&caps), 3);
    }

    #[test]
    fn composite_alpha_takes_the_first_supported() {
        let caps = vk::SurfaceCapabilitiesKHR {
            supported_composite_alpha: vk::CompositeAlphaFlagsKHR::INHERIT | vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED,
            ..Default::default()
        };
        assert_eq!(choose_composite_alpha(&caps), vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED);
    }

    #[test]
    fn vk_errors_map_to_sync_errors() {
        assert_eq!(sync_error(vk::Result::ERROR_OUT_OF_DATE_KHR), SwapchainSyncError::SurfaceOutDate);
        assert_eq!(sync_error(vk::Result::TIMEOUT), SwapchainSyncError::TimeOut);
        assert_eq!(sync_error(vk::Result::ERROR_DEVICE_LOST), SwapchainSyncError::Unknown(vk::Result::ERROR_DEVICE_LOST));
    }
}
