
pub use self::device::{VkDevice, VkLogicalDevice, VkPhysicalDevice, DeviceQueues, VkQueue, QueueFamilyIndices};
pub use self::device::{VkObjectDiscardable, VkObjectWaitable};
pub use self::swapchain::{VkSwapchain, SwapchainSyncError};
pub use self::teardown::{DiscardStack, DeviceObject};
pub use self::instance::VkInstance;
pub use self::debug::VkDebugger;
pub use self::surface::{VkSurface, SurfaceSupport};
pub use self::objects::VkBackendObject;

pub use self::instance::InstanceConfig;
pub use self::debug::{ValidationConfig, DebugUtilsConfig, VALIDATION_LOG_TARGET};
pub use self::device::PhysicalDevConfig;
pub use self::swapchain::SwapchainConfig;

mod instance;
mod debug;
mod surface;
mod device;
mod swapchain;
mod objects;
mod teardown;

use crate::workflow::WindowContext;
use crate::config::RendererConfig;
use crate::error::VkResult;

#[derive(Debug, Clone, Default)]
pub struct VulkanConfig {

    pub instance : InstanceConfig,
    pub debugger : ValidationConfig,
    pub dev_phy  : PhysicalDevConfig,
    pub swapchain: SwapchainConfig,
}

impl From<&RendererConfig> for VulkanConfig {

    fn from(config: &RendererConfig) -> VulkanConfig {
        VulkanConfig {
            instance : config.instance.clone(),
            debugger : config.validation.clone(),
            dev_phy  : config.device.clone(),
            swapchain: config.swapchain.clone(),
        }
    }
}

/// Everything needed to draw into the window: instance, validation messenger, surface, device and swapchain.
pub struct VulkanContext {

    instance : instance::VkInstance,
    debugger : debug::VkDebugger,
    surface  : surface::VkSurface,

    pub device   : device::VkDevice,
    pub swapchain: swapchain::VkSwapchain,
}

impl VulkanContext {

    pub fn from_config(config: &RendererConfig) -> VulkanContextBuilder {
        VulkanContextBuilder { config: VulkanConfig::from(config) }
    }

    pub fn wait_idle(&self) -> VkResult<()> {
        self.device.wait_idle()
    }

    /// Destroy the context, the reverse of its creation order. Every object created from the device must be destroyed before.
    pub fn discard(self) {

        self.swapchain.discard(&self.device);
        self.device.discard_self();

        unsafe {
            self.surface.discard();
            self.debugger.discard();
            self.instance.discard();
        }
        log::info!("Vulkan context destroyed.");
    }
}

pub struct VulkanContextBuilder {

    config: VulkanConfig,
}

impl VulkanContextBuilder {

    /// Create the context step by step. If a step fails, the steps already done are undone in reverse before returning the error.
    pub fn build(self, window: &WindowContext) -> VkResult<VulkanContext> {

        let instance = instance::VkInstance::new(&self.config.instance, &self.config.debugger, window.raw_display_handle())?;

        let debugger = match debug::VkDebugger::new(&instance, &self.config.debugger) {
            | Ok(debugger) => debugger,
            | Err(e) => {
                unsafe { instance.discard(); }
                return Err(e)
            },
        };

        macro_rules! unwind_on_error {
            ($step:expr, $($created:ident),+) => {
                match $step {
                    | Ok(object) => object,
                    | Err(e) => {
                        unsafe { $($created.discard();)+ }
                        return Err(e)
                    },
                }
            };
        }

        let surface = unwind_on_error!(surface::VkSurface::new(&instance, &window.handle), debugger, instance);
        let device = unwind_on_error!(device::VkDevice::new(&instance, &surface, self.config.dev_phy), surface, debugger, instance);

        let swapchain = match swapchain::VkSwapchain::new(&instance, &device, &surface, self.config.swapchain, window.dimension()) {
            | Ok(swapchain) => swapchain,
            | Err(e) => {
                device.discard_self();
                unsafe {
                    surface.discard();
                    debugger.discard();
                    instance.discard();
                }
                return Err(e)
            },
        };

        log::info!("Vulkan context created.");
        let context = VulkanContext { instance, debugger, surface, device, swapchain };
        Ok(context)
    }
}
