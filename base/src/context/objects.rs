
/// Instance-level objects living for the whole runtime of the application (instance, debugger, surface).
///
/// They are not owned by a device, so `VulkanContext` destroys them by hand, the reverse of their creation order.
pub trait VkBackendObject {

    /// Destroy the underlying Vulkan object. Every child object must have been destroyed before.
    unsafe fn discard(&self);
}
