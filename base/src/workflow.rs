
pub use self::window::{WindowContext, WindowConfig, WindowMode};
pub use self::loops::ProcPipeline;

mod window;
mod loops;

use ash::vk;

use crate::context::{VkDevice, VkSwapchain};
use crate::input::EventController;
use crate::utils::frame::FrameAction;
use crate::error::VkResult;

/// The program specific part of the render loop.
pub trait Workflow {

    /// Create the objects the workflow needs. On failure, the ones already created must be destroyed before returning.
    fn init(&mut self, _device: &VkDevice, _swapchain: &VkSwapchain) -> VkResult<()> {
        Ok(())
    }

    /// Record and submit the commands drawing to `image_index`.
    ///
    /// The submission must wait for `image_available` and signal `device_available` once done.
    /// Return the semaphore signaled when the rendering finishes, which the presentation waits on.
    fn render_frame(&mut self, device: &VkDevice, device_available: vk::Fence, image_available: vk::Semaphore, image_index: usize) -> VkResult<vk::Semaphore>;

    fn receive_input(&mut self, inputer: &EventController) -> FrameAction {

        if inputer.key.is_key_pressed(winit::event::VirtualKeyCode::Escape) {
            FrameAction::Terminal
        } else {
            FrameAction::Rendering
        }
    }

    /// Destroy the objects created in `init`, the reverse of their creation order.
    ///
    /// Also called after `init` failed, when there is nothing left to destroy.
    fn deinit(&mut self, device: &VkDevice);
}
