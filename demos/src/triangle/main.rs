
//! Snapshot 03 - Triangle
//!
//! The whole bring-up: swapchain, render pass, graphics pipeline, framebuffers, command buffer and
//! the synchronization of a single frame in flight. Draws until the window closes or Escape is pressed.

mod renderer;

use vkbase::context::VulkanContext;
use vkbase::{WindowContext, ProcPipeline, VkResult};

fn main() {

    vkdemos::init_logger();
    vkdemos::exit_on_error(run());
}

fn run() -> VkResult<()> {

    let config = vkdemos::load_config()?;

    let window = WindowContext::new(config.window.clone())?;
    let context = VulkanContext::from_config(&config)
        .build(&window)?;

    let entry = ProcPipeline::new(window, context)?;
    let renderer = renderer::Renderer::new(config.shaders.clone());

    entry.launch(renderer)
}
