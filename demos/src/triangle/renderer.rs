
use ash::vk;

use vkbase::context::{VkDevice, VkSwapchain, DiscardStack};
use vkbase::ci::VkObjectBuildableCI;
use vkbase::ci::pipeline::{RenderPassCI, RenderPassBI, AttachmentDescCI, SubpassDescCI, SubpassDependencyCI};
use vkbase::ci::pipeline::{FramebufferCI, PipelineLayoutCI, GraphicsPipelineCI, RasterizationSCI};
use vkbase::ci::shader::ShaderModuleCI;
use vkbase::ci::command::{CommandPoolCI, CommandBufferAI};
use vkbase::ci::sync::SemaphoreCI;
use vkbase::ci::device::SubmitCI;
use vkbase::command::{VkCmdRecorder, IGraphics, CmdGraphicsApi};
use vkbase::{ShaderConfig, VkResult, VkError};

const CLEAR_COLOR: vk::ClearValue = vk::ClearValue {
    color: vk::ClearColorValue {
        float32: [0.0, 0.0, 0.0, 1.0],
    },
};

/// Everything the triangle needs besides the context and the loop's own sync objects.
pub struct Renderer {

    shaders: ShaderConfig,
    // present between `init` and `deinit`.
    objects: Option<RenderObjects>,
}

struct RenderObjects {

    dimension: vk::Extent2D,

    render_pass: vk::RenderPass,
    pipeline: vk::Pipeline,
    /// one framebuffer for each swapchain image.
    framebuffers: Vec<vk::Framebuffer>,

    /// allocated from the pool, so it is freed together with it.
    command: vk::CommandBuffer,
    render_finished: vk::Semaphore,

    discards: DiscardStack,
}

impl Renderer {

    pub fn new(shaders: ShaderConfig) -> Renderer {
        Renderer { shaders, objects: None }
    }
}

impl vkbase::Workflow for Renderer {

    fn init(&mut self, device: &VkDevice, swapchain: &VkSwapchain) -> VkResult<()> {

        let objects = RenderObjects::new(device, swapchain, &self.shaders)?;
        log::info!("Triangle renderer ready with {} framebuffer(s).", objects.framebuffers.len());

        self.objects = Some(objects);
        Ok(())
    }

    fn render_frame(&mut self, device: &VkDevice, device_available: vk::Fence, image_available: vk::Semaphore, image_index: usize) -> VkResult<vk::Semaphore> {

        let objects = self.objects.as_ref()
            .ok_or_else(|| VkError::other("Triangle renderer is not initialized."))?;

        objects.record_commands(device, image_index)?;

        SubmitCI::new()
            // the image must be acquired before writing colors into it.
            .add_wait(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT, image_available)
            .add_command(objects.command)
            .add_signal(objects.render_finished)
            .submit(device, device_available)?;

        Ok(objects.render_finished)
    }

    fn deinit(&mut self, device: &VkDevice) {

        if let Some(mut objects) = self.objects.take() {
            objects.discards.unwind(device);
        }
    }
}

impl RenderObjects {

    /// Create the objects in order. If one of them fails, the ones created before are destroyed in reverse.
    fn new(device: &VkDevice, swapchain: &VkSwapchain, shaders: &ShaderConfig) -> VkResult<RenderObjects> {

        let mut discards = DiscardStack::new();
        let dimension = swapchain.dimension();

        let render_pass = discards.build(device, &render_pass_ci(swapchain.format()))?;
        let pipeline_layout = discards.build(device, &PipelineLayoutCI::new())?;

        let pipeline_ci = GraphicsPipelineCI::new(render_pass, pipeline_layout)
            .add_shader(ShaderModuleCI::from_path(vk::ShaderStageFlags::VERTEX, &shaders.vertex))
            .add_shader(ShaderModuleCI::from_path(vk::ShaderStageFlags::FRAGMENT, &shaders.fragment))
            .set_rasterization(RasterizationSCI::new()
                .cull_face(vk::CullModeFlags::BACK, vk::FrontFace::CLOCKWISE));
        let pipeline = discards.build(device, &pipeline_ci)?;

        let image_views = swapchain.image_views();
        let mut framebuffers = Vec::with_capacity(image_views.len());
        for &view in image_views.iter() {
            let framebuffer_ci = FramebufferCI::new(render_pass, dimension)
                .add_attachment(view);
            framebuffers.push(discards.build(device, &framebuffer_ci)?);
        }

        let command_pool = discards.build(device, &CommandPoolCI::new(device.logic.queues.graphics.family_index))?;
        let command = match CommandBufferAI::new(command_pool, 1).build(device) {
            | Ok(commands) if !commands.is_empty() => commands[0],
            | Ok(_) => {
                discards.unwind(device);
                return Err(VkError::create("Command Buffers"))
            },
            | Err(e) => {
                discards.unwind(device);
                return Err(e)
            },
        };

        let render_finished = discards.build(device, &SemaphoreCI::new())?;

        let objects = RenderObjects { dimension, render_pass, pipeline, framebuffers, command, render_finished, discards };
        Ok(objects)
    }

    fn record_commands(&self, device: &VkDevice, image_index: usize) -> VkResult<()> {

        let framebuffer = self.framebuffers.get(image_index).cloned()
            .ok_or_else(|| VkError::other(format!("No framebuffer for swapchain image {}.", image_index)))?;

        let render_pass_bi = RenderPassBI::new(self.render_pass, framebuffer)
            .render_extent(self.dimension)
            .add_clear_value(CLEAR_COLOR);

        let recorder: VkCmdRecorder<IGraphics> = VkCmdRecorder::new(device, self.command);

        // the previous submission has finished once the in-flight fence is signaled.
        recorder.reset_command(vk::CommandBufferResetFlags::empty())?;

        recorder.begin_record()?
            .begin_render_pass(render_pass_bi)
            .bind_pipeline(self.pipeline)
            .set_viewport(0, &[full_viewport(self.dimension)])
            .set_scissor(0, &[full_scissor(self.dimension)])
            .draw(3, 1, 0, 0)
            .end_render_pass();

        recorder.end_record()
    }
}

fn render_pass_ci(color_format: vk::Format) -> RenderPassCI {

    let color_attachment = AttachmentDescCI::new(color_format)
        .sample_count(vk::SampleCountFlags::TYPE_1)
        .op(vk::AttachmentLoadOp::CLEAR, vk::AttachmentStoreOp::STORE)
        .stencil_op(vk::AttachmentLoadOp::DONT_CARE, vk::AttachmentStoreOp::DONT_CARE)
        .layout(vk::ImageLayout::UNDEFINED, vk::ImageLayout::PRESENT_SRC_KHR);

    let subpass = SubpassDescCI::new(vk::PipelineBindPoint::GRAPHICS)
        .add_color_attachment(0, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

    // the layout transition at the start of the render pass waits for the image to be acquired.
    let dependency = SubpassDependencyCI::new(vk::SUBPASS_EXTERNAL, 0)
        .stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT, vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
        .access_mask(vk::AccessFlags::empty(), vk::AccessFlags::COLOR_ATTACHMENT_WRITE);

    RenderPassCI::new()
        .add_attachment(color_attachment)
        .add_subpass(subpass)
        .add_dependency(dependency)
}

fn full_viewport(dimension: vk::Extent2D) -> vk::Viewport {
    vk::Viewport {
        x: 0.0, y: 0.0,
        width : dimension.width  as f32,
        height: dimension.height as f32,
        min_depth: 0.0,
        max_depth: 1.0,
    }
}

fn full_scissor(dimension: vk::Extent2D) -> vk::Rect2D {
    vk::Rect2D {
        offset: vk::Offset2D { x: 0, y: 0 },
        extent: dimension,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_and_scissor_cover_the_swapchain() {
        let dimension = vk::Extent2D { width: 800, height: 600 };

        let viewport = full_viewport(dimension);
        assert_eq!((viewport.x, viewport.y), (0.0, 0.0));
        assert_eq!((viewport.width, viewport.height), (800.0, 600.0));
        assert_eq!((viewport.min_depth, viewport.max_depth), (0.0, 1.0));

        let scissor = full_scissor(dimension);
        assert_eq!(scissor.extent, dimension);
        assert_eq!((scissor.offset.x, scissor.offset.y), (0, 0));
    }

    #[test]
    fn renderer_starts_without_objects() {
        let renderer = Renderer::new(ShaderConfig::default());
        assert!(renderer.objects.is_none());
    }
}
