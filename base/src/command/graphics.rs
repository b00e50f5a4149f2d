
use ash::vk;

use crate::command::VkCommandType;
use crate::command::recorder::VkCmdRecorder;
use crate::ci::pipeline::RenderPassBI;
use crate::vkuint;

pub struct IGraphics;

impl VkCommandType for IGraphics {
    const BIND_POINT: vk::PipelineBindPoint = vk::PipelineBindPoint::GRAPHICS;
}

impl<'a> CmdGraphicsApi for VkCmdRecorder<'a, IGraphics> {

    fn begin_render_pass(&self, bi: RenderPassBI) -> &VkCmdRecorder<'a, IGraphics> {

        // only primary command buffers are recorded, so the contents are always inline.
        let begin_info = bi.value();
        unsafe {
            self.device.logic.handle.cmd_begin_render_pass(self.command, &begin_info, vk::SubpassContents::INLINE);
        } self
    }

    fn set_viewport(&self, first_viewport: vkuint, viewports: &[vk::Viewport]) -> &VkCmdRecorder<'a, IGraphics> {
        unsafe {
            self.device.logic.handle.cmd_set_viewport(self.command, first_viewport, viewports);
        } self
    }

    fn set_scissor(&self, first_scissor: vkuint, scissors: &[vk::Rect2D]) -> &VkCmdRecorder<'a, IGraphics> {
        unsafe {
            self.device.logic.handle.cmd_set_scissor(self.command, first_scissor, scissors);
        } self
    }

    fn bind_pipeline(&self, pipeline: vk::Pipeline) -> &VkCmdRecorder<'a, IGraphics> {
        unsafe {
            self.device.logic.handle.cmd_bind_pipeline(self.command, IGraphics::BIND_POINT, pipeline);
        } self
    }

    fn draw(&self, vertex_count: vkuint, instance_count: vkuint, first_vertex: vkuint, first_instance: vkuint) -> &VkCmdRecorder<'a, IGraphics> {
        unsafe {
            self.device.logic.handle.cmd_draw(self.command, vertex_count, instance_count, first_vertex, first_instance);
        } self
    }

    fn end_render_pass(&self) -> &VkCmdRecorder<'a, IGraphics> {
        // the final layout of the color attachment is applied here, ready for presentation.
        unsafe {
            self.device.logic.handle.cmd_end_render_pass(self.command);
        } self
    }
}

pub trait CmdGraphicsApi {

    fn begin_render_pass(&self, bi: RenderPassBI) -> &Self;

    /// Set the viewport dynamically.
    fn set_viewport(&self, first_viewport: vkuint, viewports: &[vk::Viewport]) -> &Self;

    /// Set the scissor rectangles dynamically.
    fn set_scissor(&self, first_scissor: vkuint, scissors: &[vk::Rect2D]) -> &Self;

    fn bind_pipeline(&self, pipeline: vk::Pipeline) -> &Self;

    fn draw(&self, vertex_count: vkuint, instance_count: vkuint, first_vertex: vkuint, first_instance: vkuint) -> &Self;

    fn end_render_pass(&self) -> &Self;
}
