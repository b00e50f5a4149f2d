
use ash::vk;

use crate::context::VkDevice;
use crate::context::VkObjectDiscardable;
use crate::ci::{VulkanCI, VkObjectBuildableCI};
use crate::error::{VkResult, VkError};
use crate::vkuint;

use std::ptr;

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::RenderPassBeginInfo.
#[derive(Clone)]
pub struct RenderPassBI {

    inner: vk::RenderPassBeginInfo,
    clears: Vec<vk::ClearValue>,
}

impl VulkanCI<vk::RenderPassBeginInfo> for RenderPassBI {

    fn default_ci() -> vk::RenderPassBeginInfo {

        vk::RenderPassBeginInfo {
            s_type: vk::StructureType::RENDER_PASS_BEGIN_INFO,
            p_next: ptr::null(),
            render_area: vk::Rect2D {
                extent: vk::Extent2D { width : 0, height: 0 },
                offset: vk::Offset2D { x: 0, y: 0 },
            },
            clear_value_count: 0,
            p_clear_values   : ptr::null(),
            render_pass: vk::RenderPass::null(),
            framebuffer: vk::Framebuffer::null(),
        }
    }
}

impl RenderPassBI {

    pub fn new(render_pass: vk::RenderPass, framebuffer: vk::Framebuffer) -> RenderPassBI {

        RenderPassBI {
            inner: vk::RenderPassBeginInfo {
                render_pass, framebuffer,
                ..RenderPassBI::default_ci()
            },
            clears: Vec::new(),
        }
    }

    pub fn render_extent(mut self, area: vk::Extent2D) -> RenderPassBI {
        self.inner.render_area.extent = area; self
    }

    /// Clear values are used in the order of the attachments.
    pub fn add_clear_value(mut self, value: vk::ClearValue) -> RenderPassBI {
        self.clears.push(value); self
    }

    pub(crate) fn value(&self) -> vk::RenderPassBeginInfo {

        vk::RenderPassBeginInfo {
            clear_value_count: self.clears.len() as _,
            p_clear_values   : self.clears.as_ptr(),
            ..self.inner
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::RenderPassCreateInfo.
#[derive(Debug, Clone)]
pub struct RenderPassCI {

    inner: vk::RenderPassCreateInfo,
    attachments : Vec<vk::AttachmentDescription>,
    subpasses   : Vec<SubpassDescCI>,
    dependencies: Vec<vk::SubpassDependency>,
}

impl VulkanCI<vk::RenderPassCreateInfo> for RenderPassCI {

    fn default_ci() -> vk::RenderPassCreateInfo {

        vk::RenderPassCreateInfo {
            s_type: vk::StructureType::RENDER_PASS_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::RenderPassCreateFlags::empty(),
            attachment_count: 0,
            p_attachments   : ptr::null(),
            subpass_count   : 0,
            p_subpasses     : ptr::null(),
            dependency_count: 0,
            p_dependencies  : ptr::null(),
        }
    }
}

impl VkObjectBuildableCI for RenderPassCI {
    type ObjectType = vk::RenderPass;

    fn build(&self, device: &VkDevice) -> VkResult<vk::RenderPass> {

        let subpasses: Vec<vk::SubpassDescription> = self.subpasses.iter()
            .map(SubpassDescCI::value)
            .collect();

        let render_pass_ci = vk::RenderPassCreateInfo {
            attachment_count: self.attachments.len() as _,
            p_attachments   : self.attachments.as_ptr(),
            subpass_count   : subpasses.len() as _,
            p_subpasses     : subpasses.as_ptr(),
            dependency_count: self.dependencies.len() as _,
            p_dependencies  : self.dependencies.as_ptr(),
            ..self.inner
        };

        let render_pass = unsafe {
            device.logic.handle.create_render_pass(&render_pass_ci, None)
                .map_err(|_| VkError::create("Render Pass"))?
        };
        Ok(render_pass)
    }
}

impl RenderPassCI {

    pub fn new() -> RenderPassCI {

        RenderPassCI {
            inner: RenderPassCI::default_ci(),
            attachments : Vec::new(),
            subpasses   : Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn add_attachment(mut self, attachment: AttachmentDescCI) -> RenderPassCI {
        self.attachments.push(attachment.inner); self
    }

    pub fn add_subpass(mut self, subpass: SubpassDescCI) -> RenderPassCI {
        self.subpasses.push(subpass); self
    }

    pub fn add_dependency(mut self, dependency: SubpassDependencyCI) -> RenderPassCI {
        self.dependencies.push(dependency.inner); self
    }
}

impl VkObjectDiscardable for vk::RenderPass {

    fn discard(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_render_pass(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::AttachmentDescription.
#[derive(Debug, Clone)]
pub struct AttachmentDescCI {
    inner: vk::AttachmentDescription,
}

impl VulkanCI<vk::AttachmentDescription> for AttachmentDescCI {

    fn default_ci() -> vk::AttachmentDescription {

        vk::AttachmentDescription {
            flags            : vk::AttachmentDescriptionFlags::empty(),
            format           : vk::Format::UNDEFINED,
            samples          : vk::SampleCountFlags::TYPE_1,
            load_op          : vk::AttachmentLoadOp::DONT_CARE,
            store_op         : vk::AttachmentStoreOp::DONT_CARE,
            stencil_load_op  : vk::AttachmentLoadOp::DONT_CARE,
            stencil_store_op : vk::AttachmentStoreOp::DONT_CARE,
            initial_layout   : vk::ImageLayout::UNDEFINED,
            final_layout     : vk::ImageLayout::UNDEFINED,
        }
    }
}

impl AttachmentDescCI {

    pub fn new(format: vk::Format) -> AttachmentDescCI {

        AttachmentDescCI {
            inner: vk::AttachmentDescription {
                format,
                ..AttachmentDescCI::default_ci()
            },
        }
    }

    pub fn sample_count(mut self, count: vk::SampleCountFlags) -> AttachmentDescCI {
        self.inner.samples = count; self
    }

    pub fn op(mut self, load: vk::AttachmentLoadOp, store: vk::AttachmentStoreOp) -> AttachmentDescCI {
        self.inner.load_op  = load;
        self.inner.store_op = store; self
    }

    pub fn stencil_op(mut self, load: vk::AttachmentLoadOp, store: vk::AttachmentStoreOp) -> AttachmentDescCI {
        self.inner.stencil_load_op  = load;
        self.inner.stencil_store_op = store; self
    }

    pub fn layout(mut self, initial: vk::ImageLayout, r#final: vk::ImageLayout) -> AttachmentDescCI {
        self.inner.initial_layout = initial;
        self.inner.final_layout   = r#final; self
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::SubpassDescription, limited to color attachments.
#[derive(Debug, Clone)]
pub struct SubpassDescCI {

    bind_point: vk::PipelineBindPoint,
    colors: Vec<vk::AttachmentReference>,
}

impl SubpassDescCI {

    pub fn new(bind_point: vk::PipelineBindPoint) -> SubpassDescCI {

        SubpassDescCI {
            bind_point,
            colors: Vec::new(),
        }
    }

    pub fn add_color_attachment(mut self, attachment_index: vkuint, image_layout: vk::ImageLayout) -> SubpassDescCI {

        self.colors.push(vk::AttachmentReference {
            attachment: attachment_index,
            layout: image_layout,
        }); self
    }

    fn value(&self) -> vk::SubpassDescription {

        vk::SubpassDescription {
            flags: vk::SubpassDescriptionFlags::empty(),
            pipeline_bind_point        : self.bind_point,
            input_attachment_count     : 0,
            p_input_attachments        : ptr::null(),
            color_attachment_count     : self.colors.len() as _,
            p_color_attachments        : self.colors.as_ptr(),
            p_resolve_attachments      : ptr::null(),
            p_depth_stencil_attachment : ptr::null(),
            preserve_attachment_count  : 0,
            p_preserve_attachments     : ptr::null(),
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::SubpassDependency.
#[derive(Debug, Clone)]
pub struct SubpassDependencyCI {
    inner: vk::SubpassDependency,
}

impl VulkanCI<vk::SubpassDependency> for SubpassDependencyCI {

    fn default_ci() -> vk::SubpassDependency {

        vk::SubpassDependency {
            src_subpass      : vk::SUBPASS_EXTERNAL,
            dst_subpass      : 0,
            src_stage_mask   : vk::PipelineStageFlags::empty(),
            dst_stage_mask   : vk::PipelineStageFlags::empty(),
            src_access_mask  : vk::AccessFlags::empty(),
            dst_access_mask  : vk::AccessFlags::empty(),
            dependency_flags : vk::DependencyFlags::empty(),
        }
    }
}

impl SubpassDependencyCI {

    /// `src` may be `vk::SUBPASS_EXTERNAL` to depend on the commands before the render pass.
    pub fn new(src: vkuint, dst: vkuint) -> SubpassDependencyCI {

        SubpassDependencyCI {
            inner: vk::SubpassDependency {
                src_subpass: src,
                dst_subpass: dst,
                ..SubpassDependencyCI::default_ci()
            },
        }
    }

    pub fn stage_mask(mut self, src: vk::PipelineStageFlags, dst: vk::PipelineStageFlags) -> SubpassDependencyCI {
        self.inner.src_stage_mask = src;
        self.inner.dst_stage_mask = dst; self
    }

    pub fn access_mask(mut self, src: vk::AccessFlags, dst: vk::AccessFlags) -> SubpassDependencyCI {
        self.inner.src_access_mask = src;
        self.inner.dst_access_mask = dst; self
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::FramebufferCreateInfo.
#[derive(Debug, Clone)]
pub struct FramebufferCI {

    inner: vk::FramebufferCreateInfo,
    attachments: Vec<vk::ImageView>,
}

impl VulkanCI<vk::FramebufferCreateInfo> for FramebufferCI {

    fn default_ci() -> vk::FramebufferCreateInfo {

        vk::FramebufferCreateInfo {
            s_type: vk::StructureType::FRAMEBUFFER_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::FramebufferCreateFlags::empty(),
            render_pass     : vk::RenderPass::null(),
            attachment_count: 0,
            p_attachments   : ptr::null(),
            width : 0,
            height: 0,
            layers: 1,
        }
    }
}

impl VkObjectBuildableCI for FramebufferCI {
    type ObjectType = vk::Framebuffer;

    fn build(&self, device: &VkDevice) -> VkResult<vk::Framebuffer> {

        let framebuffer_ci = vk::FramebufferCreateInfo {
            attachment_count: self.attachments.len() as _,
            p_attachments   : self.attachments.as_ptr(),
            ..self.inner
        };

        let framebuffer = unsafe {
            device.logic.handle.create_framebuffer(&framebuffer_ci, None)
                .map_err(|_| VkError::create("Framebuffer"))?
        };
        Ok(framebuffer)
    }
}

impl FramebufferCI {

    pub fn new(render_pass: vk::RenderPass, dimension: vk::Extent2D) -> FramebufferCI {

        FramebufferCI {
            inner: vk::FramebufferCreateInfo {
                render_pass,
                width : dimension.width,
                height: dimension.height,
                ..FramebufferCI::default_ci()
            },
            attachments: Vec::new(),
        }
    }

    pub fn add_attachment(mut self, view: vk::ImageView) -> FramebufferCI {
        self.attachments.push(view); self
    }
}

impl VkObjectDiscardable for vk::Framebuffer {

    fn discard(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_framebuffer(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    #[test]
    fn begin_info_carries_clear_values() {
        let begin = RenderPassBI::new(vk::RenderPass::from_raw(1), vk::Framebuffer::from_raw(2))
            .render_extent(vk::Extent2D { width: 800, height: 600 })
            .add_clear_value(vk::ClearValue { color: vk::ClearColorValue { float32: [0.0, 0.0, 0.0, 1.0] } });
        let value = begin.value();

        assert_eq!(value.clear_value_count, 1);
        assert_eq!(value.render_area.extent.width, 800);
        assert_eq!(value.render_area.offset.x, 0);
        assert_eq!(value.framebuffer, vk::Framebuffer::from_raw(2));
    }

    #[test]
    fn color_attachment_description() {
        let attachment = AttachmentDescCI::new(vk::Format::B8G8R8A8_SRGB)
            .op(vk::AttachmentLoadOp::CLEAR, vk::AttachmentStoreOp::STORE)
            .layout(vk::ImageLayout::UNDEFINED, vk::ImageLayout::PRESENT_SRC_KHR);

        assert_eq!(attachment.inner.samples, vk::SampleCountFlags::TYPE_1);
        assert_eq!(attachment.inner.stencil_load_op, vk::AttachmentLoadOp::DONT_CARE);
        assert_eq!(attachment.inner.final_layout, vk::ImageLayout::PRESENT_SRC_KHR);
    }

    #[test]
    fn subpass_references_color_attachment() {
        let subpass = SubpassDescCI::new(vk::PipelineBindPoint::GRAPHICS)
            .add_color_attachment(0, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
        let value = subpass.value();

        assert_eq!(value.color_attachment_count, 1);
        assert!(value.p_depth_stencil_attachment.is_null());
        assert_eq!(unsafe { (*value.p_color_attachments).layout }, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
    }

    #[test]
    fn framebuffer_matches_extent() {
        let ci = FramebufferCI::new(vk::RenderPass::from_raw(1), vk::Extent2D { width: 640, height: 480 })
            .add_attachment(vk::ImageView::from_raw(3));

        assert_eq!(ci.inner.width, 640);
        assert_eq!(ci.inner.height, 480);
        assert_eq!(ci.inner.layers, 1);
        assert_eq!(ci.attachments, vec![vk::ImageView::from_raw(3)]);
    }
}
