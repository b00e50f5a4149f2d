
pub use self::renderpass::{RenderPassBI, RenderPassCI, AttachmentDescCI, SubpassDescCI, SubpassDependencyCI, FramebufferCI};
pub use self::state::{VertexInputSCI, InputAssemblySCI, ViewportSCI, RasterizationSCI, MultisampleSCI};
pub use self::state::{BlendAttachmentSCI, ColorBlendSCI, DynamicSCI};

mod renderpass;
mod state;

use ash::vk;

use crate::context::VkDevice;
use crate::context::VkObjectDiscardable;
use crate::ci::{VulkanCI, VkObjectBuildableCI};
use crate::ci::shader::{ShaderModuleCI, ShaderStageCI};
use crate::error::{VkResult, VkError};

use std::ptr;

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::PipelineLayoutCreateInfo.
///
/// Always empty: the triangle shaders bind no resource.
#[derive(Debug, Clone)]
pub struct PipelineLayoutCI {
    inner: vk::PipelineLayoutCreateInfo,
}

impl VulkanCI<vk::PipelineLayoutCreateInfo> for PipelineLayoutCI {

    fn default_ci() -> vk::PipelineLayoutCreateInfo {

        vk::PipelineLayoutCreateInfo {
            s_type: vk::StructureType::PIPELINE_LAYOUT_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::PipelineLayoutCreateFlags::empty(),
            set_layout_count: 0,
            p_set_layouts   : ptr::null(),
            push_constant_range_count: 0,
            p_push_constant_ranges   : ptr::null(),
        }
    }
}

impl VkObjectBuildableCI for PipelineLayoutCI {
    type ObjectType = vk::PipelineLayout;

    fn build(&self, device: &VkDevice) -> VkResult<vk::PipelineLayout> {

        let pipeline_layout = unsafe {
            device.logic.handle.create_pipeline_layout(&self.inner, None)
                .map_err(|_| VkError::create("Pipeline Layout"))?
        };
        Ok(pipeline_layout)
    }
}

impl PipelineLayoutCI {

    pub fn new() -> PipelineLayoutCI {
        PipelineLayoutCI { inner: PipelineLayoutCI::default_ci() }
    }
}

impl VkObjectDiscardable for vk::PipelineLayout {

    fn discard(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_pipeline_layout(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::GraphicsPipelineCreateInfo.
///
/// The shader modules are created from their `ShaderModuleCI` during `build`, and destroyed before `build` returns.
pub struct GraphicsPipelineCI {

    inner: vk::GraphicsPipelineCreateInfo,

    shaders: Vec<ShaderModuleCI>,

    vertex_input  : VertexInputSCI,
    input_assembly: InputAssemblySCI,
    viewport      : ViewportSCI,
    rasterization : RasterizationSCI,
    multisample   : MultisampleSCI,
    color_blend   : ColorBlendSCI,
    dynamics      : DynamicSCI,
}

impl VulkanCI<vk::GraphicsPipelineCreateInfo> for GraphicsPipelineCI {

    fn default_ci() -> vk::GraphicsPipelineCreateInfo {

        vk::GraphicsPipelineCreateInfo {
            s_type: vk::StructureType::GRAPHICS_PIPELINE_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::PipelineCreateFlags::empty(),
            stage_count            : 0,
            p_stages               : ptr::null(),
            p_vertex_input_state   : ptr::null(),
            p_input_assembly_state : ptr::null(),
            p_tessellation_state   : ptr::null(),
            p_viewport_state       : ptr::null(),
            p_rasterization_state  : ptr::null(),
            p_multisample_state    : ptr::null(),
            p_depth_stencil_state  : ptr::null(),
            p_color_blend_state    : ptr::null(),
            p_dynamic_state        : ptr::null(),
            layout                 : vk::PipelineLayout::null(),
            render_pass            : vk::RenderPass::null(),
            subpass                : 0,
            base_pipeline_handle   : vk::Pipeline::null(),
            base_pipeline_index    : -1,
        }
    }
}

impl GraphicsPipelineCI {

    /// A pipeline without vertex input drawing filled triangle lists to one color attachment, with blending off.
    ///
    /// Viewport and scissor are dynamic states, set while recording.
    pub fn new(render_pass: vk::RenderPass, layout: vk::PipelineLayout) -> GraphicsPipelineCI {

        GraphicsPipelineCI {
            inner: vk::GraphicsPipelineCreateInfo {
                render_pass, layout,
                ..GraphicsPipelineCI::default_ci()
            },
            shaders: Vec::new(),
            vertex_input  : VertexInputSCI::new(),
            input_assembly: InputAssemblySCI::new(),
            viewport      : ViewportSCI::dynamic(1, 1),
            rasterization : RasterizationSCI::new(),
            multisample   : MultisampleSCI::new(),
            color_blend   : ColorBlendSCI::new().add_attachment(BlendAttachmentSCI::new()),
            dynamics      : DynamicSCI::new()
                .add_dynamic(vk::DynamicState::VIEWPORT)
                .add_dynamic(vk::DynamicState::SCISSOR),
        }
    }

    pub fn add_shader(mut self, shader: ShaderModuleCI) -> GraphicsPipelineCI {
        self.shaders.push(shader); self
    }

    pub fn set_rasterization(mut self, state: RasterizationSCI) -> GraphicsPipelineCI {
        self.rasterization = state; self
    }

    fn create_pipeline(&self, device: &VkDevice, stages: &[ShaderStageCI]) -> VkResult<vk::Pipeline> {

        let stages: Vec<vk::PipelineShaderStageCreateInfo> = stages.iter()
            .map(ShaderStageCI::value)
            .collect();

        let vertex_input   = self.vertex_input.value();
        let input_assembly = self.input_assembly.value();
        let viewport       = self.viewport.value();
        let rasterization  = self.rasterization.value();
        let multisample    = self.multisample.value();
        let color_blend    = self.color_blend.value();
        let dynamics       = self.dynamics.value();

        let pipeline_ci = vk::GraphicsPipelineCreateInfo {
            stage_count            : stages.len() as _,
            p_stages               : stages.as_ptr(),
            p_vertex_input_state   : &vertex_input,
            p_input_assembly_state : &input_assembly,
            p_viewport_state       : &viewport,
            p_rasterization_state  : &rasterization,
            p_multisample_state    : &multisample,
            p_color_blend_state    : &color_blend,
            p_dynamic_state        : if dynamics.dynamic_state_count == 0 { ptr::null() } else { &dynamics },
            ..self.inner
        };

        let pipelines = unsafe {
            device.logic.handle.create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_ci], None)
                .map_err(|_| VkError::create("Graphics Pipeline"))?
        };

        pipelines.into_iter().next()
            .ok_or_else(|| VkError::create("Graphics Pipeline"))
    }
}

impl VkObjectBuildableCI for GraphicsPipelineCI {
    type ObjectType = vk::Pipeline;

    fn build(&self, device: &VkDevice) -> VkResult<vk::Pipeline> {

        let mut modules: Vec<vk::ShaderModule> = Vec::with_capacity(self.shaders.len());
        let mut stages = Vec::with_capacity(self.shaders.len());
        let mut result = Ok(vk::Pipeline::null());

        for shader in self.shaders.iter() {
            match shader.build(device) {
                | Ok(module) => {
                    modules.push(module);
                    stages.push(ShaderStageCI::new(shader.stage(), module));
                },
                | Err(e) => {
                    result = Err(e);
                    break
                },
            }
        }

        if result.is_ok() {
            result = self.create_pipeline(device, &stages);
        }

        // the modules are not needed once the pipeline is created, or has failed to be.
        modules.into_iter().rev().for_each(|module| device.discard(module));

        if result.is_ok() {
            log::debug!("Graphics pipeline created with {} shader stage(s).", stages.len());
        }
        result
    }
}

impl VkObjectDiscardable for vk::Pipeline {

    fn discard(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_pipeline(self, None);
        }
    }
}
// ----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    #[test]
    fn triangle_pipeline_defaults() {
        let ci = GraphicsPipelineCI::new(vk::RenderPass::from_raw(1), vk::PipelineLayout::from_raw(2));

        assert_eq!(ci.inner.render_pass, vk::RenderPass::from_raw(1));
        assert_eq!(ci.inner.layout, vk::PipelineLayout::from_raw(2));
        assert_eq!(ci.inner.subpass, 0);
        assert_eq!(ci.input_assembly.value().topology, vk::PrimitiveTopology::TRIANGLE_LIST);
        assert_eq!(ci.viewport.value().viewport_count, 1);
        assert_eq!(ci.multisample.value().rasterization_samples, vk::SampleCountFlags::TYPE_1);
        assert_eq!(ci.color_blend.value().attachment_count, 1);
        assert_eq!(ci.dynamics.value().dynamic_state_count, 2);
        assert!(ci.shaders.is_empty());
    }

    #[test]
    fn empty_pipeline_layout() {
        let ci = PipelineLayoutCI::new();
        assert_eq!(ci.inner.set_layout_count, 0);
        assert_eq!(ci.inner.push_constant_range_count, 0);
    }
}
