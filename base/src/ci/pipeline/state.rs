
use ash::vk;

use crate::ci::VulkanCI;

use std::ptr;

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::PipelineVertexInputStateCreateInfo.
///
/// Empty by default, for pipelines generating their vertices in the vertex shader.
#[derive(Debug, Clone)]
pub struct VertexInputSCI {
    inner: vk::PipelineVertexInputStateCreateInfo,
}

impl VulkanCI<vk::PipelineVertexInputStateCreateInfo> for VertexInputSCI {

    fn default_ci() -> vk::PipelineVertexInputStateCreateInfo {

        vk::PipelineVertexInputStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_VERTEX_INPUT_STATE_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::PipelineVertexInputStateCreateFlags::empty(),
            vertex_binding_description_count   : 0,
            p_vertex_binding_descriptions      : ptr::null(),
            vertex_attribute_description_count : 0,
            p_vertex_attribute_descriptions    : ptr::null(),
        }
    }
}

impl VertexInputSCI {

    pub fn new() -> VertexInputSCI {
        VertexInputSCI { inner: VertexInputSCI::default_ci() }
    }

    pub(crate) fn value(&self) -> vk::PipelineVertexInputStateCreateInfo {
        self.inner
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::PipelineInputAssemblyStateCreateInfo.
#[derive(Debug, Clone)]
pub struct InputAssemblySCI {
    inner: vk::PipelineInputAssemblyStateCreateInfo,
}

impl VulkanCI<vk::PipelineInputAssemblyStateCreateInfo> for InputAssemblySCI {

    fn default_ci() -> vk::PipelineInputAssemblyStateCreateInfo {

        vk::PipelineInputAssemblyStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_INPUT_ASSEMBLY_STATE_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::PipelineInputAssemblyStateCreateFlags::empty(),
            topology: vk::PrimitiveTopology::TRIANGLE_LIST,
            primitive_restart_enable: vk::FALSE,
        }
    }
}

impl InputAssemblySCI {

    pub fn new() -> InputAssemblySCI {
        InputAssemblySCI { inner: InputAssemblySCI::default_ci() }
    }

    pub(crate) fn value(&self) -> vk::PipelineInputAssemblyStateCreateInfo {
        self.inner
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::PipelineViewportStateCreateInfo.
///
/// Viewports and scissors are set dynamically, so only their count is given here.
#[derive(Debug, Clone)]
pub struct ViewportSCI {
    inner: vk::PipelineViewportStateCreateInfo,
}

impl VulkanCI<vk::PipelineViewportStateCreateInfo> for ViewportSCI {

    fn default_ci() -> vk::PipelineViewportStateCreateInfo {

        vk::PipelineViewportStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_VIEWPORT_STATE_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::PipelineViewportStateCreateFlags::empty(),
            viewport_count : 0,
            p_viewports    : ptr::null(),
            scissor_count  : 0,
            p_scissors     : ptr::null(),
        }
    }
}

impl ViewportSCI {

    /// Declare `viewport_count` viewports and `scissor_count` scissors which are set at record time.
    pub fn dynamic(viewport_count: u32, scissor_count: u32) -> ViewportSCI {

        ViewportSCI {
            inner: vk::PipelineViewportStateCreateInfo {
                viewport_count, scissor_count,
                ..ViewportSCI::default_ci()
            },
        }
    }

    pub(crate) fn value(&self) -> vk::PipelineViewportStateCreateInfo {
        self.inner
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::PipelineRasterizationStateCreateInfo.
#[derive(Debug, Clone)]
pub struct RasterizationSCI {
    inner: vk::PipelineRasterizationStateCreateInfo,
}

impl VulkanCI<vk::PipelineRasterizationStateCreateInfo> for RasterizationSCI {

    fn default_ci() -> vk::PipelineRasterizationStateCreateInfo {

        vk::PipelineRasterizationStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_RASTERIZATION_STATE_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::PipelineRasterizationStateCreateFlags::empty(),
            depth_clamp_enable         : vk::FALSE,
            rasterizer_discard_enable  : vk::FALSE,
            polygon_mode               : vk::PolygonMode::FILL,
            cull_mode                  : vk::CullModeFlags::BACK,
            front_face                 : vk::FrontFace::CLOCKWISE,
            depth_bias_enable          : vk::FALSE,
            depth_bias_constant_factor : 0.0,
            depth_bias_clamp           : 0.0,
            depth_bias_slope_factor    : 0.0,
            line_width                 : 1.0,
        }
    }
}

impl RasterizationSCI {

    pub fn new() -> RasterizationSCI {
        RasterizationSCI { inner: RasterizationSCI::default_ci() }
    }

    pub fn cull_face(mut self, mode: vk::CullModeFlags, front_face: vk::FrontFace) -> RasterizationSCI {
        self.inner.cull_mode  = mode;
        self.inner.front_face = front_face; self
    }

    pub(crate) fn value(&self) -> vk::PipelineRasterizationStateCreateInfo {
        self.inner
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::PipelineMultisampleStateCreateInfo. One sample per pixel by default.
#[derive(Debug, Clone)]
pub struct MultisampleSCI {
    inner: vk::PipelineMultisampleStateCreateInfo,
}

impl VulkanCI<vk::PipelineMultisampleStateCreateInfo> for MultisampleSCI {

    fn default_ci() -> vk::PipelineMultisampleStateCreateInfo {

        vk::PipelineMultisampleStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_MULTISAMPLE_STATE_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::PipelineMultisampleStateCreateFlags::empty(),
            rasterization_samples    : vk::SampleCountFlags::TYPE_1,
            sample_shading_enable    : vk::FALSE,
            min_sample_shading       : 1.0,
            p_sample_mask            : ptr::null(),
            alpha_to_coverage_enable : vk::FALSE,
            alpha_to_one_enable      : vk::FALSE,
        }
    }
}

impl MultisampleSCI {

    pub fn new() -> MultisampleSCI {
        MultisampleSCI { inner: MultisampleSCI::default_ci() }
    }

    pub(crate) fn value(&self) -> vk::PipelineMultisampleStateCreateInfo {
        self.inner
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::PipelineColorBlendAttachmentState. Blending is off, all channels written.
#[derive(Debug, Clone)]
pub struct BlendAttachmentSCI {
    inner: vk::PipelineColorBlendAttachmentState,
}

impl VulkanCI<vk::PipelineColorBlendAttachmentState> for BlendAttachmentSCI {

    fn default_ci() -> vk::PipelineColorBlendAttachmentState {

        vk::PipelineColorBlendAttachmentState {
            blend_enable           : vk::FALSE,
            src_color_blend_factor : vk::BlendFactor::ONE,
            dst_color_blend_factor : vk::BlendFactor::ZERO,
            color_blend_op         : vk::BlendOp::ADD,
            src_alpha_blend_factor : vk::BlendFactor::ONE,
            dst_alpha_blend_factor : vk::BlendFactor::ZERO,
            alpha_blend_op         : vk::BlendOp::ADD,
            color_write_mask       : vk::ColorComponentFlags::RGBA,
        }
    }
}

impl BlendAttachmentSCI {

    pub fn new() -> BlendAttachmentSCI {
        BlendAttachmentSCI { inner: BlendAttachmentSCI::default_ci() }
    }
}

/// Wrapper class for vk::PipelineColorBlendStateCreateInfo.
#[derive(Debug, Clone)]
pub struct ColorBlendSCI {

    inner: vk::PipelineColorBlendStateCreateInfo,
    attachments: Vec<vk::PipelineColorBlendAttachmentState>,
}

impl VulkanCI<vk::PipelineColorBlendStateCreateInfo> for ColorBlendSCI {

    fn default_ci() -> vk::PipelineColorBlendStateCreateInfo {

        vk::PipelineColorBlendStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_COLOR_BLEND_STATE_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::PipelineColorBlendStateCreateFlags::empty(),
            logic_op_enable  : vk::FALSE,
            logic_op         : vk::LogicOp::COPY,
            attachment_count : 0,
            p_attachments    : ptr::null(),
            blend_constants  : [0.0; 4],
        }
    }
}

impl ColorBlendSCI {

    pub fn new() -> ColorBlendSCI {

        ColorBlendSCI {
            inner: ColorBlendSCI::default_ci(),
            attachments: Vec::new(),
        }
    }

    pub fn add_attachment(mut self, attachment: BlendAttachmentSCI) -> ColorBlendSCI {
        self.attachments.push(attachment.inner); self
    }

    pub(crate) fn value(&self) -> vk::PipelineColorBlendStateCreateInfo {

        vk::PipelineColorBlendStateCreateInfo {
            attachment_count : self.attachments.len() as _,
            p_attachments    : self.attachments.as_ptr(),
            ..self.inner
        }
    }
}
// ----------------------------------------------------------------------------------------------

// ----------------------------------------------------------------------------------------------
/// Wrapper class for vk::PipelineDynamicStateCreateInfo.
#[derive(Debug, Clone)]
pub struct DynamicSCI {

    inner: vk::PipelineDynamicStateCreateInfo,
    states: Vec<vk::DynamicState>,
}

impl VulkanCI<vk::PipelineDynamicStateCreateInfo> for DynamicSCI {

    fn default_ci() -> vk::PipelineDynamicStateCreateInfo {

        vk::PipelineDynamicStateCreateInfo {
            s_type: vk::StructureType::PIPELINE_DYNAMIC_STATE_CREATE_INFO,
            p_next: ptr::null(),
            flags : vk::PipelineDynamicStateCreateFlags::empty(),
            dynamic_state_count : 0,
            p_dynamic_states    : ptr::null(),
        }
    }
}

impl DynamicSCI {

    pub fn new() -> DynamicSCI {

        DynamicSCI {
            inner: DynamicSCI::default_ci(),
            states: Vec::new(),
        }
    }

    pub fn add_dynamic(mut self, state: vk::DynamicState) -> DynamicSCI {

        if !self.states.contains(&state) {
            self.states.push(state);
        } self
    }

    pub(crate) fn value(&self) -> vk::PipelineDynamicStateCreateInfo {

        vk::PipelineDynamicStateCreateInfo {
            dynamic_state_count : self.states.len() as _,
            p_dynamic_states    : self.states.as_ptr(),
            ..self.inner
        }
    }
}
// ----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_viewport_only_counts() {
        let viewport = ViewportSCI::dynamic(1, 1).value();

        assert_eq!(viewport.viewport_count, 1);
        assert_eq!(viewport.scissor_count, 1);
        assert!(viewport.p_viewports.is_null());
        assert!(viewport.p_scissors.is_null());
    }

    #[test]
    fn rasterization_defaults() {
        let state = RasterizationSCI::new().value();

        assert_eq!(state.polygon_mode, vk::PolygonMode::FILL);
        assert_eq!(state.cull_mode, vk::CullModeFlags::BACK);
        assert_eq!(state.front_face, vk::FrontFace::CLOCKWISE);
        assert_eq!(state.line_width, 1.0);
    }

    #[test]
    fn dynamic_states_are_not_duplicated() {
        let dynamic = DynamicSCI::new()
            .add_dynamic(vk::DynamicState::VIEWPORT)
            .add_dynamic(vk::DynamicState::SCISSOR)
            .add_dynamic(vk::DynamicState::VIEWPORT);

        assert_eq!(dynamic.states, vec![vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR]);
        assert_eq!(dynamic.value().dynamic_state_count, 2);
    }

    #[test]
    fn blending_off_writes_rgba() {
        let blend = ColorBlendSCI::new().add_attachment(BlendAttachmentSCI::new());
        let value = blend.value();

        assert_eq!(value.attachment_count, 1);
        let attachment = unsafe { *value.p_attachments };
        assert_eq!(attachment.blend_enable, vk::FALSE);
        assert_eq!(attachment.color_write_mask, vk::ColorComponentFlags::RGBA);
    }

    #[test]
    fn empty_vertex_input() {
        let input = VertexInputSCI::new().value();
        assert_eq!(input.vertex_binding_description_count, 0);
        assert_eq!(input.vertex_attribute_description_count, 0);
    }
}
