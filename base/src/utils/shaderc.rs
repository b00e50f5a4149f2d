
use ash::vk;

use crate::error::{VkResult, VkError};

struct ShadercOptions {

    optimal_level   : shaderc::OptimizationLevel,
    debug_info      : bool,
    suppress_warning: bool,
    error_warning   : bool,
}

impl Default for ShadercOptions {

    fn default() -> ShadercOptions {

        ShadercOptions {
            optimal_level    : shaderc::OptimizationLevel::Performance,
            debug_info       : true,
            suppress_warning : false,
            error_warning    : false,
        }
    }
}

impl ShadercOptions {

    fn to_shaderc_options(&self) -> VkResult<shaderc::CompileOptions<'static>> {

        // Default to compile target is vulkan and GLSL.
        let mut shaderc_options = shaderc::CompileOptions::new()
            .ok_or_else(|| VkError::shaderc("There are conflict in Shader Compile Options."))?;
        shaderc_options.set_optimization_level(self.optimal_level);

        if self.debug_info {
            shaderc_options.set_generate_debug_info();
        }
        if self.suppress_warning {
            shaderc_options.set_suppress_warnings();
        }
        if self.error_warning {
            shaderc_options.set_warnings_as_errors();
        }

        Ok(shaderc_options)
    }
}

/// Runtime GLSL to SPIR-V compiler.
pub struct VkShaderCompiler {

    compiler: shaderc::Compiler,
    options: ShadercOptions,
}

impl VkShaderCompiler {

    pub fn new() -> VkResult<VkShaderCompiler> {

        let compiler = shaderc::Compiler::new()
            .ok_or_else(|| VkError::shaderc("Failed to initialize shader compiler."))?;

        let target = VkShaderCompiler {
            compiler,
            options: ShadercOptions::default(),
        };
        Ok(target)
    }

    pub fn compile_from_str(&mut self, source_text: &str, stage: vk::ShaderStageFlags, input_name: &str, entry_name: &str) -> VkResult<Vec<u32>> {

        let kind = shader_kind(stage)?;
        let compile_options = self.options.to_shaderc_options()?;

        let result = self.compiler.compile_into_spirv(source_text, kind, input_name, entry_name, Some(&compile_options))
            .map_err(|e| VkError::shaderc(format!("Failed to compile {}({})", input_name, e)))?;

        if result.get_num_warnings() > 0 {
            log::warn!("{}: {}", input_name, result.get_warning_messages());
        }

        Ok(result.as_binary().to_owned())
    }
}

fn shader_kind(stage: vk::ShaderStageFlags) -> VkResult<shaderc::ShaderKind> {

    let kind = match stage {
        | vk::ShaderStageFlags::VERTEX   => shaderc::ShaderKind::Vertex,
        | vk::ShaderStageFlags::FRAGMENT => shaderc::ShaderKind::Fragment,
        | vk::ShaderStageFlags::GEOMETRY => shaderc::ShaderKind::Geometry,
        | vk::ShaderStageFlags::COMPUTE  => shaderc::ShaderKind::Compute,
        | vk::ShaderStageFlags::TESSELLATION_CONTROL    => shaderc::ShaderKind::TessControl,
        | vk::ShaderStageFlags::TESSELLATION_EVALUATION => shaderc::ShaderKind::TessEvaluation,
        | _ => return Err(VkError::shaderc(format!("Unsupported shader stage: {:?}", stage))),
    };
    Ok(kind)
}
