
use ash::vk;

use crate::context::VkDevice;
use crate::context::VkObjectDiscardable;
use crate::ci::{VulkanCI, VkObjectBuildableCI};
use crate::error::{VkResult, VkError};

use std::path::{Path, PathBuf};
use std::ffi::CStr;
use std::io::Cursor;
use std::ptr;

const SPIRV_MAGIC_NUMBER: u32 = 0x0723_0203;
const ENTRY_NAME: &str = "main";

// ---------------------------------------------------------------------------------------------------
/// Wrapper class for vk::ShaderModuleCreateInfo.
///
/// The code is loaded from `path` at build time. Files ending with `.spv` are read as SPIR-V, any other file is GLSL source.
#[derive(Debug, Clone)]
pub struct ShaderModuleCI {

    ci: vk::ShaderModuleCreateInfo,

    path : PathBuf,

    shader_type: ShaderType,
    shader_stage: vk::ShaderStageFlags,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum ShaderType {
    GLSLSource,
    SprivSource,
}

impl VulkanCI<vk::ShaderModuleCreateInfo> for ShaderModuleCI {

    fn default_ci() -> vk::ShaderModuleCreateInfo {

        vk::ShaderModuleCreateInfo {
            s_type    : vk::StructureType::SHADER_MODULE_CREATE_INFO,
            p_next    : ptr::null(),
            flags     : vk::ShaderModuleCreateFlags::empty(),
            code_size : 0,
            p_code    : ptr::null(),
        }
    }
}

impl ShaderModuleCI {

    pub fn from_path(stage: vk::ShaderStageFlags, path: impl AsRef<Path>) -> ShaderModuleCI {

        let path = PathBuf::from(path.as_ref());
        let shader_type = if path.extension().map_or(false, |extension| extension == "spv") {
            ShaderType::SprivSource
        } else {
            ShaderType::GLSLSource
        };

        ShaderModuleCI {
            ci: ShaderModuleCI::default_ci(),
            path, shader_type,
            shader_stage: stage,
        }
    }

    #[inline]
    pub fn stage(&self) -> vk::ShaderStageFlags {
        self.shader_stage
    }

    fn load_codes(&self) -> VkResult<Vec<u32>> {

        match self.shader_type {
            | ShaderType::SprivSource => {
                let bytes = std::fs::read(&self.path)
                    .map_err(|_| VkError::path(&self.path))?;
                parse_spirv(&bytes)
            },
            | ShaderType::GLSLSource => self.compile_glsl(),
        }
    }

    #[cfg(feature = "shaderc")]
    fn compile_glsl(&self) -> VkResult<Vec<u32>> {

        use crate::utils::shaderc::VkShaderCompiler;

        let source = std::fs::read_to_string(&self.path)
            .map_err(|_| VkError::path(&self.path))?;
        let input_name = self.path.to_string_lossy();

        let mut compiler = VkShaderCompiler::new()?;
        compiler.compile_from_str(&source, self.shader_stage, &input_name, ENTRY_NAME)
    }

    #[cfg(not(feature = "shaderc"))]
    fn compile_glsl(&self) -> VkResult<Vec<u32>> {
        Err(VkError::unsupported(format!("runtime GLSL compiling of {:?} in this build (enable the `shaderc` feature or load SPIR-V)", self.path)))
    }
}

impl VkObjectBuildableCI for ShaderModuleCI {
    type ObjectType = vk::ShaderModule;

    fn build(&self, device: &VkDevice) -> VkResult<vk::ShaderModule> {

        let codes = self.load_codes()?;

        let shader_module_ci = vk::ShaderModuleCreateInfo {
            // code_size is in bytes.
            code_size : codes.len() * 4,
            p_code    : codes.as_ptr(),
            ..self.ci
        };

        let module = unsafe {
            device.logic.handle.create_shader_module(&shader_module_ci, None)
                .map_err(|_| VkError::create("Shader Module"))?
        };
        log::debug!("Shader module created from {:?}.", self.path);
        Ok(module)
    }
}

impl VkObjectDiscardable for vk::ShaderModule {

    fn discard(self, device: &VkDevice) {
        unsafe {
            device.logic.handle.destroy_shader_module(self, None);
        }
    }
}

/// Check and convert the content of a SPIR-V binary.
fn parse_spirv(bytes: &[u8]) -> VkResult<Vec<u32>> {

    if bytes.is_empty() || bytes.len() % 4 != 0 {
        return Err(VkError::other(format!("Invalid SPIR-V: size {} is not a multiple of 4.", bytes.len())))
    }

    // read_spv also fixes the endianness of the words.
    let codes = ash::util::read_spv(&mut Cursor::new(bytes))
        .map_err(|e| VkError::other(format!("Invalid SPIR-V: {}.", e)))?;

    if codes.first() != Some(&SPIRV_MAGIC_NUMBER) {
        return Err(VkError::other("Invalid SPIR-V: bad magic number."))
    }

    Ok(codes)
}
// ---------------------------------------------------------------------------------------------------

// ---------------------------------------------------------------------------------------------------
/// Wrapper class for vk::PipelineShaderStageCreateInfo, always using `main` as entry point.
#[derive(Debug, Clone)]
pub struct ShaderStageCI {
    ci: vk::PipelineShaderStageCreateInfo,
}

impl VulkanCI<vk::PipelineShaderStageCreateInfo> for ShaderStageCI {

    fn default_ci() -> vk::PipelineShaderStageCreateInfo {

        vk::PipelineShaderStageCreateInfo {
            s_type : vk::StructureType::PIPELINE_SHADER_STAGE_CREATE_INFO,
            p_next : ptr::null(),
            flags  : vk::PipelineShaderStageCreateFlags::empty(),
            p_name : entry_main().as_ptr(),
            stage  : vk::ShaderStageFlags::empty(),
            module : vk::ShaderModule::null(),
            p_specialization_info: ptr::null(),
        }
    }
}

impl ShaderStageCI {

    pub fn new(stage: vk::ShaderStageFlags, module: vk::ShaderModule) -> ShaderStageCI {

        ShaderStageCI {
            ci: vk::PipelineShaderStageCreateInfo {
                stage, module,
                ..ShaderStageCI::default_ci()
            },
        }
    }

    pub(crate) fn value(&self) -> vk::PipelineShaderStageCreateInfo {
        self.ci
    }
}

fn entry_main() -> &'static CStr {
    unsafe { CStr::from_bytes_with_nul_unchecked(b"main\0") }
}
// ---------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn words_to_bytes(words: &[u32]) -> Vec<u8> {
        words.iter().flat_map(|word| word.to_le_bytes().to_vec()).collect()
    }

    #[test]
    fn shader_type_follows_extension() {
        let spirv = ShaderModuleCI::from_path(vk::ShaderStageFlags::VERTEX, "shaders/triangle.vert.spv");
        assert_eq!(spirv.shader_type, ShaderType::SprivSource);

        let glsl = ShaderModuleCI::from_path(vk::ShaderStageFlags::FRAGMENT, "shaders/triangle.frag");
        assert_eq!(glsl.shader_type, ShaderType::GLSLSource);
        assert_eq!(glsl.stage(), vk::ShaderStageFlags::FRAGMENT);
    }

    #[test]
    fn missing_spirv_file_is_a_path_error() {
        let ci = ShaderModuleCI::from_path(vk::ShaderStageFlags::VERTEX, "no/such/shader.spv");

        match ci.load_codes() {
            | Err(e) => assert!(matches!(e.kind(), crate::VkErrorKind::Path { .. })),
            | Ok(_) => panic!("loading a missing file must fail"),
        }
    }

    #[test]
    fn spirv_size_must_be_word_aligned() {
        let mut bytes = words_to_bytes(&[SPIRV_MAGIC_NUMBER, 0x0001_0000]);
        bytes.push(0);
        assert!(parse_spirv(&bytes).is_err());
        assert!(parse_spirv(&[]).is_err());
    }

    #[test]
    fn spirv_magic_number_is_checked() {
        let bytes = words_to_bytes(&[0xDEAD_BEEF, 0x0001_0000]);
        assert!(parse_spirv(&bytes).is_err());

        let bytes = words_to_bytes(&[SPIRV_MAGIC_NUMBER, 0x0001_0000]);
        assert_eq!(parse_spirv(&bytes).unwrap(), vec![SPIRV_MAGIC_NUMBER, 0x0001_0000]);
    }

    #[test]
    fn shader_stage_uses_main() {
        let stage = ShaderStageCI::new(vk::ShaderStageFlags::VERTEX, vk::ShaderModule::null()).value();
        let name = unsafe { CStr::from_ptr(stage.p_name) };
        assert_eq!(name.to_str().unwrap(), "main");
    }

    #[cfg(feature = "shaderc")]
    #[test]
    fn default_shaders_compile() {
        let shaders = crate::ShaderConfig::default();

        let vertex = ShaderModuleCI::from_path(vk::ShaderStageFlags::VERTEX, &shaders.vertex).load_codes().unwrap();
        assert_eq!(vertex.first(), Some(&SPIRV_MAGIC_NUMBER));

        let fragment = ShaderModuleCI::from_path(vk::ShaderStageFlags::FRAGMENT, &shaders.fragment).load_codes().unwrap();
        assert_eq!(fragment.first(), Some(&SPIRV_MAGIC_NUMBER));
    }

    #[cfg(not(feature = "shaderc"))]
    #[test]
    fn glsl_needs_the_compiler_feature() {
        let ci = ShaderModuleCI::from_path(vk::ShaderStageFlags::VERTEX, "shaders/triangle.vert");

        match ci.load_codes() {
            | Err(e) => assert!(matches!(e.kind(), crate::VkErrorKind::UnSupport { .. })),
            | Ok(_) => panic!("GLSL must not load without the compiler"),
        }
    }
}
