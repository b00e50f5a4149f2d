//! Configuration of the whole bring-up, optionally read from a TOML file.
//!
//! Every subsystem keeps its own config struct with a `Default` impl. The file only lists what differs
//! from those defaults, so each section here is a set of optional overrides.

use ash::vk;
use serde_derive::Deserialize;

use crate::context::{InstanceConfig, ValidationConfig, PhysicalDevConfig, SwapchainConfig};
use crate::workflow::{WindowConfig, WindowMode};
use crate::error::{VkResult, VkError};

use std::ffi::CString;
use std::path::{Path, PathBuf};

/// Locations of the shaders used by the triangle pipeline.
#[derive(Debug, Clone)]
pub struct ShaderConfig {
    pub vertex  : PathBuf,
    pub fragment: PathBuf,
}

impl Default for ShaderConfig {

    fn default() -> ShaderConfig {

        // GLSL sources need the `shaderc` feature. Point these at `.spv` files to load SPIR-V instead.
        let shader_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("shaders");
        ShaderConfig {
            vertex  : shader_dir.join("triangle.vert"),
            fragment: shader_dir.join("triangle.frag"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RendererConfig {
    pub window    : WindowConfig,
    pub instance  : InstanceConfig,
    pub validation: ValidationConfig,
    pub device    : PhysicalDevConfig,
    pub swapchain : SwapchainConfig,
    pub shaders   : ShaderConfig,
}

impl RendererConfig {

    /// Read the configuration file at `path` on top of the default configuration.
    pub fn load(path: impl AsRef<Path>) -> VkResult<RendererConfig> {

        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|_| VkError::path(path.as_ref()))?;
        RendererConfig::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> VkResult<RendererConfig> {

        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| VkError::config(e.to_string()))?;

        let mut config = RendererConfig::default();
        file.window.apply(&mut config.window)?;
        file.instance.apply(&mut config.instance)?;
        file.validation.apply(&mut config.validation)?;
        file.device.apply(&mut config.device)?;
        file.swapchain.apply(&mut config.swapchain);
        file.shaders.apply(&mut config.shaders);

        Ok(config)
    }
}


// ------------------------------------------------------------------------------------------------
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    window    : WindowSection,
    instance  : InstanceSection,
    validation: ValidationSection,
    device    : DeviceSection,
    swapchain : SwapchainSection,
    shaders   : ShaderSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct WindowSection {
    title    : Option<String>,
    width    : Option<u32>,
    height   : Option<u32>,
    min_size : Option<[u32; 2]>,
    max_size : Option<[u32; 2]>,
    resizable: Option<bool>,
    mode     : Option<String>,
}

impl WindowSection {

    fn apply(self, config: &mut WindowConfig) -> VkResult<()> {

        if let Some(title) = self.title {
            config.title = title;
        }
        if let Some(width) = self.width {
            config.dimension.width = width;
        }
        if let Some(height) = self.height {
            config.dimension.height = height;
        }
        if config.dimension.width == 0 || config.dimension.height == 0 {
            return Err(VkError::config("window dimension must not be zero"))
        }

        if let Some([width, height]) = self.min_size {
            config.min_dimension = Some(vk::Extent2D { width, height });
        }
        if let Some([width, height]) = self.max_size {
            config.max_dimension = Some(vk::Extent2D { width, height });
        }
        if let Some(resizable) = self.resizable {
            config.is_resizable = resizable;
        }
        if let Some(mode) = self.mode {
            config.mode = match mode.as_str() {
                | "normal"     => WindowMode::Normal,
                | "maximized"  => WindowMode::Maximized,
                | "fullscreen" => WindowMode::Fullscreen,
                | _ => return Err(VkError::config(format!("unknown window mode `{}`", mode))),
            };
        }

        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct InstanceSection {
    application_name: Option<String>,
    engine_name     : Option<String>,
    /// `[major, minor]` of the requested Vulkan API.
    api_version     : Option<[u32; 2]>,
    print_available_layers    : Option<bool>,
    print_available_extensions: Option<bool>,
}

impl InstanceSection {

    fn apply(self, config: &mut InstanceConfig) -> VkResult<()> {

        if let Some(name) = self.application_name {
            config.application_name = name;
        }
        if let Some(name) = self.engine_name {
            config.engine_name = name;
        }
        if let Some([major, minor]) = self.api_version {
            if major != 1 {
                return Err(VkError::config(format!("unsupported Vulkan API version {}.{}", major, minor)))
            }
            config.api_version = vk::make_api_version(0, major, minor, 0);
        }
        if let Some(print) = self.print_available_layers {
            config.print_available_layers = print;
        }
        if let Some(print) = self.print_available_extensions {
            config.print_available_extensions = print;
        }

        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ValidationSection {
    enable  : Option<bool>,
    layers  : Option<Vec<String>>,
    severity: Option<Vec<String>>,
}

impl ValidationSection {

    fn apply(self, config: &mut ValidationConfig) -> VkResult<()> {

        if let Some(enable) = self.enable {
            config.is_enable = enable;
        }
        if let Some(layers) = self.layers {
            config.layers = layers;
        }
        if let Some(severities) = self.severity {

            let mut flags = vk::DebugUtilsMessageSeverityFlagsEXT::empty();
            for severity in severities.iter() {
                flags |= match severity.as_str() {
                    | "verbose" => vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
                    | "info"    => vk::DebugUtilsMessageSeverityFlagsEXT::INFO,
                    | "warning" => vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
                    | "error"   => vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
                    | _ => return Err(VkError::config(format!("unknown message severity `{}`", severity))),
                };
            }
            config.utils_config.severity = flags;
        }

        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DeviceSection {
    preferred_type  : Option<String>,
    extensions      : Option<Vec<String>>,
    print_properties: Option<bool>,
    print_available_extensions: Option<bool>,
}

impl DeviceSection {

    fn apply(self, config: &mut PhysicalDevConfig) -> VkResult<()> {

        if let Some(device_type) = self.preferred_type {
            config.device_type_preference = match device_type.as_str() {
                | "discrete"   => vk::PhysicalDeviceType::DISCRETE_GPU,
                | "integrated" => vk::PhysicalDeviceType::INTEGRATED_GPU,
                | "virtual"    => vk::PhysicalDeviceType::VIRTUAL_GPU,
                | "cpu"        => vk::PhysicalDeviceType::CPU,
                | _ => return Err(VkError::config(format!("unknown device type `{}`", device_type))),
            };
        }
        if let Some(extensions) = self.extensions {

            let mut names = Vec::with_capacity(extensions.len());
            for extension in extensions.into_iter() {
                let name = CString::new(extension)
                    .map_err(|_| VkError::config("device extension name contains a nul byte"))?;
                names.push(name);
            }
            config.request_extensions = names;
        }
        if let Some(print) = self.print_properties {
            config.print_device_properties = print;
        }
        if let Some(print) = self.print_available_extensions {
            config.print_available_extensions = print;
        }

        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SwapchainSection {
    vsync: Option<bool>,
}

impl SwapchainSection {

    fn apply(self, config: &mut SwapchainConfig) {

        if let Some(vsync) = self.vsync {
            config.present_vsync = vsync;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ShaderSection {
    vertex  : Option<PathBuf>,
    fragment: Option<PathBuf>,
}

impl ShaderSection {

    fn apply(self, config: &mut ShaderConfig) {

        if let Some(vertex) = self.vertex {
            config.vertex = vertex;
        }
        if let Some(fragment) = self.fragment {
            config.fragment = fragment;
        }
    }
}
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VkErrorKind;

    #[test]
    fn empty_file_gives_defaults() {
        let config = RendererConfig::from_toml_str("").unwrap();

        assert_eq!(config.window.title, "Vulkan");
        assert_eq!(config.window.dimension, vk::Extent2D { width: 800, height: 600 });
        assert!(!config.window.is_resizable);
        assert_eq!(config.device.device_type_preference, vk::PhysicalDeviceType::DISCRETE_GPU);
        assert_eq!(config.device.request_extensions, vec![CString::new("VK_KHR_swapchain").unwrap()]);
        assert!(!config.swapchain.present_vsync);
        assert_eq!(config.validation.is_enable, cfg!(debug_assertions));
    }

    #[test]
    fn sections_override_defaults() {
        let config = RendererConfig::from_toml_str(r#"
            [window]
            title = "Triangle"
            width = 1280
            height = 720
            mode = "maximized"

            [instance]
            application_name = "Snapshot"
            api_version = [1, 2]

            [validation]
            enable = true
            severity = ["warning", "error", "info"]

            [device]
            preferred_type = "integrated"

            [swapchain]
            vsync = true

            [shaders]
            vertex = "custom/tri.vert.spv"
        "#).unwrap();

        assert_eq!(config.window.title, "Triangle");
        assert_eq!(config.window.dimension, vk::Extent2D { width: 1280, height: 720 });
        assert!(matches!(config.window.mode, WindowMode::Maximized));
        assert_eq!(config.instance.application_name, "Snapshot");
        assert_eq!(config.instance.api_version, vk::make_api_version(0, 1, 2, 0));
        assert!(config.validation.is_enable);
        assert_eq!(config.validation.utils_config.severity,
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR | vk::DebugUtilsMessageSeverityFlagsEXT::INFO);
        assert_eq!(config.device.device_type_preference, vk::PhysicalDeviceType::INTEGRATED_GPU);
        assert!(config.swapchain.present_vsync);
        assert_eq!(config.shaders.vertex, PathBuf::from("custom/tri.vert.spv"));
        // untouched keys keep their default.
        assert_eq!(config.shaders.fragment, ShaderConfig::default().fragment);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = RendererConfig::from_toml_str("[window]\nfps = 60\n").unwrap_err();
        assert!(matches!(error.kind(), VkErrorKind::Config { .. }));
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        assert!(RendererConfig::from_toml_str("[device]\npreferred_type = \"quantum\"\n").is_err());
        assert!(RendererConfig::from_toml_str("[validation]\nseverity = [\"loud\"]\n").is_err());
        assert!(RendererConfig::from_toml_str("[window]\nmode = \"tiny\"\n").is_err());
    }

    #[test]
    fn zero_sized_window_is_rejected() {
        assert!(RendererConfig::from_toml_str("[window]\nwidth = 0\n").is_err());
    }

    #[test]
    fn missing_file_reports_the_path() {
        let error = RendererConfig::load("does/not/exist.toml").unwrap_err();
        assert!(matches!(error.kind(), VkErrorKind::Path { .. }));
    }
}
