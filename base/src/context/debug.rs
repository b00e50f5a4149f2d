
use ash::vk;

use crate::context::instance::VkInstance;
use crate::context::objects::VkBackendObject;
use crate::{vkptr, vkbool};
use crate::error::{VkResult, VkError};

use std::borrow::Cow;
use std::ffi::CStr;
use std::ptr;

/// Target of the log records emitted by the validation layers.
pub const VALIDATION_LOG_TARGET: &str = "vulkan";

#[derive(Debug, Clone)]
pub struct ValidationConfig {

    /// `is_enable` tell if validation layer should be enabled.
    pub is_enable: bool,
    /// `layers` specifies the instance layers to load when validation is enabled.
    pub layers: Vec<String>,
    /// `utils_config` specifies the configuration parameters used in Debug Utils.
    pub utils_config: DebugUtilsConfig,
}

impl Default for ValidationConfig {

    fn default() -> ValidationConfig {
        ValidationConfig {
            // validation is only turned on for debug builds.
            is_enable: cfg!(debug_assertions),
            layers: vec![
                String::from("VK_LAYER_KHRONOS_validation"),
            ],
            utils_config: DebugUtilsConfig::default(),
        }
    }
}

/// Wrapper class for the validation tools used in Vulkan.
pub struct VkDebugger {

    target: Option<VkDebugUtils>,
}

impl VkDebugger {

    pub fn new(instance: &VkInstance, config: &ValidationConfig) -> VkResult<VkDebugger> {

        let target = if config.is_enable {
            Some(VkDebugUtils::new(instance, &config.utils_config)?)
        } else {
            None
        };

        let result = VkDebugger { target };
        Ok(result)
    }
}

impl VkBackendObject for VkDebugger {

    unsafe fn discard(&self) {

        if let Some(ref debugger) = self.target {
            debugger.loader.destroy_debug_utils_messenger(debugger.utils_messenger, None);
            log::debug!("Debug utils messenger destroyed.");
        }
    }
}


// Debug Utils ------------------------------------------------------------------------------------

/// the callback function used in Debug Utils.
unsafe extern "system" fn vulkan_debug_utils_callback(
    message_severity : vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type     : vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data  : *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data     : vkptr
) -> vkbool {

    let message = if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        Cow::from("<empty message>")
    } else {
        CStr::from_ptr((*p_callback_data).p_message).to_string_lossy()
    };

    log::log!(target: VALIDATION_LOG_TARGET, severity_level(message_severity), "[{}] {}", message_type_name(message_type), message);

    vk::FALSE
}

/// Map the severity reported by validation layers to a log level.
fn severity_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {

    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::Level::Info
    } else {
        log::Level::Trace
    }
}

fn message_type_name(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {

    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "Validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "Performance"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL) {
        "General"
    } else {
        "Unknown"
    }
}

/// The configuration parameters used in the initialization of `vk::DebugUtils`.
#[derive(Debug, Clone)]
pub struct DebugUtilsConfig {

    pub flags    : vk::DebugUtilsMessengerCreateFlagsEXT,
    pub severity : vk::DebugUtilsMessageSeverityFlagsEXT,
    pub types    : vk::DebugUtilsMessageTypeFlagsEXT,
}

impl Default for DebugUtilsConfig {

    fn default() -> DebugUtilsConfig {
        DebugUtilsConfig {
            flags: vk::DebugUtilsMessengerCreateFlagsEXT::empty(),
            severity:
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING |
                // vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE |
                // vk::DebugUtilsMessageSeverityFlagsEXT::INFO |
                vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            types:
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL |
                vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE |
                vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
        }
    }
}

/// Create info of the messenger.
///
/// It is also chained into `vk::InstanceCreateInfo`, so that instance creation and destruction are covered as well.
pub(crate) fn messenger_ci(config: &DebugUtilsConfig) -> vk::DebugUtilsMessengerCreateInfoEXT {

    vk::DebugUtilsMessengerCreateInfoEXT {
        s_type: vk::StructureType::DEBUG_UTILS_MESSENGER_CREATE_INFO_EXT,
        p_next: ptr::null(),
        flags            : config.flags,
        message_severity : config.severity,
        message_type     : config.types,
        pfn_user_callback: Some(vulkan_debug_utils_callback),
        p_user_data      : ptr::null_mut(),
    }
}

/// Wrapper class for `vk::DebugUtils` object.
struct VkDebugUtils {
    /// the handle of `vk::DebugUtils` object.
    loader: ash::extensions::ext::DebugUtils,
    /// the handle of callback function used in Validation Layer.
    utils_messenger: vk::DebugUtilsMessengerEXT,
}

impl VkDebugUtils {

    /// Initialize debug utils extension loader and `vk::DebugUtilsMessengerExt` object.
    fn new(instance: &VkInstance, config: &DebugUtilsConfig) -> VkResult<VkDebugUtils> {

        let loader = ash::extensions::ext::DebugUtils::new(&instance.entry, &instance.handle);
        let messenger_ci = messenger_ci(config);

        let utils_messenger = unsafe {
            loader.create_debug_utils_messenger(&messenger_ci, None)
                .map_err(|_| VkError::create("Debug Utils Callback"))?
        };
        log::debug!("Debug utils messenger created.");

        let utils = VkDebugUtils { loader, utils_messenger };
        Ok(utils)
    }
}
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_maps_to_log_level() {
        assert_eq!(severity_level(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE), log::Level::Trace);
        assert_eq!(severity_level(vk::DebugUtilsMessageSeverityFlagsEXT::INFO), log::Level::Info);
        assert_eq!(severity_level(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING), log::Level::Warn);
        assert_eq!(severity_level(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR), log::Level::Error);
    }

    #[test]
    fn combined_severity_takes_the_highest() {
        let severity = vk::DebugUtilsMessageSeverityFlagsEXT::INFO | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR;
        assert_eq!(severity_level(severity), log::Level::Error);
    }

    #[test]
    fn message_type_names() {
        assert_eq!(message_type_name(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL), "General");
        assert_eq!(message_type_name(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE), "Performance");
        assert_eq!(message_type_name(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION), "Validation");
        assert_eq!(message_type_name(vk::DebugUtilsMessageTypeFlagsEXT::empty()), "Unknown");
    }

    #[test]
    fn messenger_ci_follows_config() {
        let config = DebugUtilsConfig::default();
        let ci = messenger_ci(&config);

        assert_eq!(ci.s_type, vk::StructureType::DEBUG_UTILS_MESSENGER_CREATE_INFO_EXT);
        assert_eq!(ci.message_severity, config.severity);
        assert_eq!(ci.message_type, config.types);
        assert!(ci.pfn_user_callback.is_some());
    }

    #[test]
    fn callback_never_aborts_the_call() {
        let message = std::ffi::CString::new("vkCreateDevice: test message").unwrap();
        let data = vk::DebugUtilsMessengerCallbackDataEXT {
            p_message: message.as_ptr(),
            ..Default::default()
        };

        let result = unsafe {
            vulkan_debug_utils_callback(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
                vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
                &data, ptr::null_mut())
        };
        assert_eq!(result, vk::FALSE);
    }
}
