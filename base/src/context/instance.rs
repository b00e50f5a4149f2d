
use ash::vk;
use raw_window_handle::RawDisplayHandle;

use crate::context::debug::{self, ValidationConfig};
use crate::context::objects::VkBackendObject;
use crate::utils::cast::{chars2string, cstrings2ptrs, missing_names};
use crate::error::{VkResult, VkError};
use crate::vkuint;

use std::ffi::{CStr, CString};
use std::os::raw::c_void;
use std::ptr;

/// The configuration parameters used in the initialization of `vk::Instance`.
#[derive(Debug, Clone)]
pub struct InstanceConfig {

    /// `api_version` must be the highest version of Vulkan that the application is designed to use.
    ///
    /// The patch version number is ignored and only the major and minor versions must match those requested in `api_version`.
    pub api_version: vkuint,
    /// `application_version` is an unsigned integer variable containing the developer-supplied version number of the application.
    pub application_version: vkuint,
    /// `engine_version`is an unsigned integer variable containing the developer-supplied version number of the engine used to create the application.
    pub engine_version: vkuint,
    /// `application_name` is a string containing the name of the application.
    pub application_name: String,
    /// `engine_name` is the name of the engine used to create the application.
    pub engine_name: String,
    /// `print_available_layers` specific program to log all available instance layers.
    pub print_available_layers: bool,
    /// `print_available_extensions` specific program to log all available instance extensions.
    pub print_available_extensions: bool,
}

impl Default for InstanceConfig {

    fn default() -> InstanceConfig {
       InstanceConfig {
           api_version         : vk::make_api_version(0, 1, 0, 0),
           application_version : vk::make_api_version(0, 1, 0, 0),
           engine_version      : vk::make_api_version(0, 1, 0, 0),
           application_name    : String::from("Hello Triangle"),
           engine_name         : String::from("No Engine"),
           print_available_layers    : false,
           print_available_extensions: false,
       }
    }
}

/// Wrapper class for `vk::Instance` object.
pub struct VkInstance {

    /// handle of `vk::Instance`.
    pub(crate) handle: ash::Instance,
    /// the object used in instance creation define in ash crate.
    pub(crate) entry: ash::Entry,
    /// an array to store the names of vulkan layers enabled in instance creation.
    pub(crate) enable_layer_names: Vec<CString>,
}

impl VkInstance {

    /// Initialize `vk::Instance` object.
    ///
    /// `display` is the display of the window to present to, it decides which surface extensions are required.
    pub fn new(config: &InstanceConfig, validation: &ValidationConfig, display: RawDisplayHandle) -> VkResult<VkInstance> {

        let entry = unsafe {
            ash::Entry::load()
                .map_err(|_| VkError::unlink("Entry"))?
        };

        let app_name = CString::new(config.application_name.as_bytes())
            .map_err(|_| VkError::other("Failed to cast application name to CString."))?;
        let engine_name = CString::new(config.engine_name.as_bytes())
            .map_err(|_| VkError::other("Failed to cast engine name to CString."))?;

        let application_info = vk::ApplicationInfo {
            s_type              : vk::StructureType::APPLICATION_INFO,
            p_next              : ptr::null(),
            p_application_name  : app_name.as_ptr(),
            application_version : config.application_version,
            p_engine_name       : engine_name.as_ptr(),
            engine_version      : config.engine_version,
            api_version         : config.api_version,
        };

        // validation layers are the only instance layers requested.
        let require_layers = if validation.is_enable {
            validation.layers.clone()
        } else {
            Vec::new()
        };

        // check if all instance layer is support.
        let available_layers = query_available_layers(&entry)?;
        if config.print_available_layers {
            log::info!("Available instance layers:");
            available_layers.iter().for_each(|layer| log::info!("\t{}", layer));
        }
        let missing_layers = missing_names(&available_layers, &require_layers);
        if !missing_layers.is_empty() {
            return Err(VkError::unsupported(format!("instance layers [{}]", missing_layers.join(", "))))
        }

        // get the names of required vulkan layers.
        let enable_layer_names = names_to_cstring(&require_layers)?;
        let enable_layer_names_ptr = cstrings2ptrs(&enable_layer_names);

        // get the names of required vulkan extensions and make sure they are support.
        let surface_extensions = ash_window::enumerate_required_extensions(display)
            .map_err(|_| VkError::query("Surface Extensions"))?;
        let surface_extensions: Vec<CString> = surface_extensions.iter().map(|&name| {
            unsafe { CStr::from_ptr(name) }.to_owned()
        }).collect();
        let enable_extension_names = require_extensions(surface_extensions, validation.is_enable);

        let available_extensions = query_available_extensions(&entry)?;
        if config.print_available_extensions {
            log::info!("Available instance extensions:");
            available_extensions.iter().for_each(|extension| log::info!("\t{}", extension));
        }
        let require_extension_strings: Vec<String> = enable_extension_names.iter()
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        let missing_extensions = missing_names(&available_extensions, &require_extension_strings);
        if !missing_extensions.is_empty() {
            return Err(VkError::unsupported(format!("instance extensions [{}]", missing_extensions.join(", "))))
        }
        let enable_extension_names_ptr = cstrings2ptrs(&enable_extension_names);

        // chain the messenger create info so that instance creation and destruction get validated too.
        let debug_ci = debug::messenger_ci(&validation.utils_config);
        let p_next = if validation.is_enable {
            &debug_ci as *const vk::DebugUtilsMessengerCreateInfoEXT as *const c_void
        } else {
            ptr::null()
        };

        let instance_ci = vk::InstanceCreateInfo {
            s_type                     : vk::StructureType::INSTANCE_CREATE_INFO,
            p_next,
            flags                      : vk::InstanceCreateFlags::empty(),
            p_application_info         : &application_info,
            enabled_layer_count        : enable_layer_names_ptr.len() as _,
            pp_enabled_layer_names     : enable_layer_names_ptr.as_ptr(),
            enabled_extension_count    : enable_extension_names_ptr.len() as _,
            pp_enabled_extension_names : enable_extension_names_ptr.as_ptr(),
        };

        // create vk::Instance object.
        let handle = unsafe {
            entry.create_instance(&instance_ci, None)
                .map_err(|_| VkError::unlink("Instance"))?
        };
        log::debug!("Instance created with layers {:?} and extensions {:?}.", require_layers, require_extension_strings);

        let instance = VkInstance { entry, handle, enable_layer_names };
        Ok(instance)
    }
}

impl VkBackendObject for VkInstance {

    /// Destroy the `vk::Instance` object.
    ///
    /// In Vulkan, all child objects created using instance must have been destroyed prior to destroying instance.
    unsafe fn discard(&self) {
        self.handle.destroy_instance(None);
        log::debug!("Instance destroyed.");
    }
}

/// Specify the necessary extensions: the platform surface extensions, plus debug utils if validation is on.
fn require_extensions(surface_extensions: Vec<CString>, is_enable_validation: bool) -> Vec<CString> {

    let mut instance_extensions = surface_extensions;

    if is_enable_validation {
        instance_extensions.push(ash::extensions::ext::DebugUtils::name().to_owned());
    }

    instance_extensions
}

fn query_available_layers(entry: &ash::Entry) -> VkResult<Vec<String>> {

    let layer_properties = entry.enumerate_instance_layer_properties()
        .map_err(|_| VkError::query("Layer Properties"))?;

    let available_layer_names = layer_properties.iter().map(|available_layer| {
        chars2string(&available_layer.layer_name)
    }).collect();
    Ok(available_layer_names)
}

fn query_available_extensions(entry: &ash::Entry) -> VkResult<Vec<String>> {

    let extension_properties = entry.enumerate_instance_extension_properties(None)
        .map_err(|_| VkError::query("Instance Extensions"))?;

    let available_extension_names = extension_properties.iter().map(|extension| {
        chars2string(&extension.extension_name)
    }).collect();
    Ok(available_extension_names)
}

fn names_to_cstring(names: &[String]) -> VkResult<Vec<CString>> {

    let mut converted = Vec::with_capacity(names.len());

    for name in names.iter() {
        let name_converted = CString::new(name.as_bytes())
            .map_err(|_| VkError::other("Failed to cast instance layer name to CString."))?;
        converted.push(name_converted);
    }

    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_names() -> Vec<CString> {
        vec![
            CString::new("VK_KHR_surface").unwrap(),
            CString::new("VK_KHR_xlib_surface").unwrap(),
        ]
    }

    #[test]
    fn debug_utils_only_with_validation() {
        let with_validation = require_extensions(surface_names(), true);
        assert_eq!(with_validation.len(), 3);
        assert_eq!(with_validation[2].as_c_str(), ash::extensions::ext::DebugUtils::name());

        let without_validation = require_extensions(surface_names(), false);
        assert_eq!(without_validation, surface_names());
    }

    #[test]
    fn layer_names_with_nul_are_rejected() {
        let names = vec![String::from("VK_LAYER\0broken")];
        assert!(names_to_cstring(&names).is_err());
    }

    #[test]
    fn default_config_targets_vulkan_1_0() {
        let config = InstanceConfig::default();
        assert_eq!(vk::api_version_major(config.api_version), 1);
        assert_eq!(vk::api_version_minor(config.api_version), 0);
    }
}
