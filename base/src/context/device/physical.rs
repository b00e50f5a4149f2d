
use ash::vk;

use crate::context::instance::VkInstance;
use crate::context::surface::VkSurface;
use crate::context::device::queue::QueueFamilyIndices;
use crate::utils::cast::{chars2string, missing_names};
use crate::error::{VkResult, VkError};

use std::ffi::CString;

#[derive(Debug, Clone)]
pub struct PhysicalDevConfig {

    /// log the name, type and API version of every enumerated device.
    pub print_device_properties: bool,
    /// devices of this type are picked before the others.
    pub device_type_preference: vk::PhysicalDeviceType,

    pub print_available_extensions: bool,
    /// device extensions the selected device must support.
    pub request_extensions: Vec<CString>,

    pub print_available_features: bool,
    pub request_features: vk::PhysicalDeviceFeatures,
}

impl Default for PhysicalDevConfig {

    fn default() -> PhysicalDevConfig {

        PhysicalDevConfig {
            print_device_properties: false,
            device_type_preference: vk::PhysicalDeviceType::DISCRETE_GPU,

            print_available_extensions: false,
            request_extensions: vec![
                ash::extensions::khr::Swapchain::name().to_owned(),
            ],

            print_available_features: false,
            request_features: vk::PhysicalDeviceFeatures::default(),
        }
    }
}

/// The physical device chosen for rendering.
pub struct VkPhysicalDevice {

    pub handle: vk::PhysicalDevice,
    pub families: QueueFamilyIndices,
    pub memories: vk::PhysicalDeviceMemoryProperties,
    pub limits: vk::PhysicalDeviceLimits,
    pub name: String,

    config: PhysicalDevConfig,
}

impl VkPhysicalDevice {

    pub(crate) fn new(instance: &VkInstance, surface: &VkSurface, config: PhysicalDevConfig) -> VkResult<VkPhysicalDevice> {

        let handles = unsafe {
            instance.handle.enumerate_physical_devices()
                .map_err(|_| VkError::query("Physical Device"))?
        };

        if handles.is_empty() {
            return Err(VkError::query("Physical Device"))
        }

        let mut candidates = Vec::with_capacity(handles.len());
        for handle in handles.into_iter() {
            candidates.push(PhyDeviceCandidate::inspect(instance, surface, handle, &config)?);
        }

        let selected = select_device(&candidates, config.device_type_preference)
            .ok_or_else(|| VkError::unsupported("suitable Vulkan device"))?;
        let selected = &candidates[selected];

        // a suitable candidate always has its queue families.
        let families = selected.families
            .ok_or_else(|| VkError::unsupported("graphics and present queue families"))?;

        let memories = unsafe {
            instance.handle.get_physical_device_memory_properties(selected.handle)
        };

        let name = chars2string(&selected.property.device_name);
        log::info!("Using device: {} ({}).", name, device_type_name(selected.property.device_type));
        log::info!("Queue families: graphics = {}, present = {}.", families.graphics, families.present);

        let dst_device = VkPhysicalDevice {
            handle: selected.handle,
            limits: selected.property.limits,
            families, memories, name, config,
        };
        Ok(dst_device)
    }

    pub fn enable_features(&self) -> &vk::PhysicalDeviceFeatures {
        &self.config.request_features
    }

    pub fn enable_extensions(&self) -> &[CString] {
        &self.config.request_extensions
    }
}

/// The facts about one enumerated device that decide whether it can be used.
struct PhyDeviceCandidate {

    handle: vk::PhysicalDevice,
    property: vk::PhysicalDeviceProperties,
    families: Option<QueueFamilyIndices>,
    is_extensions_support: bool,
    is_features_support: bool,
    is_surface_adequate: bool,
}

impl PhyDeviceCandidate {

    fn inspect(instance: &VkInstance, surface: &VkSurface, handle: vk::PhysicalDevice, config: &PhysicalDevConfig) -> VkResult<PhyDeviceCandidate> {

        let property = unsafe {
            instance.handle.get_physical_device_properties(handle)
        };
        let device_name = chars2string(&property.device_name);

        if config.print_device_properties {
            print_device_properties(&property);
        }

        let family_properties = unsafe {
            instance.handle.get_physical_device_queue_family_properties(handle)
        };
        let families = QueueFamilyIndices::find(&family_properties, |family_index| {
            surface.query_is_family_presentable(handle, family_index)
        })?;

        // check extensions.
        let available_extensions = unsafe {
            instance.handle.enumerate_device_extension_properties(handle)
                .map_err(|_| VkError::query("Device Extensions"))?
        };
        let available_extensions: Vec<String> = available_extensions.iter()
            .map(|extension| chars2string(&extension.extension_name))
            .collect();

        if config.print_available_extensions {
            log::info!("Available extensions for {}:", device_name);
            available_extensions.iter().for_each(|extension| log::info!("\t{}", extension));
        }

        let request_extensions: Vec<String> = config.request_extensions.iter()
            .map(|extension| extension.to_string_lossy().into_owned())
            .collect();
        let missing_extensions = missing_names(&available_extensions, &request_extensions);
        if !missing_extensions.is_empty() {
            log::debug!("{} lacks extensions [{}].", device_name, missing_extensions.join(", "));
        }

        // check features.
        let available_features = unsafe {
            instance.handle.get_physical_device_features(handle)
        };
        if config.print_available_features {
            log::info!("Available features for {}: {:?}", device_name, available_features);
        }
        let missing_features = unsupported_features(&available_features, &config.request_features);
        if !missing_features.is_empty() {
            log::debug!("{} lacks features [{}].", device_name, missing_features.join(", "));
        }

        // the surface is only queried on devices that could present to it.
        let is_surface_adequate = if families.is_some() && missing_extensions.is_empty() {
            surface.query_support(handle)?.is_adequate()
        } else {
            false
        };

        let candidate = PhyDeviceCandidate {
            handle, property, families,
            is_extensions_support: missing_extensions.is_empty(),
            is_features_support: missing_features.is_empty(),
            is_surface_adequate,
        };
        Ok(candidate)
    }

    fn is_suitable(&self) -> bool {
        self.families.is_some()
            && self.is_extensions_support
            && self.is_features_support
            && self.is_surface_adequate
    }
}

/// Pick the first suitable device of the preferred type, or else the first suitable device.
fn select_device(candidates: &[PhyDeviceCandidate], preference: vk::PhysicalDeviceType) -> Option<usize> {

    let mut suitable = candidates.iter().enumerate()
        .filter(|(_, candidate)| candidate.is_suitable());

    let first_suitable = suitable.next()?;
    if first_suitable.1.property.device_type == preference {
        return Some(first_suitable.0)
    }

    suitable.find(|(_, candidate)| candidate.property.device_type == preference)
        .map(|(index, _)| index)
        .or(Some(first_suitable.0))
}

fn print_device_properties(property: &vk::PhysicalDeviceProperties) {

    log::info!("Device: {}", chars2string(&property.device_name));
    log::info!("\tType: {}", device_type_name(property.device_type));
    log::info!("\tAPI version: {}.{}.{}",
        vk::api_version_major(property.api_version),
        vk::api_version_minor(property.api_version),
        vk::api_version_patch(property.api_version));
    log::info!("\tDriver version: {}", property.driver_version);
}

fn device_type_name(device_type: vk::PhysicalDeviceType) -> &'static str {

    match device_type {
        | vk::PhysicalDeviceType::CPU            => "CPU",
        | vk::PhysicalDeviceType::INTEGRATED_GPU => "Integrated GPU",
        | vk::PhysicalDeviceType::DISCRETE_GPU   => "Discrete GPU",
        | vk::PhysicalDeviceType::VIRTUAL_GPU    => "Virtual GPU",
        | _ => "Unknown",
    }
}


// Physical Feature ------------------------------------------------------------------
macro_rules! unsupported_features {
    ($available:ident, $request:ident, {
        $(
           $feature:ident,
        )*
    }) => {{
        let mut missing = Vec::new();
        $(
            if $request.$feature == vk::TRUE && $available.$feature == vk::FALSE {
                missing.push(stringify!($feature));
            }
        )*
        missing
    }};
}

/// Return the names of the requested features that the device does not support.
fn unsupported_features(available: &vk::PhysicalDeviceFeatures, request: &vk::PhysicalDeviceFeatures) -> Vec<&'static str> {

    unsupported_features!(available, request, {
        robust_buffer_access,
        full_draw_index_uint32,
        image_cube_array,
        independent_blend,
        geometry_shader,
        tessellation_shader,
        sample_rate_shading,
        dual_src_blend,
        logic_op,
        multi_draw_indirect,
        draw_indirect_first_instance,
        depth_clamp,
        depth_bias_clamp,
        fill_mode_non_solid,
        depth_bounds,
        wide_lines,
        large_points,
        alpha_to_one,
        multi_viewport,
        sampler_anisotropy,
        texture_compression_etc2,
        texture_compression_astc_ldr,
        texture_compression_bc,
        occlusion_query_precise,
        pipeline_statistics_query,
        vertex_pipeline_stores_and_atomics,
        fragment_stores_and_atomics,
        shader_tessellation_and_geometry_point_size,
        shader_image_gather_extended,
        shader_storage_image_extended_formats,
        shader_storage_image_multisample,
        shader_storage_image_read_without_format,
        shader_storage_image_write_without_format,
        shader_uniform_buffer_array_dynamic_indexing,
        shader_sampled_image_array_dynamic_indexing,
        shader_storage_buffer_array_dynamic_indexing,
        shader_storage_image_array_dynamic_indexing,
        shader_clip_distance,
        shader_cull_distance,
        shader_float64,
        shader_int64,
        shader_int16,
        shader_resource_residency,
        shader_resource_min_lod,
        sparse_binding,
        sparse_residency_buffer,
        sparse_residency_image2_d,
        sparse_residency_image3_d,
        sparse_residency2_samples,
        sparse_residency4_samples,
        sparse_residency8_samples,
        sparse_residency16_samples,
        sparse_residency_aliased,
        variable_multisample_rate,
        inherited_queries,
    })
}
// ----------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    fn candidate(raw: u64, device_type: vk::PhysicalDeviceType, is_suitable: bool) -> PhyDeviceCandidate {
        PhyDeviceCandidate {
            handle: vk::PhysicalDevice::from_raw(raw),
            property: vk::PhysicalDeviceProperties { device_type, ..Default::default() },
            families: Some(QueueFamilyIndices { graphics: 0, present: 0 }),
            is_extensions_support: is_suitable,
            is_features_support: true,
            is_surface_adequate: true,
        }
    }

    #[test]
    fn preferred_type_wins() {
        let candidates = [
            candidate(1, vk::PhysicalDeviceType::INTEGRATED_GPU, true),
            candidate(2, vk::PhysicalDeviceType::DISCRETE_GPU, true),
        ];
        assert_eq!(select_device(&candidates, vk::PhysicalDeviceType::DISCRETE_GPU), Some(1));
    }

    #[test]
    fn first_suitable_without_preferred_type() {
        let candidates = [
            candidate(1, vk::PhysicalDeviceType::CPU, false),
            candidate(2, vk::PhysicalDeviceType::INTEGRATED_GPU, true),
            candidate(3, vk::PhysicalDeviceType::VIRTUAL_GPU, true),
        ];
        assert_eq!(select_device(&candidates, vk::PhysicalDeviceType::DISCRETE_GPU), Some(1));
    }

    #[test]
    fn unsuitable_preferred_device_is_ignored() {
        let candidates = [
            candidate(1, vk::PhysicalDeviceType::DISCRETE_GPU, false),
            candidate(2, vk::PhysicalDeviceType::INTEGRATED_GPU, true),
        ];
        assert_eq!(select_device(&candidates, vk::PhysicalDeviceType::DISCRETE_GPU), Some(1));
    }

    #[test]
    fn every_requirement_counts() {
        let mut no_families = candidate(1, vk::PhysicalDeviceType::DISCRETE_GPU, true);
        no_families.families = None;
        let mut no_features = candidate(2, vk::PhysicalDeviceType::DISCRETE_GPU, true);
        no_features.is_features_support = false;
        let mut no_surface = candidate(3, vk::PhysicalDeviceType::DISCRETE_GPU, true);
        no_surface.is_surface_adequate = false;

        assert_eq!(select_device(&[no_families, no_features, no_surface], vk::PhysicalDeviceType::DISCRETE_GPU), None);
        assert_eq!(select_device(&[], vk::PhysicalDeviceType::DISCRETE_GPU), None);
    }

    #[test]
    fn requested_features_must_be_available() {
        let available = vk::PhysicalDeviceFeatures { sampler_anisotropy: vk::TRUE, ..Default::default() };
        let request = vk::PhysicalDeviceFeatures {
            sampler_anisotropy: vk::TRUE,
            geometry_shader: vk::TRUE,
            ..Default::default()
        };

        assert_eq!(unsupported_features(&available, &request), vec!["geometry_shader"]);
        assert!(unsupported_features(&available, &vk::PhysicalDeviceFeatures::default()).is_empty());
    }

    #[test]
    fn swapchain_is_requested_by_default() {
        let config = PhysicalDevConfig::default();
        assert_eq!(config.request_extensions, vec![CString::new("VK_KHR_swapchain").unwrap()]);
    }
}
