
use crate::vkchar;

use std::ffi::{ CStr, CString };

/// Helper function to convert [c_char; SIZE] to string
///
/// The array must contain a nul terminator, which is guaranteed for the fixed-size name fields filled by Vulkan.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn chars2string(raw_string_array: &[vkchar]) -> String {

    chars2cstring(raw_string_array)
        .to_string_lossy()
        .into_owned()
}

pub fn chars2cstring(raw_string_array: &[vkchar]) -> CString {

    let raw_string = unsafe {
        let pointer = raw_string_array.as_ptr();
        CStr::from_ptr(pointer)
    };

    raw_string.to_owned()
}

pub fn cstrings2ptrs(raw_string_array: &[CString]) -> Vec<*const vkchar> {

    raw_string_array.iter()
        .map(|l| l.as_ptr()).collect()
}

/// Return the required names which do not appear in `available`, keeping the order of `required`.
pub fn missing_names<'a>(available: &[String], required: &'a [String]) -> Vec<&'a str> {

    required.iter()
        .filter(|required_name| !available.contains(required_name))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_chars(name: &str) -> [vkchar; 256] {
        let mut chars = [0 as vkchar; 256];
        for (i, byte) in name.bytes().enumerate() {
            chars[i] = byte as vkchar;
        }
        chars
    }

    #[test]
    fn fixed_size_name_is_read_up_to_the_terminator() {
        let chars = to_chars("VK_LAYER_KHRONOS_validation");
        assert_eq!(chars2string(&chars), "VK_LAYER_KHRONOS_validation");
    }

    #[test]
    fn missing_names_keep_request_order() {
        let available = vec![String::from("VK_KHR_surface"), String::from("VK_KHR_xcb_surface")];
        let required = vec![
            String::from("VK_EXT_debug_utils"),
            String::from("VK_KHR_surface"),
            String::from("VK_KHR_wayland_surface"),
        ];

        assert_eq!(missing_names(&available, &required), vec!["VK_EXT_debug_utils", "VK_KHR_wayland_surface"]);
    }

    #[test]
    fn nothing_missing_when_all_available() {
        let available = vec![String::from("VK_LAYER_KHRONOS_validation")];
        assert!(missing_names(&available, &available).is_empty());
    }
}
