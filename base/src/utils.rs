
pub mod cast;
pub mod time;
pub mod frame;

#[cfg(feature = "shaderc")]
pub mod shaderc;
