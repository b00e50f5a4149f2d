
pub use self::recorder::VkCmdRecorder;
pub use self::graphics::{IGraphics, CmdGraphicsApi};

mod recorder;
mod graphics;

use ash::vk;

/// Marker of the kind of commands a recorder may record.
pub trait VkCommandType {
    const BIND_POINT: vk::PipelineBindPoint;
}
