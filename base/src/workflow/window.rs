
use ash::vk;
use raw_window_handle::{HasRawDisplayHandle, RawDisplayHandle};
use winit::dpi::PhysicalSize;
use winit::event_loop::EventLoop;
use winit::window::{Fullscreen, WindowBuilder};

use crate::error::{VkResult, VkError};

/// The configuration parameters used to open the application window.
#[derive(Debug, Clone)]
pub struct WindowConfig {

    pub title: String,
    pub mode: WindowMode,

    /// the initial inner size of window, in physical pixels.
    pub dimension: vk::Extent2D,
    pub max_dimension: Option<vk::Extent2D>,
    pub min_dimension: Option<vk::Extent2D>,

    /// Resizing only raises a flag in the event controller; the swapchain is never rebuilt.
    pub is_resizable: bool,
}

impl Default for WindowConfig {

    fn default() -> WindowConfig {

        WindowConfig {
            title: String::from("Vulkan"),
            mode: WindowMode::Normal,

            dimension: vk::Extent2D {
                width : 800,
                height: 600,
            },
            max_dimension: None,
            min_dimension: None,

            is_resizable: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WindowMode {
    Normal,
    Maximized,
    Fullscreen,
}


pub struct WindowContext {

    pub(crate) event_loop: EventLoop<()>,
    pub(crate) handle: winit::window::Window,
}

impl WindowContext {

    pub fn new(config: WindowConfig) -> VkResult<WindowContext> {

        let event_loop = EventLoop::new();

        let mut builder = WindowBuilder::new()
            .with_title(config.title)
            .with_inner_size(PhysicalSize::new(config.dimension.width, config.dimension.height))
            .with_resizable(config.is_resizable);

        if let Some(min) = config.min_dimension {
            builder = builder.with_min_inner_size(PhysicalSize::new(min.width, min.height));
        }

        if let Some(max) = config.max_dimension {
            builder = builder.with_max_inner_size(PhysicalSize::new(max.width, max.height));
        }

        builder = match config.mode {
            | WindowMode::Maximized => {
                builder.with_maximized(true)
            },
            | WindowMode::Fullscreen => {
                // borderless on the current monitor.
                builder.with_fullscreen(Some(Fullscreen::Borderless(None)))
            },
            | WindowMode::Normal => {
                builder
            },
        };

        let handle = builder.build(&event_loop)
            .map_err(|e| VkError::window(e.to_string()))?;
        log::debug!("Window created with inner size {:?}.", handle.inner_size());

        let window = WindowContext { event_loop, handle };
        Ok(window)
    }

    /// The size of the drawable area of window, in pixels.
    pub fn dimension(&self) -> vk::Extent2D {

        let size = self.handle.inner_size();
        vk::Extent2D { width: size.width, height: size.height }
    }

    pub fn window(&self) -> &winit::window::Window {
        &self.handle
    }

    /// The display connection of window, which decides the surface extensions an instance needs.
    pub fn raw_display_handle(&self) -> RawDisplayHandle {
        self.handle.raw_display_handle()
    }
}
