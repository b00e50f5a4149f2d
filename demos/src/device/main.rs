
//! Snapshot 02 - Physical and logical device
//!
//! Adds the window surface, picks a physical device able to draw and present to it,
//! and creates the logical device with its queues. Reports what the swapchain could use, then tears down.

use vkbase::context::{VkInstance, VkDebugger, VkSurface, VkDevice, VkBackendObject};
use vkbase::{WindowContext, VkResult};

fn main() {

    vkdemos::init_logger();
    vkdemos::exit_on_error(run());
}

fn run() -> VkResult<()> {

    let config = vkdemos::load_config()?;
    let window = WindowContext::new(config.window.clone())?;

    let instance = VkInstance::new(&config.instance, &config.validation, window.raw_display_handle())?;

    // undo the steps created so far, the last one first.
    macro_rules! unwind_on_error {
        ($step:expr, $($created:ident),+) => {
            match $step {
                | Ok(object) => object,
                | Err(e) => {
                    unsafe { $($created.discard();)+ }
                    return Err(e)
                },
            }
        };
    }

    let debugger = unwind_on_error!(VkDebugger::new(&instance, &config.validation), instance);
    let surface = unwind_on_error!(VkSurface::new(&instance, window.window()), debugger, instance);
    let device = unwind_on_error!(VkDevice::new(&instance, &surface, config.device.clone()), surface, debugger, instance);

    let report = report_swapchain_support(&surface, &device);

    device.discard_self();
    unsafe {
        surface.discard();
        debugger.discard();
        instance.discard();
    }

    report
}

fn report_swapchain_support(surface: &VkSurface, device: &VkDevice) -> VkResult<()> {

    let families = &device.phy.families;
    if families.is_shared() {
        log::info!("Graphics and presentation share queue family {}.", families.graphics);
    } else {
        log::info!("Graphics queue family {}, presentation queue family {}.", families.graphics, families.present);
    }

    let support = surface.query_support(device.phy.handle)?;
    let capabilities = &support.capabilities;

    log::info!("Swapchain support of {}:", device.phy.name);
    log::info!("\timage count: {} ~ {}", capabilities.min_image_count, capabilities.max_image_count);
    log::info!("\tcurrent extent: {}x{}", capabilities.current_extent.width, capabilities.current_extent.height);
    support.formats.iter().for_each(|format| {
        log::info!("\tformat: {:?} / {:?}", format.format, format.color_space);
    });
    support.present_modes.iter().for_each(|mode| {
        log::info!("\tpresent mode: {:?}", mode);
    });

    Ok(())
}
