
//! Snapshot 01 - Instance and validation layers
//!
//! Opens the window, creates the instance with the validation layers and the debug messenger,
//! lists what the loader offers, then destroys everything.

use vkbase::context::{VkInstance, VkDebugger, VkBackendObject};
use vkbase::{WindowContext, VkResult};

fn main() {

    vkdemos::init_logger();
    vkdemos::exit_on_error(run());
}

fn run() -> VkResult<()> {

    let mut config = vkdemos::load_config()?;
    config.instance.print_available_layers = true;
    config.instance.print_available_extensions = true;

    let window = WindowContext::new(config.window.clone())?;

    let instance = VkInstance::new(&config.instance, &config.validation, window.raw_display_handle())?;
    let debugger = match VkDebugger::new(&instance, &config.validation) {
        | Ok(debugger) => debugger,
        | Err(e) => {
            unsafe { instance.discard(); }
            return Err(e)
        },
    };

    if config.validation.is_enable {
        log::info!("Instance created with validation layers {:?}.", config.validation.layers);
    } else {
        log::info!("Instance created without validation.");
    }

    unsafe {
        debugger.discard();
        instance.discard();
    }

    Ok(())
}
