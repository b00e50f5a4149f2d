
//! Setup shared by the snapshot binaries: logging and the optional configuration file.

use vkbase::{RendererConfig, VkResult};

use std::ffi::OsString;
use std::path::PathBuf;

/// Log to stderr, at `info` level unless `RUST_LOG` says otherwise.
pub fn init_logger() {

    let env = env_logger::Env::default()
        .default_filter_or("info");
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();
}

/// Load the configuration file given as the first command line argument, or the default configuration if none is given.
pub fn load_config() -> VkResult<RendererConfig> {

    match config_path(std::env::args_os()) {
        | Some(path) => {
            log::info!("Loading configuration from {}.", path.display());
            RendererConfig::load(path)
        },
        | None => Ok(RendererConfig::default()),
    }
}

/// Log the error of a snapshot and exit with a failure code.
pub fn exit_on_error(result: VkResult<()>) {

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn config_path(mut args: impl Iterator<Item = OsString>) -> Option<PathBuf> {
    // skip the program name.
    args.nth(1).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_argument_is_the_config_path() {
        let args = vec![OsString::from("triangle"), OsString::from("triangle.toml"), OsString::from("ignored")];
        assert_eq!(config_path(args.into_iter()), Some(PathBuf::from("triangle.toml")));
    }

    #[test]
    fn no_argument_means_defaults() {
        let args = vec![OsString::from("triangle")];
        assert_eq!(config_path(args.into_iter()), None);
    }
}
