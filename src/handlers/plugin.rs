//! Plugin dispatch handler.

use std::ffi::OsString;

use tracing::info;

use crate::{
    error::{Error, Result},
    plugins::{PluginRegistry, ProcessLauncher},
};

/// Run the plugin named by `argv[0]` with the remaining arguments.
///
/// The plugin's exit status and launch failures never fail the host; only
/// an unknown command does.
pub fn run(registry: &PluginRegistry, launcher: &dyn ProcessLauncher, argv: &[OsString]) -> Result<()> {
    let Some((name, args)) = argv.split_first() else {
        return Err(Error::UnknownCommand(String::new()));
    };
    let name = name.to_string_lossy();

    match registry.invoke(launcher, &name, args) {
        Ok(_) => Ok(()),
        Err(err @ Error::PluginLaunchFailure { .. }) => {
            info!("{err}");
            Ok(())
        }
        Err(err) => Err(err),
    }
}
