//! `list` handler: prints the discovered plugins.

use std::io::{self, Write};

use crate::plugins::PluginRegistry;

pub fn run(registry: &PluginRegistry, out: &mut dyn Write) -> io::Result<()> {
    if registry.is_empty() {
        writeln!(out, "No plugins found.")?;
        return Ok(());
    }

    writeln!(out, "Available plugins:")?;
    for plugin in registry.iter() {
        writeln!(out, "  - {} ({})", plugin.command, plugin.path.display())?;
    }
    Ok(())
}
