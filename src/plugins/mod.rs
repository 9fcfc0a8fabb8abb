//! Plugin discovery and dispatch.
//!
//! A plugin is any non-directory entry whose file name starts with the
//! configured prefix (`awesome-build` exposes the `build` command). Sources
//! are scanned in priority order and the first discovery of a command wins.

use std::{
    collections::BTreeMap,
    ffi::OsString,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    fs::FileSystem,
};

mod launch;

pub use launch::{ProcessLauncher, SystemLauncher};

/// A directory to scan together with the prefix that marks plugins in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginSource {
    pub dir: PathBuf,
    pub prefix: String,
}

impl PluginSource {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self { dir: dir.into(), prefix: prefix.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    /// Executable file name, prefix included.
    pub file_name: String,
    /// Absolute path used to launch the plugin.
    pub path: PathBuf,
    /// Subcommand name, prefix stripped.
    pub command: String,
}

#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Plugin>,
    reserved: Vec<String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that refuses plugins shadowing the given built-in commands.
    pub fn with_reserved<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            plugins: BTreeMap::new(),
            reserved: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Scan every source in order. Unreadable directories contribute nothing.
    pub fn discover(&mut self, fs: &dyn FileSystem, sources: &[PluginSource]) {
        for source in sources {
            if let Err(err) = self.scan(fs, source) {
                debug!("{err}");
            }
        }
    }

    /// Scan one directory, returning how many new commands it contributed.
    pub fn scan(&mut self, fs: &dyn FileSystem, source: &PluginSource) -> Result<usize> {
        let entries = fs
            .list_dir(&source.dir)
            .map_err(|source_err| Error::DirectoryUnreadable {
                path: source.dir.clone(),
                source: source_err,
            })?;

        let mut added = 0;
        for entry in entries {
            if entry.is_dir || !entry.name.starts_with(&source.prefix) {
                continue;
            }
            if self.register(&source.dir, &entry.name, &source.prefix) {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Register `dir/file_name`. Returns `false` when the command is
    /// already taken, reserved, or empty.
    pub fn register(&mut self, dir: &Path, file_name: &str, prefix: &str) -> bool {
        let Some(command) = file_name.strip_prefix(prefix) else {
            return false;
        };
        if command.is_empty() || self.plugins.contains_key(command) {
            return false;
        }
        if self.reserved.iter().any(|r| r == command) {
            debug!(file_name, "plugin shadows a built-in command, skipping");
            return false;
        }

        let plugin = Plugin {
            file_name: file_name.to_string(),
            path: absolute(dir).join(file_name),
            command: command.to_string(),
        };
        info!("Loaded plugin: {file_name}");
        self.plugins.insert(plugin.command.clone(), plugin);
        true
    }

    pub fn get(&self, command: &str) -> Option<&Plugin> {
        self.plugins.get(command)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Registered plugins ordered by command name.
    pub fn iter(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.values()
    }

    /// Run the plugin behind `command`, blocking until it exits.
    ///
    /// Returns the child's exit code (`None` when it was killed by a signal).
    /// A non-zero code is reported but is not an error of the host.
    pub fn invoke(
        &self,
        launcher: &dyn ProcessLauncher,
        command: &str,
        args: &[OsString],
    ) -> Result<Option<i32>> {
        let plugin = self
            .get(command)
            .ok_or_else(|| Error::UnknownCommand(command.to_string()))?;

        debug!(path = %plugin.path.display(), "Executing plugin");
        let code = launcher
            .run(&plugin.path, args)
            .map_err(|source| Error::PluginLaunchFailure {
                path: plugin.path.clone(),
                source,
            })?;
        if code != Some(0) {
            info!(
                "Error executing plugin {}: exit status {}",
                plugin.path.display(),
                code.map_or_else(|| "signal".to_string(), |c| c.to_string())
            );
        }
        Ok(code)
    }
}

fn absolute(dir: &Path) -> PathBuf {
    std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemFs;

    #[test]
    fn strips_prefix_and_skips_dirs_and_strangers() {
        let fs = MemFs::new();
        fs.add_file("/plugins/awesome-build", "");
        fs.add_file("/plugins/other-tool", "");
        fs.add_dir("/plugins/awesome-dir");

        let mut registry = PluginRegistry::new();
        let added = registry
            .scan(&fs, &PluginSource::new("/plugins", "awesome-"))
            .unwrap();

        assert_eq!(added, 1);
        let plugin = registry.get("build").unwrap();
        assert_eq!(plugin.file_name, "awesome-build");
        assert_eq!(plugin.path, PathBuf::from("/plugins/awesome-build"));
        assert!(registry.get("dir").is_none());
    }

    #[test]
    fn bare_prefix_is_not_a_command() {
        let mut registry = PluginRegistry::new();
        assert!(!registry.register(Path::new("/p"), "awesome-", "awesome-"));
        assert!(registry.is_empty());
    }

    #[test]
    fn reserved_names_are_refused() {
        let mut registry = PluginRegistry::with_reserved(["list", "version"]);
        assert!(!registry.register(Path::new("/p"), "awesome-list", "awesome-"));
        assert!(registry.register(Path::new("/p"), "awesome-lint", "awesome-"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unreadable_dir_is_reported_by_scan() {
        let fs = MemFs::new();
        let mut registry = PluginRegistry::new();
        let err = registry
            .scan(&fs, &PluginSource::new("/missing", "awesome-"))
            .unwrap_err();
        assert!(matches!(err, Error::DirectoryUnreadable { .. }));
    }

    #[test]
    fn relative_dirs_resolve_to_absolute_paths() {
        let mut registry = PluginRegistry::new();
        registry.register(Path::new("bin"), "awesome-x", "awesome-");
        assert!(registry.get("x").unwrap().path.is_absolute());
    }
}
