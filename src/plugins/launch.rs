//! Process launch capability for plugin invocation.

use std::{ffi::OsString, io, path::Path, process::Command};

pub trait ProcessLauncher {
    /// Run `path` with `args`, sharing the caller's stdout and stderr, and
    /// wait for it. Returns the exit code, or `None` if the child was
    /// terminated by a signal.
    fn run(&self, path: &Path, args: &[OsString]) -> io::Result<Option<i32>>;
}

/// Launches plugins as child processes of the host. No timeout: a hung
/// plugin hangs the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn run(&self, path: &Path, args: &[OsString]) -> io::Result<Option<i32>> {
        let status = Command::new(path).args(args).status()?;
        Ok(status.code())
    }
}
