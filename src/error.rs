//! Error taxonomy shared by the registrar and the aggregator.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read directory {}: {source}", path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot decode report {}: {reason}", path.display())]
    DecodeFailure { path: PathBuf, reason: String },
    #[error("failed to write {sink} output to {target}: {source}")]
    SinkWriteFailure {
        sink: &'static str,
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to launch plugin {}: {source}", path.display())]
    PluginLaunchFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
}

pub type Result<T> = std::result::Result<T, Error>;
