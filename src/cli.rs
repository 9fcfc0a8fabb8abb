use std::{ffi::OsString, path::PathBuf};

use clap::{Args, Parser, Subcommand};

/// Names plugins may not take over.
pub const BUILTIN_COMMANDS: &[&str] = &["list", "version", "report", "help"];

#[derive(Parser, Debug, Clone)]
#[command(name = "awesome", about = "Awesome CLI: built-in tools plus `awesome-*` plugins", version)]
#[command(after_help = "Any other command is looked up among discovered plugins; see `awesome list`.")]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Lists all the available plugins.
    List,

    /// Print the version number of the CLI.
    Version,

    /// Aggregate Cucumber JSON reports into per-scenario counts.
    Report(ReportArgs),

    /// Run a discovered plugin.
    #[command(external_subcommand)]
    Plugin(Vec<OsString>),
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Directory holding the JSON reports.
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Prefix of JSON files to analyze (defaults to AWESOME_REPORT_PREFIX).
    #[arg(long)]
    pub prefix: Option<String>,

    /// Where the aggregated JSON and HTML files are written.
    #[arg(long = "out-dir", default_value = ".")]
    pub out_dir: PathBuf,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

pub fn version_line() -> String {
    format!("CLI Version v{}", env!("CARGO_PKG_VERSION"))
}
