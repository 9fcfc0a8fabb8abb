use std::{env, io};

use anyhow::{Context, Result};
use awesome_cli::{
    cli::{self, Commands, BUILTIN_COMMANDS},
    config::Config,
    fs::OsFs,
    handlers,
    plugins::{PluginRegistry, SystemLauncher},
};
use is_terminal::IsTerminal;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Load config
    let cfg = Config::load();
    init_logging(args.verbose || cfg.verbose());

    match args.command {
        Commands::Version => {
            println!("{}", cli::version_line());
            Ok(())
        }
        Commands::List => {
            let registry = discover_plugins(&cfg);
            handlers::list::run(&registry, &mut io::stdout().lock())?;
            Ok(())
        }
        Commands::Report(report) => {
            let prefix = report.prefix.unwrap_or_else(|| cfg.report_prefix());
            let stdout = io::stdout();
            let color = stdout.is_terminal();
            handlers::report::run(
                &OsFs,
                &report.dir,
                &prefix,
                &report.out_dir,
                &mut stdout.lock(),
                color,
            )
            .context("Failed to output results")?;
            Ok(())
        }
        Commands::Plugin(argv) => {
            let registry = discover_plugins(&cfg);
            handlers::plugin::run(&registry, &SystemLauncher, &argv)?;
            Ok(())
        }
    }
}

fn discover_plugins(cfg: &Config) -> PluginRegistry {
    let sources = cfg.plugin_sources(env::var_os("PATH"));
    let mut registry = PluginRegistry::with_reserved(BUILTIN_COMMANDS.iter().copied());
    registry.discover(&OsFs, &sources);
    registry
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the verbosity switch.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .try_init();
}
