//! Command handlers, one per subcommand.

pub mod list;
pub mod plugin;
pub mod report;
