//! `report` handler: aggregate a directory and emit every sink.

use std::{io::Write, path::Path};

use tracing::debug;

use crate::{
    error::Result,
    fs::FileSystem,
    report::{
        aggregate,
        sinks::{emit_all, ConsoleSink, HtmlSink, JsonSink},
        Aggregate,
    },
};

/// Sinks run JSON, then HTML, then console; the first failure stops the rest.
pub fn run(
    fs: &dyn FileSystem,
    dir: &Path,
    prefix: &str,
    out_dir: &Path,
    console: &mut dyn Write,
    color: bool,
) -> Result<Aggregate> {
    let results = aggregate(fs, dir, prefix);
    debug!(scenarios = results.len(), dir = %dir.display(), "aggregated reports");

    let mut json = JsonSink::new(fs, out_dir, prefix);
    let mut html = HtmlSink::new(fs, out_dir, prefix);
    let mut console = ConsoleSink::new(console, color);
    emit_all(&mut [&mut json, &mut html, &mut console], &results)?;
    debug!(json = %json.path().display(), html = %html.path().display(), "report written");
    Ok(results)
}
